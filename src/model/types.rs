//! Records exchanged with the news API.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One news item as served by the backend. Read-only on the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publish_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
}

impl ArticleRecord {
    /// Calendar day of publication. The backend emits HTTP dates
    /// (`Tue, 15 Oct 2024 00:00:00 GMT`), but ISO forms show up in fixtures.
    pub fn published_on(&self) -> Option<NaiveDate> {
        let raw = self.publish_date.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.date_naive());
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt.date());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    /// `Month D, YYYY`, or the raw string when it cannot be parsed.
    pub fn display_date(&self) -> String {
        match self.published_on() {
            Some(day) => format_long_date(day),
            None => self.publish_date.trim().to_string(),
        }
    }
}

pub fn format_long_date(day: NaiveDate) -> String {
    day.format("%B %-d, %Y").to_string()
}

/// One page of `/get_articles` (the backend serves 21 articles per page).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
    pub current_page: u32,
    pub total_pages: u32,
}

/// One entry of `/data`: a word and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub text: String,
    pub size: u32,
}

/// Values accepted by the topic and source filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

const BUILTIN_TOPICS: &[&str] = &[
    "Agriculture & Food",
    "Business & Innovation",
    "Climate Change",
    "Crisis & Disasters",
    "Energy",
    "Fossil Fuels",
    "Pollution",
    "Politics & Law",
    "Public Health & Environment",
    "Society & Culture",
    "Sustainability",
    "Technology & Science",
    "Urban & Infrastructure",
    "Water & Oceans",
    "Wildlife & Conservation",
];

/// Outlets the site aggregates, with the homepage their badge links to.
const SOURCES: &[SourceInfo] = &[
    SourceInfo {
        name: "BBC News",
        homepage: "https://www.bbc.com/news/science_and_environment",
    },
    SourceInfo {
        name: "Columbia Climate School",
        homepage: "https://news.climate.columbia.edu/",
    },
    SourceInfo {
        name: "Earth911",
        homepage: "https://earth911.com/",
    },
    SourceInfo {
        name: "Greenpeace",
        homepage: "https://www.greenpeace.org/canada/en/",
    },
    SourceInfo {
        name: "Grist",
        homepage: "https://grist.org/",
    },
    SourceInfo {
        name: "The Guardian",
        homepage: "https://www.theguardian.com/us/environment",
    },
    SourceInfo {
        name: "The Independent",
        homepage: "https://www.independent.co.uk/climate-change/news",
    },
    SourceInfo {
        name: "Yale Environment 360",
        homepage: "https://e360.yale.edu/",
    },
];

impl FilterOptions {
    /// The enumeration the site ships with; used until `/filter-options` answers.
    pub fn builtin() -> Self {
        Self {
            sources: SOURCES.iter().map(|s| s.name.to_string()).collect(),
            topics: BUILTIN_TOPICS.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Server lists with blanks dropped. An empty server list keeps the builtin one.
    pub fn merged_with_builtin(self) -> Self {
        let builtin = Self::builtin();
        let clean = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        };
        let sources = clean(self.sources);
        let topics = clean(self.topics);
        Self {
            sources: if sources.is_empty() {
                builtin.sources
            } else {
                sources
            },
            topics: if topics.is_empty() {
                builtin.topics
            } else {
                topics
            },
        }
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: &'static str,
    pub homepage: &'static str,
}

pub fn source_info(name: &str) -> Option<&'static SourceInfo> {
    SOURCES.iter().find(|s| s.name == name.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_http_date_from_backend() {
        let record: ArticleRecord = serde_json::from_str(
            r#"{"title":"Heat","publish_date":"Tue, 15 Oct 2024 00:00:00 GMT","source":"Grist","extra":1}"#,
        )
        .unwrap();
        assert_eq!(record.display_date(), "October 15, 2024");
        assert_eq!(record.summary, "");
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let record: ArticleRecord =
            serde_json::from_str(r#"{"title":null,"image":null,"publish_date":"2024-03-01"}"#)
                .unwrap();
        assert_eq!(record.title, "");
        assert_eq!(record.image, "");
        assert_eq!(record.display_date(), "March 1, 2024");
    }

    #[test]
    fn unparseable_date_is_shown_raw() {
        let record = ArticleRecord {
            publish_date: "sometime".into(),
            ..Default::default()
        };
        assert_eq!(record.display_date(), "sometime");
    }

    #[test]
    fn empty_server_lists_fall_back_to_builtin() {
        let merged = FilterOptions {
            sources: vec!["Grist".into(), " ".into()],
            topics: vec![],
        }
        .merged_with_builtin();
        assert_eq!(merged.sources, vec!["Grist".to_string()]);
        assert_eq!(merged.topics.len(), 15);
    }

    #[test]
    fn source_badges_resolve_homepages() {
        assert_eq!(
            source_info("The Guardian").map(|s| s.homepage),
            Some("https://www.theguardian.com/us/environment")
        );
        assert!(source_info("Unknown Daily").is_none());
    }
}
