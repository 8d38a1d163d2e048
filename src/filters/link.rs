//! Launch parameters carried by a shared link (`?topic=..&source=..&keyword=..`).

/// Filters requested at launch. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchParams {
    pub topic: Option<String>,
    pub source: Option<String>,
    pub keyword: Option<String>,
}

impl LaunchParams {
    /// Parses a full URL, a `?query` string or a bare `a=b&c=d` string.
    /// Unknown parameters are ignored; empty values count as absent.
    pub fn parse(link: &str) -> Self {
        let link = link.trim();
        let without_fragment = link.split('#').next().unwrap_or_default();
        let query = match without_fragment.split_once('?') {
            Some((_, q)) => q,
            None if without_fragment.contains('=') => without_fragment,
            None => "",
        };

        let mut params = Self::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw_value);
            if value.is_empty() {
                continue;
            }
            match decode_component(raw_key).as_str() {
                "topic" => params.topic = Some(value),
                "source" => params.source = Some(value),
                "keyword" => params.keyword = Some(value),
                _ => {}
            }
        }
        params
    }

    /// Values set in `other` win.
    pub fn overridden_by(self, other: LaunchParams) -> Self {
        Self {
            topic: other.topic.or(self.topic),
            source: other.source.or(self.source),
            keyword: other.keyword.or(self.keyword),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.source.is_none() && self.keyword.is_none()
    }

    /// Query string in `keyword, source, topic` order, without the leading `?`.
    pub fn to_query(&self) -> String {
        [
            ("keyword", &self.keyword),
            ("source", &self.source),
            ("topic", &self.topic),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{key}={}", urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}

/// Form decoding: `+` is a space, then percent escapes.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_url() {
        let p = LaunchParams::parse(
            "https://example.org/?topic=Water%20%26%20Oceans&keyword=sea+level#top",
        );
        assert_eq!(p.topic.as_deref(), Some("Water & Oceans"));
        assert_eq!(p.keyword.as_deref(), Some("sea level"));
        assert_eq!(p.source, None);
    }

    #[test]
    fn bare_query_and_empty_values() {
        let p = LaunchParams::parse("source=Grist&topic=&page=3");
        assert_eq!(p.source.as_deref(), Some("Grist"));
        assert_eq!(p.topic, None);
    }

    #[test]
    fn plain_path_has_no_params() {
        assert!(LaunchParams::parse("https://example.org/index.html").is_empty());
    }

    #[test]
    fn query_roundtrips_through_parse() {
        let p = LaunchParams {
            topic: Some("Agriculture & Food".into()),
            source: None,
            keyword: Some("drought".into()),
        };
        let q = p.to_query();
        assert_eq!(q, "keyword=drought&topic=Agriculture%20%26%20Food");
        assert_eq!(LaunchParams::parse(&format!("?{q}")), p);
    }

    #[test]
    fn flags_override_link() {
        let link = LaunchParams::parse("?topic=Energy&keyword=coal");
        let flags = LaunchParams {
            keyword: Some("wind".into()),
            ..Default::default()
        };
        let merged = link.overridden_by(flags);
        assert_eq!(merged.topic.as_deref(), Some("Energy"));
        assert_eq!(merged.keyword.as_deref(), Some("wind"));
    }
}
