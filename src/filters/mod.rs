//! Filter state (topic, source, keyword, date range) and its persistence.
//!
//! Initialization priority is launch parameter, then persisted value, then
//! default. Every mutation writes the changed field back to the store and
//! sends the list back to the first page.

pub mod link;
pub mod store;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::api::{ArticleQuery, WordQuery};
pub use link::LaunchParams;
use store::{KEY_END_DATE, KEY_KEYWORD, KEY_SOURCE, KEY_START_DATE, KEY_TOPIC, KeyValueStore};

/// Sentinel for "no topic/source filter".
pub const ALL: &str = "all";
pub const FIRST_PAGE: u32 = 1;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open calendar range: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Range from raw bounds; `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Range covering the picked days. One day covers that day; two or more
    /// cover min..=max. The exclusive end is one day past the last pick.
    pub fn from_selection(days: &[NaiveDate]) -> Option<Self> {
        let first = *days.iter().min()?;
        let last = *days.iter().max()?;
        let end = last.checked_add_days(Days::new(1))?;
        Some(Self { start: first, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Last day the user picked (the day before the exclusive end).
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start).max(self.start)
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    pub fn start_param(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }

    pub fn parse_params(start: &str, end: &str) -> Option<Self> {
        let start = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).ok()?;
        let end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).ok()?;
        Self::new(start, end)
    }

    /// `Oct 1, 2024` or `Oct 1, 2024 - Oct 3, 2024`, in picked days.
    pub fn label(&self) -> String {
        let first = self.start.format("%b %-d, %Y").to_string();
        let last_day = self.last_day();
        if last_day == self.start {
            first
        } else {
            format!("{first} - {}", last_day.format("%b %-d, %Y"))
        }
    }
}

/// Parses the date prompt: `YYYY-MM-DD`, `YYYY-MM-DD..YYYY-MM-DD` or
/// `YYYY-MM-DD to YYYY-MM-DD`. An empty input is an empty selection.
pub fn parse_date_selection(input: &str) -> Result<Vec<NaiveDate>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let parts: Vec<&str> = if let Some((a, b)) = input.split_once("..") {
        vec![a, b]
    } else if let Some((a, b)) = input.split_once(" to ") {
        vec![a, b]
    } else {
        vec![input]
    };
    parts
        .into_iter()
        .map(|p| {
            NaiveDate::parse_from_str(p.trim(), DATE_FORMAT)
                .map_err(|_| format!("`{}` is not a YYYY-MM-DD date", p.trim()))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub topic: String,
    pub source: String,
    pub keyword: String,
    pub date_range: Option<DateRange>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            topic: ALL.to_string(),
            source: ALL.to_string(),
            keyword: String::new(),
            date_range: None,
        }
    }
}

impl FilterState {
    pub fn keyword_trimmed(&self) -> &str {
        self.keyword.trim()
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn article_query(&self, page: u32) -> ArticleQuery {
        ArticleQuery {
            topic: self.topic.clone(),
            source: self.source.clone(),
            keyword: self.keyword_trimmed().to_string(),
            start_date: self
                .date_range
                .map(|r| r.start_param())
                .unwrap_or_default(),
            end_date: self.date_range.map(|r| r.end_param()).unwrap_or_default(),
            page: page.max(FIRST_PAGE),
        }
    }

    pub fn word_query(&self) -> WordQuery {
        WordQuery {
            source: self.source.clone(),
            topic: self.topic.clone(),
            start_date: self.date_range.map(|r| r.start_param()),
            end_date: self.date_range.map(|r| r.end_param()),
        }
    }

    /// Short human summary for the status line.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.topic != ALL {
            parts.push(format!("topic:{}", self.topic));
        }
        if self.source != ALL {
            parts.push(format!("source:{}", self.source));
        }
        if !self.keyword_trimmed().is_empty() {
            parts.push(format!("keyword:{}", self.keyword_trimmed()));
        }
        if let Some(range) = self.date_range {
            parts.push(format!("dates:{}", range.label()));
        }
        if parts.is_empty() {
            "all articles".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Blank choices collapse to `"all"`.
pub fn normalize_choice(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        ALL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Writes `value` under `key`, or removes the key for `"all"`/empty.
pub fn persist_choice(store: &mut impl KeyValueStore, key: &str, value: &str) {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == ALL {
        store.remove(key);
    } else {
        store.set(key, trimmed);
    }
}

pub fn persist_date_range(store: &mut impl KeyValueStore, range: Option<DateRange>) {
    match range {
        Some(r) => {
            store.set(KEY_START_DATE, &r.start_param());
            store.set(KEY_END_DATE, &r.end_param());
        }
        None => {
            store.remove(KEY_START_DATE);
            store.remove(KEY_END_DATE);
        }
    }
}

pub fn restore_date_range(store: &impl KeyValueStore) -> Option<DateRange> {
    let start = store.get(KEY_START_DATE)?;
    let end = store.get(KEY_END_DATE)?;
    DateRange::parse_params(&start, &end)
}

/// Owns the filter state and the store it is mirrored into.
#[derive(Debug)]
pub struct FilterController<S: KeyValueStore> {
    state: FilterState,
    store: S,
}

impl<S: KeyValueStore> FilterController<S> {
    pub fn load(store: S, launch: &LaunchParams) -> Self {
        let mut controller = Self {
            state: FilterState::default(),
            store,
        };
        controller.reload(launch);
        controller
    }

    /// Re-reads the store and applies launch parameters on top.
    pub fn reload(&mut self, launch: &LaunchParams) {
        let pick = |launched: &Option<String>, key: &str, store: &S| -> Option<String> {
            launched
                .as_deref()
                .map(str::to_string)
                .or_else(|| store.get(key))
                .filter(|v| !v.trim().is_empty())
        };
        let topic = pick(&launch.topic, KEY_TOPIC, &self.store);
        let source = pick(&launch.source, KEY_SOURCE, &self.store);
        let keyword = pick(&launch.keyword, KEY_KEYWORD, &self.store);

        self.state = FilterState {
            topic: normalize_choice(topic.as_deref().unwrap_or(ALL)),
            source: normalize_choice(source.as_deref().unwrap_or(ALL)),
            keyword: keyword.unwrap_or_default(),
            date_range: restore_date_range(&self.store),
        };
        tracing::debug!(filters = %self.state.describe(), "filters_loaded");
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn set_topic(&mut self, topic: &str) -> u32 {
        self.state.topic = normalize_choice(topic);
        persist_choice(&mut self.store, KEY_TOPIC, &self.state.topic);
        tracing::info!(topic = %self.state.topic, "filter_topic");
        FIRST_PAGE
    }

    pub fn set_source(&mut self, source: &str) -> u32 {
        self.state.source = normalize_choice(source);
        persist_choice(&mut self.store, KEY_SOURCE, &self.state.source);
        tracing::info!(source = %self.state.source, "filter_source");
        FIRST_PAGE
    }

    pub fn set_keyword(&mut self, keyword: &str) -> u32 {
        self.state.keyword = keyword.to_string();
        persist_choice(&mut self.store, KEY_KEYWORD, self.state.keyword_trimmed());
        tracing::debug!(keyword = %self.state.keyword_trimmed(), "filter_keyword");
        FIRST_PAGE
    }

    /// Picked days; an empty selection clears the range.
    pub fn set_date_selection(&mut self, days: &[NaiveDate]) -> u32 {
        self.set_date_range(DateRange::from_selection(days))
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) -> u32 {
        self.state.date_range = range;
        persist_date_range(&mut self.store, range);
        tracing::info!(
            start = %range.map(|r| r.start_param()).unwrap_or_default(),
            end = %range.map(|r| r.end_param()).unwrap_or_default(),
            "filter_dates"
        );
        FIRST_PAGE
    }

    /// Back to defaults with every persisted entry removed.
    pub fn reset(&mut self) -> u32 {
        self.state = FilterState::default();
        for key in store::ALL_KEYS {
            self.store.remove(key);
        }
        tracing::info!("filters_reset");
        FIRST_PAGE
    }
}

#[cfg(test)]
mod tests {
    use super::store::MemoryStore;
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn single_day_selection_is_exclusive_next_day() {
        let r = DateRange::from_selection(&[day("2024-10-05")]).unwrap();
        assert_eq!(r.start_param(), "2024-10-05");
        assert_eq!(r.end_param(), "2024-10-06");
        assert!(r.contains(day("2024-10-05")));
        assert!(!r.contains(day("2024-10-06")));
        assert_eq!(r.label(), "Oct 5, 2024");
    }

    #[test]
    fn two_days_in_any_order() {
        let r = DateRange::from_selection(&[day("2024-10-09"), day("2024-10-01")]).unwrap();
        assert_eq!(r.start_param(), "2024-10-01");
        assert_eq!(r.end_param(), "2024-10-10");
        assert_eq!(r.label(), "Oct 1, 2024 - Oct 9, 2024");
        assert!(DateRange::from_selection(&[]).is_none());
    }

    #[test]
    fn date_prompt_forms() {
        assert_eq!(parse_date_selection("").unwrap(), vec![]);
        assert_eq!(parse_date_selection("2024-01-02").unwrap().len(), 1);
        assert_eq!(
            parse_date_selection("2024-01-02..2024-01-09").unwrap().len(),
            2
        );
        assert_eq!(
            parse_date_selection("2024-01-02 to 2024-01-09")
                .unwrap()
                .len(),
            2
        );
        assert!(parse_date_selection("yesterday").is_err());
    }

    #[test]
    fn launch_params_beat_persisted_values() {
        let mut store = MemoryStore::new();
        store.set(KEY_TOPIC, "Energy");
        store.set(KEY_SOURCE, "Grist");
        let launch = LaunchParams {
            topic: Some("Pollution".into()),
            ..Default::default()
        };
        let ctl = FilterController::load(store, &launch);
        assert_eq!(ctl.state().topic, "Pollution");
        assert_eq!(ctl.state().source, "Grist");
        assert_eq!(ctl.state().keyword, "");
    }

    #[test]
    fn all_and_empty_remove_persisted_entries() {
        let mut ctl = FilterController::load(MemoryStore::new(), &LaunchParams::default());
        ctl.set_topic("Energy");
        ctl.set_keyword("  solar ");
        assert_eq!(ctl.store().get(KEY_KEYWORD).as_deref(), Some("solar"));
        ctl.set_topic("all");
        ctl.set_keyword("");
        assert!(ctl.store().is_empty());
    }

    #[test]
    fn article_query_trims_keyword_and_formats_dates() {
        let mut ctl = FilterController::load(MemoryStore::new(), &LaunchParams::default());
        ctl.set_keyword("  heat wave ");
        ctl.set_date_selection(&[day("2024-10-01"), day("2024-10-03")]);
        let q = ctl.state().article_query(2);
        assert_eq!(q.keyword, "heat wave");
        assert_eq!(q.start_date, "2024-10-01");
        assert_eq!(q.end_date, "2024-10-04");
        assert_eq!(q.page, 2);
    }

    #[test]
    fn inverted_persisted_range_is_ignored() {
        let mut store = MemoryStore::new();
        store.set(KEY_START_DATE, "2024-10-09");
        store.set(KEY_END_DATE, "2024-10-01");
        let ctl = FilterController::load(store, &LaunchParams::default());
        assert_eq!(ctl.state().date_range, None);
    }
}
