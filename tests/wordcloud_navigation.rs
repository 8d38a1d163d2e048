mod util;

use earth_news::filters::store::{KEY_KEYWORD, KEY_SOURCE, KeyValueStore, MemoryStore};
use earth_news::filters::{ALL, DateRange, FilterController, LaunchParams};
use earth_news::ui::wordcloud::{CloudControls, WordCloudPage};
use std::sync::Arc;
use std::time::Duration;
use util::{FakeApi, word};

#[test]
fn word_query_leaves_out_unfiltered_values() {
    let controls = CloudControls {
        source: "Grist".into(),
        topic: ALL.into(),
        date_range: None,
    };
    let pairs = controls.query().pairs();
    assert_eq!(pairs, vec![("source", "Grist".to_string())]);
}

#[test]
fn loaded_cloud_drills_into_article_list() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let api = Arc::new(FakeApi::new(1).with_words(vec![
        word("wildfire", 40),
        word("drought", 12),
        word("coral", 3),
    ]));

    let mut store = MemoryStore::new();
    store.set(KEY_SOURCE, "Mongabay");
    let controls = CloudControls::restore(&store);
    assert_eq!(controls.source, "Mongabay");

    let mut page = WordCloudPage::new(controls);
    page.request(&api, rt.handle());
    assert!(page.is_loading());
    assert!(page.wait(Duration::from_secs(2)));
    assert!(!page.is_loading());
    page.ensure_size(100, 20);

    let words: Vec<String> = page
        .cloud()
        .selectable()
        .into_iter()
        .filter_map(|i| page.cloud().text_of(i).map(str::to_string))
        .collect();
    assert_eq!(words.len(), 3, "placeholders are never selectable");

    let chosen = page.selected_word().expect("first word preselected");
    let params = page.controls.navigate(&chosen, &mut store);
    assert_eq!(params.keyword.as_deref(), Some(chosen.as_str()));
    assert_eq!(params.source.as_deref(), Some("Mongabay"));
    assert_eq!(params.topic, None);
    assert_eq!(store.get(KEY_KEYWORD).as_deref(), Some(chosen.as_str()));

    let filters = FilterController::load(store, &params);
    assert_eq!(filters.state().keyword, chosen);
    assert_eq!(filters.state().source, "Mongabay");
    assert_eq!(filters.state().topic, ALL);

    let sent = api.word_queries();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].source, "Mongabay");
}

#[test]
fn cloud_dates_are_persisted_on_navigation() {
    let day = |s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
    let controls = CloudControls {
        source: ALL.into(),
        topic: "Oceans".into(),
        date_range: DateRange::from_selection(&[day("2024-06-01"), day("2024-06-07")]),
    };
    let mut store = MemoryStore::new();
    let params = controls.navigate("plastic", &mut store);
    assert_eq!(params.to_query(), "keyword=plastic&topic=Oceans");

    let filters = FilterController::load(store, &LaunchParams::default());
    let range = filters.state().date_range.unwrap();
    assert_eq!(range.start_param(), "2024-06-01");
    assert_eq!(range.end_param(), "2024-06-08");
}
