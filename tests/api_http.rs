mod util;

use earth_news::api::{ApiError, ArticleQuery, HttpNewsApi, NewsApi, WordQuery};
use std::time::Duration;
use util::FakeBackend;

const PAGE_BODY: &str = r#"{
  "articles": [
    {"title": "Reef bleaching", "summary": null, "publish_date": "Tue, 15 Oct 2024 00:00:00 GMT",
     "link": "https://grist.org/reef", "image": null, "source": "Grist", "topic": "Water & Oceans"}
  ],
  "current_page": 2,
  "total_pages": 7
}"#;

fn api(backend: &FakeBackend) -> HttpNewsApi {
    HttpNewsApi::new(&backend.base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn decodes_article_page_and_sends_query() {
    let backend = FakeBackend::start(vec![("/get_articles", 200, PAGE_BODY.to_string())]);
    let query = ArticleQuery {
        topic: "Water & Oceans".into(),
        source: "all".into(),
        keyword: "coral reef".into(),
        page: 2,
        ..Default::default()
    };

    let page = api(&backend).get_articles(&query).await.unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_pages, 7);
    assert_eq!(page.articles[0].summary, "");
    assert_eq!(page.articles[0].display_date(), "October 15, 2024");

    let sent = backend.requests();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].starts_with("/get_articles?topic=Water+%26+Oceans&source=all&keyword=coral+reef"));
    assert!(sent[0].ends_with("&start_date=&end_date=&page=2"));
}

#[tokio::test]
async fn http_error_status_is_typed() {
    let backend = FakeBackend::start(vec![("/get_articles", 500, "{}".to_string())]);
    let err = api(&backend)
        .get_articles(&ArticleQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.endpoint(), Some("/get_articles"));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let backend = FakeBackend::start(vec![("/data", 200, "[{\"text\": 3}]".to_string())]);
    let err = api(&backend)
        .word_data(&WordQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[tokio::test]
async fn filter_options_and_words_decode() {
    let backend = FakeBackend::start(vec![
        (
            "/filter-options",
            200,
            r#"{"sources": ["Grist", " "], "topics": []}"#.to_string(),
        ),
        (
            "/data",
            200,
            r#"[{"text": "heat", "size": 12}, {"text": "flood", "size": 4}]"#.to_string(),
        ),
    ]);
    let api = api(&backend);

    let options = api.filter_options().await.unwrap().merged_with_builtin();
    assert_eq!(options.sources, vec!["Grist".to_string()]);
    assert!(!options.topics.is_empty(), "empty server list keeps builtin topics");

    let query = WordQuery {
        source: "Grist".into(),
        topic: "all".into(),
        ..Default::default()
    };
    let words = api.word_data(&query).await.unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].size, 12);
    assert_eq!(backend.requests().last().unwrap(), "/data?source=Grist");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let api = HttpNewsApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = api.filter_options().await.unwrap_err();
    assert!(matches!(err, ApiError::Network { .. }));
}
