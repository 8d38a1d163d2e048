//! Headless runs of the interactive client: `tui --once` with
//! `TUI_HEADLESS=1` does one fetch, draws one off-screen frame and prints the
//! status line.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

mod util;
use util::FakeBackend;

fn page_body(current: u32, total: u32) -> String {
    format!(
        r#"{{"articles": [{{"title": "Glacier retreat", "summary": "Ice loss.", "publish_date": "2024-10-02",
            "link": "https://e360.yale.edu/glacier", "image": "", "source": "Yale Environment 360"}}],
            "current_page": {current}, "total_pages": {total}}}"#
    )
}

fn headless(dir: &TempDir, backend: &FakeBackend) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("earth-news");
    cmd.env("TUI_HEADLESS", "1")
        .env("EARTH_NEWS_CONFIG", dir.path().join("config.toml"))
        .env("EARTH_NEWS_DATA_DIR", dir.path())
        .env("EARTH_NEWS_TIMEOUT_SECS", "3")
        .env("EARTH_NEWS_API_URL", &backend.base_url);
    cmd
}

#[test]
fn headless_once_loads_first_page() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::start(vec![("/get_articles", 200, page_body(1, 3))]);

    headless(&dir, &backend)
        .args(["tui", "--once"])
        .assert()
        .success()
        .stdout(contains("Page 1 of 3"));

    assert!(
        backend
            .requests()
            .iter()
            .any(|r| r.starts_with("/get_articles?topic=all&source=all&keyword=&"))
    );
    assert!(dir.path().join("logs").exists(), "TUI logs go to the data dir");
}

#[test]
fn shared_link_seeds_filters() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::start(vec![("/get_articles", 200, page_body(1, 1))]);

    headless(&dir, &backend)
        .args(["tui", "--once", "https://earth.example.org/?topic=Energy&keyword=solar"])
        .assert()
        .success()
        .stdout(contains("topic:Energy"))
        .stdout(contains("keyword:solar"));

    let sent = backend.requests();
    assert!(sent.iter().any(|r| r.contains("topic=Energy") && r.contains("keyword=solar")));

    // Launch values are not written back; only explicit choices persist.
    assert!(!dir.path().join("filters.json").exists());
}

#[test]
fn stored_filters_apply_without_a_link() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("filters.json"),
        r#"{"selectedSource": "Grist", "startDate": "2024-10-01", "endDate": "2024-10-08"}"#,
    )
    .unwrap();
    let backend = FakeBackend::start(vec![("/get_articles", 200, page_body(1, 1))]);

    headless(&dir, &backend)
        .args(["tui", "--once"])
        .assert()
        .success()
        .stdout(contains("source:Grist"));
    assert!(backend.requests().iter().any(|r| {
        r.contains("source=Grist") && r.contains("start_date=2024-10-01&end_date=2024-10-08")
    }));
}

#[test]
fn backend_error_is_logged_not_shown() {
    let dir = TempDir::new().unwrap();
    let backend = FakeBackend::start(vec![("/get_articles", 503, "{}".to_string())]);

    headless(&dir, &backend)
        .args(["tui", "--once"])
        .assert()
        .success()
        .stdout(contains("all articles"))
        .stdout(contains("Could not").not());

    let logged: String = std::fs::read_dir(dir.path().join("logs"))
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| std::fs::read_to_string(entry.path()).unwrap_or_default())
        .collect();
    assert!(logged.contains("Error fetching articles"), "logs: {logged}");
}
