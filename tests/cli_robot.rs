use assert_cmd::cargo::cargo_bin_cmd;
use clap::CommandFactory;
use earth_news::Cli;
use predicates::str::contains;
use tempfile::TempDir;

fn base_cmd(data_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("earth-news");
    cmd.env_remove("EARTH_NEWS_API_URL")
        .env("EARTH_NEWS_CONFIG", data_dir.path().join("config.toml"))
        .env("EARTH_NEWS_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    base_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("articles"))
        .stdout(contains("cloud"))
        .stdout(contains("--api-url"));
}

#[test]
fn window_prints_visible_pages() {
    let dir = TempDir::new().unwrap();
    base_cmd(&dir)
        .args(["window", "--current", "10", "--total", "10"])
        .assert()
        .success()
        .stdout("6 7 8 9 10\n");
    base_cmd(&dir)
        .args(["window", "--current", "4", "--total", "9"])
        .assert()
        .success()
        .stdout("2 3 4 5 6\n");
}

#[test]
fn completions_and_man_render() {
    let dir = TempDir::new().unwrap();
    base_cmd(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(contains("earth-news"));
    base_cmd(&dir)
        .arg("man")
        .assert()
        .success()
        .stdout(contains(".TH"));
}

#[test]
fn bad_api_url_is_reported() {
    let dir = TempDir::new().unwrap();
    base_cmd(&dir)
        .args(["--api-url", "ftp://news.example.org", "articles"])
        .assert()
        .failure()
        .stderr(contains("unsupported scheme"));
}

#[test]
fn unreachable_backend_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    base_cmd(&dir)
        .env("EARTH_NEWS_TIMEOUT_SECS", "2")
        .args(["--api-url", "http://127.0.0.1:9", "articles", "--page", "2"])
        .assert()
        .failure()
        .stderr(contains("fetching articles"));
}

#[test]
fn malformed_config_names_the_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "timeout_secs = \"soon\"").unwrap();
    base_cmd(&dir)
        .args(["articles"])
        .assert()
        .failure()
        .stderr(contains("config.toml"));
}
