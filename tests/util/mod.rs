use earth_news::api::{
    ARTICLES_ENDPOINT, ApiError, ArticleQuery, FILTER_OPTIONS_ENDPOINT, NewsApi, WordQuery,
};
use earth_news::model::types::{ArticleRecord, FilterOptions, PageResult, WordRecord};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<std::sync::Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        let buf = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }

    pub fn lines(&self) -> Vec<String> {
        self.output()
            .lines()
            .map(std::string::ToString::to_string)
            .collect()
    }
}

#[allow(dead_code)]
pub struct EnvGuard {
    key: String,
    prev: Option<String>,
}

#[allow(dead_code)]
impl EnvGuard {
    pub fn set(key: &str, val: impl AsRef<str>) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::set_var(key, val.as_ref()) };
        Self {
            key: key.to_string(),
            prev,
        }
    }

    pub fn unset(key: &str) -> Self {
        let prev = std::env::var(key).ok();
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            prev,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(&self.key, v) },
            None => unsafe { std::env::remove_var(&self.key) },
        }
    }
}

struct TestWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.0.lock().unwrap();
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Article with predictable fields: title `"p{page} #{i}"`.
#[allow(dead_code)]
pub fn article(page: u32, i: usize) -> ArticleRecord {
    ArticleRecord {
        title: format!("p{page} #{i}"),
        summary: format!("Summary of article {i} on page {page}."),
        publish_date: "Tue, 01 Oct 2024 09:30:00 GMT".into(),
        link: format!("https://news.example.org/{page}/{i}"),
        image: String::new(),
        source: "Grist".into(),
    }
}

#[allow(dead_code)]
pub fn word(text: &str, size: u32) -> WordRecord {
    WordRecord {
        text: text.into(),
        size,
    }
}

/// In-process backend. Records every query; per-call delays are consumed
/// in order so tests can make an early request finish last.
#[allow(dead_code)]
pub struct FakeApi {
    total_pages: u32,
    per_page: usize,
    words: Vec<WordRecord>,
    options: Option<FilterOptions>,
    delays: Mutex<VecDeque<Duration>>,
    fail_articles: AtomicBool,
    article_queries: Mutex<Vec<ArticleQuery>>,
    word_queries: Mutex<Vec<WordQuery>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            per_page: 3,
            words: Vec::new(),
            options: Some(FilterOptions::builtin()),
            delays: Mutex::new(VecDeque::new()),
            fail_articles: AtomicBool::new(false),
            article_queries: Mutex::new(Vec::new()),
            word_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_words(mut self, words: Vec<WordRecord>) -> Self {
        self.words = words;
        self
    }

    pub fn with_options(mut self, options: Option<FilterOptions>) -> Self {
        self.options = options;
        self
    }

    pub fn with_delays(self, delays: &[Duration]) -> Self {
        self.delays.lock().unwrap().extend(delays.iter().copied());
        self
    }

    pub fn fail_articles(&self, fail: bool) {
        self.fail_articles.store(fail, Ordering::SeqCst);
    }

    pub fn article_queries(&self) -> Vec<ArticleQuery> {
        self.article_queries.lock().unwrap().clone()
    }

    pub fn last_article_query(&self) -> Option<ArticleQuery> {
        self.article_queries.lock().unwrap().last().cloned()
    }

    pub fn word_queries(&self) -> Vec<WordQuery> {
        self.word_queries.lock().unwrap().clone()
    }
}

impl NewsApi for FakeApi {
    async fn get_articles(&self, query: &ArticleQuery) -> Result<PageResult, ApiError> {
        self.article_queries.lock().unwrap().push(query.clone());
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_articles.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                endpoint: ARTICLES_ENDPOINT,
                status: 500,
            });
        }
        let per_page = if self.total_pages == 0 { 0 } else { self.per_page };
        Ok(PageResult {
            articles: (0..per_page).map(|i| article(query.page, i)).collect(),
            current_page: query.page,
            total_pages: self.total_pages,
        })
    }

    async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        self.options.clone().ok_or(ApiError::Status {
            endpoint: FILTER_OPTIONS_ENDPOINT,
            status: 503,
        })
    }

    async fn word_data(&self, query: &WordQuery) -> Result<Vec<WordRecord>, ApiError> {
        self.word_queries.lock().unwrap().push(query.clone());
        Ok(self.words.clone())
    }
}

/// Minimal HTTP/1.1 responder on a loopback port. Each request gets the
/// response registered for its path (query ignored), or 404.
#[allow(dead_code)]
pub struct FakeBackend {
    pub base_url: String,
    requests: std::sync::Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn start(routes: Vec<(&'static str, u16, String)>) -> Self {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = std::sync::Arc::new(Mutex::new(Vec::new()));
        let seen = std::sync::Arc::clone(&requests);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                let mut header = String::new();
                while reader.read_line(&mut header).is_ok() && !header.trim().is_empty() {
                    header.clear();
                }
                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(target.clone());
                let path = target.split('?').next().unwrap_or("/");
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, "{}".to_string()));
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Self { base_url, requests }
    }

    /// Request targets (path plus query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
