//! Off-thread requests with latest-wins delivery.
//!
//! Every request is tagged with a generation number. Outcomes travel back to
//! the UI loop over a crossbeam channel; only the outcome matching the most
//! recent generation is handed out, older ones are dropped.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, unbounded};
use tokio::runtime::Handle;

use crate::api::{ApiError, NewsApi};
use crate::filters::FilterState;
use crate::model::types::PageResult;

/// An outcome stamped with the generation of the request that produced it.
#[derive(Debug)]
pub struct Tagged<T> {
    pub generation: u64,
    pub value: T,
}

/// One stream of requests where only the newest answer matters.
#[derive(Debug)]
pub struct RequestLane<T> {
    tx: Sender<Tagged<T>>,
    rx: Receiver<Tagged<T>>,
    latest: u64,
    name: &'static str,
}

impl<T: Send + 'static> RequestLane<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            latest: 0,
            name,
        }
    }

    /// Generation of the newest request, 0 before the first one.
    pub fn latest(&self) -> u64 {
        self.latest
    }

    /// Runs `fut` on `runtime` as the newest request of this lane.
    pub fn spawn<F>(&mut self, runtime: &Handle, fut: F) -> u64
    where
        F: Future<Output = T> + Send + 'static,
    {
        self.latest = self.latest.wrapping_add(1);
        let generation = self.latest;
        let tx = self.tx.clone();
        runtime.spawn(async move {
            let value = fut.await;
            // The receiver lives as long as the lane; a closed channel means
            // the UI is gone and nobody wants the answer.
            let _ = tx.send(Tagged { generation, value });
        });
        generation
    }

    /// Drains the channel and returns the outcome of the newest request, if
    /// it has arrived.
    pub fn poll_latest(&mut self) -> Option<T> {
        let mut current = None;
        loop {
            match self.rx.try_recv() {
                Ok(tagged) => {
                    if let Some(value) = self.accept(tagged) {
                        current = Some(value);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        current
    }

    /// Blocks up to `timeout` for the newest outcome.
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(tagged) => {
                    if let Some(value) = self.accept(tagged) {
                        return Some(value);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn accept(&self, tagged: Tagged<T>) -> Option<T> {
        if tagged.generation == self.latest {
            Some(tagged.value)
        } else {
            tracing::debug!(
                lane = self.name,
                generation = tagged.generation,
                latest = self.latest,
                "dropping stale response"
            );
            None
        }
    }
}

/// What the article view shows while a request is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// First load: loading indicator over an empty list.
    Loading,
    /// Later loads: current content hidden until the answer arrives.
    FadingOut,
}

#[derive(Debug)]
pub enum FetchEvent {
    Loaded(PageResult),
    Failed(ApiError),
}

/// Article page requests for the list view.
pub struct ArticleFetcher<A: NewsApi> {
    api: Arc<A>,
    runtime: Handle,
    lane: RequestLane<Result<PageResult, ApiError>>,
    phase: Phase,
    initial_load: bool,
    requested_page: u32,
}

impl<A: NewsApi> ArticleFetcher<A> {
    pub fn new(api: Arc<A>, runtime: Handle) -> Self {
        Self {
            api,
            runtime,
            lane: RequestLane::new("articles"),
            phase: Phase::Idle,
            initial_load: true,
            requested_page: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_initial_load(&self) -> bool {
        self.initial_load
    }

    pub fn latest_generation(&self) -> u64 {
        self.lane.latest()
    }

    pub fn requested_page(&self) -> u32 {
        self.requested_page
    }

    /// Requests `page` under `filters`. Returns the request's generation.
    pub fn fetch_page(&mut self, filters: &FilterState, page: u32) -> u64 {
        let query = filters.article_query(page);
        self.phase = if self.initial_load {
            Phase::Loading
        } else {
            Phase::FadingOut
        };
        self.requested_page = query.page;
        let api = Arc::clone(&self.api);
        let generation = self.lane.spawn(&self.runtime, async move {
            api.get_articles(&query).await
        });
        tracing::info!(
            generation,
            page = self.requested_page,
            topic = %filters.topic,
            source = %filters.source,
            keyword = %filters.keyword_trimmed(),
            "fetch_articles"
        );
        generation
    }

    /// Non-blocking check for the newest outcome.
    pub fn poll(&mut self) -> Option<FetchEvent> {
        let outcome = self.lane.poll_latest()?;
        Some(self.settle(outcome))
    }

    /// Blocking variant for headless runs and tests.
    pub fn wait(&mut self, timeout: Duration) -> Option<FetchEvent> {
        let outcome = self.lane.wait_latest(timeout)?;
        Some(self.settle(outcome))
    }

    fn settle(&mut self, outcome: Result<PageResult, ApiError>) -> FetchEvent {
        self.phase = Phase::Idle;
        self.initial_load = false;
        match outcome {
            Ok(page) => {
                tracing::info!(
                    page = page.current_page,
                    total = page.total_pages,
                    articles = page.articles.len(),
                    "articles_loaded"
                );
                FetchEvent::Loaded(page)
            }
            Err(err) => {
                tracing::error!(page = self.requested_page, "Error fetching articles: {err}");
                FetchEvent::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_newest_generation_is_delivered() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut lane: RequestLane<&'static str> = RequestLane::new("test");
        lane.spawn(rt.handle(), async {
            tokio::time::sleep(Duration::from_millis(150)).await;
            "slow-first"
        });
        let second = lane.spawn(rt.handle(), async { "fast-second" });
        assert_eq!(second, 2);

        assert_eq!(lane.wait_latest(Duration::from_secs(2)), Some("fast-second"));
        // The slow answer still arrives, but is discarded.
        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(lane.poll_latest(), None);
    }

    #[test]
    fn wait_times_out_without_answer() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut lane: RequestLane<u8> = RequestLane::new("test");
        lane.spawn(rt.handle(), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            1
        });
        assert_eq!(lane.wait_latest(Duration::from_millis(50)), None);
    }
}
