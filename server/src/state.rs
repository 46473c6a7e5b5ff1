use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use watch_service_cli::{fetch::PageFetcher, summary::Summarizer};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub fetcher: Arc<PageFetcher>,
    pub summarizer: Arc<Summarizer>,
    // link id → pipeline lock; lazily created, kept for the process lifetime
    check_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    pub fn new(pool: SqlitePool, fetcher: PageFetcher, summarizer: Summarizer) -> Self {
        AppState {
            pool,
            fetcher: Arc::new(fetcher),
            summarizer: Arc::new(summarizer),
            check_locks: Arc::new(DashMap::new()),
        }
    }

    /// The mutex serializing check runs for one link. Holding it across the
    /// whole pipeline keeps the baseline read and the retention trim from
    /// racing with a concurrent check of the same link.
    pub fn check_lock(&self, link_id: &str) -> Arc<Mutex<()>> {
        self.check_locks
            .entry(link_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
