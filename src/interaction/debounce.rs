//! Search-as-you-type coalescing
//!
//! Every keystroke restarts the quiet-period countdown; the request is only
//! issued once input has been idle for the whole window. A response whose
//! query has since been replaced by newer input is discarded.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::dto::SearchResults;
use crate::error::ClientResult;

/// Unified search backend call
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn search(&self, query: &str) -> ClientResult<SearchResults>;
}

/// Generation counter plus quiet-period timer
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    latest: AtomicU64,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            latest: AtomicU64::new(0),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Register new input, invalidating everything issued before it
    pub fn touch(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    /// Register input and wait out the window
    ///
    /// Returns the generation if no newer input arrived meanwhile.
    pub async fn settle(&self) -> Option<u64> {
        let generation = self.touch();
        tokio::time::sleep(self.window).await;
        self.is_latest(generation).then_some(generation)
    }
}

/// What the search view currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
    pub query: String,
    pub results: SearchResults,
    pub loading: bool,
    pub error: Option<String>,
}

/// How one input event ended
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Newer input arrived before this one's results could be shown
    Superseded,
    /// Blank input cleared the results without a request
    Cleared,
    /// Results for this input are now shown
    Results(SearchResults),
}

/// Debounced search box state
pub struct SearchController {
    api: Arc<dyn SearchApi>,
    debouncer: Debouncer,
    view: Mutex<SearchView>,
}

impl SearchController {
    pub fn new(api: Arc<dyn SearchApi>, window: Duration) -> Self {
        Self {
            api,
            debouncer: Debouncer::new(window),
            view: Mutex::new(SearchView::default()),
        }
    }

    fn view_mut(&self) -> MutexGuard<'_, SearchView> {
        self.view.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view(&self) -> SearchView {
        self.view_mut().clone()
    }

    /// Handle one change of the search input
    pub async fn input(&self, text: &str) -> ClientResult<SearchOutcome> {
        let query = text.trim().to_string();
        self.view_mut().query = text.to_string();

        if query.is_empty() {
            // Still bump the generation so any in-flight search is dropped
            self.debouncer.touch();
            let mut view = self.view_mut();
            view.results = SearchResults::default();
            view.loading = false;
            view.error = None;
            return Ok(SearchOutcome::Cleared);
        }

        let Some(generation) = self.debouncer.settle().await else {
            return Ok(SearchOutcome::Superseded);
        };

        self.view_mut().loading = true;
        tracing::debug!(query = %query, "Issuing search");
        let result = self.api.search(&query).await;

        if !self.debouncer.is_latest(generation) {
            tracing::debug!(query = %query, "Discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }

        let mut view = self.view_mut();
        view.loading = false;
        match result {
            Ok(results) => {
                view.results = results.clone();
                view.error = None;
                Ok(SearchOutcome::Results(results))
            }
            Err(e) => {
                view.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
