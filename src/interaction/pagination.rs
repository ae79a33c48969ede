//! Paginated / infinite list loader
//!
//! Page 1 replaces the accumulated items; later pages append the items not
//! seen before. The next page is only requested once the current one has
//! been applied, so pages never land out of order.
//!
//! Every request carries a [`PageTicket`] stamped with the query
//! generation that issued it. Changing the query bumps the generation, and
//! a response holding an older ticket is discarded instead of applied.

use async_trait::async_trait;
use std::collections::HashSet;

use crate::dto::{Identified, Page};
use crate::error::ClientResult;

/// Backend listing that can be fetched one page at a time
#[async_trait]
pub trait PageSource<T, Q>: Send + Sync {
    async fn fetch_page(&self, query: &Q, page: u32) -> ClientResult<Page<T>>;
}

/// Permission to apply one page response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket<Q> {
    pub generation: u64,
    pub page: u32,
    pub query: Q,
}

/// What happened to a page response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Items were applied; `added` counts new, de-duplicated items
    Applied { added: usize },
    /// The response belonged to an older query and was dropped
    Stale,
    /// Nothing to load: a request is in flight or no pages remain
    Skipped,
}

/// Cursor and accumulated items of one list view
#[derive(Debug)]
pub struct PagedLoader<T, Q> {
    query: Q,
    current_page: u32,
    total_pages: u32,
    items: Vec<T>,
    seen: HashSet<String>,
    loading: bool,
    /// A page of the current query has been applied
    loaded: bool,
    generation: u64,
    error: Option<String>,
}

impl<T, Q> PagedLoader<T, Q>
where
    T: Identified + Send,
    Q: Clone + PartialEq + Send + Sync,
{
    pub fn new(query: Q) -> Self {
        Self {
            query,
            current_page: 1,
            total_pages: 0,
            items: Vec::new(),
            seen: HashSet::new(),
            loading: false,
            loaded: false,
            generation: 0,
            error: None,
        }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether page 1 of the current query has come back, even if empty
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Message of the last failed load, for the view's banner
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Switch to a new query: reset to page 1, clear items, refetch
    pub fn set_query(&mut self, query: Q) -> PageTicket<Q> {
        self.query = query;
        self.restart()
    }

    /// Refetch page 1 of the current query
    pub fn restart(&mut self) -> PageTicket<Q> {
        self.generation += 1;
        self.current_page = 1;
        self.total_pages = 0;
        self.loaded = false;
        self.items.clear();
        self.seen.clear();
        self.error = None;
        self.ticket(1)
    }

    /// Ticket for the page after the current one, if it may be requested
    pub fn next_ticket(&mut self) -> Option<PageTicket<Q>> {
        if self.loading || !self.has_more() {
            return None;
        }
        Some(self.ticket(self.current_page + 1))
    }

    fn ticket(&mut self, page: u32) -> PageTicket<Q> {
        self.loading = true;
        PageTicket {
            generation: self.generation,
            page,
            query: self.query.clone(),
        }
    }

    /// Apply a page response issued under `ticket`
    pub fn apply(
        &mut self,
        ticket: &PageTicket<Q>,
        result: ClientResult<Page<T>>,
    ) -> ClientResult<LoadOutcome> {
        if ticket.generation != self.generation || ticket.query != self.query {
            tracing::debug!(page = ticket.page, "Discarding stale page response");
            return Ok(LoadOutcome::Stale);
        }

        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        if ticket.page <= 1 {
            self.items.clear();
            self.seen.clear();
        }

        let mut added = 0;
        for item in page.items {
            if self.seen.insert(item.key().to_string()) {
                self.items.push(item);
                added += 1;
            }
        }

        self.current_page = ticket.page;
        self.total_pages = page.total_pages;
        self.loaded = true;
        self.error = None;

        tracing::debug!(
            page = ticket.page,
            total_pages = self.total_pages,
            added,
            "Applied page"
        );
        Ok(LoadOutcome::Applied { added })
    }

    async fn fetch(
        &mut self,
        ticket: PageTicket<Q>,
        source: &dyn PageSource<T, Q>,
    ) -> ClientResult<LoadOutcome> {
        let result = source.fetch_page(&ticket.query, ticket.page).await;
        self.apply(&ticket, result)
    }

    /// Load page 1 of the current query
    pub async fn load_first(&mut self, source: &dyn PageSource<T, Q>) -> ClientResult<LoadOutcome> {
        let ticket = self.restart();
        self.fetch(ticket, source).await
    }

    /// Change the query and load its first page
    pub async fn change_query(
        &mut self,
        query: Q,
        source: &dyn PageSource<T, Q>,
    ) -> ClientResult<LoadOutcome> {
        let ticket = self.set_query(query);
        self.fetch(ticket, source).await
    }

    /// The sentinel after the last item became visible
    pub async fn on_sentinel_visible(
        &mut self,
        source: &dyn PageSource<T, Q>,
    ) -> ClientResult<LoadOutcome> {
        match self.next_ticket() {
            Some(ticket) => self.fetch(ticket, source).await,
            None => Ok(LoadOutcome::Skipped),
        }
    }

    /// Page 1 until it has loaded, then the next page if any remain
    pub async fn load_more(&mut self, source: &dyn PageSource<T, Q>) -> ClientResult<LoadOutcome> {
        if self.loaded {
            self.on_sentinel_visible(source).await
        } else {
            self.load_first(source).await
        }
    }

    /// Drop the in-flight request without applying it (view left)
    pub fn abandon(&mut self) {
        if self.loading {
            self.generation += 1;
            self.loading = false;
        }
    }
}

impl<T, Q> PagedLoader<T, Q> {
    /// Consume the loader, yielding the accumulated items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
