//! Unified search

use async_trait::async_trait;
use std::sync::Arc;

use crate::dto::SearchResults;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::interaction::SearchApi;

pub struct SearchService {
    http: Arc<HttpClient>,
}

impl SearchService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn search(&self, query: &str) -> ClientResult<SearchResults> {
        self.http
            .get_query("/search", &[("q", query.to_string())])
            .await
    }
}

#[async_trait]
impl SearchApi for SearchService {
    async fn search(&self, query: &str) -> ClientResult<SearchResults> {
        SearchService::search(self, query).await
    }
}
