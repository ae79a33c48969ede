//! Notification feed

use async_trait::async_trait;
use serde::de::IgnoredAny;
use std::sync::Arc;

use crate::dto::{MarkAsRead, Notification, Page};
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::interaction::PageSource;

pub struct NotificationService {
    http: Arc<HttpClient>,
}

impl NotificationService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self, page: u32) -> ClientResult<Page<Notification>> {
        self.http
            .get_query("/notifications", &[("page", page.to_string())])
            .await
    }

    /// Mark the given notifications read; an empty slice marks all of them
    pub async fn mark_as_read(&self, ids: &[String]) -> ClientResult<()> {
        let body = MarkAsRead { ids: ids.to_vec() };
        self.http
            .post::<_, IgnoredAny>("/notifications/mark-as-read", &body)
            .await?;
        tracing::debug!(count = ids.len(), "Notifications marked as read");
        Ok(())
    }
}

#[async_trait]
impl PageSource<Notification, ()> for NotificationService {
    async fn fetch_page(&self, _query: &(), page: u32) -> ClientResult<Page<Notification>> {
        self.list(page).await
    }
}
