//! Own profile, avatar, personalized feed and creator dashboard
//!
//! Every call that returns a fresh user record also refreshes the cached
//! user snapshot in the session, so headers and menus see the change.

use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::dto::{Dashboard, Page, Post, ProfileUpdate, User};
use crate::error::ClientResult;
use crate::http::{HttpClient, Upload};
use crate::interaction::PageSource;

pub struct ProfileService {
    http: Arc<HttpClient>,
}

impl ProfileService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn get_profile(&self) -> ClientResult<User> {
        let user: User = self.http.get("/me/profile").await?;
        self.refresh_session(&user)?;
        Ok(user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<User> {
        let user: User = self.http.put("/me/profile", update).await?;
        self.refresh_session(&user)?;
        Ok(user)
    }

    pub async fn upload_avatar(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<User> {
        let user: User = self
            .http
            .upload(Method::PATCH, "/me/avatar", Upload::image("avatar", file_name, bytes))
            .await?;
        self.refresh_session(&user)?;
        Ok(user)
    }

    pub async fn remove_avatar(&self) -> ClientResult<User> {
        let user: User = self.http.delete("/me/avatar").await?;
        self.refresh_session(&user)?;
        Ok(user)
    }

    /// Posts from the communities the user belongs to
    pub async fn feed(&self, page: u32) -> ClientResult<Page<Post>> {
        self.http
            .get_query("/me/feed", &[("page", page.to_string())])
            .await
    }

    /// Aggregates over the communities a creator owns
    pub async fn dashboard(&self) -> ClientResult<Dashboard> {
        self.http.get("/me/dashboard").await
    }

    fn refresh_session(&self, user: &User) -> ClientResult<()> {
        if self.http.session().update_user(user.clone())? {
            tracing::debug!(user_id = %user.id, "Session user refreshed");
        }
        Ok(())
    }
}

#[async_trait]
impl PageSource<Post, ()> for ProfileService {
    async fn fetch_page(&self, _query: &(), page: u32) -> ClientResult<Page<Post>> {
        self.feed(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::testing::{sample_post, sample_user, Harness};
    use axum::extract::{Multipart, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn backend() -> Router {
        Router::new()
            .route(
                "/me/profile",
                get(|| async { Json(sample_user("me", Role::Creator)) }).put(
                    |Json(body): Json<Value>| async move {
                        let mut user = sample_user("me", Role::Creator);
                        user.name = body["name"].as_str().unwrap_or_default().to_string();
                        Json(user)
                    },
                ),
            )
            .route(
                "/me/avatar",
                axum::routing::patch(|mut form: Multipart| async move {
                    let field = form.next_field().await.unwrap().unwrap();
                    let mut user = sample_user("me", Role::Creator);
                    user.avatar = Some(format!(
                        "/uploads/{}:{}",
                        field.name().unwrap_or_default(),
                        field.content_type().unwrap_or_default()
                    ));
                    Json(user)
                })
                .delete(|| async { Json(sample_user("me", Role::Creator)) }),
            )
            .route(
                "/me/feed",
                get(|Query(params): Query<HashMap<String, String>>| async move {
                    let page: u32 = params["page"].parse().unwrap();
                    Json(json!({
                        "items": [sample_post(&format!("f{}", page), 0, false)],
                        "page": page,
                        "totalPages": 2
                    }))
                }),
            )
            .route(
                "/me/dashboard",
                get(|| async {
                    Json(json!({"totalSubscribers": 12, "monthlyRevenue": 59.5, "communities": []}))
                }),
            )
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_session() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Creator);
        let profile = ProfileService::new(harness.http.clone());

        let update = ProfileUpdate {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let user = profile.update_profile(&update).await.unwrap();
        assert_eq!(user.name, "Renamed");
        assert_eq!(
            harness.session.current_session().unwrap().display_name(),
            "Renamed"
        );
    }

    #[tokio::test]
    async fn test_avatar_upload_is_multipart() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Creator);
        let profile = ProfileService::new(harness.http.clone());

        let user = profile
            .upload_avatar("me.png", vec![0x89, 0x50, 0x4e, 0x47])
            .await
            .unwrap();
        assert_eq!(user.avatar.as_deref(), Some("/uploads/avatar:image/png"));
        assert_eq!(
            harness.session.current_session().unwrap().avatar_ref(),
            Some("/uploads/avatar:image/png")
        );

        let user = profile.remove_avatar().await.unwrap();
        assert_eq!(user.avatar, None);
    }

    #[tokio::test]
    async fn test_feed_pages() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Crew);
        let profile = ProfileService::new(harness.http.clone());

        let page = profile.fetch_page(&(), 2).await.unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].id, "f2");
    }

    #[tokio::test]
    async fn test_dashboard_defaults_missing_fields() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Creator);
        let dashboard = ProfileService::new(harness.http.clone())
            .dashboard()
            .await
            .unwrap();
        assert_eq!(dashboard.total_subscribers, 12);
        assert_eq!(dashboard.total_posts, 0);
        assert_eq!(dashboard.monthly_revenue, 59.5);
    }
}
