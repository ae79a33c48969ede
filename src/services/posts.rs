//! Community posts and the like toggle

use async_trait::async_trait;
use std::sync::Arc;

use crate::dto::{Page, Post, PostDraft, Reaction};
use crate::error::ClientResult;
use crate::http::{segment, HttpClient};
use crate::interaction::{PageSource, ReactionApi};

pub struct PostService {
    http: Arc<HttpClient>,
}

impl PostService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn community_posts(community_id: &str) -> String {
        // The backend mounts community posts under its Spanish route name
        format!("/comunidades/{}/posts", segment(community_id))
    }

    pub async fn list_for_community(&self, community_id: &str, page: u32) -> ClientResult<Page<Post>> {
        self.http
            .get_query(
                &Self::community_posts(community_id),
                &[("page", page.to_string())],
            )
            .await
    }

    pub async fn create(&self, community_id: &str, draft: &PostDraft) -> ClientResult<Post> {
        let post: Post = self
            .http
            .post(&Self::community_posts(community_id), draft)
            .await?;
        tracing::info!(post_id = %post.id, community_id = %community_id, "Post published");
        Ok(post)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Post> {
        self.http.get(&format!("/posts/{}", segment(id))).await
    }

    /// Toggle the current user's like; the answer is authoritative
    pub async fn react(&self, id: &str) -> ClientResult<Reaction> {
        self.http
            .post(&format!("/posts/{}/react", segment(id)), &())
            .await
    }
}

#[async_trait]
impl ReactionApi for PostService {
    async fn react(&self, post_id: &str) -> ClientResult<Reaction> {
        PostService::react(self, post_id).await
    }
}

/// Pages of one community's posts; the query is the community id
#[async_trait]
impl PageSource<Post, String> for PostService {
    async fn fetch_page(&self, community_id: &String, page: u32) -> ClientResult<Page<Post>> {
        self.list_for_community(community_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::interaction::{LikeState, LikeTracker, ToggleOutcome};
    use crate::testing::{sample_post, Harness};
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;

    type Likes = Arc<Mutex<HashMap<String, (u64, bool)>>>;

    fn backend(likes: Likes) -> Router {
        Router::new()
            .route(
                "/comunidades/:id/posts",
                get(
                    |Path(id): Path<String>, Query(params): Query<HashMap<String, String>>| async move {
                        let page: u32 = params["page"].parse().unwrap();
                        let mut post = sample_post(&format!("{}-p{}", id, page), 0, false);
                        post.community_id = Some(id);
                        Json(json!({"items": [post], "page": page, "totalPages": 3}))
                    },
                )
                .post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    if body["content"].as_str().unwrap_or_default().is_empty() {
                        return (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(json!({"errors": {"content": "Content is required"}})),
                        );
                    }
                    let mut post = sample_post("new", 0, false);
                    post.community_id = Some(id);
                    post.is_premium = body["isPremium"].as_bool().unwrap_or_default();
                    (StatusCode::CREATED, Json(json!(post)))
                }),
            )
            .route(
                "/posts/:id",
                get(|Path(id): Path<String>| async move { Json(sample_post(&id, 7, true)) }),
            )
            .route(
                "/posts/:id/react",
                post(
                    |State(likes): State<Likes>, Path(id): Path<String>| async move {
                        let mut likes = likes.lock().unwrap();
                        let entry = likes.entry(id).or_insert((0, false));
                        entry.1 = !entry.1;
                        if entry.1 {
                            entry.0 += 1;
                        } else {
                            entry.0 -= 1;
                        }
                        Json(json!({"liked": entry.1, "likes": entry.0}))
                    },
                ),
            )
            .with_state(likes)
    }

    #[tokio::test]
    async fn test_community_posts_page() {
        let harness = Harness::start(backend(Likes::default())).await;
        harness.login_as(Role::Crew);
        let posts = PostService::new(harness.http.clone());

        let page = posts.fetch_page(&"c9".to_string(), 2).await.unwrap();
        assert_eq!(page.items[0].id, "c9-p2");
        assert_eq!(page.items[0].community_id.as_deref(), Some("c9"));
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_create_and_validation() {
        let harness = Harness::start(backend(Likes::default())).await;
        harness.login_as(Role::Creator);
        let posts = PostService::new(harness.http.clone());

        let created = posts
            .create(
                "c1",
                &PostDraft {
                    title: None,
                    content: "Deadlift day".to_string(),
                    is_premium: true,
                },
            )
            .await
            .unwrap();
        assert!(created.is_premium);

        let err = posts
            .create(
                "c1",
                &PostDraft {
                    title: None,
                    content: String::new(),
                    is_premium: false,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.field_errors()[0].field, "content");
    }

    #[tokio::test]
    async fn test_like_toggle_against_backend() {
        let likes = Likes::default();
        likes.lock().unwrap().insert("p1".to_string(), (7, true));
        let harness = Harness::start(backend(likes)).await;
        harness.login_as(Role::Crew);
        let posts = PostService::new(harness.http.clone());

        let tracker = LikeTracker::new();
        tracker.track(&posts.get("p1").await.unwrap());

        let outcome = tracker.toggle("p1", &posts).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed(LikeState::new(6, false)));
        let outcome = tracker.toggle("p1", &posts).await.unwrap();
        assert_eq!(outcome, ToggleOutcome::Confirmed(LikeState::new(7, true)));
    }

    #[tokio::test]
    async fn test_like_toggle_reverts_when_backend_unreachable() {
        let harness = Harness::unreachable();
        harness.login_as(Role::Crew);
        let posts = PostService::new(harness.http.clone());

        let tracker = LikeTracker::new();
        tracker.track(&sample_post("p1", 2, false));
        assert!(tracker.toggle("p1", &posts).await.is_err());
        assert_eq!(tracker.state("p1"), Some(LikeState::new(2, false)));
    }
}
