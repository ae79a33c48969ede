//! Post comments

use async_trait::async_trait;
use std::sync::Arc;

use crate::dto::{Comment, CommentDraft, Page};
use crate::error::ClientResult;
use crate::http::{segment, HttpClient};
use crate::interaction::PageSource;

pub struct CommentService {
    http: Arc<HttpClient>,
}

impl CommentService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn list(&self, post_id: &str, page: u32) -> ClientResult<Page<Comment>> {
        self.http
            .get_query(
                &format!("/posts/{}/comments", segment(post_id)),
                &[("page", page.to_string())],
            )
            .await
    }

    pub async fn create(&self, post_id: &str, content: &str) -> ClientResult<Comment> {
        self.http
            .post(
                &format!("/posts/{}/comments", segment(post_id)),
                &CommentDraft {
                    content: content.to_string(),
                },
            )
            .await
    }
}

/// Pages of one post's comments; the query is the post id
#[async_trait]
impl PageSource<Comment, String> for CommentService {
    async fn fetch_page(&self, post_id: &String, page: u32) -> ClientResult<Page<Comment>> {
        self.list(post_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::testing::Harness;
    use axum::extract::Path;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn backend() -> Router {
        Router::new().route(
            "/posts/:id/comments",
            get(|Path(id): Path<String>| async move {
                Json(json!({
                    "results": [{"_id": format!("{}-c1", id), "content": "Nice lift"}],
                    "totalPages": 1
                }))
            })
            .post(|Json(body): Json<Value>| async move {
                Json(json!({"id": "c2", "content": body["content"]}))
            }),
        )
    }

    #[tokio::test]
    async fn test_list_and_create() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Crew);
        let comments = CommentService::new(harness.http.clone());

        let page = comments.list("p1", 1).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items[0].id, "p1-c1");
        assert_eq!(page.items[0].author, None);

        let created = comments.create("p1", "Congrats").await.unwrap();
        assert_eq!(created.content, "Congrats");
    }
}
