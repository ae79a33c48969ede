//! Communities, membership, branding images and premium plans

use async_trait::async_trait;
use reqwest::Method;
use serde::de::IgnoredAny;
use std::sync::Arc;

use crate::dto::{Community, CommunityDraft, CommunityQuery, Page, Plan, PlanDraft, UserSummary};
use crate::error::ClientResult;
use crate::http::{segment, HttpClient, Upload};
use crate::interaction::PageSource;

pub struct CommunityService {
    http: Arc<HttpClient>,
}

impl CommunityService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    fn path(id: &str) -> String {
        format!("/communities/{}", segment(id))
    }

    /// One page of the community directory
    pub async fn list(&self, query: &CommunityQuery, page: u32) -> ClientResult<Page<Community>> {
        let mut params = query.params();
        params.push(("page", page.to_string()));
        self.http.get_query("/communities", &params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Community> {
        self.http.get(&Self::path(id)).await
    }

    pub async fn create(&self, draft: &CommunityDraft) -> ClientResult<Community> {
        let community: Community = self.http.post("/communities", draft).await?;
        tracing::info!(community_id = %community.id, "Community created");
        Ok(community)
    }

    pub async fn update(&self, id: &str, draft: &CommunityDraft) -> ClientResult<Community> {
        self.http.put(&Self::path(id), draft).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http.delete::<IgnoredAny>(&Self::path(id)).await?;
        tracing::info!(community_id = %id, "Community deleted");
        Ok(())
    }

    // ---- membership ----

    pub async fn join(&self, id: &str) -> ClientResult<()> {
        self.http
            .post::<_, IgnoredAny>(&format!("{}/members", Self::path(id)), &())
            .await?;
        Ok(())
    }

    pub async fn leave(&self, id: &str) -> ClientResult<()> {
        self.http
            .delete::<IgnoredAny>(&format!("{}/members", Self::path(id)))
            .await?;
        Ok(())
    }

    pub async fn members(&self, id: &str) -> ClientResult<Vec<UserSummary>> {
        self.http.get(&format!("{}/members", Self::path(id))).await
    }

    /// Paying subscribers of a community (owner only)
    pub async fn subscribers(&self, id: &str) -> ClientResult<Vec<UserSummary>> {
        self.http
            .get(&format!("{}/subscribers", Self::path(id)))
            .await
    }

    // ---- images ----

    pub async fn upload_logo(&self, id: &str, file_name: &str, bytes: Vec<u8>) -> ClientResult<Community> {
        self.http
            .upload(
                Method::PATCH,
                &format!("{}/logo", Self::path(id)),
                Upload::image("logo", file_name, bytes),
            )
            .await
    }

    pub async fn upload_banner(&self, id: &str, file_name: &str, bytes: Vec<u8>) -> ClientResult<Community> {
        self.http
            .upload(
                Method::PATCH,
                &format!("{}/banner", Self::path(id)),
                Upload::image("banner", file_name, bytes),
            )
            .await
    }

    // ---- plans ----

    pub async fn plans(&self, id: &str) -> ClientResult<Vec<Plan>> {
        self.http.get(&format!("{}/plans", Self::path(id))).await
    }

    pub async fn create_plan(&self, id: &str, draft: &PlanDraft) -> ClientResult<Plan> {
        self.http
            .post(&format!("{}/plans", Self::path(id)), draft)
            .await
    }

    pub async fn update_plan(&self, id: &str, plan_id: &str, draft: &PlanDraft) -> ClientResult<Plan> {
        self.http
            .put(&format!("{}/plans/{}", Self::path(id), segment(plan_id)), draft)
            .await
    }

    pub async fn delete_plan(&self, id: &str, plan_id: &str) -> ClientResult<()> {
        self.http
            .delete::<IgnoredAny>(&format!("{}/plans/{}", Self::path(id), segment(plan_id)))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PageSource<Community, CommunityQuery> for CommunityService {
    async fn fetch_page(&self, query: &CommunityQuery, page: u32) -> ClientResult<Page<Community>> {
        self.list(query, page).await
    }
}
