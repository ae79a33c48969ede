//! Premium plan subscriptions of the current user

use serde::de::IgnoredAny;
use std::sync::Arc;

use crate::dto::{Subscription, SubscriptionRequest};
use crate::error::ClientResult;
use crate::http::{segment, HttpClient};

pub struct SubscriptionService {
    http: Arc<HttpClient>,
}

impl SubscriptionService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn mine(&self) -> ClientResult<Vec<Subscription>> {
        self.http.get("/me/subscriptions").await
    }

    pub async fn subscribe(&self, plan_id: &str) -> ClientResult<Subscription> {
        let subscription: Subscription = self
            .http
            .post(
                "/subscriptions",
                &SubscriptionRequest {
                    plan_id: plan_id.to_string(),
                },
            )
            .await?;
        tracing::info!(subscription_id = %subscription.id, plan_id = %plan_id, "Subscribed");
        Ok(subscription)
    }

    pub async fn cancel(&self, subscription_id: &str) -> ClientResult<()> {
        self.http
            .delete::<IgnoredAny>(&format!("/subscriptions/{}", segment(subscription_id)))
            .await?;
        tracing::info!(subscription_id = %subscription_id, "Subscription cancelled");
        Ok(())
    }
}
