//! Authentication endpoints

use async_trait::async_trait;
use std::sync::Arc;

use crate::dto::{Ack, AuthPayload, Credentials, ForgotPassword, Registration, ResetPassword, User};
use crate::error::{ClientError, ClientResult};
use crate::http::{segment, HttpClient, RequestOptions};
use crate::session::Authenticator;

pub struct AuthService {
    http: Arc<HttpClient>,
}

impl AuthService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Exchange credentials for a token; a 401 here means bad credentials
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthPayload> {
        self.http
            .post_with("/auth/login", credentials, RequestOptions::self_handled())
            .await
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<AuthPayload> {
        self.http
            .post_with("/auth/registro", registration, RequestOptions::self_handled())
            .await
    }

    /// Ask for a password reset email; returns the backend's message
    pub async fn forgot_password(&self, email: &str) -> ClientResult<Option<String>> {
        let ack: Option<Ack> = self
            .http
            .post(
                "/auth/forgot-password",
                &ForgotPassword {
                    email: email.to_string(),
                },
            )
            .await?;
        Ok(ack.and_then(|a| a.message))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ClientResult<Option<String>> {
        let ack: Option<Ack> = self
            .http
            .post(
                &format!("/auth/reset-password/{}", segment(token)),
                &ResetPassword {
                    password: password.to_string(),
                },
            )
            .await?;
        Ok(ack.and_then(|a| a.message))
    }

    /// Optional profile fetch: an expired token yields `None`, not a logout
    pub async fn fetch_me(&self) -> ClientResult<Option<User>> {
        match self
            .http
            .get_with("/me/profile", &[], RequestOptions::self_handled())
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(ClientError::Unauthorized { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch the profile behind a token handed over by an OAuth callback
    pub async fn fetch_me_with_token(&self, token: &str) -> ClientResult<User> {
        self.http
            .get_with(
                "/me/profile",
                &[],
                RequestOptions::self_handled().with_bearer(token),
            )
            .await
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthPayload> {
        AuthService::login(self, credentials).await
    }

    async fn register(&self, registration: &Registration) -> ClientResult<AuthPayload> {
        AuthService::register(self, registration).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::testing::{sample_user, Harness};
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "secret" {
                        Json(json!({"token": "tok-1", "user": sample_user("u1", Role::Crew)}))
                            .into_response()
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"})))
                            .into_response()
                    }
                }),
            )
            .route(
                "/auth/registro",
                post(|| async {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"errors": [{"path": "email", "msg": "Email already registered"}]})),
                    )
                }),
            )
            .route(
                "/auth/forgot-password",
                post(|| async { Json(json!({"message": "Check your inbox"})) }),
            )
            .route(
                "/auth/reset-password/:token",
                post(|Path(token): Path<String>| async move {
                    Json(json!({"message": format!("reset {}", token)}))
                }),
            )
            .route(
                "/me/profile",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer oauth-tok") => {
                            Json(sample_user("u7", Role::Creator)).into_response()
                        }
                        _ => StatusCode::UNAUTHORIZED.into_response(),
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_login_success() {
        let harness = Harness::start(backend()).await;
        let auth = AuthService::new(harness.http.clone());
        let payload = auth
            .login(&Credentials::new("a@b.com", "secret"))
            .await
            .unwrap();
        assert_eq!(payload.token, "tok-1");
        assert_eq!(payload.user.role, Role::Crew);
    }

    #[tokio::test]
    async fn test_bad_credentials_do_not_redirect() {
        let harness = Harness::start(backend()).await;
        harness.navigator.navigate("/login");
        let auth = AuthService::new(harness.http.clone());

        let err = auth
            .login(&Credentials::new("a@b.com", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(harness.navigator.current().state.message, None);
    }

    #[tokio::test]
    async fn test_register_validation_errors() {
        let harness = Harness::start(backend()).await;
        let auth = AuthService::new(harness.http.clone());
        let err = auth
            .register(&Registration {
                name: "A".to_string(),
                username: "a".to_string(),
                email: "a@b.com".to_string(),
                password: "pw".to_string(),
                role: Role::Crew,
            })
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].field, "email");
    }

    #[tokio::test]
    async fn test_password_recovery() {
        let harness = Harness::start(backend()).await;
        let auth = AuthService::new(harness.http.clone());
        assert_eq!(
            auth.forgot_password("a@b.com").await.unwrap().as_deref(),
            Some("Check your inbox")
        );
        assert_eq!(
            auth.reset_password("abc123", "new").await.unwrap().as_deref(),
            Some("reset abc123")
        );
    }

    #[tokio::test]
    async fn test_optional_profile_fetch() {
        let harness = Harness::start(backend()).await;
        harness.login_as(Role::Crew);
        let auth = AuthService::new(harness.http.clone());

        // The session token is rejected, but the caller handles it
        assert_eq!(auth.fetch_me().await.unwrap(), None);
        assert!(harness.session.is_authenticated());

        let user = auth.fetch_me_with_token("oauth-tok").await.unwrap();
        assert_eq!(user.id, "u7");
    }
}
