//! HTTP Client Pipeline
//!
//! The single request pipeline every feature service goes through:
//!
//! - attaches `Authorization: Bearer <token>` when a session exists
//! - normalizes every non-success response into [`ClientError`]
//! - reacts centrally to 401/403: forced logout, then a redirect to the
//!   login view carrying an explanatory message and the original location
//!
//! Callers for whom a 401 is an expected outcome (login itself, optional
//! profile fetches) flag their request [`AuthHandling::SelfHandled`].

use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::{normalize, ClientError, ClientResult};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// Message shown on the login view after a forced logout (401)
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";

/// Message shown on the login view after a forced logout (403)
pub const ACCESS_REVOKED_MESSAGE: &str =
    "Your session is no longer authorized. Please log in again.";

/// Who reacts to an authentication rejection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthHandling {
    /// The pipeline logs out and redirects to login
    #[default]
    Global,
    /// The caller handles the 401/403 itself
    SelfHandled,
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub auth: AuthHandling,
    /// Token to send instead of the session's (OAuth callback)
    pub bearer: Option<String>,
}

impl RequestOptions {
    pub fn self_handled() -> Self {
        Self {
            auth: AuthHandling::SelfHandled,
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }
}

/// A file to upload as multipart form data
#[derive(Debug, Clone)]
pub struct Upload {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Guess the MIME type from the file extension
    pub fn image(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = match file_name
            .rsplit('.')
            .next()
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        };
        Self::new(field, file_name, mime, bytes)
    }
}

/// Configured request pipeline
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl HttpClient {
    pub fn new(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("bulk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get_with(path, &[], RequestOptions::default()).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.get_with(path, query, RequestOptions::default()).await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        options: RequestOptions,
    ) -> ClientResult<T> {
        let builder = self.builder(Method::GET, path).query(query);
        decode(self.send(builder, &options).await?).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        self.post_with(path, body, RequestOptions::default()).await
    }

    pub async fn post_with<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ClientResult<T> {
        let builder = self.builder(Method::POST, path).json(body);
        decode(self.send(builder, &options).await?).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let builder = self.builder(Method::PUT, path).json(body);
        decode(self.send(builder, &RequestOptions::default()).await?).await
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let builder = self.builder(Method::PATCH, path).json(body);
        decode(self.send(builder, &RequestOptions::default()).await?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.builder(Method::DELETE, path);
        decode(self.send(builder, &RequestOptions::default()).await?).await
    }

    /// Send a file as multipart form data (avatar, logo, banner)
    pub async fn upload<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        upload: Upload,
    ) -> ClientResult<T> {
        let size = upload.bytes.len();
        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let form = multipart::Form::new().part(upload.field, part);

        tracing::debug!(path = %path, bytes = size, "Uploading file");
        let builder = self.builder(method, path).multipart(form);
        decode(self.send(builder, &RequestOptions::default()).await?).await
    }

    /// Attach the bearer token, send, and run the shared response reaction
    async fn send(&self, builder: RequestBuilder, options: &RequestOptions) -> ClientResult<Response> {
        let token = options.bearer.clone().or_else(|| self.session.token());
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let request = builder.build().map_err(ClientError::from)?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(method = %method, url = %url, "Sending request");

        let response = self.client.execute(request).await.map_err(|e| {
            tracing::warn!(method = %method, url = %url, error = %e, "Request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = normalize(status.as_u16(), &body);
        tracing::debug!(method = %method, url = %url, status = status.as_u16(), error = %error, "Request rejected");

        if error.is_unauthorized() && options.auth == AuthHandling::Global {
            self.force_logout(status.as_u16());
        }

        Err(error)
    }

    fn force_logout(&self, status: u16) {
        let from = self.navigator.current_path();
        tracing::warn!(status, from = %from, "Authentication rejected, logging out");

        let message = if status == 403 {
            ACCESS_REVOKED_MESSAGE
        } else {
            SESSION_EXPIRED_MESSAGE
        };

        self.session.logout();
        self.navigator
            .redirect_to_login(Some(from), Some(message.to_string()));
    }
}

/// Decode a success body; an empty body decodes as JSON `null`
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let text = response.text().await?;
    let text = if text.trim().is_empty() { "null" } else { text.as_str() };
    serde_json::from_str(text).map_err(ClientError::from)
}

/// Percent-encode one path segment
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::testing::Harness;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, patch, post};
    use axum::{Json, Router};
    use serde::de::IgnoredAny;
    use serde_json::{json, Value};

    fn bearer(headers: &HeaderMap) -> Value {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null)
    }

    fn echo_router() -> Router {
        Router::new()
            .route(
                "/echo",
                get(|headers: HeaderMap| async move { Json(json!({ "auth": bearer(&headers) })) }),
            )
            .route(
                "/expired",
                get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "jwt expired"}))) }),
            )
            .route(
                "/forbidden",
                get(|| async { (StatusCode::FORBIDDEN, "") }),
            )
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "No such post"}))) }),
            )
            .route("/empty", post(|| async { StatusCode::NO_CONTENT }))
            .route(
                "/settings",
                patch(|Json(body): Json<Value>| async move { Json(json!({ "patched": body })) }),
            )
    }

    #[tokio::test]
    async fn test_attaches_bearer_token_when_logged_in() {
        let harness = Harness::start(echo_router()).await;

        let anonymous: Value = harness.http.get("/echo").await.unwrap();
        assert_eq!(anonymous["auth"], Value::Null);

        harness.login_as(Role::Crew);
        let authed: Value = harness.http.get("/echo").await.unwrap();
        assert_eq!(authed["auth"], "Bearer test-token");
    }

    #[tokio::test]
    async fn test_explicit_bearer_overrides_session() {
        let harness = Harness::start(echo_router()).await;
        let value: Value = harness
            .http
            .get_with("/echo", &[], RequestOptions::default().with_bearer("oauth-tok"))
            .await
            .unwrap();
        assert_eq!(value["auth"], "Bearer oauth-tok");
    }

    #[tokio::test]
    async fn test_unhandled_401_forces_logout_and_redirect() {
        let harness = Harness::start(echo_router()).await;
        harness.login_as(Role::Crew);
        harness.navigator.navigate("/communities/c1");

        let err = harness.http.get::<Value>("/expired").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "jwt expired");

        assert!(!harness.session.is_authenticated());
        let location = harness.navigator.current();
        assert_eq!(location.path, "/login");
        assert_eq!(location.state.from.as_deref(), Some("/communities/c1"));
        assert_eq!(location.state.message.as_deref(), Some(SESSION_EXPIRED_MESSAGE));
    }

    #[tokio::test]
    async fn test_unhandled_403_forces_logout() {
        let harness = Harness::start(echo_router()).await;
        harness.login_as(Role::Creator);

        let err = harness.http.get::<Value>("/forbidden").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(!harness.session.is_authenticated());
        assert_eq!(
            harness.navigator.current().state.message.as_deref(),
            Some(ACCESS_REVOKED_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_self_handled_401_keeps_session() {
        let harness = Harness::start(echo_router()).await;
        harness.login_as(Role::Crew);
        harness.navigator.navigate("/feed");

        let err = harness
            .http
            .get_with::<Value>("/expired", &[], RequestOptions::self_handled())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(harness.session.is_authenticated());
        assert_eq!(harness.navigator.current_path(), "/feed");
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let harness = Harness::start(echo_router()).await;
        harness.login_as(Role::Crew);

        let err = harness.http.get::<Value>("/missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.user_message(), "No such post");
        assert!(harness.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_empty_body_decodes() {
        let harness = Harness::start(echo_router()).await;
        let _: IgnoredAny = harness.http.post("/empty", &json!({})).await.unwrap();
        harness.http.post::<_, ()>("/empty", &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_patch_sends_json_body() {
        let harness = Harness::start(echo_router()).await;
        let value: Value = harness
            .http
            .patch("/settings", &json!({"bio": "lifter"}))
            .await
            .unwrap();
        assert_eq!(value["patched"]["bio"], "lifter");
    }

    #[tokio::test]
    async fn test_network_error() {
        let harness = Harness::unreachable();
        let err = harness.http.get::<Value>("/echo").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn test_upload_mime_guess() {
        assert_eq!(Upload::image("avatar", "me.PNG", vec![]).mime, "image/png");
        assert_eq!(Upload::image("logo", "l.jpeg", vec![]).mime, "image/jpeg");
        assert_eq!(
            Upload::image("logo", "l", vec![]).mime,
            "application/octet-stream"
        );
    }
}
