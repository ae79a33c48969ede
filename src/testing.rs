//! Shared test fixtures: sample records and an in-process mock backend

use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::ApiConfig;
use crate::dto::{Post, Role, User};
use crate::http::HttpClient;
use crate::navigation::Navigator;
use crate::session::SessionStore;
use crate::storage::MemoryStore;

pub(crate) fn sample_user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: format!("User {}", id),
        username: format!("user_{}", id),
        email: Some(format!("{}@bulk.test", id)),
        role,
        avatar: None,
        bio: None,
    }
}

pub(crate) fn sample_post(id: &str, like_count: u64, liked: bool) -> Post {
    Post {
        id: id.to_string(),
        community_id: Some("c1".to_string()),
        author: None,
        title: None,
        content: format!("post {}", id),
        is_premium: false,
        like_count,
        liked_by_me: liked,
        comment_count: 0,
        created_at: None,
    }
}

/// Mock REST backend bound to an ephemeral local port
pub(crate) struct MockServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Session store, navigator and pipeline wired to a mock backend
pub(crate) struct Harness {
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub http: Arc<HttpClient>,
    _server: Option<MockServer>,
}

impl Harness {
    pub async fn start(router: Router) -> Self {
        let server = MockServer::start(router).await;
        let mut harness = Self::with_base_url(&server.base_url);
        harness._server = Some(server);
        harness
    }

    /// Pipeline pointed at a port nothing listens on
    pub fn unreachable() -> Self {
        Self::with_base_url("http://127.0.0.1:1")
    }

    fn with_base_url(base_url: &str) -> Self {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
        };
        let session = Arc::new(SessionStore::open(Arc::new(MemoryStore::new())));
        let navigator = Arc::new(Navigator::default());
        let http = Arc::new(HttpClient::new(&config, session.clone(), navigator.clone()).unwrap());
        Self {
            session,
            navigator,
            http,
            _server: None,
        }
    }

    pub fn login_as(&self, role: Role) {
        self.session
            .establish("test-token", sample_user("me", role))
            .unwrap();
    }
}
