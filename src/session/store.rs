//! Session store with subscribe/notify semantics
//!
//! Constructed once per application instance and passed by reference.
//! Every mutation is published on a `tokio::sync::watch` channel so views
//! re-render reactively.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use super::model::{HydrationStatus, Session, SessionState};
use crate::dto::{AuthPayload, Credentials, Registration, User};
use crate::error::ClientResult;
use crate::storage::{keys, KeyValueStore, StorageResult};

/// Exchanges credentials for a token and user
///
/// Implemented by the auth service; tests substitute fakes.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> ClientResult<AuthPayload>;
    async fn register(&self, registration: &Registration) -> ClientResult<AuthPayload>;
}

/// Owner of the client session
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Create a store that has not read durable storage yet
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(SessionState::hydrating());
        Self { storage, state }
    }

    /// Create a store and hydrate it from durable storage
    pub fn open(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self::new(storage);
        store.hydrate();
        store
    }

    /// Restore the session persisted by a previous run
    ///
    /// Missing or unreadable credentials leave the store unauthenticated.
    pub fn hydrate(&self) -> Option<Session> {
        let session = match self.read_persisted() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted session");
                None
            }
        };

        if let Some(session) = &session {
            tracing::debug!(user_id = %session.user_id(), "Restored session");
        }

        self.state.send_replace(SessionState::ready(session.clone()));
        session
    }

    fn read_persisted(&self) -> StorageResult<Option<Session>> {
        let token = self.storage.get(keys::TOKEN)?;
        let user = self.storage.get(keys::USER)?;

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => (token, user),
            (None, None) => return Ok(None),
            _ => {
                tracing::warn!("Discarding incomplete persisted session");
                self.clear_persisted()?;
                return Ok(None);
            }
        };

        match serde_json::from_str::<User>(&user) {
            Ok(user) => Ok(Some(Session::new(token, user))),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable user snapshot");
                self.clear_persisted()?;
                Ok(None)
            }
        }
    }

    fn clear_persisted(&self) -> StorageResult<()> {
        self.storage.remove(keys::TOKEN)?;
        self.storage.remove(keys::USER)
    }

    /// Log in with email and password
    pub async fn login(
        &self,
        auth: &dyn Authenticator,
        email: &str,
        password: &str,
    ) -> ClientResult<Session> {
        let payload = auth.login(&Credentials::new(email, password)).await?;
        tracing::info!(user_id = %payload.user.id, "Logged in");
        self.establish(payload.token, payload.user)
    }

    /// Create an account; the backend logs the new user in directly
    pub async fn register(
        &self,
        auth: &dyn Authenticator,
        registration: &Registration,
    ) -> ClientResult<Session> {
        let payload = auth.register(registration).await?;
        tracing::info!(user_id = %payload.user.id, "Registered");
        self.establish(payload.token, payload.user)
    }

    /// Install a session obtained by any means and persist it
    pub fn establish(&self, token: impl Into<String>, user: User) -> ClientResult<Session> {
        let session = Session::new(token, user);

        self.storage.set(keys::TOKEN, &session.auth_token)?;
        self.storage
            .set(keys::USER, &serde_json::to_string(&session.user)?)?;

        self.state
            .send_replace(SessionState::ready(Some(session.clone())));
        Ok(session)
    }

    /// Replace the user snapshot after a profile edit
    ///
    /// Returns false when there is no session to update.
    pub fn update_user(&self, user: User) -> ClientResult<bool> {
        let Some(current) = self.current_session() else {
            return Ok(false);
        };

        self.storage.set(keys::USER, &serde_json::to_string(&user)?)?;
        self.state
            .send_replace(SessionState::ready(Some(Session::new(current.auth_token, user))));
        Ok(true)
    }

    /// Destroy the session in memory and in durable storage
    ///
    /// Unconditional and idempotent. A storage failure is logged; the
    /// in-memory session is cleared regardless.
    pub fn logout(&self) {
        let had_session = self.state.borrow().session.is_some();

        self.state.send_replace(SessionState::ready(None));

        if let Err(e) = self.clear_persisted() {
            tracing::error!(error = %e, "Failed to clear persisted session");
        }

        if had_session {
            tracing::info!("Logged out");
        }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.state.borrow().session.clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.auth_token.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_some()
    }

    pub fn status(&self) -> HydrationStatus {
        self.state.borrow().status
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent change of the session state
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::Role;
    use crate::error::ClientError;
    use crate::storage::MemoryStore;
    use crate::testing::sample_user;

    struct FakeAuth;

    #[async_trait]
    impl Authenticator for FakeAuth {
        async fn login(&self, credentials: &Credentials) -> ClientResult<AuthPayload> {
            if credentials.password == "secret" {
                Ok(AuthPayload {
                    token: "tok-1".to_string(),
                    user: sample_user("u1", Role::Crew),
                })
            } else {
                Err(ClientError::Unauthorized {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            }
        }

        async fn register(&self, registration: &Registration) -> ClientResult<AuthPayload> {
            let mut user = sample_user("u2", registration.role);
            user.username = registration.username.clone();
            Ok(AuthPayload {
                token: "tok-2".to_string(),
                user,
            })
        }
    }

    fn store() -> (SessionStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (SessionStore::open(storage.clone()), storage)
    }

    #[test]
    fn test_new_store_is_hydrating() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(store.status(), HydrationStatus::Hydrating);
        store.hydrate();
        assert_eq!(store.status(), HydrationStatus::Ready);
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_then_logout_clears_everything() {
        let (store, storage) = store();

        let session = store.login(&FakeAuth, "a@b.com", "secret").await.unwrap();
        assert_eq!(session.auth_token, "tok-1");
        assert_eq!(storage.get(keys::TOKEN).unwrap().as_deref(), Some("tok-1"));
        assert!(storage.get(keys::USER).unwrap().is_some());

        store.logout();
        assert!(store.current_session().is_none());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
        assert!(storage.get(keys::USER).unwrap().is_none());

        // Idempotent
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_no_session() {
        let (store, storage) = store();
        let err = store.login(&FakeAuth, "a@b.com", "wrong").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!store.is_authenticated());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_establishes_session() {
        let (store, _) = store();
        let registration = Registration {
            name: "Bea".to_string(),
            username: "bea".to_string(),
            email: "bea@b.com".to_string(),
            password: "pw".to_string(),
            role: Role::Creator,
        };
        let session = store.register(&FakeAuth, &registration).await.unwrap();
        assert_eq!(session.username(), "bea");
        assert_eq!(store.current_session().unwrap().role(), Role::Creator);
    }

    #[test]
    fn test_hydrates_persisted_session() {
        let storage = Arc::new(MemoryStore::new());
        {
            let first = SessionStore::open(storage.clone());
            first.establish("tok-9", sample_user("u9", Role::Creator)).unwrap();
        }

        let second = SessionStore::open(storage);
        let session = second.current_session().unwrap();
        assert_eq!(session.auth_token, "tok-9");
        assert_eq!(session.user_id(), "u9");
    }

    #[test]
    fn test_corrupt_snapshot_is_discarded() {
        let storage = Arc::new(MemoryStore::with_entries([
            (keys::TOKEN, "tok"),
            (keys::USER, "{broken"),
        ]));
        let store = SessionStore::open(storage.clone());
        assert!(!store.is_authenticated());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_token_without_user_is_discarded() {
        let storage = Arc::new(MemoryStore::with_entries([(keys::TOKEN, "tok")]));
        let store = SessionStore::open(storage.clone());
        assert!(!store.is_authenticated());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
    }

    #[test]
    fn test_update_user() {
        let (store, storage) = store();
        assert!(!store.update_user(sample_user("u1", Role::Crew)).unwrap());

        store.establish("tok", sample_user("u1", Role::Crew)).unwrap();
        let mut edited = sample_user("u1", Role::Crew);
        edited.name = "Renamed".to_string();
        assert!(store.update_user(edited).unwrap());

        assert_eq!(store.current_session().unwrap().display_name(), "Renamed");
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert!(storage.get(keys::USER).unwrap().unwrap().contains("Renamed"));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let (store, _) = store();
        let mut rx = store.subscribe();

        store.establish("tok", sample_user("u1", Role::Crew)).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
