use serde::{Deserialize, Serialize};

use crate::dto::{Role, User};

/// The authenticated user and their credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub auth_token: String,
    pub user: User,
}

impl Session {
    pub fn new(auth_token: impl Into<String>, user: User) -> Self {
        Self {
            auth_token: auth_token.into(),
            user,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn avatar_ref(&self) -> Option<&str> {
        self.user.avatar.as_deref()
    }
}

/// Whether the store has finished reading durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationStatus {
    Hydrating,
    Ready,
}

/// What subscribers observe: hydration progress plus the session, if any
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub status: HydrationStatus,
    pub session: Option<Session>,
}

impl SessionState {
    pub fn hydrating() -> Self {
        Self {
            status: HydrationStatus::Hydrating,
            session: None,
        }
    }

    pub fn ready(session: Option<Session>) -> Self {
        Self {
            status: HydrationStatus::Ready,
            session,
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.status == HydrationStatus::Ready
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.as_ref().map(Session::role)
    }
}
