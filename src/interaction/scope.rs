//! View lifetime scopes
//!
//! A view runs its requests inside its [`ViewScope`]. Leaving the view
//! (calling [`ViewScope::leave`] or dropping the scope) cancels whatever is
//! still in flight, and any response that races the cancellation is
//! reported as [`ClientError::Cancelled`] instead of being applied.

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, ClientResult};

/// Cancellation boundary tied to one view's lifetime
#[derive(Debug)]
pub struct ViewScope {
    name: String,
    token: CancellationToken,
}

impl ViewScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: CancellationToken::new(),
        }
    }

    /// Nested scope (dialog, tab) cancelled along with this one
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: self.token.child_token(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Token for work spawned outside [`ViewScope::run`]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel everything still running in this scope
    pub fn leave(&self) {
        if !self.token.is_cancelled() {
            tracing::debug!(view = %self.name, "Leaving view, cancelling requests");
            self.token.cancel();
        }
    }

    /// Run a request; its result is dropped if the view is left first
    pub async fn run<F, T>(&self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.token.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ClientError::Cancelled),
            result = request => {
                if self.token.is_cancelled() {
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
