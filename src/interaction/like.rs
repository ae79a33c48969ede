//! Optimistic like toggle
//!
//! Per post: `Idle -> Pending -> Idle`. The toggle is applied to the
//! visible state immediately; the server's answer then overwrites it. A
//! failed request restores the values from before the optimistic flip.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::dto::{Post, Reaction};
use crate::error::ClientResult;

/// Backend call that toggles the current user's like on a post
#[async_trait]
pub trait ReactionApi: Send + Sync {
    async fn react(&self, post_id: &str) -> ClientResult<Reaction>;
}

/// Visible like state of one post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub like_count: u64,
    pub liked: bool,
    pub in_flight: bool,
}

impl LikeState {
    pub fn new(like_count: u64, liked: bool) -> Self {
        Self {
            like_count,
            liked,
            in_flight: false,
        }
    }

    fn flipped(self) -> Self {
        let like_count = if self.liked {
            self.like_count.saturating_sub(1)
        } else {
            self.like_count + 1
        };
        Self {
            like_count,
            liked: !self.liked,
            in_flight: true,
        }
    }
}

impl From<&Post> for LikeState {
    fn from(post: &Post) -> Self {
        Self::new(post.like_count, post.liked_by_me)
    }
}

/// A toggle that has been applied optimistically and awaits the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
    pub post_id: String,
    pub previous: LikeState,
    pub optimistic: LikeState,
    ticket: u64,
}

/// Result of a user-triggered toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server confirmed; carries the reconciled state
    Confirmed(LikeState),
    /// A request for this post was already in flight, or it is not tracked
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    state: LikeState,
    /// Ticket of the toggle currently in flight
    pending: Option<u64>,
}

impl Tracked {
    /// Whether `pending` is still the toggle this entry waits on
    fn awaits(&self, pending: &PendingToggle) -> bool {
        self.pending == Some(pending.ticket)
    }
}

/// Like state of every post currently on screen
#[derive(Debug, Default)]
pub struct LikeTracker {
    posts: Mutex<HashMap<String, Tracked>>,
    next_ticket: AtomicU64,
}

impl LikeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn posts(&self) -> MutexGuard<'_, HashMap<String, Tracked>> {
        self.posts.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start tracking a fetched post; an in-flight entry is left alone
    pub fn track(&self, post: &Post) {
        let mut posts = self.posts();
        match posts.get(&post.id) {
            Some(tracked) if tracked.pending.is_some() => {}
            _ => {
                posts.insert(
                    post.id.clone(),
                    Tracked {
                        state: LikeState::from(post),
                        pending: None,
                    },
                );
            }
        }
    }

    pub fn track_all<'a>(&self, posts: impl IntoIterator<Item = &'a Post>) {
        for post in posts {
            self.track(post);
        }
    }

    pub fn state(&self, post_id: &str) -> Option<LikeState> {
        self.posts().get(post_id).map(|tracked| tracked.state)
    }

    /// Drop a post whose view was left; a late response for it is ignored
    pub fn forget(&self, post_id: &str) {
        self.posts().remove(post_id);
    }

    pub fn clear(&self) {
        self.posts().clear();
    }

    /// Apply the optimistic flip, unless a request is already pending
    pub fn begin(&self, post_id: &str) -> Option<PendingToggle> {
        let mut posts = self.posts();
        let tracked = posts.get_mut(post_id)?;
        if tracked.pending.is_some() {
            return None;
        }

        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let previous = tracked.state;
        let optimistic = previous.flipped();
        *tracked = Tracked {
            state: optimistic,
            pending: Some(ticket),
        };

        Some(PendingToggle {
            post_id: post_id.to_string(),
            previous,
            optimistic,
            ticket,
        })
    }

    /// Overwrite with the server's authoritative count and flag
    ///
    /// Ignored when the post was forgotten or re-tracked since `pending`
    /// began.
    pub fn confirm(&self, pending: &PendingToggle, reaction: Reaction) -> LikeState {
        let confirmed = LikeState::new(reaction.like_count, reaction.liked);
        self.settle(pending, confirmed);
        confirmed
    }

    /// Restore the values from before the optimistic flip
    pub fn revert(&self, pending: &PendingToggle) -> LikeState {
        let restored = LikeState {
            in_flight: false,
            ..pending.previous
        };
        self.settle(pending, restored);
        restored
    }

    fn settle(&self, pending: &PendingToggle, state: LikeState) {
        let mut posts = self.posts();
        match posts.get_mut(&pending.post_id) {
            Some(tracked) if tracked.awaits(pending) => {
                *tracked = Tracked {
                    state,
                    pending: None,
                };
            }
            _ => tracing::debug!(post_id = %pending.post_id, "Dropping stale like response"),
        }
    }

    /// Toggle a post's like through `api`
    ///
    /// Returns the error of a failed request after the state is reverted.
    pub async fn toggle(&self, post_id: &str, api: &dyn ReactionApi) -> ClientResult<ToggleOutcome> {
        let Some(pending) = self.begin(post_id) else {
            tracing::debug!(post_id = %post_id, "Like toggle ignored");
            return Ok(ToggleOutcome::Ignored);
        };

        match api.react(post_id).await {
            Ok(reaction) => Ok(ToggleOutcome::Confirmed(self.confirm(&pending, reaction))),
            Err(e) => {
                tracing::warn!(post_id = %post_id, error = %e, "Like toggle failed, reverting");
                self.revert(&pending);
                Err(e)
            }
        }
    }
}
