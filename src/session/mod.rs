//! Client Session
//!
//! The session is the client-side record of the authenticated user and
//! their bearer token. It is owned exclusively by [`SessionStore`]; every
//! other part of the client reads it through snapshots or a subscription.
//!
//! ## Lifecycle
//!
//! 1. `SessionStore::open` hydrates from durable storage (no stored
//!    credentials means unauthenticated, not an error)
//! 2. Login, registration or an OAuth callback establishes a session
//! 3. Profile edits replace the user snapshot
//! 4. Logout, or any unhandled 401/403 response, destroys it

mod model;
mod store;

pub use model::{HydrationStatus, Session, SessionState};
pub use store::{Authenticator, SessionStore};
