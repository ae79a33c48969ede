//! # Bulk
//!
//! Client core for the Bulk community platform: creators run communities
//! with premium plans, members ("crew") join, post, like and comment.
//!
//! ## Features
//!
//! - **Session**: Durable login state with subscribe/notify semantics
//! - **Request pipeline**: Bearer auth, error normalization, forced logout
//! - **Optimistic likes**: Instant toggles reconciled with the server
//! - **Infinite lists**: De-duplicated, stale-safe page loading
//! - **Route guard**: Session and role based access to views
//! - **Search**: Debounced search-as-you-type
//!
//! ## Modules
//!
//! - [`session`]: Session store
//! - [`http`]: Request pipeline every service goes through
//! - [`services`]: One service per backend resource
//! - [`interaction`]: Like toggles, pagination, search debouncing, view scopes
//! - [`router`]: Route table and guard
//! - [`app`]: [`BulkApp`], wiring it all together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bulk::{BulkApp, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = BulkApp::open(Config::load_default())?;
//!
//!     // Log in; the session is persisted for the next run
//!     app.login("ana@example.com", "secret").await?;
//!
//!     // First page of the personalized feed
//!     let mut feed = app.feed_loader();
//!     app.load_feed(&mut feed).await?;
//!
//!     for post in feed.items() {
//!         println!("{} ({} likes)", post.content, post.like_count);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod dto;
pub mod error;
pub mod http;
pub mod interaction;
pub mod navigation;
pub mod preferences;
pub mod router;
pub mod services;
pub mod session;
pub mod storage;

#[cfg(test)]
mod testing;

// Re-export top-level types for convenience
pub use app::BulkApp;

pub use config::{generate_default_config, Config, ConfigError};

pub use dto::{Community, Page, Post, Role, User};

pub use error::{ClientError, ClientResult, FieldError};

pub use http::{AuthHandling, HttpClient, RequestOptions};

pub use interaction::{LikeTracker, PagedLoader, SearchController, ToggleOutcome, ViewScope};

pub use navigation::{Location, NavigationState, Navigator};

pub use preferences::{Theme, ThemePreference};

pub use router::{guard, GuardOutcome, Route, Router};

pub use session::{HydrationStatus, Session, SessionState, SessionStore};

pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
