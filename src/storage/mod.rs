//! Durable client-side storage
//!
//! The client persists a handful of string values across restarts: the
//! bearer token, a serialized user snapshot and the theme preference.
//!
//! - **kv**: The [`KeyValueStore`] trait and the in-memory store
//! - **file**: JSON-document store under the data directory
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use bulk::storage::{keys, FileStore, KeyValueStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::open("./bulk_data/state.json")?;
//!     store.set(keys::THEME, "dark")?;
//!     assert_eq!(store.get(keys::THEME)?.as_deref(), Some("dark"));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod file;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use kv::{KeyValueStore, MemoryStore};

/// Fixed keys under which client state is persisted
pub mod keys {
    /// Bearer token of the current session
    pub const TOKEN: &str = "token";
    /// Serialized snapshot of the logged-in user
    pub const USER: &str = "user";
    /// Theme preference ("light" / "dark")
    pub const THEME: &str = "theme";
}
