//! Client-side Interaction State
//!
//! Transient state views keep while the user interacts with them:
//!
//! - **like**: Optimistic like toggles, one request in flight per post
//! - **pagination**: Infinite-scroll loader with identity de-duplication
//! - **debounce**: Search-as-you-type coalescing with stale-response discard
//! - **scope**: Cancellation of a view's requests when the view is left
//!
//! None of this state is persisted; it is discarded with the view.

mod debounce;
mod like;
mod pagination;
mod scope;

pub use debounce::{Debouncer, SearchApi, SearchController, SearchOutcome, SearchView};
pub use like::{LikeState, LikeTracker, PendingToggle, ReactionApi, ToggleOutcome};
pub use pagination::{LoadOutcome, PageSource, PageTicket, PagedLoader};
pub use scope::ViewScope;
