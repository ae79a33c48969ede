//! Feature Services
//!
//! One service per backend resource, each mapping logical operations to a
//! single call through the shared [`HttpClient`](crate::http::HttpClient).
//! Errors arrive already normalized and are propagated unchanged.
//!
//! ## Services
//!
//! - **auth**: Login, registration, password recovery, OAuth profile
//! - **profile**: Own profile, avatar, personalized feed, creator dashboard
//! - **communities**: Community CRUD, membership, images, plans
//! - **posts**: Community posts, post detail, like toggle
//! - **comments**: Post comments
//! - **notifications**: Notification feed
//! - **subscriptions**: Premium plan subscriptions
//! - **search**: Unified search

mod auth;
mod comments;
mod communities;
mod notifications;
mod posts;
mod profile;
mod search;
mod subscriptions;

pub use auth::AuthService;
pub use comments::CommentService;
pub use communities::CommunityService;
pub use notifications::NotificationService;
pub use posts::PostService;
pub use profile::ProfileService;
pub use search::SearchService;
pub use subscriptions::SubscriptionService;
