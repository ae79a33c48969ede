//! Data Transfer Objects
//!
//! Request and response types exchanged with the Bulk REST backend.
//! Wire names are camelCase; a few fields accept the alternate names
//! different backend handlers use for the same thing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything with a stable identity, used to de-duplicate paged lists
pub trait Identified {
    fn key(&self) -> &str;
}

// ============================================
// USERS & AUTH
// ============================================

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Owns communities and publishes premium content
    #[serde(alias = "creator")]
    Creator,
    /// Regular member
    #[serde(alias = "crew")]
    Crew,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "CREATOR",
            Role::Crew => "CREW",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATOR" => Ok(Role::Creator),
            "CREW" => Ok(Role::Crew),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Full user record as returned by auth and profile endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "displayName")]
    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default, alias = "avatarUrl", skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Compact user reference embedded in posts, comments and search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "displayName")]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "avatarUrl")]
    pub avatar: Option<String>,
}

impl Identified for UserSummary {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Account creation request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful login/registration response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    #[serde(alias = "accessToken")]
    pub token: String,
    pub user: User,
}

/// Password reset request bodies
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPassword {
    pub password: String,
}

/// Generic acknowledgement (`{"message": "..."}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

// ============================================
// COMMUNITIES & PLANS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default, alias = "owner")]
    pub owner_id: Option<String>,
    #[serde(default, alias = "membersCount")]
    pub member_count: u64,
    #[serde(default)]
    pub is_member: bool,
}

impl Identified for Community {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Body for creating or replacing a community
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDraft {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Sort order for community listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommunitySort {
    #[default]
    Newest,
    Popular,
    Name,
}

impl CommunitySort {
    pub fn as_param(&self) -> &'static str {
        match self {
            CommunitySort::Newest => "recent",
            CommunitySort::Popular => "popular",
            CommunitySort::Name => "name",
        }
    }
}

impl std::str::FromStr for CommunitySort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recent" | "newest" => Ok(CommunitySort::Newest),
            "popular" => Ok(CommunitySort::Popular),
            "name" => Ok(CommunitySort::Name),
            other => Err(format!("unknown sort: {}", other)),
        }
    }
}

/// Filter and sort parameters of a community listing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommunityQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: CommunitySort,
}

impl CommunityQuery {
    /// Query-string pairs, without the page number
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort", self.sort.as_param().to_string())];
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("search", search.trim().to_string()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params
    }
}

/// Premium subscription tier of a community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub benefits: Vec<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub benefits: Vec<String>,
}

// ============================================
// POSTS & COMMENTS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, alias = "community")]
    pub community_id: Option<String>,
    #[serde(default)]
    pub author: Option<UserSummary>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, alias = "likes", alias = "likesCount")]
    pub like_count: u64,
    #[serde(default, alias = "liked", alias = "isLiked")]
    pub liked_by_me: bool,
    #[serde(default, alias = "commentsCount")]
    pub comment_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Post {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub is_premium: bool,
}

/// Authoritative like state returned by the react endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub liked: bool,
    #[serde(alias = "likes", alias = "likesCount")]
    pub like_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub author: Option<UserSummary>,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Comment {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentDraft {
    pub content: String,
}

// ============================================
// NOTIFICATIONS, SUBSCRIPTIONS, SEARCH
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, alias = "isRead")]
    pub read: bool,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Identified for Notification {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Body of the mark-as-read call; an empty list marks everything
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarkAsRead {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "community")]
    pub community_id: String,
    #[serde(alias = "plan")]
    pub plan_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub plan_id: String,
}

/// Unified search across users, communities and posts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchResults {
    pub users: Vec<UserSummary>,
    pub communities: Vec<Community>,
    pub posts: Vec<Post>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.communities.is_empty() && self.posts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.users.len() + self.communities.len() + self.posts.len()
    }
}

/// Creator dashboard aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Dashboard {
    pub total_subscribers: u64,
    pub total_members: u64,
    pub total_posts: u64,
    pub total_likes: u64,
    pub monthly_revenue: f64,
    pub communities: Vec<Community>,
}

// ============================================
// PAGINATION
// ============================================

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "data", alias = "results")]
    pub items: Vec<T>,
    #[serde(default = "first_page", alias = "currentPage")]
    pub page: u32,
    #[serde(default, alias = "pages")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, total_pages: u32) -> Self {
        Self {
            items,
            page,
            total_pages,
        }
    }
}
