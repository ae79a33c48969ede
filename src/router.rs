//! Client Router
//!
//! Maps location paths to views and gates each view behind its access
//! rule. The guard itself is a pure function of the session state, so it
//! can be evaluated on every session change without side effects.

use std::fmt;
use std::sync::Arc;

use crate::dto::Role;
use crate::session::{SessionState, SessionStore};

/// Message of the access-denied view
pub const ACCESS_DENIED_MESSAGE: &str = "You don't have permission to view this page.";

const CREATOR_ONLY: &[Role] = &[Role::Creator];

/// Every view of the client
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Register,
    ForgotPassword,
    ResetPassword { token: String },
    /// Landing view of the OAuth provider redirect
    OAuthCallback,
    Feed,
    Dashboard,
    Profile,
    /// Community directory
    Communities,
    Community { id: String },
    Post { id: String },
    Search,
    Notifications,
    Subscriptions,
    NotFound,
}

/// Who may enter a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    /// Authenticated with one of these roles
    Roles(&'static [Role]),
}

impl Route {
    /// Match a location path; query string and fragment are ignored
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            })
            .collect();

        match segments.as_slice() {
            [] => Route::Home,
            [a] if a == "login" => Route::Login,
            [a] if a == "register" => Route::Register,
            [a] if a == "forgot-password" => Route::ForgotPassword,
            [a, token] if a == "reset-password" => Route::ResetPassword {
                token: token.clone(),
            },
            [a, b] if a == "oauth" && b == "callback" => Route::OAuthCallback,
            [a] if a == "feed" => Route::Feed,
            [a] if a == "dashboard" => Route::Dashboard,
            [a] if a == "profile" => Route::Profile,
            [a] if a == "communities" => Route::Communities,
            [a, id] if a == "communities" => Route::Community { id: id.clone() },
            [a, id] if a == "posts" => Route::Post { id: id.clone() },
            [a] if a == "search" => Route::Search,
            [a] if a == "notifications" => Route::Notifications,
            [a] if a == "subscriptions" => Route::Subscriptions,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        let seg = |s: &str| urlencoding::encode(s).into_owned();
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::ResetPassword { token } => format!("/reset-password/{}", seg(token)),
            Route::OAuthCallback => "/oauth/callback".to_string(),
            Route::Feed => "/feed".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Profile => "/profile".to_string(),
            Route::Communities => "/communities".to_string(),
            Route::Community { id } => format!("/communities/{}", seg(id)),
            Route::Post { id } => format!("/posts/{}", seg(id)),
            Route::Search => "/search".to_string(),
            Route::Notifications => "/notifications".to_string(),
            Route::Subscriptions => "/subscriptions".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Route::Feed
            | Route::Profile
            | Route::Notifications
            | Route::Subscriptions
            | Route::Post { .. } => Access::Authenticated,
            Route::Dashboard => Access::Roles(CREATOR_ONLY),
            _ => Access::Public,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decision for one navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Session still hydrating; show a loading state
    Loading,
    Allow,
    /// Not logged in; `from` is restored after login
    RedirectToLogin { from: String },
    /// Logged in with the wrong role; no redirect
    Deny { message: String, home: String },
}

/// Decide whether the session may enter a guarded view
///
/// An empty `required_roles` only requires authentication.
pub fn guard(state: &SessionState, required_roles: &[Role], requested: &str) -> GuardOutcome {
    if !state.is_hydrated() {
        return GuardOutcome::Loading;
    }

    let Some(role) = state.role() else {
        return GuardOutcome::RedirectToLogin {
            from: requested.to_string(),
        };
    };

    if !required_roles.is_empty() && !required_roles.contains(&role) {
        return GuardOutcome::Deny {
            message: ACCESS_DENIED_MESSAGE.to_string(),
            home: Route::Home.path(),
        };
    }

    GuardOutcome::Allow
}

/// A path matched to its route and the guard's decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub route: Route,
    pub outcome: GuardOutcome,
}

/// Route table bound to the live session
pub struct Router {
    session: Arc<SessionStore>,
}

impl Router {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn resolve(&self, path: &str) -> Resolution {
        let route = Route::parse(path);
        let outcome = Self::check(&route, &self.session.snapshot(), path);
        tracing::debug!(path = %path, route = %route, outcome = ?outcome, "Resolved route");
        Resolution { route, outcome }
    }

    /// Apply a route's access rule to a session state
    pub fn check(route: &Route, state: &SessionState, requested: &str) -> GuardOutcome {
        match route.access() {
            Access::Public => GuardOutcome::Allow,
            Access::Authenticated => guard(state, &[], requested),
            Access::Roles(roles) => guard(state, roles, requested),
        }
    }
}
