//! Application Root
//!
//! [`BulkApp`] is constructed once per application instance and passed by
//! reference. It owns the session store, the navigator, the request
//! pipeline and every feature service, and runs the flows that span more
//! than one of them (login and its redirect back, OAuth completion,
//! guarded navigation, like toggles).

use std::sync::Arc;

use crate::config::Config;
use crate::dto::{Comment, Community, CommunityQuery, Notification, Post, Registration};
use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use crate::interaction::{
    LikeTracker, LoadOutcome, PagedLoader, SearchController, ToggleOutcome, ViewScope,
};
use crate::navigation::Navigator;
use crate::preferences::ThemePreference;
use crate::router::{GuardOutcome, Resolution, Route, Router};
use crate::services::{
    AuthService, CommentService, CommunityService, NotificationService, PostService,
    ProfileService, SearchService, SubscriptionService,
};
use crate::session::{Session, SessionStore};
use crate::storage::{FileStore, KeyValueStore};

pub struct BulkApp {
    config: Config,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    http: Arc<HttpClient>,
    router: Router,
    theme: ThemePreference,
    likes: LikeTracker,
    auth: AuthService,
    profile: ProfileService,
    communities: CommunityService,
    posts: PostService,
    comments: CommentService,
    notifications: NotificationService,
    subscriptions: SubscriptionService,
    search: Arc<SearchService>,
}

impl BulkApp {
    /// Wire the application over `storage`, hydrating the session from it
    pub fn new(config: Config, storage: Arc<dyn KeyValueStore>) -> ClientResult<Self> {
        let session = Arc::new(SessionStore::open(storage.clone()));
        let navigator = Arc::new(Navigator::default());
        let http = Arc::new(HttpClient::new(&config.api, session.clone(), navigator.clone())?);

        tracing::info!(
            api = %http.base_url(),
            authenticated = session.is_authenticated(),
            "Client initialized"
        );

        Ok(Self {
            router: Router::new(session.clone()),
            theme: ThemePreference::new(storage),
            likes: LikeTracker::new(),
            auth: AuthService::new(http.clone()),
            profile: ProfileService::new(http.clone()),
            communities: CommunityService::new(http.clone()),
            posts: PostService::new(http.clone()),
            comments: CommentService::new(http.clone()),
            notifications: NotificationService::new(http.clone()),
            subscriptions: SubscriptionService::new(http.clone()),
            search: Arc::new(SearchService::new(http.clone())),
            config,
            session,
            navigator,
            http,
        })
    }

    /// Wire the application over the state file in the data directory
    pub fn open(config: Config) -> ClientResult<Self> {
        let storage = FileStore::open(config.storage.state_file())?;
        Self::new(config, Arc::new(storage))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    pub fn likes(&self) -> &LikeTracker {
        &self.likes
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    pub fn communities(&self) -> &CommunityService {
        &self.communities
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn comments(&self) -> &CommentService {
        &self.comments
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.subscriptions
    }

    pub fn search(&self) -> &SearchService {
        &self.search
    }

    // ============================================
    // SESSION FLOWS
    // ============================================

    /// Log in and continue to the page that required it (or the feed)
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let session = self.session.login(&self.auth, email, password).await?;
        self.continue_after_login();
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<Session> {
        let session = self.session.register(&self.auth, registration).await?;
        self.continue_after_login();
        Ok(session)
    }

    /// Finish an OAuth round trip with the token the provider handed back
    pub async fn complete_oauth(&self, token: &str) -> ClientResult<Session> {
        let user = self.auth.fetch_me_with_token(token).await?;
        let session = self.session.establish(token, user)?;
        tracing::info!(user_id = %session.user_id(), "Logged in via OAuth");
        self.continue_after_login();
        Ok(session)
    }

    pub fn logout(&self) {
        self.session.logout();
        self.likes.clear();
        self.navigator.navigate(Route::Home.path());
    }

    fn continue_after_login(&self) {
        let destination = self
            .navigator
            .current()
            .state
            .from
            .unwrap_or_else(|| Route::Feed.path());
        self.navigator.navigate(destination);
    }

    // ============================================
    // NAVIGATION
    // ============================================

    /// Navigate to `path`, honoring the route's guard
    ///
    /// An anonymous visit to a protected page lands on login instead,
    /// remembering `path` for after login.
    pub fn visit(&self, path: &str) -> Resolution {
        let resolution = self.router.resolve(path);
        match &resolution.outcome {
            GuardOutcome::RedirectToLogin { from } => {
                self.navigator.redirect_to_login(Some(from.clone()), None);
            }
            _ => self.navigator.navigate(path),
        }
        resolution
    }

    /// Cancellation scope for a view about to be shown
    ///
    /// Requests issued through the `*_in` methods, or wrapped in
    /// [`ViewScope::run`], are dropped once the scope is left.
    pub fn enter_view(&self, name: impl Into<String>) -> ViewScope {
        ViewScope::new(name)
    }

    // ============================================
    // LISTS & INTERACTIONS
    // ============================================

    pub fn search_controller(&self) -> SearchController {
        SearchController::new(self.search.clone(), self.config.search.debounce())
    }

    pub fn feed_loader(&self) -> PagedLoader<Post, ()> {
        PagedLoader::new(())
    }

    pub fn community_loader(&self, query: CommunityQuery) -> PagedLoader<Community, CommunityQuery> {
        PagedLoader::new(query)
    }

    pub fn community_posts_loader(&self, community_id: &str) -> PagedLoader<Post, String> {
        PagedLoader::new(community_id.to_string())
    }

    pub fn comments_loader(&self, post_id: &str) -> PagedLoader<Comment, String> {
        PagedLoader::new(post_id.to_string())
    }

    pub fn notifications_loader(&self) -> PagedLoader<Notification, ()> {
        PagedLoader::new(())
    }

    /// Load the next page of the feed and track its posts' like state
    pub async fn load_feed(&self, loader: &mut PagedLoader<Post, ()>) -> ClientResult<LoadOutcome> {
        let outcome = loader.load_more(&self.profile).await?;
        self.likes.track_all(loader.items());
        Ok(outcome)
    }

    /// [`BulkApp::load_feed`] bound to the feed view's scope
    pub async fn load_feed_in(
        &self,
        scope: &ViewScope,
        loader: &mut PagedLoader<Post, ()>,
    ) -> ClientResult<LoadOutcome> {
        let result = scope.run(self.load_feed(loader)).await;
        if matches!(result, Err(ClientError::Cancelled)) {
            loader.abandon();
        }
        result
    }

    /// Leave the feed view: cancel its requests and stop tracking its posts
    pub fn leave_feed(&self, scope: &ViewScope, loader: &mut PagedLoader<Post, ()>) {
        scope.leave();
        loader.abandon();
        for post in loader.items() {
            self.likes.forget(&post.id);
        }
    }

    /// Fetch a post for display and start tracking its like state
    pub async fn open_post(&self, post_id: &str) -> ClientResult<Post> {
        let post = self.posts.get(post_id).await?;
        self.likes.track(&post);
        Ok(post)
    }

    pub async fn toggle_like(&self, post_id: &str) -> ClientResult<ToggleOutcome> {
        self.likes.toggle(post_id, &self.posts).await
    }
}
