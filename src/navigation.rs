//! Navigation State
//!
//! Tracks the current location of the client and the one-shot state that
//! travels with a navigation (the page a login redirect came from, and an
//! informational message to show there).

use tokio::sync::watch;

use crate::router::Route;

/// State attached to a single navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    /// Location the user originally asked for, restored after login
    pub from: Option<String>,
    /// Informational message for the destination view
    pub message: Option<String>,
}

/// Current location plus its navigation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub state: NavigationState,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: NavigationState::default(),
        }
    }
}

/// Client-side navigator
pub struct Navigator {
    location: watch::Sender<Location>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Home.path())
    }
}

impl Navigator {
    pub fn new(initial: impl Into<String>) -> Self {
        let (location, _) = watch::channel(Location::new(initial));
        Self { location }
    }

    pub fn navigate(&self, path: impl Into<String>) {
        self.navigate_with(path, NavigationState::default());
    }

    pub fn navigate_with(&self, path: impl Into<String>, state: NavigationState) {
        let path = path.into();
        tracing::debug!(path = %path, "Navigating");
        self.location.send_replace(Location { path, state });
    }

    /// Send the user to the login view, remembering where they were
    pub fn redirect_to_login(&self, from: Option<String>, message: Option<String>) {
        let from = from.filter(|f| f.as_str() != Route::Login.path());
        self.navigate_with(Route::Login.path(), NavigationState { from, message });
    }

    pub fn current(&self) -> Location {
        self.location.borrow().clone()
    }

    pub fn current_path(&self) -> String {
        self.location.borrow().path.clone()
    }

    /// Take the informational message, so it is shown only once
    pub fn take_message(&self) -> Option<String> {
        let mut taken = None;
        self.location.send_if_modified(|location| {
            taken = location.state.message.take();
            taken.is_some()
        });
        taken
    }

    pub fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}
