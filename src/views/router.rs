//! Client-side routes.

use serde::Serialize;

/// A navigable location in the app.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Route {
    /// `/` market listing.
    Home,
    /// `/create` market creation.
    Create,
    /// `/market/:id` market detail.
    Market(String),
    /// `/profile`, session required.
    Profile,
    /// `/auth` sign-in / sign-up.
    Auth,
    /// Anything else.
    Unknown(String),
}

impl Route {
    /// Parse a path. Query strings, fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] | [""] => Route::Home,
            ["create"] => Route::Create,
            ["profile"] => Route::Profile,
            ["auth"] => Route::Auth,
            ["market", id] if !id.is_empty() => Route::Market((*id).to_string()),
            _ => Route::Unknown(path.to_string()),
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Create => "/create".to_string(),
            Route::Market(id) => format!("/market/{id}"),
            Route::Profile => "/profile".to_string(),
            Route::Auth => "/auth".to_string(),
            Route::Unknown(path) => path.clone(),
        }
    }

    /// Stable name for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Create => "create",
            Route::Market(_) => "market",
            Route::Profile => "profile",
            Route::Auth => "auth",
            Route::Unknown(_) => "unknown",
        }
    }

    /// Whether visiting this route without a session redirects to `/auth`.
    pub fn requires_session(&self) -> bool {
        matches!(self, Route::Profile)
    }
}
