//! Hash-history view routes.
//!
//! Every window loads the same webview bundle and picks its page from the URL
//! fragment (`index.html#/search`).  The table is static; matching is exact
//! path equality with no parameters and no guards.

use serde::Serialize;

/// A page the webview can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Home,
    Search,
    Settings,
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

/// The application's route table.
pub const ROUTES: [Route; 3] = [
    Route {
        path: "/",
        name: "home",
        view: View::Home,
    },
    Route {
        path: "/search",
        name: "search",
        view: View::Search,
    },
    Route {
        path: "/settings",
        name: "settings",
        view: View::Settings,
    },
];

impl View {
    /// Path that routes to this view.
    pub fn path(self) -> &'static str {
        ROUTES
            .iter()
            .find(|route| route.view == self)
            .map_or("/", |route| route.path)
    }
}

/// Resolves an exact route path such as `/search`.
pub fn resolve(path: &str) -> Option<View> {
    ROUTES
        .iter()
        .find(|route| route.path == path)
        .map(|route| route.view)
}

/// Resolves the view addressed by a hash-history URL.
///
/// Accepts a full URL (`tauri://localhost/index.html#/search`), a bare
/// fragment (`#/search`), or a path (`/search`).  A URL with an empty or
/// missing fragment addresses `/`.
pub fn resolve_location(location: &str) -> Option<View> {
    let path = match location.split_once('#') {
        Some((_, fragment)) => fragment,
        None if location.starts_with('/') => location,
        None => "",
    };
    // Query strings are not part of the route path.
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() {
        resolve("/")
    } else {
        resolve(path)
    }
}
