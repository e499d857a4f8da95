//! Backend endpoint paths and client-side routes.

use serde::{Deserialize, Serialize};

/// Paths of the auth endpoints the session layer treats specially.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Endpoints {
    /// Password login
    pub login: String,
    /// Google identity login
    pub google_login: String,
    /// Server-side logout (invalidates the refresh cookie)
    pub logout: String,
    /// Cookie-authenticated token refresh
    pub refresh: String,
    /// Current user's profile
    pub profile: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            login: "/auth/login".to_string(),
            google_login: "/auth/google".to_string(),
            logout: "/auth/logout".to_string(),
            refresh: "/auth/refresh".to_string(),
            profile: "/users/profile".to_string(),
        }
    }
}

/// Client-side routes the session layer navigates to.
pub mod routes {
    /// Home page
    pub const HOME: &str = "/";
    /// Login view
    pub const LOGIN: &str = "/login";
    /// Landing view after a successful OAuth redirect
    pub const OAUTH_SUCCESS: &str = "/oauth/success";
    /// Prefix of the owner console
    pub const OWNER_PREFIX: &str = "/owner";

    /// Returns true if `path` is the OAuth-success callback view.
    #[must_use]
    pub fn is_oauth_callback(path: &str) -> bool {
        path.trim_end_matches('/') == OAUTH_SUCCESS
    }

    /// Returns true if `path` belongs to the owner console.
    #[must_use]
    pub fn is_owner_console(path: &str) -> bool {
        path == OWNER_PREFIX || path.starts_with("/owner/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.login, "/auth/login");
        assert_eq!(endpoints.refresh, "/auth/refresh");
        assert_eq!(endpoints.profile, "/users/profile");
    }

    #[test]
    fn test_route_predicates() {
        assert!(routes::is_oauth_callback("/oauth/success"));
        assert!(routes::is_oauth_callback("/oauth/success/"));
        assert!(!routes::is_oauth_callback("/"));

        assert!(routes::is_owner_console("/owner"));
        assert!(routes::is_owner_console("/owner/hotels"));
        assert!(!routes::is_owner_console("/ownership"));
    }
}
