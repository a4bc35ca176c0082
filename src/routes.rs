//! Client-side route table

use std::fmt;
use std::str::FromStr;

/// Dashboard views addressable by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Dashboard,
    Devices,
    Insights,
    History,
    Upload,
    SignIn,
    SignUp,
    Settings,
    App,
    /// Any unrecognized path
    NotFound(String),
}

impl Route {
    pub const KNOWN: [Route; 10] = [
        Route::Landing,
        Route::Dashboard,
        Route::Devices,
        Route::Insights,
        Route::History,
        Route::Upload,
        Route::SignIn,
        Route::SignUp,
        Route::Settings,
        Route::App,
    ];

    pub fn path(&self) -> &str {
        match self {
            Route::Landing => "/",
            Route::Dashboard => "/dashboard",
            Route::Devices => "/devices",
            Route::Insights => "/insights",
            Route::History => "/history",
            Route::Upload => "/upload",
            Route::SignIn => "/signin",
            Route::SignUp => "/signup",
            Route::Settings => "/settings",
            Route::App => "/app",
            Route::NotFound(path) => path.as_str(),
        }
    }

    /// Resolve a path. Trailing slashes, query strings and fragments are ignored.
    pub fn resolve(path: &str) -> Route {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Self::KNOWN
            .into_iter()
            .find(|route| route.path() == normalized)
            .unwrap_or_else(|| Route::NotFound(path.to_string()))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Route::NotFound(_))
    }
}

impl FromStr for Route {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Route::resolve(s))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_paths_round_trip() {
        for route in Route::KNOWN {
            assert_eq!(Route::resolve(route.path()), route);
        }
    }

    #[test]
    fn test_normalization() {
        assert_eq!(Route::resolve("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::resolve("/insights?tab=alerts"), Route::Insights);
        assert_eq!(Route::resolve(""), Route::Landing);
        assert_eq!(Route::resolve("/upload#history"), Route::Upload);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let route: Route = "/reports/42".parse().unwrap();
        assert!(route.is_not_found());
        assert_eq!(route.path(), "/reports/42");
    }
}
