//! Route table, locations, and path matching.
//!
//! DESIGN
//! ======
//! Routes are a closed enum rather than string names so the guard's decision
//! table can be matched exhaustively. Matching is segment-wise; `:param`
//! segments capture exactly one non-empty segment.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::BTreeMap;
use std::fmt;

use url::{Url, form_urlencoded};

/// Query key carrying the return path on login redirects.
pub const REDIRECT_QUERY: &str = "redirect";

/// Placeholder origin app-relative paths are resolved against.
const APP_ORIGIN: &str = "http://app.invalid/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteName {
    Home,
    Login,
    Register,
    Dashboard,
    Profile,
    LinkStats,
    NotFound,
}

/// Matchable routes in priority order. `NotFound` is the catch-all.
pub const ROUTES: [RouteName; 6] = [
    RouteName::Home,
    RouteName::Login,
    RouteName::Register,
    RouteName::Dashboard,
    RouteName::Profile,
    RouteName::LinkStats,
];

impl RouteName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::Dashboard => "dashboard",
            Self::Profile => "profile",
            Self::LinkStats => "link-stats",
            Self::NotFound => "not-found",
        }
    }

    /// Path pattern; `None` for the catch-all.
    pub fn pattern(self) -> Option<&'static str> {
        match self {
            Self::Home => Some("/"),
            Self::Login => Some("/login"),
            Self::Register => Some("/register"),
            Self::Dashboard => Some("/dashboard"),
            Self::Profile => Some("/profile"),
            Self::LinkStats => Some("/links/:id/stats"),
            Self::NotFound => None,
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard | Self::Profile | Self::LinkStats)
    }

    /// Login and register: pointless to show to an authenticated user.
    pub fn is_auth_route(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path plus ordered query parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location {
    /// A location with no query. An empty path becomes `/`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.is_empty() { "/".to_owned() } else { path };
        Self { path, query: Vec::new() }
    }

    /// Parse `path?query#fragment`. The fragment is dropped. Input that
    /// would leave the app's origin becomes `/`.
    pub fn parse(full_path: &str) -> Self {
        Self::parse_local(full_path).unwrap_or_default()
    }

    /// Parse an app-relative location, or `None` when the input resolves to
    /// another origin (`//host`, `/\host`, `https://...`) or is not a URL.
    pub fn parse_local(full_path: &str) -> Option<Self> {
        let Ok(base) = Url::parse(APP_ORIGIN) else {
            return None;
        };
        let Ok(url) = base.join(full_path) else {
            return None;
        };
        if url.origin() != base.origin() {
            return None;
        }
        let query = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        Some(Self { query, ..Self::new(url.path()) })
    }

    /// Location of a route without parameters. `None` for parameterized routes
    /// and the catch-all.
    pub fn named(name: RouteName) -> Option<Self> {
        name.pattern().filter(|p| !p.contains(':')).map(Self::new)
    }

    /// `/login?redirect=<return_to>`.
    pub fn login_redirect(return_to: &str) -> Self {
        Self::new("/login").with_query(REDIRECT_QUERY, return_to)
    }

    /// Append a query parameter, replacing an existing one with the same key.
    #[must_use]
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// `path?k=v&...`. Values are percent-encoded except `/`, which stays
    /// readable the way browser routers render return paths.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.path)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<RouteName> for Location {
    fn from(value: RouteName) -> Self {
        Self::named(value).unwrap_or_default()
    }
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect::<String>().replace("%2F", "/")
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), |cow| cow.into_owned())
}

/// A location resolved against the route table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationTarget {
    pub name: RouteName,
    pub location: Location,
    pub params: BTreeMap<String, String>,
}

impl NavigationTarget {
    pub fn path(&self) -> &str {
        self.location.path()
    }

    pub fn full_path(&self) -> String {
        self.location.full_path()
    }

    pub fn requires_auth(&self) -> bool {
        self.name.requires_auth()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Resolve a location to the first matching route, or `NotFound`.
pub fn resolve(location: Location) -> NavigationTarget {
    for name in ROUTES {
        let Some(pattern) = name.pattern() else {
            continue;
        };
        if let Some(params) = match_pattern(pattern, location.path()) {
            return NavigationTarget { name, location, params };
        }
    }
    NavigationTarget { name: RouteName::NotFound, location, params: BTreeMap::new() }
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let expected: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if expected.len() != actual.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(&actual) {
        if let Some(param) = want.strip_prefix(':') {
            params.insert(param.to_owned(), decode(got));
        } else if want != got {
            return None;
        }
    }
    Some(params)
}
