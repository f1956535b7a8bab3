//! Endpoints of the consumed REST API.
//!
//! Paths are relative to the configured base URL. Path builders
//! percent-encode identifiers so text ids can never escape their segment.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::types::ResourceId;

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const CURRENT_USER: &str = "/users/me";
pub const CURRENT_USER_PASSWORD: &str = "/users/me/password";
pub const CURRENT_USER_STATS: &str = "/users/me/stats";
pub const LINKS: &str = "/links";

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// `/links/:id`
pub fn link_endpoint(id: &ResourceId) -> String {
    format!("{LINKS}/{}", urlencoding::encode(&id.to_string()))
}

/// `/links/:id/stats`
pub fn link_stats_endpoint(id: &ResourceId) -> String {
    format!("{}/stats", link_endpoint(id))
}

/// Query for `GET /links`.
pub fn page_query(page: u32, limit: u32) -> Vec<(&'static str, String)> {
    vec![("page", page.to_string()), ("limit", limit.to_string())]
}

/// Query for `GET /links/:id/stats`; bounds are only sent when supplied.
pub fn stats_range_query(from: Option<&str>, to: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(from) = from.filter(|v| !v.is_empty()) {
        query.push(("from", from.to_owned()));
    }
    if let Some(to) = to.filter(|v| !v.is_empty()) {
        query.push(("to", to.to_owned()));
    }
    query
}
