//! Link CRUD and statistics state.
//!
//! Same operation contract as the session store: `loading` brackets each call,
//! failures land in `last_error`, and a failed call never discards data that
//! was already loaded.

#[cfg(test)]
#[path = "links_test.rs"]
mod links_test;

use std::rc::Rc;

use tokio::sync::watch;

use super::{LoadingGuard, Subscription, Tracked};
use crate::net::api;
use crate::net::transport::Transport;
use crate::net::types::{Link, LinkPatch, LinkStats, NewLink, ResourceId, UserStats};

const FETCH_LINKS_FAILED: &str = "Failed to fetch links";
const FETCH_LINK_FAILED: &str = "Failed to fetch link details";
const CREATE_LINK_FAILED: &str = "Failed to create link";
const UPDATE_LINK_FAILED: &str = "Failed to update link";
const DELETE_LINK_FAILED: &str = "Failed to delete link";
const FETCH_LINK_STATS_FAILED: &str = "Failed to fetch link statistics";
const FETCH_USER_STATS_FAILED: &str = "Failed to fetch user statistics";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_links: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: api::DEFAULT_PAGE, limit: api::DEFAULT_PAGE_SIZE, total_pages: 0, total_links: 0 }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinksState {
    pub links: Vec<Link>,
    pub current_link: Option<Link>,
    pub link_stats: Option<LinkStats>,
    pub user_stats: Option<UserStats>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub pagination: Pagination,
}

impl Tracked for LinksState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

pub struct LinkStore {
    transport: Rc<Transport>,
    state: watch::Sender<LinksState>,
}

impl LinkStore {
    pub fn new(transport: Rc<Transport>) -> Self {
        Self { transport, state: watch::Sender::new(LinksState::default()) }
    }

    pub fn state(&self) -> LinksState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription<LinksState> {
        Subscription::new(self.state.subscribe())
    }

    pub fn links(&self) -> Vec<Link> {
        self.state.borrow().links.clone()
    }

    pub fn current_link(&self) -> Option<Link> {
        self.state.borrow().current_link.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// `GET /links?page&limit`.
    pub async fn fetch_links(&self, page: u32, limit: u32) {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.get_with_query::<Vec<Link>>(api::LINKS, &api::page_query(page, limit)).await {
            Ok(links) => self.state.send_modify(|s| {
                s.links = links;
                s.pagination.page = page;
                s.pagination.limit = limit;
            }),
            Err(err) => op.fail(err.user_message(FETCH_LINKS_FAILED)),
        }
    }

    /// `GET /links/:id`.
    pub async fn fetch_link(&self, id: &ResourceId) -> Option<Link> {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.get::<Link>(&api::link_endpoint(id)).await {
            Ok(link) => {
                self.state.send_modify(|s| s.current_link = Some(link.clone()));
                Some(link)
            }
            Err(err) => {
                op.fail(err.user_message(FETCH_LINK_FAILED));
                None
            }
        }
    }

    /// `POST /links`. The new link is prepended to the loaded list.
    pub async fn create_link(&self, new_link: &NewLink) -> Option<Link> {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.post::<_, Link>(api::LINKS, new_link).await {
            Ok(link) => {
                self.state.send_modify(|s| s.links.insert(0, link.clone()));
                Some(link)
            }
            Err(err) => {
                op.fail(err.user_message(CREATE_LINK_FAILED));
                None
            }
        }
    }

    /// `PUT /links/:id`. Replaces the loaded copies of the link.
    pub async fn update_link(&self, id: &ResourceId, patch: &LinkPatch) -> Option<Link> {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.put::<_, Link>(&api::link_endpoint(id), patch).await {
            Ok(link) => {
                self.state.send_modify(|s| {
                    if let Some(slot) = s.links.iter_mut().find(|l| l.id.refers_to(id)) {
                        *slot = link.clone();
                    }
                    if s.current_link.as_ref().is_some_and(|l| l.id.refers_to(id)) {
                        s.current_link = Some(link.clone());
                    }
                });
                Some(link)
            }
            Err(err) => {
                op.fail(err.user_message(UPDATE_LINK_FAILED));
                None
            }
        }
    }

    /// `DELETE /links/:id`.
    pub async fn delete_link(&self, id: &ResourceId) -> bool {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.delete(&api::link_endpoint(id)).await {
            Ok(()) => {
                self.state.send_modify(|s| {
                    s.links.retain(|l| !l.id.refers_to(id));
                    if s.current_link.as_ref().is_some_and(|l| l.id.refers_to(id)) {
                        s.current_link = None;
                    }
                });
                true
            }
            Err(err) => {
                op.fail(err.user_message(DELETE_LINK_FAILED));
                false
            }
        }
    }

    /// `GET /links/:id/stats`, optionally bounded by `from` / `to` dates.
    pub async fn fetch_link_stats(&self, id: &ResourceId, from: Option<&str>, to: Option<&str>) -> Option<LinkStats> {
        let op = LoadingGuard::begin(&self.state);
        let query = api::stats_range_query(from, to);
        match self.transport.get_with_query::<LinkStats>(&api::link_stats_endpoint(id), &query).await {
            Ok(stats) => {
                self.state.send_modify(|s| s.link_stats = Some(stats.clone()));
                Some(stats)
            }
            Err(err) => {
                op.fail(err.user_message(FETCH_LINK_STATS_FAILED));
                None
            }
        }
    }

    /// `GET /users/me/stats`.
    pub async fn fetch_user_stats(&self) -> Option<UserStats> {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.get::<UserStats>(api::CURRENT_USER_STATS).await {
            Ok(stats) => {
                self.state.send_modify(|s| s.user_stats = Some(stats.clone()));
                Some(stats)
            }
            Err(err) => {
                op.fail(err.user_message(FETCH_USER_STATS_FAILED));
                None
            }
        }
    }
}
