//! Client-side router: route table, auth guard, and navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation passes the guard in [`guard`] against the session's
//! authentication state. The router is also the transport's [`Navigator`],
//! so a 401 on any request lands here as a navigation to login.
//!
//! DESIGN
//! ======
//! Navigation is synchronous: the guard reads in-memory session state only.
//! View prefetch is the one async step and is spawned, never awaited; a
//! failed prefetch is logged and does not affect the committed route.
//!
//! Back/forward traversal goes through the same guard. The backend has
//! already moved, so an allowed traversal writes nothing and a redirected one
//! replaces the entry it landed on.
//!
//! TRADE-OFFS
//! ==========
//! Redirect chains are bounded. The route table cannot produce a loop today,
//! but a cap keeps a bad table from spinning the guard.


pub mod guard;
pub mod history;
pub mod routes;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tokio::sync::watch;

use self::guard::decide;
use self::history::HistoryBackend;
use self::routes::{Location, NavigationTarget, REDIRECT_QUERY, RouteName, resolve};
use crate::net::transport::Navigator;
use crate::state::Subscription;
use crate::state::auth::Session;

/// Redirects followed before a navigation is abandoned.
pub const MAX_REDIRECTS: usize = 8;

#[cfg(feature = "hydrate")]
pub type LoadFuture = futures::future::LocalBoxFuture<'static, Result<(), ViewLoadError>>;
#[cfg(not(feature = "hydrate"))]
pub type LoadFuture = futures::future::BoxFuture<'static, Result<(), ViewLoadError>>;

/// Produces the prefetch future for one route's view.
pub type ViewLoader = Rc<dyn Fn() -> LoadFuture>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("view load failed: {0}")]
pub struct ViewLoadError(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The requested location was committed.
    Completed,
    /// The guard sent the navigation elsewhere; `target` was committed.
    Redirected { requested: String, target: String },
    /// Final location equals the current one; nothing changed.
    Duplicated,
    /// Nothing was committed.
    Aborted { reason: String },
}

enum Commit {
    Push,
    Replace,
    /// Back/forward: the backend already moved; only a redirect rewrites it.
    Traverse,
}

pub struct Router {
    session: Rc<Session>,
    history: Rc<dyn HistoryBackend>,
    current: watch::Sender<Option<NavigationTarget>>,
    loaders: RefCell<HashMap<RouteName, ViewLoader>>,
}

impl Router {
    pub fn new(session: Rc<Session>, history: Rc<dyn HistoryBackend>) -> Self {
        Self {
            session,
            history,
            current: watch::Sender::new(None),
            loaders: RefCell::new(HashMap::new()),
        }
    }

    /// Register the prefetch loader for a route, replacing any previous one.
    pub fn register_loader(&self, route: RouteName, loader: impl Fn() -> LoadFuture + 'static) {
        self.loaders.borrow_mut().insert(route, Rc::new(loader));
    }

    /// Route back/forward traversal of the history backend through the guard.
    pub fn listen_for_traversal(router: &Rc<Self>) {
        let weak = Rc::downgrade(router);
        router.history.on_pop(Box::new(move |location| {
            if let Some(router) = weak.upgrade() {
                let outcome = router.traverse(location);
                log::debug!("router: history traversal {outcome:?}");
            }
        }));
    }

    /// Navigate to the history backend's initial location, replacing its entry.
    pub fn start(&self) -> NavigationOutcome {
        let initial = self.history.initial_location();
        self.navigate_with(initial, &Commit::Replace)
    }

    pub fn push(&self, location: impl Into<Location>) -> NavigationOutcome {
        self.navigate_with(location.into(), &Commit::Push)
    }

    pub fn replace(&self, location: impl Into<Location>) -> NavigationOutcome {
        self.navigate_with(location.into(), &Commit::Replace)
    }

    /// The backend moved to `location` on its own (back/forward).
    pub fn traverse(&self, location: Location) -> NavigationOutcome {
        self.navigate_with(location, &Commit::Traverse)
    }

    pub fn current(&self) -> Option<NavigationTarget> {
        self.current.borrow().clone()
    }

    pub fn current_route(&self) -> Option<RouteName> {
        self.current.borrow().as_ref().map(|t| t.name)
    }

    pub fn subscribe(&self) -> Subscription<Option<NavigationTarget>> {
        Subscription::new(self.current.subscribe())
    }

    /// Where to go after a successful login: the `redirect` query of the
    /// current location when it stays on this origin, else dashboard.
    pub fn post_login_destination(&self) -> Location {
        self.current
            .borrow()
            .as_ref()
            .and_then(|t| t.location.query(REDIRECT_QUERY))
            .and_then(Location::parse_local)
            .unwrap_or_else(|| Location::from(RouteName::Dashboard))
    }

    fn navigate_with(&self, requested: Location, commit: &Commit) -> NavigationOutcome {
        let requested_path = requested.full_path();
        let mut target = resolve(requested);
        let mut hops = 0;

        loop {
            let decision = decide(&target, self.session.is_authenticated());
            let Some(next) = decision.redirect_location() else {
                break;
            };
            hops += 1;
            if hops > MAX_REDIRECTS {
                log::warn!("router: too many redirects from {requested_path}");
                return NavigationOutcome::Aborted {
                    reason: format!("more than {MAX_REDIRECTS} redirects from {requested_path}"),
                };
            }
            log::debug!("router: {} -> {}", target.full_path(), next.full_path());
            target = resolve(next);
        }

        let target_path = target.full_path();
        let duplicated = self
            .current
            .borrow()
            .as_ref()
            .is_some_and(|current| current.full_path() == target_path);
        let redirected = hops > 0;
        if duplicated {
            if redirected && matches!(commit, Commit::Traverse) {
                self.history.replace(&target.location);
            }
            return NavigationOutcome::Duplicated;
        }

        match commit {
            Commit::Push => self.history.push(&target.location),
            Commit::Replace => self.history.replace(&target.location),
            Commit::Traverse if redirected => self.history.replace(&target.location),
            Commit::Traverse => {}
        }
        self.history.scroll_to_top();
        let route = target.name;
        self.current.send_replace(Some(target));
        self.prefetch(route);

        if redirected {
            NavigationOutcome::Redirected { requested: requested_path, target: target_path }
        } else {
            NavigationOutcome::Completed
        }
    }

    fn prefetch(&self, route: RouteName) {
        let Some(loader) = self.loaders.borrow().get(&route).cloned() else {
            return;
        };
        let load = loader();
        let task = async move {
            if let Err(err) = load.await {
                log::error!("router: prefetch for {route} failed: {err}");
            }
        };

        spawn_prefetch(route, task);
    }
}

#[cfg(feature = "hydrate")]
fn spawn_prefetch(_route: RouteName, task: impl Future<Output = ()> + 'static) {
    wasm_bindgen_futures::spawn_local(task);
}

#[cfg(not(feature = "hydrate"))]
fn spawn_prefetch(route: RouteName, task: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => log::debug!("router: no runtime, skipping prefetch for {route}"),
    }
}

impl Navigator for Router {
    fn current_full_path(&self) -> String {
        self.current
            .borrow()
            .as_ref()
            .map_or_else(|| self.history.initial_location().full_path(), NavigationTarget::full_path)
    }

    fn navigate(&self, location: Location) {
        let to_login = resolve(location.clone()).name == RouteName::Login;
        if to_login && self.current_route() == Some(RouteName::Login) {
            log::debug!("router: already on login, not redirecting");
            return;
        }
        let outcome = self.push(location);
        log::debug!("router: recovery navigation {outcome:?}");
    }
}
