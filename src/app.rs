//! Application wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`App::new`] builds every shared component once, in dependency order:
//! credential store, transport, stores, router. The router is attached to
//! the transport afterwards so 401 recovery can navigate, and to the history
//! backend so back/forward passes the guard.
//!
//! Storage, history, and theme surface are injected. Under `hydrate`,
//! [`start`] supplies the browser implementations.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::rc::Rc;

use crate::config::{ClientConfig, ConfigError};
use crate::net::error::ApiError;
use crate::net::transport::{AttachError, Transport};
use crate::router::Router;
use crate::router::history::HistoryBackend;
use crate::state::auth::Session;
use crate::state::credentials::CredentialStore;
use crate::state::links::LinkStore;
use crate::state::theme::ThemeStore;
use crate::util::dark_mode::ThemeSurface;
use crate::util::storage::KeyValueStorage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("transport: {0}")]
    Transport(#[from] ApiError),
    #[error("router: {0}")]
    Attach(#[from] AttachError),
}

pub struct App {
    config: ClientConfig,
    credentials: Rc<CredentialStore>,
    transport: Rc<Transport>,
    session: Rc<Session>,
    links: Rc<LinkStore>,
    theme: Rc<ThemeStore>,
    router: Rc<Router>,
}

impl App {
    /// Wire up all components. Does not navigate; call `router().start()`.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built or the navigator is already
    /// attached.
    pub fn new(
        config: ClientConfig,
        storage: Rc<dyn KeyValueStorage>,
        history: Rc<dyn HistoryBackend>,
        surface: Rc<dyn ThemeSurface>,
    ) -> Result<Self, AppError> {
        let credentials = Rc::new(CredentialStore::open(Rc::clone(&storage)));
        let transport = Rc::new(Transport::new(&config, Rc::clone(&credentials))?);

        let session = Rc::new(Session::new(Rc::clone(&transport), Rc::clone(&credentials)));
        let links = Rc::new(LinkStore::new(Rc::clone(&transport)));
        let theme = Rc::new(ThemeStore::new(storage, surface));

        let router = Rc::new(Router::new(Rc::clone(&session), history));
        transport.attach_navigator(&router)?;
        Router::listen_for_traversal(&router);
        theme.init();

        log::info!(
            "app: ready (api={}, authenticated={})",
            transport.base_url(),
            session.is_authenticated()
        );

        Ok(Self { config, credentials, transport, session, links, theme, router })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Rc<CredentialStore> {
        &self.credentials
    }

    pub fn transport(&self) -> &Rc<Transport> {
        &self.transport
    }

    pub fn session(&self) -> &Rc<Session> {
        &self.session
    }

    pub fn links(&self) -> &Rc<LinkStore> {
        &self.links
    }

    pub fn theme(&self) -> &Rc<ThemeStore> {
        &self.theme
    }

    pub fn router(&self) -> &Rc<Router> {
        &self.router
    }
}

/// Browser entry point: logging, browser-backed components, initial route.
///
/// # Errors
///
/// See [`App::new`]; also fails on invalid configuration.
#[cfg(feature = "hydrate")]
pub fn start() -> Result<App, AppError> {
    use crate::router::history::BrowserHistory;
    use crate::util::dark_mode::BrowserThemeSurface;
    use crate::util::storage::BrowserStorage;

    crate::util::logging::init();

    let mut config = ClientConfig::from_env()?;
    if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
        config = config.resolve_against(&origin);
    }

    let app = App::new(config, Rc::new(BrowserStorage), Rc::new(BrowserHistory), Rc::new(BrowserThemeSurface))?;
    let outcome = app.router.start();
    log::debug!("app: initial navigation {outcome:?}");
    Ok(app)
}
