//! Authenticated transport: the single outbound HTTP path.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every store request goes through [`Transport`], which runs two stages:
//! - outbound: attach `Authorization: Bearer <token>` when a token exists;
//!   requests without a token proceed unauthenticated.
//! - inbound: on 401, clear the credential store, run the registered
//!   session-teardown hooks, and navigate to login with the current path as
//!   the return target. The error is still returned to the caller.
//!
//! DESIGN
//! ======
//! The transport is built before the router, so navigation is attached in a
//! second phase with [`Transport::attach_navigator`]. The navigator is held
//! weakly because the router (through the session) owns the transport.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::error::ApiError;
use crate::config::ClientConfig;
use crate::router::routes::{Location, RouteName, resolve};
use crate::state::credentials::CredentialStore;

/// Navigation capability the transport needs for 401 recovery.
pub trait Navigator {
    /// Full path (path + query) of the location currently shown.
    fn current_full_path(&self) -> String;

    /// Navigate through the normal guard pipeline.
    fn navigate(&self, location: Location);
}

/// Errors from two-phase initialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachError {
    #[error("navigator already attached")]
    AlreadyAttached,
}

type Hook = Box<dyn Fn()>;

pub struct Transport {
    http: reqwest::Client,
    /// API base with a trailing slash, so endpoint paths join beneath it.
    base: Url,
    credentials: Rc<CredentialStore>,
    navigator: OnceCell<Weak<dyn Navigator>>,
    unauthorized_hooks: RefCell<Vec<Hook>>,
}

impl Transport {
    /// Build the transport without navigation capability.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the HTTP client cannot be built
    /// or the configured base is not an absolute URL.
    pub fn new(config: &ClientConfig, credentials: Rc<CredentialStore>) -> Result<Self, ApiError> {
        #[cfg_attr(target_arch = "wasm32", allow(unused_mut))]
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            builder = builder.timeout(config.request_timeout);
        }
        let http = builder.build().map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            http,
            base: parse_base(&config.api_base_url)?,
            credentials,
            navigator: OnceCell::new(),
            unauthorized_hooks: RefCell::new(Vec::new()),
        })
    }

    /// Second initialization phase: give the transport a navigation handle.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::AlreadyAttached`] on a second call; the first
    /// navigator stays in place.
    pub fn attach_navigator<N>(&self, navigator: &Rc<N>) -> Result<(), AttachError>
    where
        N: Navigator + 'static,
    {
        let weak: Weak<N> = Rc::downgrade(navigator);
        let weak: Weak<dyn Navigator> = weak;
        self.navigator.set(weak).map_err(|_| AttachError::AlreadyAttached)
    }

    pub fn has_navigator(&self) -> bool {
        self.navigator.get().is_some()
    }

    /// Register a hook run after the credential store is cleared on 401.
    pub fn on_unauthorized(&self, hook: impl Fn() + 'static) {
        self.unauthorized_hooks.borrow_mut().push(Box::new(hook));
    }

    /// Base URL without the trailing slash.
    pub fn base_url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)?.query(query)).await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path)?.json(body)).await?;
        decode(response).await
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path)?.json(body)).await?;
        decode(response).await
    }

    /// `PUT` whose success response carries no body (204).
    ///
    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn put_no_content<B>(&self, path: &str, body: &B) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::PUT, path)?.json(body)).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ApiError`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidRequest(format!("{path}: {e}")))?;
        Ok(self.authorize(self.http.request(method, url)))
    }

    /// Outbound stage.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.credential() {
            Some(token) => request.header(AUTHORIZATION, token.bearer()),
            None => request,
        }
    }

    /// Send and run the inbound stage.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let request = request.build().map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let method = request.method().clone();
        let url = request.url().clone();
        log::debug!("transport: {method} {url}");

        let response = self.http.execute(request).await.map_err(|e| ApiError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        log::debug!("transport: {method} {url} -> {status}");
        if err.is_unauthorized() {
            self.handle_unauthorized();
        }
        Err(err)
    }

    fn handle_unauthorized(&self) {
        log::warn!("transport: 401 received, ending session");
        self.credentials.clear();
        for hook in self.unauthorized_hooks.borrow().iter() {
            hook();
        }

        let Some(navigator) = self.navigator.get().and_then(Weak::upgrade) else {
            log::warn!("transport: no navigator attached, skipping login redirect");
            return;
        };
        let return_to = navigator.current_full_path();
        if resolve(Location::parse(&return_to)).name == RouteName::Login {
            return;
        }
        navigator.navigate(Location::login_redirect(&return_to));
    }
}

fn parse_base(raw: &str) -> Result<Url, ApiError> {
    let mut base = Url::parse(raw).map_err(|e| ApiError::InvalidRequest(format!("api base url {raw}: {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
