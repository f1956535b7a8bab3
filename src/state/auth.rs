//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by the route guard (`is_authenticated`) and by views that show or edit
//! the profile. Remote calls go through the transport; tokens are persisted
//! through the credential store.
//!
//! ERROR HANDLING
//! ==============
//! Operations never return `Err`. Failures become a message in `last_error`
//! (server text when present) plus a `false`/`None` result.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::rc::Rc;

use tokio::sync::watch;

use super::credentials::CredentialStore;
use super::{LoadingGuard, Subscription, Tracked};
use crate::net::api;
use crate::net::transport::Transport;
use crate::net::types::{AuthResponse, Credential, CredentialsRequest, PasswordChange, ProfilePatch, UserProfile};

const LOGIN_FAILED: &str = "An error occurred during login";
const REGISTER_FAILED: &str = "An error occurred during registration";
const FETCH_PROFILE_FAILED: &str = "Failed to fetch user profile";
const UPDATE_PROFILE_FAILED: &str = "Failed to update profile";
const CHANGE_PASSWORD_FAILED: &str = "Failed to change password";

/// Snapshot of the session.
///
/// `user` is only meaningful while `credential` is present; authentication is
/// defined by the credential alone, whether or not the profile has loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub credential: Option<Credential>,
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

impl Tracked for AuthState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }
}

pub struct Session {
    transport: Rc<Transport>,
    credentials: Rc<CredentialStore>,
    state: Rc<watch::Sender<AuthState>>,
}

impl Session {
    /// Restore any persisted session and subscribe to transport 401 teardown.
    pub fn new(transport: Rc<Transport>, credentials: Rc<CredentialStore>) -> Self {
        let (credential, user) = credentials.load();
        let restored = AuthState { user: credential.as_ref().and(user), credential, ..AuthState::default() };
        let state = Rc::new(watch::Sender::new(restored));

        let weak = Rc::downgrade(&state);
        transport.on_unauthorized(move || {
            if let Some(state) = weak.upgrade() {
                state.send_modify(|s| {
                    s.credential = None;
                    s.user = None;
                });
            }
        });

        Self { transport, credentials, state }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription<AuthState> {
        Subscription::new(self.state.subscribe())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state.borrow().user.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// `POST /auth/login`. Returns whether a session was established.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.authenticate(api::LOGIN, email, password, LOGIN_FAILED).await
    }

    /// `POST /auth/register`. Same contract as [`Session::login`].
    pub async fn register(&self, email: &str, password: &str) -> bool {
        self.authenticate(api::REGISTER, email, password, REGISTER_FAILED).await
    }

    async fn authenticate(&self, endpoint: &str, email: &str, password: &str, fallback: &str) -> bool {
        let op = LoadingGuard::begin(&self.state);
        let body = CredentialsRequest { email, password };
        match self.transport.post::<_, AuthResponse>(endpoint, &body).await {
            Ok(AuthResponse { token, user }) => {
                if let Err(err) = self.credentials.save(&token, &user) {
                    log::warn!("session: credentials not persisted: {err}");
                }
                self.state.send_modify(|s| {
                    s.credential = Some(token);
                    s.user = Some(user);
                });
                true
            }
            Err(err) => {
                op.fail(err.user_message(fallback));
                false
            }
        }
    }

    /// `GET /users/me`. Outcome is observable through `last_error`.
    pub async fn fetch_profile(&self) {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.get::<UserProfile>(api::CURRENT_USER).await {
            Ok(user) => self.store_profile(user),
            Err(err) => op.fail(err.user_message(FETCH_PROFILE_FAILED)),
        }
    }

    /// `PUT /users/me` with a partial update. Returns the updated profile.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Option<UserProfile> {
        let op = LoadingGuard::begin(&self.state);
        match self.transport.put::<_, UserProfile>(api::CURRENT_USER, patch).await {
            Ok(user) => {
                self.store_profile(user.clone());
                Some(user)
            }
            Err(err) => {
                op.fail(err.user_message(UPDATE_PROFILE_FAILED));
                None
            }
        }
    }

    /// `PUT /users/me/password`. The current token stays in use afterwards.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> bool {
        let op = LoadingGuard::begin(&self.state);
        let body = PasswordChange { old_password, new_password };
        match self.transport.put_no_content(api::CURRENT_USER_PASSWORD, &body).await {
            Ok(()) => true,
            Err(err) => {
                op.fail(err.user_message(CHANGE_PASSWORD_FAILED));
                false
            }
        }
    }

    /// Local-only logout: clears state and durable credentials. Idempotent.
    pub fn logout(&self) {
        self.state.send_replace(AuthState::default());
        self.credentials.clear();
    }

    fn store_profile(&self, user: UserProfile) {
        // A 401 may have ended the session while this request was in flight.
        if !self.credentials.has_credential() {
            log::debug!("session: dropping profile that arrived after logout");
            return;
        }
        if let Err(err) = self.credentials.save_profile(&user) {
            log::warn!("session: profile cache not updated: {err}");
        }
        self.state.send_modify(|s| s.user = Some(user));
    }
}
