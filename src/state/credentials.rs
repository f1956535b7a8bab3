//! Persistent credential store: the bearer token and cached profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! The only owner of the token. The transport reads it on every request from
//! the in-memory copy kept here; the session store writes it on login and the
//! transport clears it on 401.
//!
//! ERROR HANDLING
//! ==============
//! A cached profile that no longer parses is removed and reported as absent.
//! Write failures are returned from `save` after rolling back, so durable
//! storage never holds a token without its profile.

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::net::types::{Credential, UserProfile};
use crate::util::storage::{self, KeyValueStorage, StorageError};

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

pub struct CredentialStore {
    storage: Rc<dyn KeyValueStorage>,
    token: RefCell<Option<Credential>>,
}

impl CredentialStore {
    /// Open the store, priming the in-memory token from durable storage.
    pub fn open(storage: Rc<dyn KeyValueStorage>) -> Self {
        let token = read_token(storage.as_ref());
        Self { storage, token: RefCell::new(token) }
    }

    /// Current token from the in-memory copy. Never touches durable storage.
    pub fn credential(&self) -> Option<Credential> {
        self.token.borrow().clone()
    }

    pub fn has_credential(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Persist token and profile together.
    ///
    /// The in-memory token is updated even when durable storage fails, so the
    /// running session keeps working; only restart-survival is lost.
    ///
    /// # Errors
    ///
    /// Returns the storage error after removing any half-written entry.
    pub fn save(&self, credential: &Credential, profile: &UserProfile) -> Result<(), StorageError> {
        *self.token.borrow_mut() = Some(credential.clone());

        let raw_profile = serde_json::to_string(profile)
            .map_err(|e| StorageError::Serialize { key: USER_KEY.to_owned(), reason: e.to_string() })?;
        self.storage.set_item(TOKEN_KEY, credential.as_str())?;
        if let Err(err) = self.storage.set_item(USER_KEY, &raw_profile) {
            if let Err(rollback) = self.storage.remove_item(TOKEN_KEY) {
                log::warn!("credentials: rollback of {TOKEN_KEY} failed: {rollback}");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Refresh only the cached profile (after a profile fetch or update).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        storage::save_json(self.storage.as_ref(), USER_KEY, profile)
    }

    /// Read token and profile from durable storage.
    ///
    /// A corrupted profile entry is removed and returned as `None`.
    pub fn load(&self) -> (Option<Credential>, Option<UserProfile>) {
        let token = read_token(self.storage.as_ref());
        self.token.replace(token.clone());

        let profile = match storage::load_json::<UserProfile>(self.storage.as_ref(), USER_KEY) {
            Ok(profile) => profile,
            Err(StorageError::Corrupted { reason, .. }) => {
                log::warn!("credentials: discarding unparseable cached profile: {reason}");
                if let Err(err) = self.storage.remove_item(USER_KEY) {
                    log::warn!("credentials: could not remove {USER_KEY}: {err}");
                }
                None
            }
            Err(err) => {
                log::warn!("credentials: profile read failed: {err}");
                None
            }
        };
        (token, profile)
    }

    /// Drop token and profile from memory and durable storage.
    pub fn clear(&self) {
        self.token.replace(None);
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove_item(key) {
                log::warn!("credentials: could not remove {key}: {err}");
            }
        }
    }
}

fn read_token(storage: &dyn KeyValueStorage) -> Option<Credential> {
    match storage.get_item(TOKEN_KEY) {
        Ok(token) => token.filter(|t| !t.is_empty()).map(Credential::new),
        Err(err) => {
            log::warn!("credentials: token read failed: {err}");
            None
        }
    }
}
