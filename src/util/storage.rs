//! Durable key/value storage behind the credential and theme stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! Browser builds persist to `localStorage`. Headless builds and tests use
//! [`MemoryStorage`], which has the same string-in/string-out semantics. Stores
//! only see the [`KeyValueStorage`] trait, so no store touches web-sys.
//!
//! ERROR HANDLING
//! ==============
//! Backend failures are returned as [`StorageError`]; a stored value that fails
//! to parse is reported as [`StorageError::Corrupted`] so callers can discard it
//! instead of treating it as absent silently.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors produced by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No storage is reachable (no window, storage disabled by the browser).
    #[error("storage unavailable")]
    Unavailable,

    /// The backend rejected the operation (quota exceeded, security error).
    #[error("storage operation failed: {0}")]
    Backend(String),

    /// A stored value exists but does not parse as the expected type.
    #[error("stored value for {key} is corrupted: {reason}")]
    Corrupted { key: String, reason: String },

    /// A value could not be serialized for writing.
    #[error("value for {key} could not be serialized: {reason}")]
    Serialize { key: String, reason: String },
}

/// Synchronous string key/value storage.
pub trait KeyValueStorage {
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Load a JSON value stored under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Corrupted`] when the stored text is not valid JSON
/// for `T`, or the backend error when the read itself fails.
pub fn load_json<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Result<Option<T>, StorageError> {
    let Some(raw) = storage.get_item(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Corrupted { key: key.to_owned(), reason: e.to_string() })
}

/// Serialize `value` to JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn save_json<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, value: &T) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialize { key: key.to_owned(), reason: e.to_string() })?;
    storage.set_item(key, &raw)
}

/// In-memory storage. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Direct read without the `Result` wrapper.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// `window.localStorage`, looked up on every call so a storage that becomes
/// unavailable mid-session degrades to errors rather than stale handles.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn local() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable),
            Err(err) => Err(js_error(&err)),
        }
    }
}

#[cfg(feature = "hydrate")]
fn js_error(err: &wasm_bindgen::JsValue) -> StorageError {
    StorageError::Backend(format!("{err:?}"))
}

#[cfg(feature = "hydrate")]
impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::local()?.get_item(key).map_err(|e| js_error(&e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::local()?.set_item(key, value).map_err(|e| js_error(&e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::local()?.remove_item(key).map_err(|e| js_error(&e))
    }
}
