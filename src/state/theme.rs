//! Dark/light theme preference.
//!
//! Persisted as `"dark"` / `"light"` under `theme`. The first `init` without a
//! stored value adopts the OS preference and persists it.

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;

use std::rc::Rc;

use tokio::sync::watch;

use super::Subscription;
use crate::util::dark_mode::ThemeSurface;
use crate::util::storage::KeyValueStorage;

pub const THEME_KEY: &str = "theme";

const DARK: &str = "dark";
const LIGHT: &str = "light";

pub struct ThemeStore {
    storage: Rc<dyn KeyValueStorage>,
    surface: Rc<dyn ThemeSurface>,
    is_dark: watch::Sender<bool>,
}

impl ThemeStore {
    pub fn new(storage: Rc<dyn KeyValueStorage>, surface: Rc<dyn ThemeSurface>) -> Self {
        let is_dark = stored_preference(storage.as_ref()) == Some(true);
        Self { storage, surface, is_dark: watch::Sender::new(is_dark) }
    }

    pub fn is_dark(&self) -> bool {
        *self.is_dark.borrow()
    }

    pub fn subscribe(&self) -> Subscription<bool> {
        Subscription::new(self.is_dark.subscribe())
    }

    /// Apply the stored preference, or resolve and persist the OS preference on
    /// first run.
    pub fn init(&self) {
        self.surface.apply(self.is_dark());
        if stored_preference(self.storage.as_ref()).is_none() {
            let dark = self.surface.prefers_dark();
            self.is_dark.send_replace(dark);
            self.persist(dark);
            self.surface.apply(dark);
        }
    }

    /// Flip, persist, and apply. Returns the new value.
    pub fn toggle(&self) -> bool {
        let dark = !self.is_dark();
        self.is_dark.send_replace(dark);
        self.persist(dark);
        self.surface.apply(dark);
        dark
    }

    fn persist(&self, dark: bool) {
        if let Err(err) = self.storage.set_item(THEME_KEY, if dark { DARK } else { LIGHT }) {
            log::warn!("theme: preference not persisted: {err}");
        }
    }
}

/// `Some(true)` for `"dark"`, `Some(false)` for any other stored value.
fn stored_preference(storage: &dyn KeyValueStorage) -> Option<bool> {
    match storage.get_item(THEME_KEY) {
        Ok(value) => value.map(|v| v == DARK),
        Err(err) => {
            log::warn!("theme: preference read failed: {err}");
            None
        }
    }
}
