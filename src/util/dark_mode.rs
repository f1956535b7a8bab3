//! Colour-scheme probing and `dark` class application.
//!
//! [`ThemeSurface`] is what the theme store drives: it answers whether the OS
//! prefers a dark scheme and applies the resolved choice to the document.
//! [`BrowserThemeSurface`] toggles the `dark` class on `<html>` and `<body>`;
//! [`HeadlessSurface`] records what was applied so hosts without a DOM (and
//! tests) can observe it.
//!
//! TRADE-OFFS
//! ==========
//! Application is best-effort: a missing document or a rejected class-list call
//! is logged and otherwise ignored, since theming never blocks the app.

#[cfg(test)]
#[path = "dark_mode_test.rs"]
mod dark_mode_test;

use std::cell::Cell;

/// Class name toggled on `<html>` and `<body>`.
pub const DARK_CLASS: &str = "dark";

pub trait ThemeSurface {
    /// Whether the OS-level colour scheme is dark.
    fn prefers_dark(&self) -> bool;

    /// Apply (or remove) dark styling.
    fn apply(&self, dark: bool);
}

/// A surface with a fixed OS preference that remembers the last applied value.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    prefers_dark: bool,
    applied: Cell<Option<bool>>,
    applications: Cell<usize>,
}

impl HeadlessSurface {
    pub fn new(prefers_dark: bool) -> Self {
        Self { prefers_dark, applied: Cell::new(None), applications: Cell::new(0) }
    }

    /// Last value passed to [`ThemeSurface::apply`], if any.
    pub fn applied(&self) -> Option<bool> {
        self.applied.get()
    }

    /// How many times `apply` has been called.
    pub fn applications(&self) -> usize {
        self.applications.get()
    }
}

impl ThemeSurface for HeadlessSurface {
    fn prefers_dark(&self) -> bool {
        self.prefers_dark
    }

    fn apply(&self, dark: bool) {
        self.applied.set(Some(dark));
        self.applications.set(self.applications.get() + 1);
    }
}

#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserThemeSurface;

#[cfg(feature = "hydrate")]
impl ThemeSurface for BrowserThemeSurface {
    fn prefers_dark(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        match window.match_media("(prefers-color-scheme: dark)") {
            Ok(Some(mq)) => mq.matches(),
            _ => false,
        }
    }

    fn apply(&self, dark: bool) {
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
            log::warn!("dark mode: no document to apply theme to");
            return;
        };
        let root = doc.document_element();
        let body = doc.body().map(web_sys::Element::from);
        for el in root.iter().chain(body.iter()) {
            let class_list = el.class_list();
            let result = if dark { class_list.add_1(DARK_CLASS) } else { class_list.remove_1(DARK_CLASS) };
            if let Err(err) = result {
                log::warn!("dark mode: class update failed: {err:?}");
            }
        }
    }
}
