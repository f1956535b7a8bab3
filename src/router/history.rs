//! History backends: where committed navigations are recorded.
//!
//! [`MemoryHistory`] keeps a stack with a cursor (headless hosts, tests);
//! [`BrowserHistory`] writes to `window.history`, scrolls the window, and
//! reports back/forward through `popstate`.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::cell::{Cell, RefCell};

use super::routes::Location;

/// Called with the location the backend moved to on back/forward.
pub type PopHandler = Box<dyn Fn(Location)>;

pub trait HistoryBackend {
    /// Location to start the app at.
    fn initial_location(&self) -> Location;

    /// Record a new entry.
    fn push(&self, location: &Location);

    /// Overwrite the current entry.
    fn replace(&self, location: &Location);

    /// Reset scroll to the top of the page.
    fn scroll_to_top(&self);

    /// Install the traversal handler. Replaces any previous one.
    fn on_pop(&self, handler: PopHandler);
}

#[derive(Default)]
pub struct MemoryHistory {
    initial: Location,
    entries: RefCell<Vec<Location>>,
    cursor: Cell<usize>,
    scroll_resets: Cell<usize>,
    pop_handler: RefCell<Option<PopHandler>>,
}

impl MemoryHistory {
    pub fn new(initial: Location) -> Self {
        Self { initial, ..Self::default() }
    }

    pub fn entries(&self) -> Vec<Location> {
        self.entries.borrow().clone()
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<Location> {
        self.entries.borrow().get(self.cursor.get()).cloned()
    }

    pub fn scroll_resets(&self) -> usize {
        self.scroll_resets.get()
    }

    /// Step back one entry and notify the handler. `false` at the start.
    pub fn back(&self) -> bool {
        let cursor = self.cursor.get();
        if cursor == 0 || self.entries.borrow().is_empty() {
            return false;
        }
        self.move_to(cursor - 1);
        true
    }

    /// Step forward one entry and notify the handler. `false` at the end.
    pub fn forward(&self) -> bool {
        let next = self.cursor.get() + 1;
        if next >= self.entries.borrow().len() {
            return false;
        }
        self.move_to(next);
        true
    }

    fn move_to(&self, index: usize) {
        self.cursor.set(index);
        let Some(location) = self.current() else {
            return;
        };
        if let Some(handler) = self.pop_handler.borrow().as_ref() {
            handler(location);
        }
    }
}

impl HistoryBackend for MemoryHistory {
    fn initial_location(&self) -> Location {
        self.initial.clone()
    }

    fn push(&self, location: &Location) {
        let mut entries = self.entries.borrow_mut();
        if !entries.is_empty() {
            entries.truncate(self.cursor.get() + 1);
        }
        entries.push(location.clone());
        self.cursor.set(entries.len() - 1);
    }

    fn replace(&self, location: &Location) {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(self.cursor.get()) {
            Some(slot) => *slot = location.clone(),
            None => {
                entries.push(location.clone());
                self.cursor.set(entries.len() - 1);
            }
        }
    }

    fn scroll_to_top(&self) {
        self.scroll_resets.set(self.scroll_resets.get() + 1);
    }

    fn on_pop(&self, handler: PopHandler) {
        self.pop_handler.replace(Some(handler));
    }
}

#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserHistory;

#[cfg(feature = "hydrate")]
impl BrowserHistory {
    fn write(location: &Location, replace: bool) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            log::warn!("history: window.history unavailable");
            return;
        };
        let url = location.full_path();
        let state = wasm_bindgen::JsValue::NULL;
        let result = if replace {
            history.replace_state_with_url(&state, "", Some(&url))
        } else {
            history.push_state_with_url(&state, "", Some(&url))
        };
        if let Err(err) = result {
            log::warn!("history: could not record {url}: {err:?}");
        }
    }

    fn location() -> Location {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Location::default();
        };
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        Location::parse(&format!("{path}{search}"))
    }
}

#[cfg(feature = "hydrate")]
impl HistoryBackend for BrowserHistory {
    fn initial_location(&self) -> Location {
        Self::location()
    }

    fn push(&self, location: &Location) {
        Self::write(location, false);
    }

    fn replace(&self, location: &Location) {
        Self::write(location, true);
    }

    fn scroll_to_top(&self) {
        if let Some(window) = web_sys::window() {
            window.scroll_to_with_x_and_y(0.0, 0.0);
        }
    }

    fn on_pop(&self, handler: PopHandler) {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::closure::Closure;

        let Some(window) = web_sys::window() else {
            log::warn!("history: no window, back/forward not guarded");
            return;
        };
        let callback = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            handler(Self::location());
        }) as Box<dyn FnMut(web_sys::Event)>);
        if let Err(err) = window.add_event_listener_with_callback("popstate", callback.as_ref().unchecked_ref()) {
            log::warn!("history: popstate listener not installed: {err:?}");
        }
        // Lives as long as the page.
        callback.forget();
    }
}
