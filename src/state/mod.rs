//! Client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `links`, `theme`) plus the credential
//! store they share. Each store is constructed once at startup and handed out
//! as `Rc`; its state lives in a `tokio::sync::watch` channel so hosts can
//! subscribe to transitions instead of polling.
//!
//! Hosts get a [`Subscription`], never a raw `watch::Receiver`. A held
//! `watch` borrow blocks the sender, and everything here runs on one thread,
//! so a borrow kept across a store call would hang the page. Subscriptions
//! only hand out clones.

pub mod auth;
pub mod credentials;
pub mod links;
pub mod theme;

use tokio::sync::watch;

/// Read side of a store's state channel.
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub(crate) fn new(rx: watch::Receiver<T>) -> Self {
        Self { rx }
    }

    /// Current value, without marking it seen.
    pub fn snapshot(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Whether the value changed since it was last marked seen. `false` once
    /// the store is gone.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Current value, marked seen.
    pub fn latest(&mut self) -> T {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next change and return it. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<T> {
        match self.rx.changed().await {
            Ok(()) => Some(self.latest()),
            Err(_) => None,
        }
    }
}

/// State with the shared `loading` / `last_error` pair.
pub(crate) trait Tracked {
    fn set_loading(&mut self, loading: bool);
    fn set_last_error(&mut self, error: Option<String>);
}

/// Marks one store operation in flight.
///
/// `begin` sets `loading` and clears `last_error` before any request is issued;
/// dropping the guard clears `loading`, whether the operation returned, failed,
/// or its future was dropped mid-request.
pub(crate) struct LoadingGuard<'a, S: Tracked> {
    state: &'a watch::Sender<S>,
}

impl<'a, S: Tracked> LoadingGuard<'a, S> {
    pub(crate) fn begin(state: &'a watch::Sender<S>) -> Self {
        state.send_modify(|s| {
            s.set_loading(true);
            s.set_last_error(None);
        });
        Self { state }
    }

    pub(crate) fn fail(&self, message: String) {
        self.state.send_modify(|s| s.set_last_error(Some(message)));
    }
}

impl<S: Tracked> Drop for LoadingGuard<'_, S> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.set_loading(false));
    }
}
