//! # shortlink-client
//!
//! Browser-side client for the link-shortening API: credential persistence,
//! an authenticated HTTP transport, session/link/theme stores, and a router
//! whose guard keeps protected views behind a valid session.
//!
//! The crate compiles headless (native hosts and tests) and for `wasm32` with
//! the `hydrate` feature, where storage, history, and theme application are
//! backed by the browser.

pub mod app;
pub mod config;
pub mod net;
pub mod router;
pub mod state;
pub mod util;

pub use app::{App, AppError};
pub use config::ClientConfig;
