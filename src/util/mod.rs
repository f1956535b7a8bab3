//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from store and router
//! logic so the same code runs headless in tests and against web-sys in the
//! browser.

pub mod dark_mode;
pub mod logging;
pub mod storage;
