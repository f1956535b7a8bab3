//! Logger installation.
//!
//! Everything in the crate logs through the `log` facade. In the browser this
//! routes to the devtools console; native hosts install their own logger.

/// Install the console logger and panic hook. Safe to call more than once.
pub fn init() {
    #[cfg(feature = "hydrate")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Debug).is_err() {
            log::debug!("logger already installed");
        }
    }
}
