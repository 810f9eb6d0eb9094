use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Sets up a Ctrl+C handler that clears the shared `running` flag.
///
/// Only the headless printer needs this; the TUI reads Ctrl+C as a key
/// while the terminal is in raw mode.
pub fn setup_ctrlc_handler(running: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
}
