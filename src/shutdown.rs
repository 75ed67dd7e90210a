//! Ctrl-C handling
//!
//! The signal handler only clears a shared flag; the poll loop checks it once
//! per cycle, so shutdown is noticed within one poll interval.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// Cloneable running flag shared between the signal handler and the loop
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    running: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the loop to stop after the current cycle
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Install a Ctrl-C handler that clears this flag
    pub fn install_ctrlc_handler(&self) -> Result<(), ctrlc::Error> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            debug!("interrupt received");
            flag.request_shutdown();
        })
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}
