//! Ctrl+C handling.
//!
//! Each Ctrl+C cancels the current [`CancellationToken`]. Callers take a
//! fresh token per operation so one interrupt stops one answer.

use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    current: Arc<Mutex<CancellationToken>>,
}

impl Interrupt {
    /// Install the process-wide Ctrl+C handler.
    pub fn install() -> Self {
        let interrupt = Self::default();
        let current = Arc::clone(&interrupt.current);

        // Install the handler - ignore errors if already set
        let _ = ctrlc::set_handler(move || {
            current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .cancel();
        });

        interrupt
    }

    /// Replace the current token with a new one and return it.
    pub fn fresh(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token.clone();
        token
    }

    /// Cancel the current token, as Ctrl+C does.
    pub fn trigger(&self) {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .cancel();
    }
}
