//! Session-wide stop signal shared by every background process.
//!
//! A single [`ShutdownSignal`] lives for the engine's lifetime behind an
//! [`Arc`](std::sync::Arc). The flag is a plain atomic so processes can
//! check it at every tick boundary without taking a lock; the [`Notify`]
//! wakes processes that are sleeping between ticks.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-way stop flag with async wake-up.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    /// Whether a stop has been requested.
    requested: AtomicBool,

    /// Wakes every process currently waiting in [`ShutdownSignal::wait`].
    notify: Notify,
}

impl ShutdownSignal {
    /// Create a signal that has not been requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake every waiter. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check whether a stop has been requested.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested.
    ///
    /// Returns immediately if one already was.
    pub async fn wait(&self) {
        loop {
            // Register before checking the flag so a request landing in
            // between is not missed.
            let notified = self.notify.notified();
            if self.is_requested() {
                return;
            }
            notified.await;
        }
    }
}
