//! One-way readiness cell.
//!
//! Starts not-ready and flips to ready at most once. Dependents either poll
//! [`Readiness::is_ready`] or hold a [`ReadinessWatcher`] and await the flip.

use tokio::sync::watch;

/// Shared readiness state of an asynchronously started collaborator.
#[derive(Debug)]
pub struct Readiness {
    tx: watch::Sender<bool>,
}

impl Readiness {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Marks the collaborator ready. Returns true only for the call that flipped it.
    pub fn mark_ready(&self) -> bool {
        self.tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        })
    }

    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribes to the readiness transition.
    pub fn subscribe(&self) -> ReadinessWatcher {
        ReadinessWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of a [`Readiness`] cell.
#[derive(Debug, Clone)]
pub struct ReadinessWatcher {
    rx: watch::Receiver<bool>,
}

impl ReadinessWatcher {
    pub fn is_ready(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until ready. Returns immediately if already ready.
    pub async fn wait_ready(&mut self) {
        // Closed channel: the session is over
        let _ = self.rx.wait_for(|ready| *ready).await;
    }
}
