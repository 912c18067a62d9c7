use std::sync::Arc;

use tokio::sync::watch;

/// One-shot completion signal.
///
/// A signal starts unfired. [`Signal::fire`] flips it exactly once; later calls
/// are inert. Any number of tasks can [`Signal::wait`] for it, including after it
/// has fired, in which case the wait completes immediately. Clones share state.
#[derive(Clone, Debug)]
pub struct Signal {
    tx: Arc<watch::Sender<bool>>,
}

impl Signal {
    /// New, unfired signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Signal that has already fired.
    pub fn fired() -> Self {
        let s = Self::new();
        s.fire();
        s
    }

    /// Fire the signal. Returns `false` when it had already fired.
    pub fn fire(&self) -> bool {
        self.tx.send_if_modified(|fired| {
            if *fired {
                false
            } else {
                *fired = true;
                true
            }
        })
    }

    /// `true` once [`Signal::fire`] has been called.
    pub fn is_fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// Suspend until the signal has fired.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/signal.rs"]
mod tests;
