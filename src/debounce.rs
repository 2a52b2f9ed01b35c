//! Cancellable one-shot timer.
//!
//! `schedule` (re)starts the timer; only the last scheduled action runs,
//! and only after a full quiet period. `cancel` and drop discard it.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start or restart the timer. `action` runs once the delay elapses
    /// without another `schedule` or `cancel`.
    ///
    /// Returns false, leaving any pending action in place, when called
    /// outside a Tokio runtime.
    pub fn schedule<F>(&self, action: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("No Tokio runtime, debounced action dropped");
            return false;
        };
        let delay = self.delay;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
        true
    }

    /// Discard the pending action. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
