//! Trailing-edge debounce on browser timers.

use gloo_timers::callback::Timeout;

/// Runs only the most recently scheduled callback, `delay_ms` after it was
/// scheduled. Dropping a [`Timeout`] cancels it.
pub struct Debouncer {
    delay_ms: u32,
    pending: Option<Timeout>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self { delay_ms, pending: None }
    }

    /// Replace any pending callback with `f`.
    pub fn schedule(&mut self, f: impl FnOnce() + 'static) {
        self.cancel();
        self.pending = Some(Timeout::new(self.delay_ms, f));
    }

    pub fn cancel(&mut self) {
        drop(self.pending.take());
    }
}
