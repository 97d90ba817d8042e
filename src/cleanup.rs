//! Scoped release of listeners, channels and subscriptions.
//!
//! DESIGN
//! ======
//! Every resource the engine acquires from a backend (media-query listener,
//! storage event listener, broadcast channel, controller subscriber) is handed
//! back as a [`Cleanup`]. Dropping the guard releases the resource, so
//! teardown order follows ownership instead of explicit bookkeeping.

#[cfg(test)]
#[path = "cleanup_test.rs"]
mod cleanup_test;

use std::fmt;

/// Runs a release action exactly once, on [`Cleanup::cancel`] or on drop.
#[must_use = "dropping a Cleanup releases the resource immediately"]
pub struct Cleanup {
    release: Option<Box<dyn FnOnce()>>,
}

impl Cleanup {
    /// Wrap a release action.
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    /// A guard that owns nothing.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Release now. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// Whether the release action has not run yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup").field("active", &self.is_active()).finish()
    }
}
