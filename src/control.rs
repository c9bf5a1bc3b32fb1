//! Cooperative cancellation shared across long-running work.
//!
//! Grounded on the reference's `Globals` class: a single process-wide atomic
//! flag (`SetStop`/`LoadStop`) that factorization and the calculator's worker
//! loop poll periodically rather than reacting to instantly. A `StopToken` here
//! is the same idea made instance-local instead of a global, so multiple
//! calculators in one process don't share a cancellation flag by accident.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_stopped() {
        assert!(!StopToken::new().is_stopped());
    }

    #[test]
    fn request_stop_is_observed_through_clones() {
        let a = StopToken::new();
        let b = a.clone();
        a.request_stop();
        assert!(b.is_stopped());
    }

    #[test]
    fn reset_clears_the_flag() {
        let a = StopToken::new();
        a.request_stop();
        a.reset();
        assert!(!a.is_stopped());
    }
}
