// Cooperative cancellation for long-running extractions.
//
// The LDA loop checks the flag before every pass. The web layer flips it when
// a request times out or its future is dropped (client went away).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, clonable cancellation flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cancels the wrapped flag when dropped.
///
/// Held by the async side of an offloaded extraction so that abandoning the
/// request stops the blocking worker at its next pass.
#[derive(Debug)]
pub struct CancelOnDrop(pub CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let flag = CancelFlag::new();
        {
            let _guard = CancelOnDrop(flag.clone());
        }
        assert!(flag.is_cancelled());
    }
}
