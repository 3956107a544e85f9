//! Single-session exclusivity for the live video source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Grants at most one live session at a time.
///
/// The frame source is exclusive (one decoder process reading one input), so
/// a second concurrent session must fail fast instead of interleaving reads.
#[derive(Clone, Default)]
pub struct SessionGate {
    busy: Arc<AtomicBool>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to reserve the source. Returns `None` while another permit is
    /// alive.
    pub fn try_acquire(&self) -> Option<SessionPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| SessionPermit {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the gate when dropped.
pub struct SessionPermit {
    busy: Arc<AtomicBool>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_permit() {
        let gate = SessionGate::new();
        let permit = gate.try_acquire();
        assert!(permit.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn test_drop_releases() {
        let gate = SessionGate::new();
        {
            let _permit = gate.try_acquire().unwrap();
            assert!(gate.is_busy());
        }
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let gate = SessionGate::new();
        let clone = gate.clone();
        let _permit = gate.try_acquire().unwrap();
        assert!(clone.try_acquire().is_none());
    }
}
