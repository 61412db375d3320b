//! Two-phase confirmation for closing tabs
//!
//! The first invocation arms; a second one within the timeout confirms.
//! An armed state that is not confirmed in time silently expires.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStep {
    Armed,
    Confirmed,
}

#[derive(Debug, Clone)]
pub struct CloseConfirmation {
    timeout: Duration,
    armed_at: Option<Instant>,
}

impl CloseConfirmation {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            armed_at: None,
        }
    }

    pub fn invoke(&mut self, now: Instant) -> ConfirmStep {
        if self.is_armed(now) {
            self.armed_at = None;
            ConfirmStep::Confirmed
        } else {
            self.armed_at = Some(now);
            ConfirmStep::Armed
        }
    }

    pub fn is_armed(&self, now: Instant) -> bool {
        self.armed_at
            .is_some_and(|armed| now.saturating_duration_since(armed) < self.timeout)
    }

    pub fn reset(&mut self) {
        self.armed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_invocation_confirms() {
        let start = Instant::now();
        let mut confirm = CloseConfirmation::new(Duration::from_secs(3));

        assert_eq!(confirm.invoke(start), ConfirmStep::Armed);
        assert!(confirm.is_armed(start + Duration::from_secs(1)));
        assert_eq!(confirm.invoke(start + Duration::from_secs(2)), ConfirmStep::Confirmed);

        // Confirming disarms
        assert!(!confirm.is_armed(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_armed_state_expires() {
        let start = Instant::now();
        let mut confirm = CloseConfirmation::new(Duration::from_secs(3));

        confirm.invoke(start);
        assert!(!confirm.is_armed(start + Duration::from_secs(3)));
        assert_eq!(confirm.invoke(start + Duration::from_secs(4)), ConfirmStep::Armed);
    }

    #[test]
    fn test_reset() {
        let start = Instant::now();
        let mut confirm = CloseConfirmation::new(Duration::from_secs(3));
        confirm.invoke(start);
        confirm.reset();
        assert_eq!(confirm.invoke(start), ConfirmStep::Armed);
    }
}
