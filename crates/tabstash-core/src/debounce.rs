//! Search edit debouncing
//!
//! Keystrokes are coalesced: only the latest term is kept, and it becomes
//! due once no further edit has arrived for the configured delay.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, term: String, now: Instant) {
        self.pending = Some((term, now));
    }

    /// Instant at which the pending term becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Take the pending term if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.pending.take().map(|(term, _)| term),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_coalesce() {
        let start = Instant::now();
        let ms = Duration::from_millis;
        let mut debouncer = SearchDebouncer::new(ms(150));

        debouncer.push("r".into(), start);
        debouncer.push("ru".into(), start + ms(50));
        debouncer.push("rust".into(), start + ms(100));

        assert_eq!(debouncer.poll(start + ms(200)), None);
        assert_eq!(debouncer.poll(start + ms(250)), Some("rust".to_string()));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(start + ms(400)), None);
    }
}
