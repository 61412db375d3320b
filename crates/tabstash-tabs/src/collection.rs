//! Live tab collection
//!
//! Holds the most recently applied browser snapshot. Refreshes are tagged
//! with a monotonically increasing ticket; a snapshot whose ticket is not
//! newer than the last applied one is stale and gets discarded.

use crate::tab::{Tab, TabId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabCollection {
    tabs: Vec<Tab>,
    /// Last ticket handed out
    issued: u64,
    /// Ticket of the snapshot currently held
    applied: u64,
}

impl TabCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Replace the snapshot wholesale. Returns false if `ticket` is stale.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, tabs: Vec<Tab>) -> bool {
        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "Discarding superseded tab snapshot"
            );
            return false;
        }

        self.applied = ticket.0;
        self.tabs = tabs;
        true
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_replaces_snapshot() {
        let mut collection = TabCollection::new();
        let ticket = collection.begin_refresh();
        assert!(collection.complete_refresh(ticket, vec![Tab::new(1, 1, "https://a.test", "A")]));
        assert_eq!(collection.len(), 1);

        let ticket = collection.begin_refresh();
        assert!(collection.complete_refresh(ticket, vec![Tab::new(2, 1, "https://b.test", "B")]));
        assert!(!collection.contains(1));
        assert!(collection.contains(2));
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut collection = TabCollection::new();
        let first = collection.begin_refresh();
        let second = collection.begin_refresh();

        assert!(collection.complete_refresh(second, vec![Tab::new(2, 1, "https://new.test", "")]));
        // The older request resolves late and must not overwrite the newer snapshot
        assert!(!collection.complete_refresh(first, vec![Tab::new(1, 1, "https://old.test", "")]));
        assert_eq!(collection.tabs()[0].id, 2);
    }
}
