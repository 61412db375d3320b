//! Selection tracker
//!
//! The selection is keyed by tab id and outlives filter changes: hidden tabs
//! stay selected. Ids of tabs that no longer exist are dropped by `prune`
//! after every applied refresh.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::tab::{Tab, TabId};

/// Tri-state checkbox summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CheckState {
    pub checked: bool,
    pub indeterminate: bool,
}

impl CheckState {
    fn from_counts(selected: usize, total: usize) -> Self {
        Self {
            checked: total > 0 && selected == total,
            indeterminate: selected > 0 && selected < total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<TabId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, id: TabId, selected: bool) {
        if selected {
            self.ids.insert(id);
        } else {
            self.ids.remove(&id);
        }
    }

    pub fn toggle_group(&mut self, domain: &str, selected: bool, tabs_in_group: &[Tab]) {
        for tab in tabs_in_group {
            self.toggle(tab.id, selected);
        }
        tracing::debug!(domain = %domain, selected, count = tabs_in_group.len(), "Toggled group");
    }

    /// Affects only the tabs passed in, never hidden ones
    pub fn toggle_all(&mut self, selected: bool, visible_tabs: &[Tab]) {
        for tab in visible_tabs {
            self.toggle(tab.id, selected);
        }
    }

    pub fn select_all_state(&self, visible_tabs: &[Tab]) -> CheckState {
        self.state_of(visible_tabs)
    }

    pub fn group_state(&self, _domain: &str, tabs_in_group: &[Tab]) -> CheckState {
        self.state_of(tabs_in_group)
    }

    fn state_of(&self, tabs: &[Tab]) -> CheckState {
        let selected = tabs.iter().filter(|t| self.ids.contains(&t.id)).count();
        CheckState::from_counts(selected, tabs.len())
    }

    /// Drop ids missing from the live collection. Returns how many were dropped.
    pub fn prune(&mut self, live: &[Tab]) -> usize {
        let before = self.ids.len();
        let live_ids: BTreeSet<TabId> = live.iter().map(|t| t.id).collect();
        self.ids.retain(|id| live_ids.contains(id));
        before - self.ids.len()
    }

    /// Selected tabs in live-collection order
    pub fn selected_in<'a>(&self, live: &'a [Tab]) -> Vec<&'a Tab> {
        live.iter().filter(|t| self.ids.contains(&t.id)).collect()
    }

    pub fn remove_all(&mut self, ids: &[TabId]) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = TabId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
