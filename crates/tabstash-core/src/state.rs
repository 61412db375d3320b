//! Explicit view state
//!
//! Everything the presentation layer shows lives here: the live tab
//! snapshot, the selection, the current filter options and the cached
//! session list. The engine owns one `ViewState`; every transition is a
//! plain method so it can be exercised without a browser.

use tabstash_session::Session;
use tabstash_tabs::{
    CheckState, FilterOptions, RefreshTicket, Selection, Tab, TabCollection, TabId, TabView,
};

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    tabs: TabCollection,
    selection: Selection,
    pub filter: FilterOptions,
    sessions: Vec<Session>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        self.tabs.tabs()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn set_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    /// Visible tabs (and groups) under the current filter, evaluated at `now_ms`
    pub fn view(&self, now_ms: i64) -> TabView {
        TabView::build(self.tabs.tabs(), &self.filter, now_ms)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.tabs.begin_refresh()
    }

    /// Apply a completed snapshot. Superseded snapshots are ignored; an
    /// applied one prunes selected ids that no longer exist.
    pub fn apply_snapshot(&mut self, ticket: RefreshTicket, tabs: Vec<Tab>) -> bool {
        if !self.tabs.complete_refresh(ticket, tabs) {
            return false;
        }

        let dropped = self.selection.prune(self.tabs.tabs());
        if dropped > 0 {
            tracing::debug!(dropped, "Pruned selection of closed tabs");
        }
        true
    }

    /// Ids missing from the live snapshot are never added. Returns whether
    /// the selection was updated.
    pub fn select_tab(&mut self, id: TabId, selected: bool) -> bool {
        if selected && self.tab(id).is_none() {
            tracing::debug!(tab_id = id, "Ignoring selection of unknown tab");
            return false;
        }
        self.selection.toggle(id, selected);
        true
    }

    pub fn select_group(&mut self, domain: &str, selected: bool, now_ms: i64) {
        let members = self.view(now_ms).group_tabs(domain);
        self.selection.toggle_group(domain, selected, &members);
    }

    /// Select or clear every visible tab; hidden tabs keep their state
    pub fn select_all(&mut self, selected: bool, now_ms: i64) {
        let view = self.view(now_ms);
        self.selection.toggle_all(selected, &view.visible);
    }

    pub fn select_all_state(&self, now_ms: i64) -> CheckState {
        self.selection.select_all_state(&self.view(now_ms).visible)
    }

    pub fn group_state(&self, domain: &str, now_ms: i64) -> CheckState {
        let members = self.view(now_ms).group_tabs(domain);
        self.selection.group_state(domain, &members)
    }

    /// Selected live tabs, in live-collection order
    pub fn selected_tabs(&self) -> Vec<&Tab> {
        self.selection.selected_in(self.tabs.tabs())
    }

    pub fn deselect(&mut self, ids: &[TabId]) {
        self.selection.remove_all(ids);
    }
}
