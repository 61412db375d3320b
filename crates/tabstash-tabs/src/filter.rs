//! Filter-sort pipeline
//!
//! `apply` is pure: the same tabs, options and clock always yield the same
//! ordered subset. Grouping runs on the already filtered and sorted sequence.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain;
use crate::tab::Tab;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Most recently used first
    #[default]
    LastAccessed,
    Title,
    Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    #[default]
    List,
    Grouped,
}

/// Which windows a refresh queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowScope {
    #[default]
    Current,
    All,
}

/// Transient view options, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Only show tabs idle for at least this many milliseconds; 0 disables
    pub time_filter: i64,
    /// Case-insensitive substring over title and URL
    pub search_term: String,
    pub sort_by: SortBy,
    pub view_mode: ViewMode,
    pub window_scope: WindowScope,
}

/// Filter then sort `tabs` according to `options`, evaluated at `now_ms`.
pub fn apply(tabs: &[Tab], options: &FilterOptions, now_ms: i64) -> Vec<Tab> {
    let needle = options.search_term.to_uppercase();

    let mut visible: Vec<Tab> = tabs
        .iter()
        .filter(|tab| passes_time_filter(tab, options.time_filter, now_ms))
        .filter(|tab| needle.is_empty() || matches_search(tab, &needle))
        .cloned()
        .collect();

    // `sort_by` is stable, ties keep their incoming order
    match options.sort_by {
        SortBy::Title => visible.sort_by(|a, b| locale_cmp(a.display_title(), b.display_title())),
        SortBy::Url => visible.sort_by(|a, b| locale_cmp(&a.url, &b.url)),
        SortBy::LastAccessed => visible.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed)),
    }

    visible
}

fn passes_time_filter(tab: &Tab, time_filter: i64, now_ms: i64) -> bool {
    time_filter <= 0 || now_ms.saturating_sub(tab.last_accessed) >= time_filter
}

fn matches_search(tab: &Tab, needle: &str) -> bool {
    tab.title.to_uppercase().contains(needle) || tab.url.to_uppercase().contains(needle)
}

/// Case-folded comparison first, exact comparison to break ties.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabGroup {
    pub domain: String,
    pub tabs: Vec<Tab>,
}

/// Tabs bucketed by domain key, largest group first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedTabs {
    groups: Vec<TabGroup>,
}

impl GroupedTabs {
    /// Group an already sorted sequence. Member order is inherited from the
    /// input; equally sized groups keep first-encounter order.
    pub fn from_sorted(tabs: &[Tab]) -> Self {
        let mut groups: Vec<TabGroup> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for tab in tabs {
            let key = domain::classify(&tab.url);
            match index.get(&key) {
                Some(&i) => groups[i].tabs.push(tab.clone()),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push(TabGroup {
                        domain: key,
                        tabs: vec![tab.clone()],
                    });
                }
            }
        }

        groups.sort_by(|a, b| b.tabs.len().cmp(&a.tabs.len()));
        Self { groups }
    }

    pub fn groups(&self) -> &[TabGroup] {
        &self.groups
    }

    pub fn get(&self, domain: &str) -> Option<&TabGroup> {
        self.groups.iter().find(|g| g.domain == domain)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// What a renderer consumes: the visible tabs and, in grouped mode, their groups
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabView {
    pub visible: Vec<Tab>,
    pub groups: Option<GroupedTabs>,
}

impl TabView {
    pub fn build(tabs: &[Tab], options: &FilterOptions, now_ms: i64) -> Self {
        let visible = apply(tabs, options, now_ms);
        let groups = match options.view_mode {
            ViewMode::Grouped => Some(GroupedTabs::from_sorted(&visible)),
            ViewMode::List => None,
        };

        Self { visible, groups }
    }

    /// Members of one group, empty when the domain is not shown
    pub fn group_tabs(&self, domain: &str) -> Vec<Tab> {
        match &self.groups {
            Some(groups) => groups
                .get(domain)
                .map(|g| g.tabs.clone())
                .unwrap_or_default(),
            None => self
                .visible
                .iter()
                .filter(|t| domain::classify(&t.url) == domain)
                .cloned()
                .collect(),
        }
    }
}
