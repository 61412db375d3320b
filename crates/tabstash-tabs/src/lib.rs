//! Tabstash Tab Model
//!
//! Read-mostly snapshot of the browser's open tabs plus the pure view
//! pipeline on top of it: domain classification, filtering, sorting,
//! grouping and the multi-select selection set.
//! The snapshot is replaced wholesale on every refresh, never patched.

mod collection;
pub mod domain;
mod filter;
mod selection;
mod tab;

pub use collection::{RefreshTicket, TabCollection};
pub use domain::classify;
pub use filter::{apply, FilterOptions, GroupedTabs, SortBy, TabGroup, TabView, ViewMode, WindowScope};
pub use selection::{CheckState, Selection};
pub use tab::{Tab, TabId, WindowId};
