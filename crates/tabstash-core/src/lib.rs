//! Tabstash Core
//!
//! Coordination layer of the tab and session engine.
//! The engine owns all state; the presentation layer only sends commands
//! and renders what it gets back.

mod bookmarks;
mod browser_api;
mod command;
mod config;
mod confirm;
mod debounce;
mod engine;
mod error;
mod export;
mod restore;
mod state;

#[cfg(test)]
mod testing;

pub use bookmarks::{bookmark_tabs, BookmarkReport};
pub use browser_api::{BookmarkId, BrowserApi, BrowserApiError, BrowserResult, CreateTab, TabEvent};
pub use command::{Command, Notice, NoticeLevel, Outcome};
pub use config::Config;
pub use confirm::{CloseConfirmation, ConfirmStep};
pub use debounce::SearchDebouncer;
pub use engine::Engine;
pub use error::{CoreError, ErrorKind};
pub use export::{export_tabs, sanitize_file_name, ExportArtifact};
pub use restore::{report_page_url, restore_session, RestoreReport};
pub use state::ViewState;

// Re-export the component crates
pub use tabstash_session::{
    RestorePlan, Session, SessionError, SessionExport, SessionStore, SessionTab, ValidationError,
};
pub use tabstash_storage::{Database, KeyValueStore, MemoryStore, StorageError};
pub use tabstash_tabs::{
    CheckState, FilterOptions, Selection, SortBy, Tab, TabId, TabView, ViewMode, WindowId,
    WindowScope,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. Calling it again after a subscriber is installed is a no-op.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }
}
