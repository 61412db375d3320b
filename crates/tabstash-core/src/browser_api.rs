//! Browser capability surface
//!
//! Everything the engine asks of the browser goes through [`BrowserApi`].
//! Implementations bridge to the real extension APIs; every call is async
//! and reports failure as a [`BrowserApiError`].

use async_trait::async_trait;
use thiserror::Error;

use tabstash_tabs::{Tab, TabId, WindowId, WindowScope};

pub type BookmarkId = String;

pub type BrowserResult<T> = std::result::Result<T, BrowserApiError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserApiError {
    #[error("Browser capability unavailable: {0}")]
    Unavailable(String),

    #[error("Browser call {operation} failed: {message}")]
    CallFailed {
        operation: &'static str,
        message: String,
    },
}

impl BrowserApiError {
    pub fn call_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::CallFailed {
            operation,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTab {
    pub window_id: WindowId,
    pub url: String,
    /// Background tabs are created with `active: false`
    pub active: bool,
}

/// Any structural change to the tab strip. All variants trigger the same
/// full refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created,
    Removed,
    Updated,
    Moved,
    Attached,
    Detached,
}

#[async_trait]
pub trait BrowserApi: Send + Sync {
    async fn query_tabs(&self, scope: WindowScope) -> BrowserResult<Vec<Tab>>;

    /// Make a tab the active one in its window
    async fn activate_tab(&self, tab_id: TabId) -> BrowserResult<()>;

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> BrowserResult<()>;

    async fn create_tab(&self, request: CreateTab) -> BrowserResult<TabId>;

    /// Resolves once the tab reports load-complete
    async fn wait_for_load(&self, tab_id: TabId) -> BrowserResult<()>;

    /// Unload the page while keeping the tab strip entry
    async fn discard_tab(&self, tab_id: TabId) -> BrowserResult<()>;

    /// Open a new window navigated to `url`
    async fn create_window(&self, url: &str) -> BrowserResult<WindowId>;

    async fn focus_window(&self, window_id: WindowId) -> BrowserResult<()>;

    async fn create_bookmark_folder(&self, title: &str) -> BrowserResult<BookmarkId>;

    async fn create_bookmark(
        &self,
        parent_id: &BookmarkId,
        title: &str,
        url: &str,
    ) -> BrowserResult<BookmarkId>;

    /// Snapshot a page as a single MHTML document
    async fn capture_page(&self, tab_id: TabId) -> BrowserResult<Vec<u8>>;
}
