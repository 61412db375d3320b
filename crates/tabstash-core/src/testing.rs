//! In-memory browser used by the engine tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

use tabstash_tabs::{Tab, TabId, WindowId, WindowScope};

use crate::browser_api::{BookmarkId, BrowserApi, BrowserApiError, BrowserResult, CreateTab};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Query(WindowScope),
    Activate(TabId),
    Remove(Vec<TabId>),
    CreateTab {
        window_id: WindowId,
        url: String,
        active: bool,
    },
    WaitForLoad(TabId),
    Discard(TabId),
    CreateWindow(String),
    FocusWindow(WindowId),
    Folder(String),
    Bookmark { title: String, url: String },
    Capture(TabId),
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    tabs: Vec<Tab>,
    focused_window: WindowId,
    next_tab_id: TabId,
    next_window_id: WindowId,
    failing_urls: HashSet<String>,
    stalled_urls: HashSet<String>,
    failing_captures: HashSet<TabId>,
    fail_discards: bool,
    fail_folders: bool,
    fail_removals: bool,
}

#[derive(Clone, Default)]
pub struct FakeBrowser {
    state: Arc<Mutex<State>>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::with_tabs(Vec::new())
    }

    /// Start with `tabs` open; the first tab's window has focus
    pub fn with_tabs(tabs: Vec<Tab>) -> Self {
        let state = State {
            focused_window: tabs.first().map(|t| t.window_id).unwrap_or(1),
            next_tab_id: tabs.iter().map(|t| t.id).max().unwrap_or(0) + 100,
            next_window_id: tabs.iter().map(|t| t.window_id).max().unwrap_or(1) + 1,
            tabs,
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn tabs(&self) -> Vec<Tab> {
        self.state.lock().tabs.clone()
    }

    /// Simulate a tab opened outside the engine
    pub fn push_tab(&self, tab: Tab) {
        self.state.lock().tabs.push(tab);
    }

    pub fn tab_id_for(&self, url: &str) -> Option<TabId> {
        self.state
            .lock()
            .tabs
            .iter()
            .find(|t| t.url == url)
            .map(|t| t.id)
    }

    pub fn focused_window(&self) -> WindowId {
        self.state.lock().focused_window
    }

    /// Tab creation and bookmarking fail for this URL
    pub fn fail_url(&self, url: &str) {
        self.state.lock().failing_urls.insert(url.to_string());
    }

    /// Loads of this URL never complete
    pub fn stall_url(&self, url: &str) {
        self.state.lock().stalled_urls.insert(url.to_string());
    }

    pub fn fail_capture(&self, tab_id: TabId) {
        self.state.lock().failing_captures.insert(tab_id);
    }

    pub fn fail_discards(&self) {
        self.state.lock().fail_discards = true;
    }

    pub fn fail_folders(&self) {
        self.state.lock().fail_folders = true;
    }

    pub fn fail_removals(&self) {
        self.state.lock().fail_removals = true;
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl BrowserApi for FakeBrowser {
    async fn query_tabs(&self, scope: WindowScope) -> BrowserResult<Vec<Tab>> {
        let mut state = self.state.lock();
        state.calls.push(Call::Query(scope));
        let focused = state.focused_window;
        Ok(state
            .tabs
            .iter()
            .filter(|t| scope == WindowScope::All || t.window_id == focused)
            .cloned()
            .collect())
    }

    async fn activate_tab(&self, tab_id: TabId) -> BrowserResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::Activate(tab_id));
        let window_id = state
            .tabs
            .iter()
            .find(|t| t.id == tab_id)
            .map(|t| t.window_id)
            .ok_or_else(|| BrowserApiError::call_failed("tabs.update", format!("No tab with id {tab_id}")))?;
        for tab in state.tabs.iter_mut().filter(|t| t.window_id == window_id) {
            tab.active = tab.id == tab_id;
        }
        Ok(())
    }

    async fn remove_tabs(&self, tab_ids: &[TabId]) -> BrowserResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::Remove(tab_ids.to_vec()));
        if state.fail_removals {
            return Err(BrowserApiError::call_failed("tabs.remove", "removal refused"));
        }
        state.tabs.retain(|t| !tab_ids.contains(&t.id));
        Ok(())
    }

    async fn create_tab(&self, request: CreateTab) -> BrowserResult<TabId> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateTab {
            window_id: request.window_id,
            url: request.url.clone(),
            active: request.active,
        });
        if state.failing_urls.contains(&request.url) {
            return Err(BrowserApiError::call_failed("tabs.create", "blocked"));
        }

        let id = state.next_tab_id;
        state.next_tab_id += 1;
        state.tabs.push(Tab::new(id, request.window_id, request.url, ""));
        Ok(id)
    }

    async fn wait_for_load(&self, tab_id: TabId) -> BrowserResult<()> {
        let stalled = {
            let mut state = self.state.lock();
            state.calls.push(Call::WaitForLoad(tab_id));
            state
                .tabs
                .iter()
                .any(|t| t.id == tab_id && state.stalled_urls.contains(&t.url))
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn discard_tab(&self, tab_id: TabId) -> BrowserResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::Discard(tab_id));
        if state.fail_discards {
            return Err(BrowserApiError::call_failed("tabs.discard", "not supported"));
        }
        Ok(())
    }

    async fn create_window(&self, url: &str) -> BrowserResult<WindowId> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateWindow(url.to_string()));
        if state.failing_urls.contains(url) {
            return Err(BrowserApiError::call_failed("windows.create", "blocked"));
        }

        let window_id = state.next_window_id;
        state.next_window_id += 1;
        let tab_id = state.next_tab_id;
        state.next_tab_id += 1;
        state.tabs.push(Tab::new(tab_id, window_id, url, ""));
        state.focused_window = window_id;
        Ok(window_id)
    }

    async fn focus_window(&self, window_id: WindowId) -> BrowserResult<()> {
        let mut state = self.state.lock();
        state.calls.push(Call::FocusWindow(window_id));
        state.focused_window = window_id;
        Ok(())
    }

    async fn create_bookmark_folder(&self, title: &str) -> BrowserResult<BookmarkId> {
        let mut state = self.state.lock();
        state.calls.push(Call::Folder(title.to_string()));
        if state.fail_folders {
            return Err(BrowserApiError::Unavailable("bookmarks".to_string()));
        }
        Ok(format!("folder-{}", state.calls.len()))
    }

    async fn create_bookmark(
        &self,
        parent_id: &BookmarkId,
        title: &str,
        url: &str,
    ) -> BrowserResult<BookmarkId> {
        let mut state = self.state.lock();
        state.calls.push(Call::Bookmark {
            title: title.to_string(),
            url: url.to_string(),
        });
        if state.failing_urls.contains(url) {
            return Err(BrowserApiError::call_failed("bookmarks.create", "blocked"));
        }
        Ok(format!("{parent_id}/{}", state.calls.len()))
    }

    async fn capture_page(&self, tab_id: TabId) -> BrowserResult<Vec<u8>> {
        self.record(Call::Capture(tab_id));
        let state = self.state.lock();
        if state.failing_captures.contains(&tab_id) {
            return Err(BrowserApiError::call_failed("pageCapture.saveAsMHTML", "denied"));
        }
        state
            .tabs
            .iter()
            .find(|t| t.id == tab_id)
            .map(|t| format!("MHTML {}", t.url).into_bytes())
            .ok_or_else(|| BrowserApiError::call_failed("pageCapture.saveAsMHTML", "no such tab"))
    }
}
