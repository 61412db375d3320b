//! Engine coordinator
//!
//! Owns the view state and routes every [`Command`] to its handler. Browser
//! and storage calls are awaited without holding the state lock; the state
//! is only touched between awaits.

use chrono::{Local, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use tabstash_session::{Session, SessionError, SessionStore, SessionTab};
use tabstash_storage::{Database, KeyValueStore};
use tabstash_tabs::{Tab, TabId, TabView};

use crate::bookmarks::bookmark_tabs;
use crate::browser_api::{BrowserApi, TabEvent};
use crate::command::{Command, Notice, Outcome};
use crate::config::Config;
use crate::confirm::{CloseConfirmation, ConfirmStep};
use crate::debounce::SearchDebouncer;
use crate::error::CoreError;
use crate::export::{export_tabs, file_timestamp, sanitize_file_name, ExportArtifact};
use crate::restore::restore_session;
use crate::state::ViewState;
use crate::Result;

pub struct Engine<B, S> {
    config: Config,
    browser: B,
    sessions: SessionStore<S>,
    state: Arc<RwLock<ViewState>>,
    debouncer: Arc<Mutex<SearchDebouncer>>,
    close_confirmation: Arc<Mutex<CloseConfirmation>>,
}

impl<B: BrowserApi> Engine<B, Database> {
    /// Open the on-disk session database named by `config`
    pub fn open(config: Config, browser: B) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        Ok(Self::new(config, browser, db))
    }
}

impl<B: BrowserApi, S: KeyValueStore> Engine<B, S> {
    pub fn new(config: Config, browser: B, storage: S) -> Self {
        let debouncer = SearchDebouncer::new(config.search_debounce());
        let close_confirmation = CloseConfirmation::new(config.close_confirm_timeout());

        Self {
            config,
            browser,
            sessions: SessionStore::new(storage),
            state: Arc::new(RwLock::new(ViewState::new())),
            debouncer: Arc::new(Mutex::new(debouncer)),
            close_confirmation: Arc::new(Mutex::new(close_confirmation)),
        }
    }

    /// Load saved sessions and take the first tab snapshot
    pub async fn initialize(&self) -> Result<()> {
        let sessions = self.sessions.load().await?;
        let session_count = sessions.len();
        self.state.write().set_sessions(sessions);

        self.refresh().await?;

        tracing::info!(
            session_count,
            tab_count = self.state.read().tabs().len(),
            "Engine initialized"
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn session_store(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// Run `f` against the current state
    pub fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&ViewState) -> T,
    {
        f(&self.state.read())
    }

    /// Visible tabs under the current filter
    pub fn view(&self) -> TabView {
        self.state.read().view(Utc::now().timestamp_millis())
    }

    /// Query the browser and apply the snapshot unless a newer refresh
    /// completed first. Returns whether the snapshot was applied.
    pub async fn refresh(&self) -> Result<bool> {
        let (ticket, scope) = {
            let mut state = self.state.write();
            (state.begin_refresh(), state.filter.window_scope)
        };

        let tabs = self.browser.query_tabs(scope).await?;
        let tab_count = tabs.len();
        let applied = self.state.write().apply_snapshot(ticket, tabs);

        tracing::debug!(ticket = ticket.sequence(), tab_count, applied, "Refreshed tabs");
        Ok(applied)
    }

    /// Refresh once per burst of change notifications until the channel closes
    pub async fn run_events(&self, events: &mut mpsc::Receiver<TabEvent>) {
        while let Some(event) = events.recv().await {
            let mut coalesced = 1;
            while events.try_recv().is_ok() {
                coalesced += 1;
            }

            tracing::debug!(?event, coalesced, "Tab change notification");
            if let Err(e) = self.refresh().await {
                tracing::error!(error = %e, "Failed to refresh tabs");
            }
        }
    }

    /// Apply a pending search term once its quiet period has elapsed
    pub fn poll_search(&self, now: Instant) -> bool {
        let Some(term) = self.debouncer.lock().poll(now) else {
            return false;
        };

        tracing::debug!(term = %term, "Applying search");
        self.state.write().filter.search_term = term;
        true
    }

    /// Wait out the debounce window of the pending search, then apply it
    pub async fn settle_search(&self) -> bool {
        let deadline = self.debouncer.lock().deadline();
        match deadline {
            Some(deadline) => {
                tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
                self.poll_search(Instant::now())
            }
            None => false,
        }
    }

    /// Run a command and turn the result into a user notice
    pub async fn handle(&self, command: Command) -> Notice {
        match self.dispatch(command).await {
            Ok(outcome) => Notice::from(&outcome),
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Command failed");
                Notice::from(&e)
            }
        }
    }

    pub async fn dispatch(&self, command: Command) -> Result<Outcome> {
        self.dispatch_at(command, Instant::now()).await
    }

    /// Dispatch with an explicit clock for the debounce and confirmation timers
    pub async fn dispatch_at(&self, command: Command, now: Instant) -> Result<Outcome> {
        let now_ms = Utc::now().timestamp_millis();

        match command {
            Command::Refresh => {
                self.refresh().await?;
                Ok(self.refreshed())
            }
            Command::SelectTab { id, selected } => {
                let mut state = self.state.write();
                state.select_tab(id, selected);
                Ok(Outcome::SelectionChanged {
                    selected: state.selection().len(),
                })
            }
            Command::SelectGroup { domain, selected } => {
                let mut state = self.state.write();
                state.select_group(&domain, selected, now_ms);
                Ok(Outcome::SelectionChanged {
                    selected: state.selection().len(),
                })
            }
            Command::SelectAll { selected } => {
                let mut state = self.state.write();
                state.select_all(selected, now_ms);
                Ok(Outcome::SelectionChanged {
                    selected: state.selection().len(),
                })
            }
            Command::EditSearch { term } => {
                self.debouncer.lock().push(term, now);
                Ok(Outcome::SearchPending)
            }
            Command::SetTimeFilter { millis } => {
                self.state.write().filter.time_filter = millis.max(0);
                Ok(Outcome::ViewChanged)
            }
            Command::SetSortBy { sort_by } => {
                self.state.write().filter.sort_by = sort_by;
                Ok(Outcome::ViewChanged)
            }
            Command::SetViewMode { view_mode } => {
                self.state.write().filter.view_mode = view_mode;
                Ok(Outcome::ViewChanged)
            }
            Command::SetWindowScope { scope } => {
                self.state.write().filter.window_scope = scope;
                self.refresh().await?;
                Ok(self.refreshed())
            }
            Command::ActivateTab { id } => self.activate_tab(id).await,
            Command::CloseSelected => self.close_selected(now).await,
            Command::BookmarkSelected => {
                let selected = self.selected_tabs();
                let tabs: Vec<&Tab> = selected.iter().collect();
                let report = bookmark_tabs(
                    &self.browser,
                    &tabs,
                    &self.config.bookmark_folder_prefix,
                    Local::now(),
                )
                .await?;
                Ok(Outcome::Bookmarked(report))
            }
            Command::ExportSelected => {
                let selected = self.selected_tabs();
                let tabs: Vec<&Tab> = selected.iter().collect();
                let artifact = export_tabs(&self.browser, &tabs, Local::now()).await?;
                Ok(Outcome::Exported(artifact))
            }
            Command::SaveSession { name } => self.save_session(&name).await,
            Command::RestoreSession { index } => {
                let session = self
                    .sessions
                    .load()
                    .await?
                    .into_iter()
                    .nth(index)
                    .ok_or(SessionError::NotFound(index))?;

                let report =
                    restore_session(&self.browser, &session, self.config.tab_load_timeout()).await?;
                Ok(Outcome::Restored(report))
            }
            Command::RenameSession { index, name } => {
                let sessions = self.sessions.rename(index, &name).await?;
                let name = sessions
                    .get(index)
                    .map(|s| s.name.clone())
                    .unwrap_or(name);
                self.state.write().set_sessions(sessions);
                Ok(Outcome::SessionRenamed { name })
            }
            Command::DeleteSession { index } => {
                let sessions = self.sessions.delete(index).await?;
                let remaining = sessions.len();
                self.state.write().set_sessions(sessions);
                Ok(Outcome::SessionDeleted { remaining })
            }
            Command::ImportSessions { raw } => {
                let result = self.sessions.import(&raw).await?;
                let added = result.added_count;
                self.state.write().set_sessions(result.merged);
                Ok(Outcome::Imported { added })
            }
            Command::ExportSessions => {
                let document = self.sessions.export_all(&self.config.exported_by).await?;
                Ok(Outcome::Exported(json_artifact("tabstash_sessions", &document)?))
            }
            Command::ExportSession { index } => {
                let export = self.sessions.export_one(index).await?;
                Ok(Outcome::Exported(json_artifact(&export.session.name, &export)?))
            }
        }
    }

    fn refreshed(&self) -> Outcome {
        Outcome::Refreshed {
            tab_count: self.state.read().tabs().len(),
        }
    }

    fn selected_tabs(&self) -> Vec<Tab> {
        self.state
            .read()
            .selected_tabs()
            .into_iter()
            .cloned()
            .collect()
    }

    async fn activate_tab(&self, id: TabId) -> Result<Outcome> {
        let window_id = self
            .state
            .read()
            .tab(id)
            .map(|t| t.window_id)
            .ok_or(CoreError::TabNotFound(id))?;

        self.browser.activate_tab(id).await?;
        self.browser.focus_window(window_id).await?;

        tracing::debug!(tab_id = id, window_id, "Activated tab");
        Ok(Outcome::Activated { id })
    }

    async fn close_selected(&self, now: Instant) -> Result<Outcome> {
        let ids: Vec<TabId> = self.selected_tabs().iter().map(|t| t.id).collect();
        if ids.is_empty() {
            self.close_confirmation.lock().reset();
            return Err(CoreError::NothingSelected);
        }

        let step = self.close_confirmation.lock().invoke(now);
        if step == ConfirmStep::Armed {
            return Ok(Outcome::CloseArmed { count: ids.len() });
        }

        self.browser.remove_tabs(&ids).await?;
        self.state.write().deselect(&ids);
        tracing::info!(count = ids.len(), "Closed selected tabs");

        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Failed to refresh after closing tabs");
        }

        Ok(Outcome::Closed { count: ids.len() })
    }

    async fn save_session(&self, name: &str) -> Result<Outcome> {
        let tabs: Vec<SessionTab> = self
            .selected_tabs()
            .iter()
            .map(SessionTab::from)
            .collect();

        let session = Session::create(name, tabs)?;
        let name = session.name.clone();
        let tab_count = session.tab_count();

        let sessions = self.sessions.add(session).await?;
        self.state.write().set_sessions(sessions);

        Ok(Outcome::SessionSaved { name, tab_count })
    }
}

fn json_artifact<T: Serialize>(stem: &str, value: &T) -> Result<ExportArtifact> {
    Ok(ExportArtifact {
        file_name: format!("{}_{}.json", sanitize_file_name(stem), file_timestamp(Local::now())),
        mime_type: "application/json".to_string(),
        bytes: serde_json::to_vec_pretty(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{Call, FakeBrowser};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tabstash_session::SESSIONS_KEY;
    use tabstash_storage::MemoryStore;
    use tabstash_tabs::WindowScope;

    fn browser() -> FakeBrowser {
        FakeBrowser::with_tabs(vec![
            Tab::new(1, 1, "https://www.rust-lang.org/", "Rust"),
            Tab::new(2, 1, "https://docs.rs/tokio", "tokio docs"),
            Tab::new(3, 1, "https://github.com/", "GitHub"),
            Tab::new(4, 2, "https://example.com/", "Example"),
        ])
    }

    async fn engine() -> Engine<FakeBrowser, MemoryStore> {
        let engine = Engine::new(Config::default(), browser(), MemoryStore::new());
        engine.initialize().await.unwrap();
        engine
    }

    fn stored(engine: &Engine<FakeBrowser, MemoryStore>) -> Value {
        engine.session_store().storage().snapshot(SESSIONS_KEY).unwrap()
    }

    #[tokio::test]
    async fn test_save_then_delete_session() {
        let engine = engine().await;
        engine.dispatch(Command::SelectTab { id: 1, selected: true }).await.unwrap();
        engine.dispatch(Command::SelectTab { id: 3, selected: true }).await.unwrap();

        let outcome = engine
            .dispatch(Command::SaveSession { name: "Work".into() })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::SessionSaved {
                name: "Work".into(),
                tab_count: 2
            }
        );

        let doc = stored(&engine);
        let sessions = doc["sessions"].as_array().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0]["name"], "Work");
        assert_eq!(sessions[0]["tabs"].as_array().unwrap().len(), 2);
        assert_eq!(sessions[0]["tabs"][0]["url"], "https://www.rust-lang.org/");

        engine.dispatch(Command::DeleteSession { index: 0 }).await.unwrap();
        assert_eq!(stored(&engine), json!({ "sessions": [] }));
        assert!(engine.with_state(|s| s.sessions().is_empty()));
    }

    #[tokio::test]
    async fn test_select_ignores_tabs_outside_snapshot() {
        let engine = engine().await;

        // Tab 4 lives in an unfocused window, 99 does not exist
        for id in [4, 99] {
            let outcome = engine.dispatch(Command::SelectTab { id, selected: true }).await.unwrap();
            assert_eq!(outcome, Outcome::SelectionChanged { selected: 0 });
        }
        assert!(engine.with_state(|s| s.selection().is_empty()));
    }

    #[tokio::test]
    async fn test_close_requires_confirmation() {
        let engine = engine().await;
        engine.dispatch(Command::SelectTab { id: 2, selected: true }).await.unwrap();

        let start = Instant::now();
        let first = engine.dispatch_at(Command::CloseSelected, start).await.unwrap();
        assert_eq!(first, Outcome::CloseArmed { count: 1 });
        assert!(!engine.browser().calls().iter().any(|c| matches!(c, Call::Remove(_))));

        let second = engine
            .dispatch_at(Command::CloseSelected, start + Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(second, Outcome::Closed { count: 1 });
        assert!(engine.browser().calls().contains(&Call::Remove(vec![2])));
        assert!(engine.with_state(|s| s.selection().is_empty()));
        assert_eq!(engine.with_state(|s| s.tabs().len()), 2);
    }

    #[tokio::test]
    async fn test_close_confirmation_expires() {
        let engine = engine().await;
        engine.dispatch(Command::SelectTab { id: 2, selected: true }).await.unwrap();

        let start = Instant::now();
        engine.dispatch_at(Command::CloseSelected, start).await.unwrap();
        let late = engine
            .dispatch_at(Command::CloseSelected, start + Duration::from_secs(4))
            .await
            .unwrap();
        assert_eq!(late, Outcome::CloseArmed { count: 1 });
        assert_eq!(engine.browser().tabs().len(), 4);
    }

    #[tokio::test]
    async fn test_window_scope_drives_query() {
        let engine = engine().await;
        assert_eq!(engine.with_state(|s| s.tabs().len()), 3);

        let outcome = engine
            .dispatch(Command::SetWindowScope { scope: WindowScope::All })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Refreshed { tab_count: 4 });
        assert!(engine.browser().calls().contains(&Call::Query(WindowScope::All)));
    }

    #[tokio::test]
    async fn test_search_is_debounced() {
        let engine = engine().await;
        let start = Instant::now();

        engine
            .dispatch_at(Command::EditSearch { term: "doc".into() }, start)
            .await
            .unwrap();
        engine
            .dispatch_at(Command::EditSearch { term: "docs".into() }, start + Duration::from_millis(50))
            .await
            .unwrap();

        assert!(!engine.poll_search(start + Duration::from_millis(100)));
        assert_eq!(engine.view().visible.len(), 3);

        assert!(engine.poll_search(start + Duration::from_millis(250)));
        let visible: Vec<TabId> = engine.view().visible.iter().map(|t| t.id).collect();
        assert_eq!(visible, vec![2]);
    }

    #[tokio::test]
    async fn test_settle_search_waits_for_quiet_period() {
        let engine = engine().await;
        engine
            .dispatch(Command::EditSearch { term: "github".into() })
            .await
            .unwrap();

        assert!(engine.settle_search().await);
        assert_eq!(engine.view().visible.len(), 1);
        assert!(!engine.settle_search().await);
    }

    #[tokio::test]
    async fn test_change_notifications_coalesce_and_prune() {
        let engine = engine().await;
        engine.dispatch(Command::SelectTab { id: 3, selected: true }).await.unwrap();

        engine.browser().remove_tabs(&[3]).await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(TabEvent::Removed).await.unwrap();
        tx.send(TabEvent::Updated).await.unwrap();
        drop(tx);

        engine.run_events(&mut rx).await;

        let queries = engine
            .browser()
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Query(_)))
            .count();
        assert_eq!(queries, 2);
        assert!(engine.with_state(|s| s.selection().is_empty()));
    }

    #[tokio::test]
    async fn test_activate_tab_focuses_window() {
        let engine = engine().await;
        engine.dispatch(Command::ActivateTab { id: 2 }).await.unwrap();

        let calls = engine.browser().calls();
        assert!(calls.ends_with(&[Call::Activate(2), Call::FocusWindow(1)]));

        let err = engine.dispatch(Command::ActivateTab { id: 99 }).await.unwrap_err();
        assert!(matches!(err, CoreError::TabNotFound(99)));
    }

    #[tokio::test]
    async fn test_failures_become_notices() {
        let engine = engine().await;

        let notice = engine.handle(Command::SaveSession { name: "Empty".into() }).await;
        assert!(notice.is_error());
        assert_eq!(notice.kind, Some(ErrorKind::Validation));

        let notice = engine.handle(Command::RestoreSession { index: 5 }).await;
        assert_eq!(notice.kind, Some(ErrorKind::Session));

        let notice = engine.handle(Command::ExportSelected).await;
        assert_eq!(notice.kind, Some(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_import_restore_roundtrip() {
        let engine = engine().await;
        let raw = r#"{"sessions":[{"name":"Trip","tabs":[{"url":"https://maps.test","title":"Maps"},{"url":"chrome://settings","title":"Settings"}],"date":1}]}"#;

        let outcome = engine
            .dispatch(Command::ImportSessions { raw: raw.into() })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Imported { added: 1 });

        let again = engine
            .dispatch(Command::ImportSessions { raw: raw.into() })
            .await
            .unwrap();
        assert_eq!(again, Outcome::Imported { added: 0 });

        match engine.dispatch(Command::RestoreSession { index: 0 }).await.unwrap() {
            Outcome::Restored(report) => {
                assert_eq!(report.opened_count, 1);
                assert_eq!(report.skipped, vec!["chrome://settings"]);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(engine
            .browser()
            .calls()
            .contains(&Call::CreateWindow("https://maps.test".into())));
    }

    #[tokio::test]
    async fn test_bookmark_selected() {
        let engine = engine().await;
        engine.dispatch(Command::SelectAll { selected: true }).await.unwrap();

        match engine.dispatch(Command::BookmarkSelected).await.unwrap() {
            Outcome::Bookmarked(report) => {
                assert!(report.folder_title.starts_with("Tabstash "));
                assert_eq!(report.created, 3);
                assert_eq!(report.failed, 0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_export_session_documents() {
        let engine = engine().await;
        engine.dispatch(Command::SelectTab { id: 1, selected: true }).await.unwrap();
        engine
            .dispatch(Command::SaveSession { name: "Reading".into() })
            .await
            .unwrap();

        let Outcome::Exported(all) = engine.dispatch(Command::ExportSessions).await.unwrap() else {
            panic!("expected an export");
        };
        assert!(all.file_name.starts_with("tabstash_sessions_"));
        let doc: Value = serde_json::from_slice(&all.bytes).unwrap();
        assert_eq!(doc["version"], "1.0");
        assert_eq!(doc["exportedBy"], "Tabstash");
        assert_eq!(doc["sessions"][0]["name"], "Reading");

        let Outcome::Exported(one) = engine
            .dispatch(Command::ExportSession { index: 0 })
            .await
            .unwrap()
        else {
            panic!("expected an export");
        };
        assert!(one.file_name.starts_with("Reading_"));
        let doc: Value = serde_json::from_slice(&one.bytes).unwrap();
        assert_eq!(doc["name"], "Reading");
        assert_eq!(doc["version"], "1.0");
    }
}
