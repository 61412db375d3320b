//! Session store
//!
//! CRUD over the persisted session list. The list is one document under
//! [`SESSIONS_KEY`]; every mutation reads, modifies and writes it as a unit
//! while holding the store's write lock.

use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use tabstash_storage::KeyValueStore;

use crate::error::{SessionError, Violation};
use crate::session::Session;
use crate::transfer::{self, ExportDocument, MergeResult, SessionExport};
use crate::Result;

pub const SESSIONS_KEY: &str = "sessions";

pub struct SessionStore<S> {
    storage: S,
    /// Serializes read-modify-write cycles
    write_lock: Arc<Mutex<()>>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load persisted sessions, most recent first. Malformed records are dropped.
    pub async fn load(&self) -> Result<Vec<Session>> {
        let Some(value) = self.storage.get(SESSIONS_KEY).await? else {
            return Ok(Vec::new());
        };

        match transfer::decode_sessions(&value) {
            Some(sessions) => Ok(sessions),
            None => {
                tracing::warn!("Stored session list has an unexpected shape, ignoring it");
                Ok(Vec::new())
            }
        }
    }

    /// Validate and persist the whole list. Nothing is written unless every
    /// session passes.
    pub async fn save(&self, sessions: &[Session]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.persist(sessions).await
    }

    async fn persist(&self, sessions: &[Session]) -> Result<()> {
        let violations: Vec<Violation> = sessions
            .iter()
            .enumerate()
            .flat_map(|(index, session)| {
                session.violations().into_iter().map(move |error| Violation {
                    index,
                    name: session.name.clone(),
                    error,
                })
            })
            .collect();

        if !violations.is_empty() {
            tracing::warn!(count = violations.len(), "Rejected session batch");
            return Err(SessionError::InvalidBatch(violations));
        }

        self.storage
            .set(SESSIONS_KEY, json!({ "sessions": sessions }))
            .await?;

        tracing::debug!(session_count = sessions.len(), "Persisted sessions");
        Ok(())
    }

    /// Prepend a new session
    pub async fn add(&self, session: Session) -> Result<Vec<Session>> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load().await?;

        tracing::info!(
            session_name = %session.name,
            tab_count = session.tab_count(),
            "Saving session"
        );

        sessions.insert(0, session);
        self.persist(&sessions).await?;
        Ok(sessions)
    }

    pub async fn rename(&self, index: usize, new_name: &str) -> Result<Vec<Session>> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load().await?;

        let session = sessions.get_mut(index).ok_or(SessionError::NotFound(index))?;
        session.rename(new_name)?;

        self.persist(&sessions).await?;
        Ok(sessions)
    }

    pub async fn delete(&self, index: usize) -> Result<Vec<Session>> {
        let _guard = self.write_lock.lock().await;
        let mut sessions = self.load().await?;

        if index >= sessions.len() {
            return Err(SessionError::NotFound(index));
        }
        let removed = sessions.remove(index);

        self.persist(&sessions).await?;
        tracing::info!(session_name = %removed.name, "Deleted session");
        Ok(sessions)
    }

    /// Merge an import file into the stored list
    pub async fn import(&self, raw: &str) -> Result<MergeResult> {
        let incoming = transfer::parse_import(raw)?;

        let _guard = self.write_lock.lock().await;
        let existing = self.load().await?;
        let result = transfer::import_merge(existing, incoming);

        if result.added_count > 0 {
            self.persist(&result.merged).await?;
        }

        tracing::info!(added = result.added_count, "Imported sessions");
        Ok(result)
    }

    pub async fn export_all(&self, exported_by: &str) -> Result<ExportDocument> {
        Ok(ExportDocument::new(self.load().await?, exported_by))
    }

    pub async fn export_one(&self, index: usize) -> Result<SessionExport> {
        let session = self
            .load()
            .await?
            .into_iter()
            .nth(index)
            .ok_or(SessionError::NotFound(index))?;
        Ok(SessionExport::new(session))
    }
}

impl<S: Clone> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}
