//! Import and export documents
//!
//! Everything read back from storage or an import file is untrusted: records
//! are decoded one by one and any record that would not pass a save is
//! dropped instead of failing the whole read.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::SessionError;
use crate::session::Session;
use crate::Result;

pub const EXPORT_VERSION: &str = "1.0";

/// Export of the whole session list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub sessions: Vec<Session>,
    /// Milliseconds since the Unix epoch, like `Session::date`
    pub exported_at: i64,
    pub version: String,
    pub exported_by: String,
}

impl ExportDocument {
    pub fn new(sessions: Vec<Session>, exported_by: impl Into<String>) -> Self {
        Self {
            sessions,
            exported_at: Utc::now().timestamp_millis(),
            version: EXPORT_VERSION.to_string(),
            exported_by: exported_by.into(),
        }
    }
}

/// Export of one session, fields inlined next to the version tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    #[serde(flatten)]
    pub session: Session,
    pub exported_at: i64,
    pub version: String,
}

impl SessionExport {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            exported_at: Utc::now().timestamp_millis(),
            version: EXPORT_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub merged: Vec<Session>,
    pub added_count: usize,
}

/// Prepend incoming sessions whose names are not taken yet.
///
/// Existing sessions are never updated or replaced; an incoming name that
/// repeats within the same batch is only added once.
pub fn import_merge(existing: Vec<Session>, incoming: Vec<Session>) -> MergeResult {
    let mut taken: HashSet<String> = existing.iter().map(|s| s.name.clone()).collect();

    let mut merged: Vec<Session> = incoming
        .into_iter()
        .filter(|s| taken.insert(s.name.clone()))
        .collect();
    let added_count = merged.len();

    merged.extend(existing);
    MergeResult {
        merged,
        added_count,
    }
}

/// Parse an import file: an export document, a bare array, or a single
/// session export.
pub fn parse_import(raw: &str) -> Result<Vec<Session>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| SessionError::CorruptImport(format!("not valid JSON: {e}")))?;

    if let Some(sessions) = decode_sessions(&value) {
        return Ok(sessions);
    }

    if value.get("name").is_some() && value.get("tabs").is_some() {
        return Ok(decode_record(&value).into_iter().collect());
    }

    Err(SessionError::CorruptImport(
        "expected a session list or a single session".to_string(),
    ))
}

/// Decode `{ sessions: [...] }` or a bare array; `None` for any other shape
pub(crate) fn decode_sessions(value: &Value) -> Option<Vec<Session>> {
    let records = match value {
        Value::Array(records) => records,
        Value::Object(map) => map.get("sessions")?.as_array()?,
        _ => return None,
    };

    Some(records.iter().filter_map(decode_record).collect())
}

/// Decoded records are held to the same rules as writes, so whatever is
/// loaded can always be persisted again.
fn decode_record(record: &Value) -> Option<Session> {
    match serde_json::from_value::<Session>(record.clone()) {
        Ok(session) => {
            let violations = session.violations();
            if violations.is_empty() {
                return Some(session);
            }
            tracing::warn!(
                session_name = %session.name,
                error = %violations[0],
                violations = violations.len(),
                "Dropping malformed session record"
            );
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dropping undecodable session record");
            None
        }
    }
}
