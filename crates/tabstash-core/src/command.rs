//! User intents and their results
//!
//! The presentation layer turns every button, checkbox and text field into
//! a [`Command`] and shows the [`Notice`] the engine hands back.

use serde::{Deserialize, Serialize};

use tabstash_tabs::{SortBy, TabId, ViewMode, WindowScope};

use crate::bookmarks::BookmarkReport;
use crate::error::{CoreError, ErrorKind};
use crate::export::ExportArtifact;
use crate::restore::RestoreReport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    Refresh,
    SelectTab { id: TabId, selected: bool },
    SelectGroup { domain: String, selected: bool },
    SelectAll { selected: bool },
    /// Debounced before it reaches the pipeline
    EditSearch { term: String },
    SetTimeFilter { millis: i64 },
    SetSortBy { sort_by: SortBy },
    SetViewMode { view_mode: ViewMode },
    SetWindowScope { scope: WindowScope },
    ActivateTab { id: TabId },
    CloseSelected,
    BookmarkSelected,
    ExportSelected,
    SaveSession { name: String },
    RestoreSession { index: usize },
    RenameSession { index: usize, name: String },
    DeleteSession { index: usize },
    ImportSessions { raw: String },
    ExportSessions,
    ExportSession { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outcome {
    Refreshed { tab_count: usize },
    SelectionChanged { selected: usize },
    SearchPending,
    ViewChanged,
    Activated { id: TabId },
    CloseArmed { count: usize },
    Closed { count: usize },
    Bookmarked(BookmarkReport),
    Exported(ExportArtifact),
    SessionSaved { name: String, tab_count: usize },
    Restored(RestoreReport),
    SessionRenamed { name: String },
    SessionDeleted { remaining: usize },
    Imported { added: usize },
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Refreshed { tab_count } => format!("{tab_count} tabs"),
            Outcome::SelectionChanged { selected } => format!("{selected} selected"),
            Outcome::SearchPending => "Searching...".to_string(),
            Outcome::ViewChanged => "View updated".to_string(),
            Outcome::Activated { .. } => "Switched to tab".to_string(),
            Outcome::CloseArmed { count } => {
                format!("Click again to close {count} tab(s)")
            }
            Outcome::Closed { count } => format!("Closed {count} tab(s)"),
            Outcome::Bookmarked(report) if report.failed > 0 => format!(
                "Bookmarked {} tab(s) in \"{}\", {} failed",
                report.created, report.folder_title, report.failed
            ),
            Outcome::Bookmarked(report) => format!(
                "Bookmarked {} tab(s) in \"{}\"",
                report.created, report.folder_title
            ),
            Outcome::Exported(artifact) => format!("Exported {}", artifact.file_name),
            Outcome::SessionSaved { name, tab_count } => {
                format!("Saved session \"{name}\" with {tab_count} tab(s)")
            }
            Outcome::Restored(report) if report.skipped.is_empty() => {
                format!("Restored {} tab(s)", report.opened_count)
            }
            Outcome::Restored(report) => format!(
                "Restored {} tab(s), {} could not be reopened",
                report.opened_count,
                report.skipped.len()
            ),
            Outcome::SessionRenamed { name } => format!("Renamed session to \"{name}\""),
            Outcome::SessionDeleted { .. } => "Session deleted".to_string(),
            Outcome::Imported { added: 0 } => "No new sessions to import".to_string(),
            Outcome::Imported { added } => format!("Imported {added} session(s)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient, non-blocking notification for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
            kind: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&Outcome> for Notice {
    fn from(outcome: &Outcome) -> Self {
        Notice::info(outcome.message())
    }
}

impl From<&CoreError> for Notice {
    fn from(error: &CoreError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: error.to_string(),
            kind: Some(error.kind()),
        }
    }
}
