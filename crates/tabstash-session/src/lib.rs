//! Tabstash Session Management
//!
//! - A Session is a named, durable snapshot of tab URL/title pairs
//! - All sessions live in one JSON document, most recent first
//! - Writes validate the whole batch before anything is persisted
//! - Imports are purely additive and de-duplicated by name
//! - Sessions are local-only (no cross-device sync)

mod error;
mod manager;
mod plan;
mod session;
mod transfer;

pub use error::{SessionError, ValidationError, Violation};
pub use manager::{SessionStore, SESSIONS_KEY};
pub use plan::{is_restorable, RestorePlan};
pub use session::{validate_name, validate_url, Session, SessionTab, MAX_NAME_LEN};
pub use transfer::{import_merge, parse_import, ExportDocument, MergeResult, SessionExport, EXPORT_VERSION};

pub type Result<T> = std::result::Result<T, SessionError>;
