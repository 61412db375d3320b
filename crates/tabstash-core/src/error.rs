//! Core error types

use serde::Serialize;
use thiserror::Error;

use tabstash_session::{SessionError, ValidationError};
use tabstash_storage::StorageError;
use tabstash_tabs::TabId;

use crate::browser_api::BrowserApiError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Browser(#[from] BrowserApiError),

    #[error("Failed to capture {title:?}: {source}")]
    CaptureFailed {
        title: String,
        #[source]
        source: BrowserApiError,
    },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No tabs selected")]
    NothingSelected,

    #[error("Tab not found: {0}")]
    TabNotFound(TabId),
}

/// Coarse category used to pick how a failure is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    BrowserApi,
    Session,
    Storage,
    Export,
    Config,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Validation(_) | CoreError::NothingSelected => ErrorKind::Validation,
            CoreError::Session(SessionError::Validation(_) | SessionError::InvalidBatch(_)) => {
                ErrorKind::Validation
            }
            CoreError::Session(SessionError::Storage(_)) | CoreError::Storage(_) => {
                ErrorKind::Storage
            }
            CoreError::Session(_) => ErrorKind::Session,
            CoreError::Browser(_) | CoreError::TabNotFound(_) => ErrorKind::BrowserApi,
            CoreError::CaptureFailed { .. } | CoreError::Archive(_) | CoreError::Io(_) => {
                ErrorKind::Export
            }
            CoreError::Serialization(_) | CoreError::Config(_) => ErrorKind::Config,
        }
    }
}
