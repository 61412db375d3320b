//! Restore planning
//!
//! Splits a session into the tabs the browser can reopen and the ones it
//! cannot. Executing the plan against a browser lives in the core crate.

use url::Url;

use crate::error::SessionError;
use crate::session::{Session, SessionTab};
use crate::Result;

/// Only plain web pages can be reopened from an extension surface
pub fn is_restorable(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestorePlan {
    /// Reopenable tabs, in session order
    pub valid: Vec<SessionTab>,
    /// Everything else, in session order
    pub invalid: Vec<SessionTab>,
}

impl RestorePlan {
    pub fn partition(tabs: &[SessionTab]) -> Self {
        let (valid, invalid): (Vec<SessionTab>, Vec<SessionTab>) = tabs
            .iter()
            .cloned()
            .partition(|t| is_restorable(&t.url));
        Self { valid, invalid }
    }

    pub fn for_session(session: &Session) -> Result<Self> {
        if session.tabs.is_empty() {
            return Err(SessionError::EmptySession(session.name.clone()));
        }

        let plan = Self::partition(&session.tabs);
        if plan.is_empty() {
            return Err(SessionError::NothingToRestore);
        }
        Ok(plan)
    }

    pub fn skipped_urls(&self) -> Vec<String> {
        self.invalid.iter().map(|t| t.url.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }
}
