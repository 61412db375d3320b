//! Session data structure

use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::Url;

use tabstash_tabs::Tab;

use crate::error::ValidationError;

pub const MAX_NAME_LEN: usize = 100;

/// Characters that break file names on common platforms
const UNSAFE_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Browser-independent projection of a tab; ids do not survive restarts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTab {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl SessionTab {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

impl From<&Tab> for SessionTab {
    fn from(tab: &Tab) -> Self {
        Self {
            url: tab.url.clone(),
            title: tab.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Human-readable name, also used for export file names
    pub name: String,
    /// Ordered tabs, at least one
    pub tabs: Vec<SessionTab>,
    /// Creation time in milliseconds since the Unix epoch
    #[serde(default)]
    pub date: i64,
}

impl Session {
    pub fn create(name: &str, tabs: Vec<SessionTab>) -> Result<Self, ValidationError> {
        let name = name.trim();
        validate_name(name)?;
        if tabs.is_empty() {
            return Err(ValidationError::NoTabs);
        }

        Ok(Self {
            name: name.to_string(),
            tabs,
            date: Utc::now().timestamp_millis(),
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        let name = name.trim();
        validate_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    /// Every constraint this session violates, empty when valid
    pub fn violations(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Err(e) = validate_name(&self.name) {
            errors.push(e);
        }
        if self.tabs.is_empty() {
            errors.push(ValidationError::NoTabs);
        }
        errors.extend(self.tabs.iter().filter_map(|t| validate_url(&t.url).err()));
        errors
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ValidationError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }

    match name
        .chars()
        .find(|c| UNSAFE_NAME_CHARS.contains(c) || c.is_control())
    {
        Some(c) => Err(ValidationError::UnsafeName(c)),
        None => Ok(()),
    }
}

/// Syntactic check only; any scheme is accepted
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    Url::parse(url)
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidUrl(url.to_string()))
}
