//! Tab snapshot
//!
//! A tab as reported by the browser. `id` is the identity key everywhere:
//! selection, grouping and updates all refer to tabs by id.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain;

pub type TabId = i64;
pub type WindowId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    /// Browser-assigned identifier, unique while the tab lives
    pub id: TabId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "favIconUrl", skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    pub window_id: WindowId,
    #[serde(default)]
    pub active: bool,
    /// Milliseconds since the Unix epoch
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub last_accessed: i64,
}

impl Tab {
    pub fn new(id: TabId, window_id: WindowId, url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            favicon: None,
            pinned: false,
            window_id,
            active: false,
            last_accessed: 0,
        }
    }

    pub fn with_last_accessed(mut self, last_accessed: i64) -> Self {
        self.last_accessed = last_accessed;
        self
    }

    /// Get display title (with fallback to URL)
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Grouping key for this tab's URL
    pub fn domain(&self) -> String {
        domain::classify(&self.url)
    }
}

// Browsers report fractional milliseconds
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    Ok(millis as i64)
}
