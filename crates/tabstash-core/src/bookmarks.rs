//! Bulk bookmarking
//!
//! Bookmarks every selected tab into one freshly created folder. A failed
//! entry is logged and counted; the remaining tabs are still bookmarked.

use chrono::{DateTime, Local};
use serde::Serialize;

use tabstash_tabs::Tab;

use crate::browser_api::BrowserApi;
use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkReport {
    pub folder_title: String,
    pub created: usize,
    pub failed: usize,
}

pub fn folder_title(prefix: &str, now: DateTime<Local>) -> String {
    let prefix = prefix.trim();
    let stamp = now.format("%Y-%m-%d %H:%M");
    if prefix.is_empty() {
        stamp.to_string()
    } else {
        format!("{prefix} {stamp}")
    }
}

pub async fn bookmark_tabs<B>(
    browser: &B,
    tabs: &[&Tab],
    folder_prefix: &str,
    now: DateTime<Local>,
) -> Result<BookmarkReport>
where
    B: BrowserApi + ?Sized,
{
    if tabs.is_empty() {
        return Err(CoreError::NothingSelected);
    }

    let title = folder_title(folder_prefix, now);
    let folder_id = browser.create_bookmark_folder(&title).await?;

    let mut report = BookmarkReport {
        folder_title: title,
        created: 0,
        failed: 0,
    };

    for tab in tabs {
        match browser
            .create_bookmark(&folder_id, tab.display_title(), &tab.url)
            .await
        {
            Ok(_) => report.created += 1,
            Err(e) => {
                tracing::warn!(tab_id = tab.id, url = %tab.url, error = %e, "Failed to bookmark tab");
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        folder = %report.folder_title,
        created = report.created,
        failed = report.failed,
        "Bookmarked tabs"
    );

    Ok(report)
}
