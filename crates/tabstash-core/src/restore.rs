//! Session restore
//!
//! Reopens a saved session in a new window. Restorable tabs after the first
//! are created in the background one at a time: each is awaited until it has
//! loaded, then discarded, before the next one is created. URLs the browser
//! cannot reopen are listed on a generated report page instead.

use serde::Serialize;
use std::time::Duration;

use tabstash_session::{RestorePlan, Session, SessionTab};
use tabstash_tabs::{TabId, WindowId};

use crate::browser_api::{BrowserApi, BrowserApiError, CreateTab};
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    /// Tabs actually created, the window's first tab included
    pub opened_count: usize,
    /// URLs that cannot be reopened, listed on the report page
    pub skipped: Vec<String>,
    /// Restorable URLs whose tab could not be created
    pub failed: Vec<String>,
    pub window_id: Option<WindowId>,
}

pub async fn restore_session<B>(
    browser: &B,
    session: &Session,
    load_timeout: Duration,
) -> Result<RestoreReport>
where
    B: BrowserApi + ?Sized,
{
    let plan = RestorePlan::for_session(session)?;
    let mut report = RestoreReport {
        skipped: plan.skipped_urls(),
        ..Default::default()
    };

    tracing::info!(
        session_name = %session.name,
        restorable = plan.valid.len(),
        skipped = plan.invalid.len(),
        "Restoring session"
    );

    if let Some((first, rest)) = plan.valid.split_first() {
        let window_id = browser.create_window(&first.url).await?;
        report.window_id = Some(window_id);
        report.opened_count = 1;

        for tab in rest {
            match open_background_tab(browser, window_id, tab, load_timeout).await {
                Ok(_) => report.opened_count += 1,
                Err(e) => {
                    tracing::warn!(url = %tab.url, error = %e, "Failed to restore tab");
                    report.failed.push(tab.url.clone());
                }
            }
        }
    }

    if !report.skipped.is_empty() {
        let page = report_page_url(&report.skipped);
        match report.window_id {
            Some(window_id) => {
                let request = CreateTab {
                    window_id,
                    url: page,
                    active: false,
                };
                if let Err(e) = browser.create_tab(request).await {
                    tracing::warn!(error = %e, "Failed to open skipped-tabs report");
                }
            }
            None => {
                report.window_id = Some(browser.create_window(&page).await?);
            }
        }
    }

    tracing::info!(
        session_name = %session.name,
        opened = report.opened_count,
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "Restored session"
    );

    Ok(report)
}

/// Create an inactive tab, wait for it to load, then discard it.
///
/// Only creation failure is an error; the tab exists afterwards either way.
async fn open_background_tab<B>(
    browser: &B,
    window_id: WindowId,
    tab: &SessionTab,
    load_timeout: Duration,
) -> std::result::Result<TabId, BrowserApiError>
where
    B: BrowserApi + ?Sized,
{
    let tab_id = browser
        .create_tab(CreateTab {
            window_id,
            url: tab.url.clone(),
            active: false,
        })
        .await?;

    match tokio::time::timeout(load_timeout, browser.wait_for_load(tab_id)).await {
        Ok(Ok(())) => {
            if let Err(e) = browser.discard_tab(tab_id).await {
                tracing::warn!(tab_id, error = %e, "Failed to discard restored tab");
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(tab_id, error = %e, "Restored tab failed to report load");
        }
        Err(_) => {
            tracing::warn!(tab_id, ?load_timeout, "Restored tab did not finish loading, leaving it loaded");
        }
    }

    Ok(tab_id)
}

/// Self-contained page listing skipped URLs, as a `data:` URL
pub fn report_page_url(skipped: &[String]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Skipped tabs</title></head><body>",
    );
    html.push_str("<h1>Some tabs could not be restored</h1>");
    html.push_str("<p>These addresses cannot be reopened automatically:</p><ul>");
    for url in skipped {
        html.push_str("<li>");
        html.push_str(&escape_html(url));
        html.push_str("</li>");
    }
    html.push_str("</ul></body></html>");

    format!("data:text/html;charset=utf-8,{}", urlencoding::encode(&html))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
