//! Export bundler
//!
//! One selected tab becomes a single MHTML download. Several tabs are
//! captured one after another and zipped; the first failed capture aborts
//! the export so a partial archive is never produced.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use tabstash_tabs::Tab;

use crate::browser_api::BrowserApi;
use crate::error::CoreError;
use crate::Result;

const MAX_FILE_STEM: usize = 100;

/// Characters that are not allowed in file names on common platforms
const UNSAFE_FILE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A file ready to hand to the downloads surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

pub async fn export_tabs<B>(browser: &B, tabs: &[&Tab], now: DateTime<Local>) -> Result<ExportArtifact>
where
    B: BrowserApi + ?Sized,
{
    let stamp = file_timestamp(now);

    match tabs {
        [] => Err(CoreError::NothingSelected),
        [tab] => {
            let bytes = capture(browser, tab).await?;
            tracing::info!(tab_id = tab.id, bytes = bytes.len(), "Captured tab");
            Ok(ExportArtifact {
                file_name: format!("{}_{stamp}.mhtml", sanitize_file_name(tab.display_title())),
                mime_type: "multipart/related".to_string(),
                bytes,
            })
        }
        _ => {
            let mut captures = Vec::with_capacity(tabs.len());
            for tab in tabs {
                captures.push((*tab, capture(browser, tab).await?));
            }

            let bytes = bundle(&captures)?;
            tracing::info!(tab_count = captures.len(), bytes = bytes.len(), "Bundled tab archive");
            Ok(ExportArtifact {
                file_name: format!("tabs_{stamp}.zip"),
                mime_type: "application/zip".to_string(),
                bytes,
            })
        }
    }
}

async fn capture<B>(browser: &B, tab: &Tab) -> Result<Vec<u8>>
where
    B: BrowserApi + ?Sized,
{
    browser
        .capture_page(tab.id)
        .await
        .map_err(|source| CoreError::CaptureFailed {
            title: tab.display_title().to_string(),
            source,
        })
}

fn bundle(captures: &[(&Tab, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, (tab, bytes)) in captures.iter().enumerate() {
        // Index prefix keeps entry names unique when titles collide
        let entry = format!("{:02}_{}.mhtml", index + 1, sanitize_file_name(tab.display_title()));
        zip.start_file(entry, options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

pub fn file_timestamp(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Replace characters that are unsafe in file names and bound the length
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_whitespace() {
                ' '
            } else if UNSAFE_FILE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed: String = collapsed.chars().take(MAX_FILE_STEM).collect();
    let trimmed = trimmed.trim();

    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
