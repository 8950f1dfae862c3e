//! Transcript export. Stateless: takes a window's message log and writes a
//! JSON artifact (file or clipboard); the lifecycle core never depends on
//! this module.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use thiserror::Error;

use crate::chat::{Message, Sender};
use crate::window::WindowId;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write transcript: {0}")]
    Io(#[from] std::io::Error),
    #[error("clipboard backend error: {0}")]
    Clipboard(#[from] arboard::Error),
}

#[derive(Debug, Serialize)]
struct Transcript<'a> {
    id: &'a str,
    theme: &'a str,
    #[serde(rename = "exportedAt")]
    exported_at: String,
    messages: Vec<TranscriptMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct TranscriptMessage<'a> {
    sender: Sender,
    content: &'a str,
    timestamp: String,
}

fn iso8601(ts: DateTime<Local>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// Pretty-printed transcript JSON with ISO-8601 timestamps.
pub fn transcript_json(
    window: WindowId,
    theme: &str,
    messages: &[Message],
) -> Result<String, ExportError> {
    let transcript = Transcript {
        id: window.slug(),
        theme,
        exported_at: iso8601(Local::now()),
        messages: messages
            .iter()
            .map(|m| TranscriptMessage {
                sender: m.sender,
                content: &m.content,
                timestamp: iso8601(m.timestamp),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&transcript)?)
}

/// Writes the transcript into `dir` and returns the path of the new file.
pub fn export_to_dir(
    dir: &Path,
    window: WindowId,
    theme: &str,
    messages: &[Message],
) -> Result<PathBuf, ExportError> {
    let json = transcript_json(window, theme, messages)?;
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("chat-desk-{}-{stamp}.json", window.slug()));
    fs::write(&path, json)?;
    tracing::debug!(path = %path.display(), "exported transcript");
    Ok(path)
}

/// Places the transcript JSON on the system clipboard.
pub fn copy_to_clipboard(
    window: WindowId,
    theme: &str,
    messages: &[Message],
) -> Result<(), ExportError> {
    let json = transcript_json(window, theme, messages)?;
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(json)?;
    Ok(())
}
