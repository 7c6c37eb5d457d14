//! Export of a session into one self-contained HTML document.
//!
//! The document embeds the graph as a PNG data URI, so it can be opened
//! anywhere without the application running.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::gateway::Role;
use crate::graph::GraphSnapshot;
use crate::session::{Message, Note};

/// Characters of each message kept in a note preview.
pub const PREVIEW_CHARS: usize = 120;

/// Shown when the session has no user message yet.
pub const NO_QUESTION_PLACEHOLDER: &str = "(no question asked yet)";

/// Shown when the session has no assistant message yet.
pub const NO_REPLY_PLACEHOLDER: &str = "(no reply yet)";

/// A rendered export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub filename: String,
    pub html: String,
    pub exported_at: DateTime<Utc>,
}

impl ExportDocument {
    /// Write the document into `dir` under its own filename.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> ExportResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.html)?;
        info!(path = %path.display(), bytes = self.html.len(), "Session exported");
        Ok(path)
    }
}

/// `socratic-snapshot-<millis>.html`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("socratic-snapshot-{}.html", at.timestamp_millis())
}

/// Build the export document.
///
/// Fails with [`ExportError::GraphNotReady`] when there is no graph image yet;
/// nothing is produced in that case.
pub fn export_session(
    messages: &[Message],
    notes: &[Note],
    snapshot: Option<&GraphSnapshot>,
    exported_at: DateTime<Utc>,
) -> ExportResult<ExportDocument> {
    let snapshot = snapshot.ok_or(ExportError::GraphNotReady)?;

    let first_question = messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or(NO_QUESTION_PLACEHOLDER);
    let last_reply = messages
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
        .unwrap_or(NO_REPLY_PLACEHOLDER);

    let mut html = String::with_capacity(snapshot.png.len() * 2 + 4096);
    html.push_str(HEAD);

    let _ = write!(
        html,
        "<header>\n<h1>Socratic dialogue</h1>\n<p class=\"date\">Exported {}</p>\n</header>\n",
        exported_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    html.push_str("<section class=\"summary\">\n");
    let _ = write!(
        html,
        "<h2>Opening question</h2>\n<blockquote>{}</blockquote>\n",
        paragraphs(first_question)
    );
    let _ = write!(
        html,
        "<h2>Latest reply</h2>\n<blockquote>{}</blockquote>\n",
        paragraphs(last_reply)
    );
    html.push_str("</section>\n");

    let _ = write!(
        html,
        "<section class=\"graph\">\n<h2>Topic graph</h2>\n<img alt=\"topic graph\" width=\"{}\" height=\"{}\" src=\"{}\">\n</section>\n",
        snapshot.width,
        snapshot.height,
        snapshot.data_uri()
    );

    let _ = write!(
        html,
        "<section class=\"transcript\">\n<h2>Transcript ({} messages)</h2>\n",
        messages.len()
    );
    for message in messages {
        let _ = write!(
            html,
            "<div class=\"message {role}\"><span class=\"role\">{role}</span>{body}</div>\n",
            role = message.role.as_str(),
            body = paragraphs(&message.content)
        );
    }
    html.push_str("</section>\n");

    let _ = write!(
        html,
        "<section class=\"notes\">\n<h2>Notes ({})</h2>\n",
        notes.len()
    );
    for note in notes {
        write_note(&mut html, note);
    }
    html.push_str("</section>\n</body>\n</html>\n");

    Ok(ExportDocument {
        filename: export_filename(exported_at),
        html,
        exported_at,
    })
}

fn write_note(html: &mut String, note: &Note) {
    let _ = write!(
        html,
        "<article class=\"note\">\n<p class=\"meta\">{} messages &middot; reflection {} chars &middot; {}</p>\n<ul>\n",
        note.selected_messages.len(),
        note.reflection.chars().count(),
        note.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for message in &note.selected_messages {
        let _ = write!(
            html,
            "<li><span class=\"role\">{}</span>{}</li>\n",
            message.role.as_str(),
            escape_html(&preview(&message.content, PREVIEW_CHARS))
        );
    }
    html.push_str("</ul>\n");
    if !note.reflection.is_empty() {
        let _ = write!(
            html,
            "<div class=\"reflection\">{}</div>\n",
            paragraphs(&note.reflection)
        );
    }
    html.push_str("</article>\n");
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Blank lines separate paragraphs; single newlines become `<br>`.
fn paragraphs(text: &str) -> String {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect()
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Socratic dialogue snapshot</title>
<style>
body { font-family: Georgia, serif; max-width: 760px; margin: 2rem auto; color: #1c1c1c; background: #f7f4ee; }
h1, h2 { font-weight: normal; }
.date, .meta { color: #777; font-size: 0.9rem; }
blockquote { border-left: 3px solid #d94f2b; margin: 0; padding-left: 1rem; }
.message { margin: 0.75rem 0; }
.message .role, li .role { font-family: monospace; font-size: 0.8rem; text-transform: uppercase; margin-right: 0.5rem; color: #777; }
.message.assistant { color: #2b2b6c; }
.note { border: 1px solid #ddd; padding: 0.5rem 1rem; margin: 1rem 0; background: #fff; }
img { border: 1px solid #ddd; max-width: 100%; height: auto; }
</style>
</head>
<body>
"#;
