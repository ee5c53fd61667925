// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Comment submission checks for letter threads.
//!
//! A submission is validated, its content sanitized, and a plain-text
//! excerpt derived. Storing the result is left to the caller.

use crate::config::CommentConfig;
use crate::sanitizer::{extract_plain_text, sanitize_html};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Reasons a submission is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error("threadId required")]
    MissingThread,

    #[error("author is required")]
    MissingAuthor,

    #[error("Content is required")]
    ContentRequired,

    #[error("Comment too long")]
    TooLong { chars: usize, max: usize },

    #[error("Content too long")]
    SanitizedTooLong { chars: usize, max: usize },
}

impl CommentError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingThread => "MISSING_THREAD",
            Self::MissingAuthor => "MISSING_AUTHOR",
            Self::ContentRequired => "CONTENT_REQUIRED",
            Self::TooLong { .. } => "COMMENT_TOO_LONG",
            Self::SanitizedTooLong { .. } => "CONTENT_TOO_LONG",
        }
    }
}

/// Comment author as sent by the letters page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// Raw comment submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSubmission {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<Author>,
}

/// A submission that passed every check, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedComment {
    pub thread_id: String,
    pub author: Author,
    /// Sanitized HTML
    pub content: String,
    /// Plain-text preview of the sanitized content
    pub excerpt: String,
    pub received_at: DateTime<Utc>,
}

/// Validate and sanitize a submission.
pub fn prepare_comment(
    submission: &CommentSubmission,
    limits: &CommentConfig,
) -> Result<PreparedComment, CommentError> {
    let thread_id = submission.thread_id.trim();
    if thread_id.is_empty() {
        return Err(CommentError::MissingThread);
    }

    let author = submission
        .author
        .as_ref()
        .map(|a| Author {
            name: a.name.trim().to_string(),
            address: a.address.trim().to_string(),
        })
        .filter(|a| !a.name.is_empty() && !a.address.is_empty())
        .ok_or(CommentError::MissingAuthor)?;

    let raw = match submission.content.as_deref() {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(CommentError::ContentRequired),
    };

    let chars = raw.chars().count();
    if chars > limits.max_content_chars {
        return Err(CommentError::TooLong {
            chars,
            max: limits.max_content_chars,
        });
    }

    let clean = sanitize_html(raw);
    if extract_plain_text(raw).is_empty() {
        return Err(CommentError::ContentRequired);
    }

    let clean_chars = clean.chars().count();
    if clean_chars > limits.max_content_chars {
        return Err(CommentError::SanitizedTooLong {
            chars: clean_chars,
            max: limits.max_content_chars,
        });
    }

    let excerpt = excerpt(&extract_plain_text(&clean), limits.excerpt_chars);
    debug!(
        thread_id,
        raw_chars = chars,
        clean_chars,
        "Comment prepared"
    );

    Ok(PreparedComment {
        thread_id: thread_id.to_string(),
        author,
        content: clean,
        excerpt,
        received_at: Utc::now(),
    })
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
    }
}
