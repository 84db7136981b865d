//! Note record definition.

use serde::{Deserialize, Serialize};

/// Tags assigned when classification yields nothing.
pub const DEFAULT_TAGS: &str = "general";

/// `strftime`-style format for [`Note::timestamp`] (second precision, local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single remembered fact, matching the `memory` table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Free-form note text. Never empty.
    pub text: String,
    /// Comma-separated labels assigned at ingestion.
    pub tags: String,
    /// Creation time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
    #[error("note text must not be empty")]
    EmptyText,
}

impl Note {
    /// Build a note stamped with the current local time.
    pub fn new(text: impl Into<String>, tags: impl Into<String>) -> Result<Self, NoteError> {
        Self::with_timestamp(text, tags, now_timestamp())
    }

    /// Build a note with an explicit timestamp.
    pub fn with_timestamp(
        text: impl Into<String>,
        tags: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Result<Self, NoteError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(NoteError::EmptyText);
        }

        let tags = tags.into();
        let tags = if tags.trim().is_empty() {
            DEFAULT_TAGS.to_string()
        } else {
            tags
        };

        Ok(Self {
            text,
            tags,
            timestamp: timestamp.into(),
        })
    }
}

/// Current local time formatted with [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
