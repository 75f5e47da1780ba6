use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_NOTE_TITLE_LEN: usize = 3;
pub const MAX_NOTE_TITLE_LEN: usize = 20;

/// Source text and its AI summary.
///
/// `original_note` is the URL of the uploaded file in object storage when the
/// note was created from a file; pasted-text notes have none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub text: String,
    pub original_note: Option<String>,
    pub summarized_note: String,
    pub downloaded_pdf: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields written when a note is created or re-summarized.
#[derive(Debug, Clone)]
pub struct NoteContent {
    pub title: String,
    pub text: String,
    pub original_note: Option<String>,
    pub summarized_note: String,
}

/// Requested summary length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// Unknown tiers fall back to `Medium`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Self::Short,
            "long" => Self::Long,
            _ => Self::Medium,
        }
    }

    /// Target word-count range handed to the summarizer.
    pub fn word_count(&self) -> &'static str {
        match self {
            Self::Short => "100-120",
            Self::Medium => "150-200",
            Self::Long => "180-200",
        }
    }
}

/// Word-count range for a tier name; anything unrecognized gets the medium range.
pub fn get_summary_word_count(length: &str) -> &'static str {
    SummaryLength::parse(length).word_count()
}

/// Validates a note title, returning it trimmed.
pub fn validate_note_title(title: Option<&str>) -> Result<String, String> {
    let title = title.map(str::trim).unwrap_or_default();
    let len = title.chars().count();
    if !(MIN_NOTE_TITLE_LEN..=MAX_NOTE_TITLE_LEN).contains(&len) {
        return Err(format!(
            "Title must be between {MIN_NOTE_TITLE_LEN} and {MAX_NOTE_TITLE_LEN} characters"
        ));
    }
    Ok(title.to_string())
}
