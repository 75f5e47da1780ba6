//! Note summarization.
//!
//! Create runs extract → summarize → upload → persist, so a failed summary never
//! leaves an orphaned upload behind. If the insert fails after the upload, the
//! file is deleted again. Deletes remove the stored file before the row, and a
//! storage failure keeps the row.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Extension,
};
use uuid::Uuid;

use crate::ai::{summary_prompt, SUMMARY_OPTIONS};
use crate::api::error::ApiError;
use crate::api::extract::AppPath;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::extract::extract_text;
use crate::models::*;
use crate::storage::ObjectStorage;

const NOTE_FOLDER: &str = "notes";
const NOTE_NOT_FOUND: &str = "Note not found";

/// Fields of the note multipart form.
#[derive(Debug, Default)]
struct NoteForm {
    title: Option<String>,
    text: Option<String>,
    summary_length: Option<String>,
    file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    filename: String,
    bytes: Vec<u8>,
}

impl NoteForm {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiError> {
        let mut multipart = multipart?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "title" => form.title = Some(field.text().await?),
                "text" => form.text = Some(field.text().await?),
                "summaryLength" => form.summary_length = Some(field.text().await?),
                "originalNote" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !filename.is_empty() && !bytes.is_empty() {
                        form.file = Some(UploadedFile {
                            filename,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
            }
        }

        Ok(form)
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    fn word_count(&self) -> &'static str {
        get_summary_word_count(self.summary_length.as_deref().unwrap_or("medium"))
    }
}

async fn summarize(state: &AppState, text: &str, word_count: &str) -> Result<String, ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::bad_request("Input text cannot be empty"));
    }
    let summary = state
        .ai
        .generate(&summary_prompt(text, word_count), SUMMARY_OPTIONS)
        .await?;
    tracing::debug!(
        model = state.ai.model_name(),
        summary_len = summary.len(),
        "Summary generated"
    );
    Ok(summary)
}

pub async fn create_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Note>, ApiError> {
    let form = NoteForm::read(multipart).await?;

    let title = validate_note_title(form.title.as_deref()).map_err(ApiError::BadRequest)?;
    if form.file.is_none() && form.text().is_none() {
        return Err(ApiError::bad_request(
            "File or text is required for summarization",
        ));
    }

    let text = match &form.file {
        Some(file) => extract_text(&file.filename, &file.bytes).await?,
        None => form.text().unwrap_or_default().to_string(),
    };
    let summary = summarize(&state, &text, form.word_count()).await?;

    let original_note = match form.file {
        Some(file) => Some(
            state
                .storage
                .upload(file.bytes, &file.filename, NOTE_FOLDER)
                .await?
                .url,
        ),
        None => None,
    };

    let content = NoteContent {
        title,
        text,
        original_note: original_note.clone(),
        summarized_note: summary,
    };

    match state.db.create_note(user.id, content) {
        Ok(note) => {
            tracing::info!(note_id = %note.id, user_id = %user.id, "Note summarized");
            Ok(ApiResponse::created(
                note,
                "Note uploaded and summarized successfully",
            ))
        }
        Err(e) => {
            if let Some(url) = original_note {
                discard_upload(state.storage.as_ref(), &url).await;
            }
            Err(e.into())
        }
    }
}

/// Best-effort removal of a file whose note row was never written.
async fn discard_upload(storage: &dyn ObjectStorage, url: &str) {
    if let Err(e) = storage.delete(url).await {
        tracing::warn!(%url, "Failed to remove upload after insert error: {e}");
    }
}

pub async fn list_notes(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<Vec<Note>>, ApiError> {
    let notes = state.db.get_notes(user.id)?;
    if notes.is_empty() {
        return Err(ApiError::not_found("No notes found for this user"));
    }
    Ok(ApiResponse::ok(notes, "Notes retrieved successfully"))
}

pub async fn get_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Note>, ApiError> {
    state
        .db
        .get_note(id, user.id)?
        .map(|note| ApiResponse::ok(note, "Note retrieved successfully"))
        .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))
}

pub async fn update_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Note>, ApiError> {
    let form = NoteForm::read(multipart).await?;
    let title = validate_note_title(form.title.as_deref()).map_err(ApiError::BadRequest)?;
    if form.file.is_none() && form.text().is_none() {
        return Err(ApiError::bad_request(
            "File or text is required for summarization",
        ));
    }

    let existing = state
        .db
        .get_note(id, user.id)?
        .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))?;

    let text = match &form.file {
        Some(file) => extract_text(&file.filename, &file.bytes).await?,
        None => form.text().unwrap_or_default().to_string(),
    };
    let summary = summarize(&state, &text, form.word_count()).await?;

    let original_note = match form.file {
        Some(file) => {
            if let Some(old) = &existing.original_note {
                state.storage.delete(old).await?;
            }
            Some(
                state
                    .storage
                    .upload(file.bytes, &file.filename, NOTE_FOLDER)
                    .await?
                    .url,
            )
        }
        None => existing.original_note.clone(),
    };

    let content = NoteContent {
        title,
        text,
        original_note,
        summarized_note: summary,
    };

    state
        .db
        .update_note(id, user.id, content)?
        .map(|note| ApiResponse::ok(note, "Note updated successfully"))
        .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Option<()>>, ApiError> {
    let note = state
        .db
        .get_note(id, user.id)?
        .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))?;

    remove_note(&state, &note).await?;
    Ok(ApiResponse::ok(None, "Note deleted successfully"))
}

pub async fn delete_all_notes(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<DeletedCount>, ApiError> {
    let notes = state.db.get_notes(user.id)?;
    let mut deleted = 0u32;
    for note in &notes {
        if remove_note(&state, note).await? {
            deleted += 1;
        }
    }

    tracing::info!(user_id = %user.id, deleted, "Deleted all notes");
    Ok(ApiResponse::ok(
        DeletedCount {
            deleted_count: deleted,
        },
        "All notes deleted successfully",
    ))
}

/// Stored file first, then the row.
async fn remove_note(state: &AppState, note: &Note) -> Result<bool, ApiError> {
    if let Some(url) = &note.original_note {
        state.storage.delete(url).await?;
    }
    Ok(state.db.delete_note(note.id, note.user_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageCall};

    #[tokio::test]
    async fn discarded_upload_is_deleted() {
        let storage = MemoryStorage::new();
        let stored = storage
            .upload(b"text".to_vec(), "a.txt", NOTE_FOLDER)
            .await
            .unwrap();

        discard_upload(&storage, &stored.url).await;

        assert!(!storage.contains(&stored.url));
        assert_eq!(
            storage.calls().last(),
            Some(&StorageCall::Delete { url: stored.url.clone() })
        );
    }

    #[tokio::test]
    async fn failed_discard_is_swallowed() {
        let storage = MemoryStorage::new();
        let stored = storage
            .upload(b"text".to_vec(), "a.txt", NOTE_FOLDER)
            .await
            .unwrap();
        storage.fail_deletes(true);

        discard_upload(&storage, &stored.url).await;

        assert!(storage.contains(&stored.url));
    }
}
