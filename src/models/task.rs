use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_len;

pub const MIN_TASK_TITLE_LEN: usize = 5;

/// A to-do item owned by a single user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl CreateTaskInput {
    /// Returns the trimmed title, or a client-facing message.
    pub fn validated_title(&self) -> Result<String, String> {
        match self.title.as_deref().map(str::trim) {
            None | Some("") => Err("Title is required".to_string()),
            Some(t) if trimmed_len(t) < MIN_TASK_TITLE_LEN => Err(format!(
                "Title must be at least {MIN_TASK_TITLE_LEN} characters"
            )),
            Some(t) => Ok(t.to_string()),
        }
    }
}

/// A validated task ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTaskInput {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            if trimmed_len(title) < MIN_TASK_TITLE_LEN {
                return Err(format!(
                    "Title must be at least {MIN_TASK_TITLE_LEN} characters"
                ));
            }
        }
        Ok(())
    }
}

/// Trims a description and maps blank input to `None`.
pub fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
