use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::extract::{AppJson, AppPath};
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::models::*;

const TASK_NOT_FOUND: &str = "Task not found or not authorized";

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(input): AppJson<CreateTaskInput>,
) -> Result<ApiResponse<Task>, ApiError> {
    let title = input.validated_title().map_err(ApiError::BadRequest)?;
    let task = state.db.create_task(
        user.id,
        NewTask {
            title,
            description: normalize_description(input.description),
            completed: input.completed.unwrap_or(false),
        },
    )?;
    Ok(ApiResponse::created(task, "Task created successfully"))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<Vec<Task>>, ApiError> {
    let tasks = state.db.get_tasks(user.id)?;
    Ok(ApiResponse::ok(tasks, "Tasks retrieved successfully"))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(task_id): AppPath<Uuid>,
) -> Result<ApiResponse<Task>, ApiError> {
    state
        .db
        .get_task(task_id, user.id)?
        .map(|task| ApiResponse::ok(task, "Task retrieved successfully"))
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(task_id): AppPath<Uuid>,
    AppJson(input): AppJson<UpdateTaskInput>,
) -> Result<ApiResponse<Task>, ApiError> {
    input.validate().map_err(ApiError::BadRequest)?;
    state
        .db
        .update_task(task_id, user.id, input)?
        .map(|task| ApiResponse::ok(task, "Task updated successfully"))
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(task_id): AppPath<Uuid>,
) -> Result<ApiResponse<Task>, ApiError> {
    state
        .db
        .toggle_task(task_id, user.id)?
        .map(|task| ApiResponse::ok(task, "Task completion status updated"))
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(task_id): AppPath<Uuid>,
) -> Result<ApiResponse<Task>, ApiError> {
    state
        .db
        .delete_task(task_id, user.id)?
        .map(|task| ApiResponse::ok(task, "Task deleted successfully"))
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

pub async fn delete_all_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<DeletedCount>, ApiError> {
    let deleted = state.db.delete_all_tasks(user.id)?;
    tracing::info!(user_id = %user.id, deleted, "Deleted all tasks");
    Ok(ApiResponse::ok(
        DeletedCount {
            deleted_count: deleted as u32,
        },
        "All tasks deleted successfully",
    ))
}
