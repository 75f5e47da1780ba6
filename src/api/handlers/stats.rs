use axum::{extract::State, Extension};

use crate::api::error::ApiError;
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::models::{User, UserStats};

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<UserStats>, ApiError> {
    let stats = state.db.get_user_stats(user.id)?;
    Ok(ApiResponse::ok(stats, "User stats retrieved successfully"))
}
