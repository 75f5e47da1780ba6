use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::ai::{learning_plan_prompt, parse_learning_plan, LEARNING_OPTIONS};
use crate::api::error::ApiError;
use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::api::response::ApiResponse;
use crate::api::AppState;
use crate::models::*;

const GUIDE_NOT_FOUND: &str = "Learning guide not found";
const MAX_PAGE_SIZE: u32 = 100;

pub async fn create_guide(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppJson(input): AppJson<CreateLearningGuideInput>,
) -> Result<ApiResponse<LearningGuide>, ApiError> {
    let request = input.validate().map_err(ApiError::BadRequest)?;

    let prompt = learning_plan_prompt(&request.topic, request.duration_days);
    let response = state.ai.generate(&prompt, LEARNING_OPTIONS).await?;
    tracing::debug!(model = state.ai.model_name(), "Roadmap generated");
    let parsed = parse_learning_plan(&response)?;

    if !parsed.fallbacks.is_empty() {
        tracing::info!(
            topic = %request.topic,
            defaulted = parsed.fallbacks.len(),
            "AI roadmap repaired with defaults"
        );
    }

    let guide = state.db.create_learning_guide(
        user.id,
        NewLearningGuide {
            topic: request.topic,
            duration_days: request.duration_days,
            daily_plan: parsed.daily_plan,
        },
    )?;

    tracing::info!(guide_id = %guide.id, user_id = %user.id, "Learning roadmap created");
    Ok(ApiResponse::created(guide, "Learning roadmap created successfully"))
}

pub async fn list_guides(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<ApiResponse<GuidePage>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

    let (guides, total) = state.db.get_learning_guides(user.id, page, limit)?;
    let pagination = Pagination::new(page, limit, guides.len(), total);

    Ok(ApiResponse::ok(
        GuidePage { guides, pagination },
        "Learning guides retrieved successfully",
    ))
}

pub async fn get_guide(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<LearningGuide>, ApiError> {
    state
        .db
        .get_learning_guide(id, user.id)?
        .map(|guide| ApiResponse::ok(guide, "Learning guide retrieved successfully"))
        .ok_or_else(|| ApiError::not_found(GUIDE_NOT_FOUND))
}

pub async fn delete_guide(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    AppPath(id): AppPath<Uuid>,
) -> Result<ApiResponse<Option<()>>, ApiError> {
    if state.db.delete_learning_guide(id, user.id)? {
        Ok(ApiResponse::ok(None, "Learning guide deleted successfully"))
    } else {
        Err(ApiError::not_found(GUIDE_NOT_FOUND))
    }
}

pub async fn delete_all_guides(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<DeletedCount>, ApiError> {
    let deleted = state.db.delete_all_learning_guides(user.id)?;
    Ok(ApiResponse::ok(
        DeletedCount {
            deleted_count: deleted as u32,
        },
        "All learning guides deleted successfully",
    ))
}
