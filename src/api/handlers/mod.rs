pub mod auth;
pub mod learning;
pub mod notes;
pub mod stats;
pub mod tasks;

use serde_json::{json, Value};

use crate::api::response::ApiResponse;

// ============================================================
// Health
// ============================================================

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok(json!({ "status": "ok" }), "OK")
}
