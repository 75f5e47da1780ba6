mod error;
mod extract;
mod handlers;
pub mod middleware;
mod response;

pub use error::ApiError;
pub use response::{ApiResponse, Envelope};

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::ai::TextGenerator;
use crate::auth::{IdentityProvider, TokenIssuer};
use crate::db::Database;
use crate::storage::ObjectStorage;

/// Uploaded note files are capped at this size.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Everything a handler may reach: the store plus each external collaborator.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub ai: Arc<dyn TextGenerator>,
    pub storage: Arc<dyn ObjectStorage>,
    pub identity: Arc<dyn IdentityProvider>,
    pub tokens: TokenIssuer,
}

pub fn create_router(state: AppState, cors_origin: &str) -> Router {
    let auth_gate = from_fn_with_state(state.clone(), middleware::require_auth);

    let auth = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/current-user", get(handlers::auth::current_user))
        .route("/update-profile", patch(handlers::auth::update_profile))
        .route("/stats", get(handlers::stats::user_stats))
        .route_layer(auth_gate.clone())
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/google-login", post(handlers::auth::google_login));

    let tasks = Router::new()
        .route("/", post(handlers::tasks::create_task).get(handlers::tasks::list_tasks))
        .route(
            "/{task_id}",
            get(handlers::tasks::get_task)
                .patch(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/{task_id}/toggle", patch(handlers::tasks::toggle_task))
        .route("/user/all", delete(handlers::tasks::delete_all_tasks))
        .route_layer(auth_gate.clone());

    let notes = Router::new()
        .route("/", post(handlers::notes::create_note).get(handlers::notes::list_notes))
        .route(
            "/{id}",
            get(handlers::notes::get_note)
                .put(handlers::notes::update_note)
                .delete(handlers::notes::delete_note),
        )
        .route("/user/all", delete(handlers::notes::delete_all_notes))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(auth_gate.clone());

    let ai = Router::new()
        .route(
            "/",
            post(handlers::learning::create_guide).get(handlers::learning::list_guides),
        )
        .route(
            "/{id}",
            get(handlers::learning::get_guide).delete(handlers::learning::delete_guide),
        )
        .route("/user/all", delete(handlers::learning::delete_all_guides))
        .route_layer(auth_gate);

    let api = Router::new()
        .nest("/auth", auth)
        .nest("/tasks", tasks)
        .nest("/notes", notes)
        .nest("/ai", ai)
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

/// Credentialed CORS for the single configured frontend origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {origin:?}, cross-origin requests will be refused");
            layer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::ai::mock::MockGenerator;
    use crate::auth::DisabledIdentityProvider;
    use crate::storage::MemoryStorage;

    const ORIGIN: &str = "http://localhost:5173";

    fn router() -> Router {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();
        let state = AppState {
            db,
            ai: Arc::new(MockGenerator::new()),
            storage: Arc::new(MemoryStorage::new()),
            identity: Arc::new(DisabledIdentityProvider),
            tokens: TokenIssuer::new("unit-secret"),
        };
        create_router(state, ORIGIN)
    }

    #[tokio::test]
    async fn preflight_allows_the_client_origin_with_credentials() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/v1/tasks")
                    .header(header::ORIGIN, ORIGIN)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = router()
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_uses_the_envelope() {
        let response = router()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["success"], true);
    }
}
