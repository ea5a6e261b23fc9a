use axum::{
    routing::{any, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::{
    storage::{self, StorageKind},
    NoteService,
};

use crate::openapi::ApiDoc;

pub mod notes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub notes: NoteService,
}

impl AppState {
    /// State backed by a fresh store of the given kind.
    pub fn new(kind: StorageKind) -> Self {
        Self { notes: NoteService::new(storage::build(kind)) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let notes_routes = Router::new()
        .route("/create", post(notes::create))
        .route("/get", post(notes::get))
        .route("/update", post(notes::update))
        .route("/delete", any(notes::delete))
        .route("/get-all", post(notes::get_all));

    Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(notes_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx and transport failures
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                ),
        )
}
