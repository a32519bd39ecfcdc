use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// The largest document upload accepted by `/extract/file`.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/templates", get(handlers::list_templates_handler))
        .route("/extract", post(handlers::extract_handler))
        .route(
            "/extract/file",
            post(handlers::extract_file_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/assemble", post(handlers::assemble_handler))
        .route("/generate-prompt", post(handlers::generate_prompt_handler))
        .with_state(app_state)
        // Browser front ends call the API from other origins.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
