use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.config.max_upload_bytes);
    // Stored `image_path`s are relative to the media root.
    let media = ServeDir::new(&app_state.config.media_root);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/upload",
            post(handlers::upload_handler).layer(upload_limit.clone()),
        )
        .route("/results/{image_id}", get(handlers::results_handler))
        .route(
            "/test-vision",
            post(handlers::test_vision_handler).layer(upload_limit),
        )
        .route("/history", get(handlers::history_handler))
        .route("/vision-call/{call_id}", get(handlers::vision_call_handler))
        .nest_service("/media", media)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
