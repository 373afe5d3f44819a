use crate::config::Config;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub mod errors;
mod pages;
mod upload;

pub fn router(state: Arc<Config>) -> Router {
    // Multipart framing adds some overhead over the raw file, so the body
    // limit sits above the validation threshold and the handler's own size
    // check stays the one that rejects oversized files
    let body_limit = state.max_upload_size_kib * 1024 + 64 * 1024;

    Router::new()
        .route("/", get(pages::welcome))
        .route(
            "/upload",
            get(pages::upload_form).post(upload::handle_upload),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(120)))
        .with_state(state)
}
