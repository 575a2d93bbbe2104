use axum::{
    http::{StatusCode, Uri},
    middleware,
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    db::RecommendationStore,
    error::AppError,
    middleware::{
        json_errors::json_method_not_allowed,
        request_id::{make_span_with_request_id, request_id_middleware},
    },
};

pub mod extract;
pub mod recommendations;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecommendationStore>) -> Self {
        Self { store }
    }
}

/// Creates the application router with all routes
///
/// Collection and item paths also answer with a trailing slash.
pub fn create_router(state: AppState) -> Router {
    let collection = get(recommendations::list).post(recommendations::create);
    let item = get(recommendations::read)
        .put(recommendations::update)
        .delete(recommendations::delete);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/recommendations", collection.clone())
        .route("/recommendations/", collection)
        .route("/recommendations/:id", item.clone())
        .route("/recommendations/:id/", item)
        .route("/recommendations/:id/like", put(recommendations::like))
        .route("/recommendations/:id/unlike", put(recommendations::unlike))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(middleware::map_response(json_method_not_allowed)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "OK" })))
}

/// Landing document
async fn index() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "name": "Recommendation REST API Service",
            "version": env!("CARGO_PKG_VERSION"),
            "paths": "/recommendations",
        })),
    )
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!(
        "The requested URL '{}' was not found on the server.",
        uri.path()
    ))
}
