//! Route table and shared state.

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use services::PeblobService;

use crate::handlers;

/// State shared across all handler tasks.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PeblobService>,
}

/// Builds the full route table. CORS is permissive so browser frontends on
/// other origins can talk to the API directly.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .route("/peblobs", post(handlers::create).get(handlers::find_all))
        .route("/peblobs/random", post(handlers::create_random))
        .route("/peblobs/stats", get(handlers::stats))
        .route("/peblobs/public", get(handlers::find_public))
        .route("/peblobs/brightness", get(handlers::find_by_brightness))
        .route("/peblobs/size/{size}", get(handlers::find_by_size))
        .route("/peblobs/user/{user_id}", get(handlers::find_by_user))
        .route("/peblobs/user/{user_id}/stats", get(handlers::user_stats))
        .route(
            "/peblobs/user/{user_id}/all",
            delete(handlers::remove_all_for_user),
        )
        .route(
            "/peblobs/{id}",
            get(handlers::find_one)
                .patch(handlers::update)
                .delete(handlers::remove),
        )
        .route("/peblobs/{id}/dominant-color", get(handlers::dominant_color))
        .route(
            "/peblobs/{id}/ptiblob/{row}/{col}",
            patch(handlers::update_cell),
        )
        .route(
            "/peblobs/{id}/transfer/{new_user_id}",
            patch(handlers::transfer),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
