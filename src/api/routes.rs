use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", game_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Game routes under /api/v1
fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/game/daily", get(handlers::get_daily_movie))
        .route("/game/guess", post(handlers::submit_guess))
        .route("/game/state", get(handlers::get_game_state))
        .route("/game/leaderboard", get(handlers::get_leaderboard))
}
