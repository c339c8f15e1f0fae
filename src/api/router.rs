use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::SharedState;

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (outside /api prefix)
        .route("/health", get(handlers::health))
        // Game lifecycle
        .route(
            "/api/games",
            post(handlers::create_game).get(handlers::list_games),
        )
        .route(
            "/api/games/{id}",
            get(handlers::get_game).delete(handlers::delete_game),
        )
        .route("/api/games/{id}/reset", post(handlers::reset_game))
        // Moves
        .route("/api/games/{id}/moves", post(handlers::make_move))
        .route(
            "/api/games/{id}/promotion",
            post(handlers::complete_promotion),
        )
        .route("/api/games/{id}/legal-moves", get(handlers::legal_moves))
        // History navigation
        .route("/api/games/{id}/navigate", post(handlers::navigate))
        // PGN import / export
        .route(
            "/api/games/{id}/pgn",
            get(handlers::export_pgn).post(handlers::import_pgn),
        )
        // Display orientation & persisted state
        .route(
            "/api/games/{id}/orientation",
            post(handlers::flip_orientation),
        )
        .route("/api/games/{id}/save", get(handlers::save_game_state))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
