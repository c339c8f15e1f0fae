use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use crate::engine::game::Game;
use crate::engine::pgn;

use super::errors::ApiError;
use super::models::*;
use super::state::{GameEntry, SharedState};

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: "chess-rules".to_string(),
        uptime,
    })
}

// =========================================================================
// Game lifecycle
// =========================================================================

/// POST /api/games
pub async fn create_game(
    State(state): State<SharedState>,
    Json(input): Json<CreateGameRequest>,
) -> (StatusCode, Json<GameResponse>) {
    let mut game = Game::new();
    game.white_player = input.white_player.unwrap_or_else(|| "White".into());
    game.black_player = input.black_player.unwrap_or_else(|| "Black".into());

    let entry = GameEntry::new(game);
    let response = game_to_response(&entry);
    let id = entry.game.id.clone();

    state.games.write().await.insert(id, entry);

    (StatusCode::CREATED, Json(response))
}

/// GET /api/games
pub async fn list_games(State(state): State<SharedState>) -> Json<ListGamesResponse> {
    let games = state.games.read().await;

    let mut entries: Vec<&GameEntry> = games.values().collect();
    entries.sort_by(|a, b| b.game.created_at.cmp(&a.game.created_at));

    Json(ListGamesResponse {
        total: entries.len(),
        games: entries.into_iter().map(game_to_response).collect(),
    })
}

/// GET /api/games/:id
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let games = state.games.read().await;
    let entry = games.get(&id).ok_or(ApiError::GameNotFound(id))?;
    Ok(Json(game_to_response(entry)))
}

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let mut games = state.games.write().await;
    games.remove(&id).ok_or(ApiError::GameNotFound(id))?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Game deleted".to_string(),
    }))
}

/// POST /api/games/:id/reset
pub async fn reset_game(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;
    entry.game.reset();
    Ok(Json(game_to_response(entry)))
}

// =========================================================================
// Moves
// =========================================================================

/// POST /api/games/:id/moves
pub async fn make_move(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<MoveRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;

    let from = parse_square(&input.from)?;
    let to = parse_square(&input.to)?;
    let promotion = match &input.promotion {
        Some(s) => Some(
            parse_promotion(s)
                .ok_or_else(|| ApiError::InvalidRequest(format!("invalid promotion: {s}")))?,
        ),
        None => None,
    };

    let outcome = entry.game.request_move(from, to, promotion)?;
    tracing::debug!(game = %entry.game.id, %from, %to, ?outcome, "move requested");

    Ok(Json(game_to_response(entry)))
}

/// POST /api/games/:id/promotion
pub async fn complete_promotion(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<PromotionRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;

    let kind = parse_promotion(&input.piece)
        .ok_or_else(|| ApiError::InvalidRequest(format!("invalid promotion: {}", input.piece)))?;

    entry.game.complete_promotion(kind)?;
    Ok(Json(game_to_response(entry)))
}

/// GET /api/games/:id/legal-moves?from=e2
pub async fn legal_moves(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<LegalMovesQuery>,
) -> Result<Json<LegalMovesResponse>, ApiError> {
    let games = state.games.read().await;
    let entry = games.get(&id).ok_or(ApiError::GameNotFound(id))?;

    let from = parse_square(&query.from)?;
    let destinations = entry
        .game
        .legal_destinations(from)
        .into_iter()
        .map(|sq| sq.to_algebraic())
        .collect();

    Ok(Json(LegalMovesResponse {
        from: query.from,
        destinations,
    }))
}

// =========================================================================
// History navigation
// =========================================================================

/// POST /api/games/:id/navigate
pub async fn navigate(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<NavigateRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;

    entry.game.go_to_move(input.index)?;
    Ok(Json(game_to_response(entry)))
}

// =========================================================================
// PGN
// =========================================================================

/// GET /api/games/:id/pgn
pub async fn export_pgn(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<PgnResponse>, ApiError> {
    let games = state.games.read().await;
    let entry = games.get(&id).ok_or(ApiError::GameNotFound(id))?;
    Ok(Json(PgnResponse {
        pgn: pgn::export(&entry.game),
    }))
}

/// POST /api/games/:id/pgn
///
/// Transactional: the document is replayed against a scratch game and the
/// stored game is only replaced on full success.
pub async fn import_pgn(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(input): Json<ImportPgnRequest>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;

    let mut imported = pgn::import(&input.pgn)?;
    imported.id = entry.game.id.clone();
    entry.game = imported;

    Ok(Json(game_to_response(entry)))
}

// =========================================================================
// Display orientation & persisted state
// =========================================================================

/// POST /api/games/:id/orientation
pub async fn flip_orientation(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameResponse>, ApiError> {
    let mut games = state.games.write().await;
    let entry = games.get_mut(&id).ok_or(ApiError::GameNotFound(id))?;
    entry.flip_orientation();
    Ok(Json(game_to_response(entry)))
}

/// GET /api/games/:id/save
pub async fn save_game_state(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SaveStateResponse>, ApiError> {
    let games = state.games.read().await;
    let entry = games.get(&id).ok_or(ApiError::GameNotFound(id))?;
    Ok(Json(save_state(entry)))
}
