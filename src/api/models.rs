use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::state::GameEntry;
use crate::engine::game::Game;
use crate::engine::pgn;
use crate::engine::types::{ChessError, Color, GameStatus, PieceKind, Square};

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    pub white_player: Option<String>,
    pub black_player: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRequest {
    pub piece: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPgnRequest {
    pub pgn: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesQuery {
    pub from: String,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: String,
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: String,
    pub board: Vec<Vec<Option<String>>>,
    pub status: String,
    pub current_player: String,
    pub check: bool,
    pub game_over: bool,
    pub move_history: Vec<String>,
    pub captured_pieces: CapturedPieces,
    pub current_move_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_pending: Option<PendingPromotionInfo>,
    pub orientation: String,
    pub players: Players,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPromotionInfo {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPieces {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Players {
    pub white: String,
    pub black: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGamesResponse {
    pub games: Vec<GameResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalMovesResponse {
    pub from: String,
    pub destinations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PgnResponse {
    pub pgn: String,
}

/// Persisted-state record handed to external storage. Storage itself lives
/// outside this service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateResponse {
    pub pgn: String,
    pub timestamp: String,
    pub captured_pieces: CapturedPieces,
    pub current_move_index: usize,
    pub board_orientation: String,
    pub game_over: bool,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Parse a square from a request string, mapping failures to a domain error.
pub fn parse_square(s: &str) -> Result<Square, ChessError> {
    Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
}

/// Promotion piece from a request string like "queen" or "q".
pub fn parse_promotion(s: &str) -> Option<PieceKind> {
    match s.to_lowercase().as_str() {
        "queen" | "q" => Some(PieceKind::Queen),
        "rook" | "r" => Some(PieceKind::Rook),
        "bishop" | "b" => Some(PieceKind::Bishop),
        "knight" | "n" => Some(PieceKind::Knight),
        _ => None,
    }
}

/// Build the 8×8 board array for API responses.
/// Row 0 = rank 8 (top), row 7 = rank 1 (bottom).
/// Pieces: uppercase for White ("R"), lowercase for Black ("r"). Empty = None.
pub fn board_to_api(game: &Game) -> Vec<Vec<Option<String>>> {
    let board = &game.position().board;
    let mut rows = Vec::with_capacity(8);
    for rank in (0..8u8).rev() {
        let mut row = Vec::with_capacity(8);
        for file in 0..8u8 {
            let sq = Square::from_file_rank(file, rank);
            row.push(board.get(sq).map(|p| p.to_char().to_string()));
        }
        rows.push(row);
    }
    rows
}

/// Captured pieces up to the viewed ply, grouped by the colour that lost
/// them.
pub fn captured_pieces(game: &Game) -> CapturedPieces {
    let mut white = Vec::new();
    let mut black = Vec::new();
    for piece in game.captured_pieces() {
        match piece.color {
            Color::White => white.push(piece.to_char().to_string()),
            Color::Black => black.push(piece.to_char().to_string()),
        }
    }
    CapturedPieces { white, black }
}

/// Convert a stored game entry to the full API response.
pub fn game_to_response(entry: &GameEntry) -> GameResponse {
    let game = &entry.game;
    let check = matches!(game.status(), GameStatus::Check | GameStatus::Checkmate);

    GameResponse {
        id: game.id.clone(),
        board: board_to_api(game),
        status: game.status().as_str().to_string(),
        current_player: game.side_to_move().to_string(),
        check,
        game_over: game.is_game_over(),
        move_history: game.notation(),
        captured_pieces: captured_pieces(game),
        current_move_index: game.current_move_index(),
        promotion_pending: game.pending_promotion().map(|p| PendingPromotionInfo {
            from: p.from.to_algebraic(),
            to: p.to.to_algebraic(),
        }),
        orientation: entry.orientation.to_string(),
        players: Players {
            white: game.white_player.clone(),
            black: game.black_player.clone(),
        },
        created_at: game.created_at.to_rfc3339(),
    }
}

/// Build the persisted-state record for external storage.
pub fn save_state(entry: &GameEntry) -> SaveStateResponse {
    let game = &entry.game;
    SaveStateResponse {
        pgn: pgn::export(game),
        timestamp: Utc::now().to_rfc3339(),
        captured_pieces: captured_pieces(game),
        current_move_index: game.current_move_index(),
        board_orientation: entry.orientation.to_string(),
        game_over: game.is_game_over(),
    }
}
