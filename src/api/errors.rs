use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::types::{ChessError, PgnError};

/// Structured API error that serializes to JSON.
#[derive(Debug)]
pub enum ApiError {
    GameNotFound(String),
    InvalidMove(ChessError),
    PgnParse(PgnError),
    InvalidRequest(String),
    GameOver(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::GameNotFound(id) => (
                StatusCode::NOT_FOUND,
                "GAME_NOT_FOUND",
                format!("Game not found: {id}"),
            ),
            ApiError::InvalidMove(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_MOVE", err.to_string())
            }
            ApiError::PgnParse(err) => (StatusCode::BAD_REQUEST, "PGN_PARSE", err.to_string()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ApiError::GameOver(msg) => (
                StatusCode::BAD_REQUEST,
                "GAME_OVER",
                format!("Game is already over: {msg}"),
            ),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChessError> for ApiError {
    fn from(err: ChessError) -> Self {
        match &err {
            ChessError::InvalidMove { .. } => ApiError::InvalidMove(err),
            ChessError::GameOver(msg) => ApiError::GameOver(msg.clone()),
            _ => ApiError::InvalidRequest(err.to_string()),
        }
    }
}

impl From<PgnError> for ApiError {
    fn from(err: PgnError) -> Self {
        ApiError::PgnParse(err)
    }
}
