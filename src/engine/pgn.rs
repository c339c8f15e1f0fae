//! PGN (Portable Game Notation) export and import.
//!
//! Export produces the Seven Tag Roster, a blank line, then movetext of the
//! form `1. e4 e5 2. Nf3 ...` wrapped at ten half-moves per line and
//! terminated by a result token.
//!
//! Import is transactional: the document is parsed and replayed against a
//! fresh game, and only a fully-applied document yields a result. A failure
//! partway through returns an error and nothing else, so callers never see
//! a half-replayed game.

use crate::engine::game::{Game, MoveOutcome};
use crate::engine::san;
use crate::engine::types::{Color, GameStatus, PgnError};

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Half-moves per movetext line.
const MOVES_PER_LINE: usize = 10;

// =========================================================================
// Export
// =========================================================================

/// Export a game's full timeline as a PGN document.
pub fn export(game: &Game) -> String {
    let mut pgn = String::with_capacity(512);

    let date = game.created_at.format("%Y.%m.%d").to_string();
    let result = result_token(game);

    pgn.push_str("[Event \"Casual Game\"]\n");
    pgn.push_str("[Site \"chess-rules\"]\n");
    pgn.push_str(&format!("[Date \"{date}\"]\n"));
    pgn.push_str("[Round \"-\"]\n");
    pgn.push_str(&format!("[White \"{}\"]\n", game.white_player));
    pgn.push_str(&format!("[Black \"{}\"]\n", game.black_player));
    pgn.push_str(&format!("[Result \"{result}\"]\n"));
    pgn.push('\n');

    let records = game.history().records();
    if records.is_empty() {
        pgn.push_str(&format!("{result}\n"));
        return pgn;
    }

    let mut line = String::new();
    for (i, record) in records.iter().enumerate() {
        if !line.is_empty() {
            line.push(' ');
        }
        if i % 2 == 0 {
            line.push_str(&format!("{}. ", i / 2 + 1));
        }
        line.push_str(&record.san);

        if (i + 1) % MOVES_PER_LINE == 0 {
            pgn.push_str(&line);
            pgn.push('\n');
            line.clear();
        }
    }

    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(result);
    pgn.push_str(&line);
    pgn.push('\n');

    pgn
}

/// Result token for the recorded timeline. On checkmate the mover of the
/// final move is the winner; stalemate is a draw; anything else is
/// unfinished.
fn result_token(game: &Game) -> &'static str {
    match game.history().records().last() {
        Some(record) if record.status_after == GameStatus::Checkmate => {
            match record.piece.color {
                Color::White => "1-0",
                Color::Black => "0-1",
            }
        }
        Some(record) if record.status_after == GameStatus::Stalemate => "1/2-1/2",
        _ => "*",
    }
}

// =========================================================================
// Import
// =========================================================================

/// Parse a PGN document into a freshly played game.
///
/// Header tag pairs are validated for shape; `White`/`Black` tags carry
/// over as player names, the rest are discarded. Movetext tokens are parsed
/// as SAN against the evolving position and applied in order.
pub fn import(text: &str) -> Result<Game, PgnError> {
    let mut game = Game::new();
    let mut movetext = String::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('[') {
            let (tag, value) = parse_header(line)?;
            match tag.as_str() {
                "White" => game.white_player = value,
                "Black" => game.black_player = value,
                _ => {}
            }
        } else {
            movetext.push(' ');
            movetext.push_str(line);
        }
    }

    for raw in movetext.split_whitespace() {
        if RESULT_TOKENS.contains(&raw) {
            continue;
        }
        // Move numbers arrive either standalone ("1.") or glued to the
        // move ("1.e4"). Castling tokens may start with '0' and must not be
        // mistaken for them.
        let token = if raw.starts_with("O-O") || raw.starts_with("0-0") {
            raw
        } else {
            raw.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        };
        if token.is_empty() {
            continue;
        }

        let mv = san::parse_san(game.position(), token)
            .map_err(|_| PgnError::NoMatchingMove(token.to_string()))?;
        match game.request_move(mv.from, mv.to, mv.promotion) {
            Ok(MoveOutcome::Played(_)) => {}
            Ok(MoveOutcome::PromotionPending { .. }) => {
                return Err(PgnError::BadToken(token.to_string()));
            }
            Err(err) => return Err(PgnError::Rules(err)),
        }
    }

    Ok(game)
}

/// Validate a `[Tag "value"]` header line and split it.
fn parse_header(line: &str) -> Result<(String, String), PgnError> {
    let malformed = || PgnError::MalformedHeader(line.to_string());

    let inner = line
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(malformed)?;
    let (tag, rest) = inner.split_once(' ').ok_or_else(malformed)?;
    let value = rest
        .trim()
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(malformed)?;
    if tag.is_empty() {
        return Err(malformed());
    }
    Ok((tag.to_string(), value.to_string()))
}

// =========================================================================
// Tests
// =========================================================================
