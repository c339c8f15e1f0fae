//! Algebraic notation encoding and parsing.
//!
//! Encoding examples: `e4`, `Nf3`, `Bxe5`, `exd5`, `O-O`, `e8=Q`.
//! Ambiguous piece moves are NOT disambiguated (`Nf3` even when two knights
//! reach f3); the parser resolves such tokens to the first matching piece
//! in a1..h8 scan order. This is a deliberate, documented limitation.

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::types::{ChessError, Move, PieceKind, Square};

// =========================================================================
// Encoding
// =========================================================================

/// Convert a move to its algebraic string, evaluated against the position
/// the move is played from.
///
/// Does NOT append `+` or `#`; the caller adds those once the move has
/// been applied and the resulting status is known (`#` wins over `+`).
pub fn encode_move(pos: &Position, mv: Move) -> String {
    if mv.flags.is_castling() {
        return if mv.to.file() > mv.from.file() {
            "O-O".into()
        } else {
            "O-O-O".into()
        };
    }

    let piece = pos
        .board
        .get(mv.from)
        .expect("encode_move: no piece on from-square");

    let mut san = String::with_capacity(8);

    if piece.kind == PieceKind::Pawn {
        // Pawn captures are prefixed with the departure file: "exd5".
        if mv.flags.is_capture() {
            san.push((b'a' + mv.from.file()) as char);
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(piece_letter(promo));
        }
    } else {
        san.push(piece_letter(piece.kind));
        if mv.flags.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }

    san
}

fn piece_letter(kind: PieceKind) -> char {
    match kind {
        PieceKind::Pawn => 'P',
        PieceKind::Knight => 'N',
        PieceKind::Bishop => 'B',
        PieceKind::Rook => 'R',
        PieceKind::Queen => 'Q',
        PieceKind::King => 'K',
    }
}

// =========================================================================
// Parsing
// =========================================================================

/// Parse an algebraic token and return the matching legal move.
///
/// Accepts `e4`, `Nf3`, `Bxe5`, `exd5`, `O-O`, `0-0-0`, `e8=Q`, optional
/// disambiguation (`Nbd2`, `R1a4`), with `+`/`#`/`!`/`?` suffixes ignored.
/// The board is scanned in a1..h8 order and the first friendly piece of
/// the required kind whose legal-move set contains the destination wins.
pub fn parse_san(pos: &Position, token: &str) -> Result<Move, ChessError> {
    let san = token.trim_end_matches(['+', '#', '!', '?']);

    if san == "O-O" || san == "0-0" {
        return find_castling(pos, true, token);
    }
    if san == "O-O-O" || san == "0-0-0" {
        return find_castling(pos, false, token);
    }

    let chars: Vec<char> = san.chars().collect();
    if chars.is_empty() {
        return Err(no_match(token, "empty token"));
    }

    // Promotion suffix.
    let (chars, promotion) = if chars.len() >= 2 && chars[chars.len() - 2] == '=' {
        let promo_char = chars[chars.len() - 1];
        let promo = match promo_char.to_ascii_uppercase() {
            'Q' => PieceKind::Queen,
            'R' => PieceKind::Rook,
            'B' => PieceKind::Bishop,
            'N' => PieceKind::Knight,
            _ => return Err(ChessError::InvalidPromotion(promo_char.to_string())),
        };
        (&chars[..chars.len() - 2], Some(promo))
    } else {
        (&chars[..], None)
    };

    // Leading piece letter (pawn when absent).
    let (kind, rest) = if !chars.is_empty() && "NBRQK".contains(chars[0]) {
        let kind = match chars[0] {
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => unreachable!(),
        };
        (kind, &chars[1..])
    } else {
        (PieceKind::Pawn, chars)
    };

    // Capture marker carries no information beyond the target square.
    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();

    if rest.len() < 2 {
        return Err(no_match(token, "token too short"));
    }

    let dest_str: String = rest[rest.len() - 2..].iter().collect();
    let dest = Square::from_algebraic(&dest_str)
        .ok_or_else(|| ChessError::InvalidSquare(dest_str.clone()))?;

    // Disambiguation characters (0, 1, or 2) before the destination.
    let disambig = &rest[..rest.len() - 2];
    let disambig_file: Option<u8> = disambig
        .iter()
        .find(|c| c.is_ascii_lowercase())
        .map(|&c| c as u8 - b'a');
    let disambig_rank: Option<u8> = disambig
        .iter()
        .find(|c| c.is_ascii_digit())
        .map(|&c| c as u8 - b'1');

    // Scan the board for the first qualifying piece; first match wins.
    let us = pos.side_to_move;
    for idx in 0..64u8 {
        let from = Square(idx);
        let Some(piece) = pos.board.get(from) else {
            continue;
        };
        if piece.color != us || piece.kind != kind {
            continue;
        }
        if disambig_file.is_some_and(|f| from.file() != f) {
            continue;
        }
        if disambig_rank.is_some_and(|r| from.rank() != r) {
            continue;
        }
        let candidate = movegen::legal_moves_from(pos, from)
            .into_iter()
            .find(|m| m.to == dest && m.promotion == promotion);
        if let Some(mv) = candidate {
            return Ok(mv);
        }
    }

    Err(no_match(token, "no matching piece"))
}

fn find_castling(pos: &Position, kingside: bool, token: &str) -> Result<Move, ChessError> {
    let king_sq = pos.king_sq(pos.side_to_move);
    let target_file = if kingside { 6 } else { 2 };

    movegen::legal_moves_from(pos, king_sq)
        .into_iter()
        .find(|m| m.flags.is_castling() && m.to.file() == target_file)
        .ok_or_else(|| no_match(token, "castling not legal"))
}

fn no_match(token: &str, reason: &str) -> ChessError {
    ChessError::InvalidMove {
        from: String::new(),
        to: token.to_string(),
        reason: reason.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================
