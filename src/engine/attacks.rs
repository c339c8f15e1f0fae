//! Attack detection.
//!
//! Answers "is this square attacked by that colour?" by scanning outward
//! from the square: pawn diagonals first, then knight offsets, king
//! adjacency, orthogonal rays (rook/queen), and diagonal rays
//! (bishop/queen). Short-circuits on the first hit; each ray stops at the
//! first occupied square.

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceKind, Square};

/// Knight jump offsets as (file, rank) deltas.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// The eight king-adjacent directions.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Rook/queen ray directions.
pub const ORTHOGONAL_DIRS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Bishop/queen ray directions.
pub const DIAGONAL_DIRS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Is `sq` attacked by any piece of colour `by`?
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    // Pawns: a white pawn attacks diagonally upward, so the attacker sits
    // one rank below `sq` (and vice versa for black).
    let pawn_dr: i8 = match by {
        Color::White => -1,
        Color::Black => 1,
    };
    for df in [-1i8, 1] {
        if let Some(from) = sq.offset(df, pawn_dr)
            && board
                .get(from)
                .is_some_and(|p| p.color == by && p.kind == PieceKind::Pawn)
        {
            return true;
        }
    }

    // Knights.
    for &(df, dr) in &KNIGHT_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && board
                .get(from)
                .is_some_and(|p| p.color == by && p.kind == PieceKind::Knight)
        {
            return true;
        }
    }

    // Enemy king adjacency.
    for &(df, dr) in &KING_OFFSETS {
        if let Some(from) = sq.offset(df, dr)
            && board
                .get(from)
                .is_some_and(|p| p.color == by && p.kind == PieceKind::King)
        {
            return true;
        }
    }

    // Sliders: walk each ray until the first occupied square.
    if ray_hit(board, sq, by, &ORTHOGONAL_DIRS, PieceKind::Rook) {
        return true;
    }
    if ray_hit(board, sq, by, &DIAGONAL_DIRS, PieceKind::Bishop) {
        return true;
    }

    false
}

/// Walk rays in `dirs` from `sq`; true if the first piece hit on any ray is
/// a `by`-coloured `slider` or queen.
fn ray_hit(board: &Board, sq: Square, by: Color, dirs: &[(i8, i8)], slider: PieceKind) -> bool {
    for &(df, dr) in dirs {
        let mut current = sq;
        while let Some(next) = current.offset(df, dr) {
            match board.get(next) {
                None => current = next,
                Some(p) => {
                    if p.color == by && (p.kind == slider || p.kind == PieceKind::Queen) {
                        return true;
                    }
                    break;
                }
            }
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Piece;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board_with(pieces: &[(&str, PieceKind, Color)]) -> Board {
        let mut board = Board::empty();
        for &(name, kind, color) in pieces {
            board.set(sq(name), Some(Piece::new(kind, color)));
        }
        board
    }

    #[test]
    fn pawn_attacks_diagonally_forward() {
        let board = board_with(&[("e4", PieceKind::Pawn, Color::White)]);
        assert!(is_square_attacked(&board, sq("d5"), Color::White));
        assert!(is_square_attacked(&board, sq("f5"), Color::White));
        assert!(!is_square_attacked(&board, sq("e5"), Color::White));
        assert!(!is_square_attacked(&board, sq("d3"), Color::White));
    }

    #[test]
    fn black_pawn_attacks_downward() {
        let board = board_with(&[("e5", PieceKind::Pawn, Color::Black)]);
        assert!(is_square_attacked(&board, sq("d4"), Color::Black));
        assert!(is_square_attacked(&board, sq("f4"), Color::Black));
        assert!(!is_square_attacked(&board, sq("d6"), Color::Black));
    }

    #[test]
    fn knight_attacks_jump_over_pieces() {
        let board = board_with(&[
            ("g1", PieceKind::Knight, Color::White),
            ("f2", PieceKind::Pawn, Color::White),
            ("g2", PieceKind::Pawn, Color::White),
        ]);
        assert!(is_square_attacked(&board, sq("f3"), Color::White));
        assert!(is_square_attacked(&board, sq("h3"), Color::White));
        assert!(is_square_attacked(&board, sq("e2"), Color::White));
        assert!(!is_square_attacked(&board, sq("g3"), Color::White));
    }

    #[test]
    fn king_attacks_adjacent_only() {
        let board = board_with(&[("e4", PieceKind::King, Color::Black)]);
        assert!(is_square_attacked(&board, sq("d4"), Color::Black));
        assert!(is_square_attacked(&board, sq("f5"), Color::Black));
        assert!(!is_square_attacked(&board, sq("e6"), Color::Black));
    }

    #[test]
    fn rook_ray_stops_at_blocker() {
        let board = board_with(&[
            ("a1", PieceKind::Rook, Color::White),
            ("d1", PieceKind::Pawn, Color::Black),
        ]);
        assert!(is_square_attacked(&board, sq("b1"), Color::White));
        assert!(is_square_attacked(&board, sq("d1"), Color::White));
        assert!(!is_square_attacked(&board, sq("e1"), Color::White));
        assert!(is_square_attacked(&board, sq("a8"), Color::White));
    }

    #[test]
    fn bishop_ray_stops_at_blocker() {
        let board = board_with(&[
            ("c1", PieceKind::Bishop, Color::White),
            ("e3", PieceKind::Pawn, Color::White),
        ]);
        assert!(is_square_attacked(&board, sq("d2"), Color::White));
        assert!(!is_square_attacked(&board, sq("f4"), Color::White));
        assert!(is_square_attacked(&board, sq("b2"), Color::White));
    }

    #[test]
    fn queen_attacks_both_ray_sets() {
        let board = board_with(&[("d4", PieceKind::Queen, Color::Black)]);
        assert!(is_square_attacked(&board, sq("d8"), Color::Black));
        assert!(is_square_attacked(&board, sq("h4"), Color::Black));
        assert!(is_square_attacked(&board, sq("a7"), Color::Black));
        assert!(is_square_attacked(&board, sq("g1"), Color::Black));
        assert!(!is_square_attacked(&board, sq("e6"), Color::Black));
    }

    #[test]
    fn colour_filter_applies() {
        let board = board_with(&[("a1", PieceKind::Rook, Color::White)]);
        assert!(is_square_attacked(&board, sq("a5"), Color::White));
        assert!(!is_square_attacked(&board, sq("a5"), Color::Black));
    }

    #[test]
    fn empty_board_attacks_nothing() {
        let board = Board::empty();
        for i in 0..64 {
            assert!(!is_square_attacked(&board, Square(i), Color::White));
            assert!(!is_square_attacked(&board, Square(i), Color::Black));
        }
    }
}
