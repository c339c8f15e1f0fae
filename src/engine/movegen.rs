//! Move generation.
//!
//! Pipeline:
//!   1. Per-kind pseudo-legal candidates (ignoring pins / check evasion),
//!      dispatched over the piece-kind enum.
//!   2. Legality filter: make the move, verify the mover's own king is not
//!      attacked, unmake. Restoration is exact, so nothing of the
//!      simulation is observable to the caller.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{Color, Move, MoveFlags, PieceKind, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let us = pos.side_to_move;
    let pseudo = generate_pseudo_legal(pos);

    let mut scratch = pos.clone();
    let mut legal = Vec::with_capacity(pseudo.len());
    for mv in pseudo {
        let undo = scratch.make_move(mv);
        let king = scratch.king_sq(us);
        if !attacks::is_square_attacked(&scratch.board, king, !us) {
            legal.push(mv);
        }
        scratch.undo_move(mv, &undo);
    }
    debug_assert_eq!(&scratch, pos, "make/undo must restore the position");
    legal
}

/// Generate all legal moves originating from a specific square.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    legal_moves(pos)
        .into_iter()
        .filter(|m| m.from == from)
        .collect()
}

// =========================================================================
// Pseudo-legal generation (internal)
// =========================================================================

fn generate_pseudo_legal(pos: &Position) -> Vec<Move> {
    let us = pos.side_to_move;
    let mut moves = Vec::with_capacity(64);

    for idx in 0..64u8 {
        let from = Square(idx);
        let Some(piece) = pos.board.get(from) else {
            continue;
        };
        if piece.color != us {
            continue;
        }
        match piece.kind {
            PieceKind::Pawn => pawn_moves(pos, from, us, &mut moves),
            PieceKind::Knight => leaper_moves(pos, from, us, &attacks::KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => slider_moves(pos, from, us, &attacks::DIAGONAL_DIRS, &mut moves),
            PieceKind::Rook => slider_moves(pos, from, us, &attacks::ORTHOGONAL_DIRS, &mut moves),
            PieceKind::Queen => {
                slider_moves(pos, from, us, &attacks::ORTHOGONAL_DIRS, &mut moves);
                slider_moves(pos, from, us, &attacks::DIAGONAL_DIRS, &mut moves);
            }
            PieceKind::King => {
                leaper_moves(pos, from, us, &attacks::KING_OFFSETS, &mut moves);
                castling_moves(pos, from, us, &mut moves);
            }
        }
    }

    moves
}

// =========================================================================
// Pawn moves
// =========================================================================

fn pawn_moves(pos: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    let (dr, start_rank, promo_rank): (i8, u8, u8) = match us {
        Color::White => (1, 1, 6),
        Color::Black => (-1, 6, 1),
    };

    // Pushes.
    if let Some(to) = from.offset(0, dr)
        && pos.board.get(to).is_none()
    {
        if from.rank() == promo_rank {
            add_promotions(from, to, MoveFlags::NONE, moves);
        } else {
            moves.push(Move::new(from, to));
        }

        if from.rank() == start_rank
            && let Some(to2) = from.offset(0, dr * 2)
            && pos.board.get(to2).is_none()
        {
            moves.push(Move::with_flags(from, to2, MoveFlags::DOUBLE_PUSH));
        }
    }

    // Diagonal captures, including en passant.
    for df in [-1i8, 1] {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match pos.board.get(to) {
            Some(target) if target.color != us => {
                if from.rank() == promo_rank {
                    add_promotions(from, to, MoveFlags::CAPTURE, moves);
                } else {
                    moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                }
            }
            None if pos.en_passant == Some(to) => {
                moves.push(Move::with_flags(
                    from,
                    to,
                    MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
                ));
            }
            _ => {}
        }
    }
}

/// Add all four promotion variants for a pawn push or capture.
fn add_promotions(from: Square, to: Square, extra_flags: MoveFlags, moves: &mut Vec<Move>) {
    for &promo in &[
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ] {
        moves.push(Move::with_promotion(from, to, promo, extra_flags));
    }
}

// =========================================================================
// Knight & king steps
// =========================================================================

fn leaper_moves(
    pos: &Position,
    from: Square,
    us: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        match pos.board.get(to) {
            None => moves.push(Move::new(from, to)),
            Some(target) if target.color != us => {
                moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
            }
            _ => {}
        }
    }
}

// =========================================================================
// Slider moves (bishop, rook, queen)
// =========================================================================

fn slider_moves(
    pos: &Position,
    from: Square,
    us: Color,
    dirs: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in dirs {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match pos.board.get(to) {
                None => {
                    moves.push(Move::new(from, to));
                    current = to;
                }
                Some(target) if target.color != us => {
                    moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                    break;
                }
                _ => break,
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

/// Castling candidates are gated on three distinct conditions: the right is
/// still granted, every square strictly between king and rook is empty, and
/// neither the king's current square nor any square it crosses or lands on
/// is attacked. The last test is explicit here: it cannot be left to the
/// generic post-move legality filter, which only sees the final square.
fn castling_moves(pos: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    let them = !us;
    let rank_base: u8 = match us {
        Color::White => 0,
        Color::Black => 56,
    };

    // Rights imply an unmoved king, which sits on the e-file.
    if from != Square(rank_base + 4) {
        return;
    }
    if attacks::is_square_attacked(&pos.board, from, them) {
        return;
    }

    // Kingside: king e→g; f and g must be empty and unattacked.
    if pos.castling_rights.can_castle_kingside(us) {
        let f_sq = Square(rank_base + 5);
        let g_sq = Square(rank_base + 6);
        if pos.board.get(f_sq).is_none()
            && pos.board.get(g_sq).is_none()
            && !attacks::is_square_attacked(&pos.board, f_sq, them)
            && !attacks::is_square_attacked(&pos.board, g_sq, them)
        {
            moves.push(Move::with_flags(from, g_sq, MoveFlags::CASTLING));
        }
    }

    // Queenside: king e→c; b, c, d must be empty, c and d unattacked.
    if pos.castling_rights.can_castle_queenside(us) {
        let b_sq = Square(rank_base + 1);
        let c_sq = Square(rank_base + 2);
        let d_sq = Square(rank_base + 3);
        if pos.board.get(b_sq).is_none()
            && pos.board.get(c_sq).is_none()
            && pos.board.get(d_sq).is_none()
            && !attacks::is_square_attacked(&pos.board, c_sq, them)
            && !attacks::is_square_attacked(&pos.board, d_sq, them)
        {
            moves.push(Move::with_flags(from, c_sq, MoveFlags::CASTLING));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::board::Board;
    use crate::engine::types::{CastlingRights, Piece};

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn custom(
        pieces: &[(&str, PieceKind, Color)],
        side: Color,
        rights: CastlingRights,
        ep: Option<&str>,
    ) -> Position {
        let mut board = Board::empty();
        for &(name, kind, color) in pieces {
            board.set(sq(name), Some(Piece::new(kind, color)));
        }
        Position::from_board(board, side, rights, ep.map(|s| sq(s))).unwrap()
    }

    fn kings() -> [(&'static str, PieceKind, Color); 2] {
        [
            ("e1", PieceKind::King, Color::White),
            ("e8", PieceKind::King, Color::Black),
        ]
    }

    // -------------------------------------------------------------------
    // Starting position
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_has_20_moves() {
        assert_eq!(legal_moves(&Position::starting()).len(), 20);
    }

    #[test]
    fn reply_to_e4_has_20_moves() {
        let mut pos = Position::starting();
        pos.make_move(Move::with_flags(sq("e2"), sq("e4"), MoveFlags::DOUBLE_PUSH));
        assert_eq!(legal_moves(&pos).len(), 20);
    }

    // -------------------------------------------------------------------
    // Pawn moves
    // -------------------------------------------------------------------

    #[test]
    fn pawn_single_and_double_push() {
        let [wk, bk] = kings();
        let pos = custom(
            &[wk, bk, ("e2", PieceKind::Pawn, Color::White)],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let pawn_moves = legal_moves_from(&pos, sq("e2"));
        assert_eq!(pawn_moves.len(), 2);
        assert!(pawn_moves.iter().any(|m| m.to == sq("e3")));
        assert!(
            pawn_moves
                .iter()
                .any(|m| m.to == sq("e4") && m.flags.is_double_push())
        );
    }

    #[test]
    fn pawn_blocked_cannot_push() {
        let [wk, bk] = kings();
        let pos = custom(
            &[
                wk,
                bk,
                ("e2", PieceKind::Pawn, Color::White),
                ("e3", PieceKind::Pawn, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        assert!(legal_moves_from(&pos, sq("e2")).is_empty());
    }

    #[test]
    fn pawn_double_push_blocked_on_second_square() {
        let [wk, bk] = kings();
        let pos = custom(
            &[
                wk,
                bk,
                ("e2", PieceKind::Pawn, Color::White),
                ("e4", PieceKind::Pawn, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let pawn_moves = legal_moves_from(&pos, sq("e2"));
        assert_eq!(pawn_moves.len(), 1);
        assert_eq!(pawn_moves[0].to, sq("e3"));
    }

    #[test]
    fn pawn_diagonal_captures_only_enemies() {
        let [wk, bk] = kings();
        let pos = custom(
            &[
                wk,
                bk,
                ("e4", PieceKind::Pawn, Color::White),
                ("d5", PieceKind::Pawn, Color::Black),
                ("f5", PieceKind::Knight, Color::White),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let pawn_moves = legal_moves_from(&pos, sq("e4"));
        assert!(
            pawn_moves
                .iter()
                .any(|m| m.to == sq("d5") && m.flags.is_capture())
        );
        assert!(!pawn_moves.iter().any(|m| m.to == sq("f5")));
    }

    #[test]
    fn pawn_en_passant_candidate() {
        let [wk, bk] = kings();
        let pos = custom(
            &[
                wk,
                bk,
                ("e5", PieceKind::Pawn, Color::White),
                ("f5", PieceKind::Pawn, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            Some("f6"),
        );
        let ep: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_en_passant())
            .collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].from, sq("e5"));
        assert_eq!(ep[0].to, sq("f6"));
    }

    #[test]
    fn pawn_promotion_has_four_variants() {
        let pos = custom(
            &[
                ("e1", PieceKind::King, Color::White),
                ("h8", PieceKind::King, Color::Black),
                ("a7", PieceKind::Pawn, Color::White),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let promos = legal_moves_from(&pos, sq("a7"));
        assert_eq!(promos.len(), 4);
        assert!(promos.iter().all(|m| m.promotion.is_some()));
        assert!(promos.iter().any(|m| m.promotion == Some(PieceKind::Queen)));
        assert!(
            promos
                .iter()
                .any(|m| m.promotion == Some(PieceKind::Knight))
        );
    }

    // -------------------------------------------------------------------
    // Knights and sliders
    // -------------------------------------------------------------------

    #[test]
    fn knight_in_corner_has_two_moves() {
        let [wk, bk] = kings();
        let pos = custom(
            &[wk, bk, ("a1", PieceKind::Knight, Color::Black)],
            Color::Black,
            CastlingRights::NONE,
            None,
        );
        let knight_moves = legal_moves_from(&pos, sq("a1"));
        assert_eq!(knight_moves.len(), 2);
    }

    #[test]
    fn rook_ray_excludes_own_blocker_includes_enemy() {
        let [wk, bk] = kings();
        let pos = custom(
            &[
                wk,
                bk,
                ("a1", PieceKind::Rook, Color::White),
                ("a4", PieceKind::Pawn, Color::White),
                ("d1", PieceKind::Knight, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let rook_moves = legal_moves_from(&pos, sq("a1"));
        assert!(rook_moves.iter().any(|m| m.to == sq("a3")));
        assert!(!rook_moves.iter().any(|m| m.to == sq("a4")));
        assert!(
            rook_moves
                .iter()
                .any(|m| m.to == sq("d1") && m.flags.is_capture())
        );
        assert!(!rook_moves.iter().any(|m| m.to == sq("e1")));
    }

    #[test]
    fn queen_covers_both_direction_sets() {
        // Both kings sit off the queen's lines so nothing is blocked.
        let pos = custom(
            &[
                ("b8", PieceKind::King, Color::White),
                ("h7", PieceKind::King, Color::Black),
                ("d4", PieceKind::Queen, Color::White),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let queen_moves = legal_moves_from(&pos, sq("d4"));
        assert_eq!(queen_moves.len(), 27);
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    fn castling_setup(extra: &[(&str, PieceKind, Color)], rights: u8) -> Position {
        let mut pieces = vec![
            ("e1", PieceKind::King, Color::White),
            ("a1", PieceKind::Rook, Color::White),
            ("h1", PieceKind::Rook, Color::White),
            ("e8", PieceKind::King, Color::Black),
        ];
        pieces.extend_from_slice(extra);
        custom(&pieces, Color::White, CastlingRights(rights), None)
    }

    #[test]
    fn castling_both_sides_available() {
        let pos = castling_setup(
            &[],
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        );
        let castles: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .collect();
        assert_eq!(castles.len(), 2);
        assert!(castles.iter().any(|m| m.to == sq("g1")));
        assert!(castles.iter().any(|m| m.to == sq("c1")));
    }

    #[test]
    fn castling_requires_rights() {
        let pos = castling_setup(&[], CastlingRights::WHITE_QUEENSIDE);
        let castles: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to, sq("c1"));
    }

    #[test]
    fn castling_blocked_by_piece_between() {
        let pos = castling_setup(
            &[("b1", PieceKind::Knight, Color::White)],
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        );
        let castles: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to, sq("g1"));
    }

    #[test]
    fn castling_through_attacked_square_forbidden() {
        // Black rook on f8 covers f1: the king would pass through check.
        let pos = castling_setup(
            &[("f8", PieceKind::Rook, Color::Black)],
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        );
        let castles: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to, sq("c1"));
    }

    #[test]
    fn no_castling_while_in_check() {
        let pos = castling_setup(
            &[("e5", PieceKind::Rook, Color::Black)],
            CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE,
        );
        assert!(legal_moves(&pos).iter().all(|m| !m.flags.is_castling()));
    }

    #[test]
    fn queenside_b_file_attack_does_not_block_castling() {
        // b1 is crossed by the rook but not the king; an attack there is fine.
        let pos = castling_setup(
            &[("b8", PieceKind::Rook, Color::Black)],
            CastlingRights::WHITE_QUEENSIDE,
        );
        let castles: Vec<Move> = legal_moves(&pos)
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to, sq("c1"));
    }

    // -------------------------------------------------------------------
    // Legality filter
    // -------------------------------------------------------------------

    #[test]
    fn pinned_piece_cannot_move_off_the_line() {
        let pos = custom(
            &[
                ("e1", PieceKind::King, Color::White),
                ("e4", PieceKind::Rook, Color::White),
                ("e8", PieceKind::Rook, Color::Black),
                ("a8", PieceKind::King, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let rook_moves = legal_moves_from(&pos, sq("e4"));
        assert!(rook_moves.iter().all(|m| m.to.file() == 4));
        assert!(rook_moves.iter().any(|m| m.to == sq("e8")));
    }

    #[test]
    fn every_legal_move_leaves_own_king_safe() {
        let pos = custom(
            &[
                ("e1", PieceKind::King, Color::White),
                ("a1", PieceKind::Rook, Color::White),
                ("h1", PieceKind::Queen, Color::Black),
                ("e8", PieceKind::King, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            None,
        );
        let mut scratch = pos.clone();
        for mv in legal_moves(&pos) {
            let undo = scratch.make_move(mv);
            assert!(
                !attacks::is_square_attacked(
                    &scratch.board,
                    scratch.king_sq(Color::White),
                    Color::Black
                ),
                "move {mv} leaves king in check"
            );
            scratch.undo_move(mv, &undo);
        }
    }

    #[test]
    fn en_passant_discovering_check_is_illegal() {
        // Removing both pawns from the 5th rank exposes the white king to
        // the rook on h5.
        let pos = custom(
            &[
                ("a5", PieceKind::King, Color::White),
                ("e5", PieceKind::Pawn, Color::White),
                ("f5", PieceKind::Pawn, Color::Black),
                ("h5", PieceKind::Rook, Color::Black),
                ("e8", PieceKind::King, Color::Black),
            ],
            Color::White,
            CastlingRights::NONE,
            Some("f6"),
        );
        assert!(legal_moves(&pos).iter().all(|m| !m.flags.is_en_passant()));
    }

    #[test]
    fn generated_moves_stay_on_the_board() {
        let pos = Position::starting();
        for mv in legal_moves(&pos) {
            assert!(mv.from.0 < 64);
            assert!(mv.to.0 < 64);
        }
    }

    #[test]
    fn legal_moves_from_empty_square_is_empty() {
        let pos = Position::starting();
        assert!(legal_moves_from(&pos, sq("e4")).is_empty());
    }
}
