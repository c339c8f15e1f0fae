//! Board storage and position state.
//!
//! `Board` is a flat 8×8 mailbox of optional pieces with no legality
//! awareness. `Position` layers the coordinated move state on top: side to
//! move, castling rights, en-passant target, and cached king squares, with
//! reversible `make_move`/`undo_move`.

use crate::engine::attacks;
use crate::engine::types::{
    CastlingRights, ChessError, Color, Move, Piece, PieceKind, Square,
};

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Pure piece storage: 64 cells, at most one piece per cell. Cloning yields
/// a fully independent copy (pieces are plain values, never shared).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board([Option<Piece>; 64]);

impl Board {
    /// An empty board.
    pub fn empty() -> Self {
        Board([None; 64])
    }

    /// The standard starting arrangement.
    pub fn starting() -> Self {
        use PieceKind::*;
        let mut board = Board::empty();
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, &kind) in back_rank.iter().enumerate() {
            let file = file as u8;
            board.set(
                Square::from_file_rank(file, 0),
                Some(Piece::new(kind, Color::White)),
            );
            board.set(
                Square::from_file_rank(file, 7),
                Some(Piece::new(kind, Color::Black)),
            );
            board.set(
                Square::from_file_rank(file, 1),
                Some(Piece::new(Pawn, Color::White)),
            );
            board.set(
                Square::from_file_rank(file, 6),
                Some(Piece::new(Pawn, Color::Black)),
            );
        }
        board
    }

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.0[sq.index()]
    }

    /// Place (or clear) a square.
    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.0[sq.index()] = piece;
    }

    /// Unconditionally transfer the piece on `from` to `to`, marking it as
    /// having moved. Returns whatever previously occupied `to` (a capture),
    /// or `None`. Does nothing when `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let mut piece = self.0[from.index()].take()?;
        piece.has_moved = true;
        self.0[to.index()].replace(piece)
    }

    /// Find the king of a colour, if present.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        (0..64u8).map(Square).find(|&sq| {
            self.get(sq)
                .is_some_and(|p| p.kind == PieceKind::King && p.color == color)
        })
    }

    /// Count pieces of one colour.
    pub fn count(&self, color: Color) -> usize {
        self.0
            .iter()
            .flatten()
            .filter(|p| p.color == color)
            .count()
    }

    /// Render the board as an 8-line string (rank 8 at top), useful for
    /// debugging.
    pub fn render(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.get(sq) {
                    Some(p) => p.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

// ---------------------------------------------------------------------------
// UndoInfo — saved state for reversing a move
// ---------------------------------------------------------------------------

/// Everything that must be saved before a move so it can be reversed
/// exactly: the moving piece as it was (has_moved flag intact), the captured
/// piece with the square it stood on, the castling rook's original state,
/// and the position-level fields the move overwrites.
#[derive(Clone, Debug)]
pub struct UndoInfo {
    pub moved: Piece,
    pub captured: Option<(Square, Piece)>,
    pub rook: Option<(Square, Square, Piece)>,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub kings: [Square; 2],
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete position: board, side to move, castling rights, en-passant
/// target, and cached king squares (always mirroring the board).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    kings: [Square; 2],
}

impl Position {
    /// Standard starting position.
    pub fn starting() -> Self {
        Position {
            board: Board::starting(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            en_passant: None,
            kings: [Square::from_file_rank(4, 0), Square::from_file_rank(4, 7)],
        }
    }

    /// Build a position from an arbitrary board. Validates that each side
    /// has exactly one king.
    pub fn from_board(
        board: Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant: Option<Square>,
    ) -> Result<Self, ChessError> {
        let mut kings = [Square(0); 2];
        for color in [Color::White, Color::Black] {
            let found: Vec<Square> = (0..64u8)
                .map(Square)
                .filter(|&sq| {
                    board
                        .get(sq)
                        .is_some_and(|p| p.kind == PieceKind::King && p.color == color)
                })
                .collect();
            if found.len() != 1 {
                return Err(ChessError::InvalidPosition(format!(
                    "{color} has {} kings (expected 1)",
                    found.len()
                )));
            }
            kings[color.index()] = found[0];
        }
        Ok(Position {
            board,
            side_to_move,
            castling_rights,
            en_passant,
            kings,
        })
    }

    /// The king square for a colour (cached, mirrors the board).
    #[inline]
    pub fn king_sq(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Is the given colour's king currently attacked?
    pub fn in_check(&self, color: Color) -> bool {
        attacks::is_square_attacked(&self.board, self.king_sq(color), !color)
    }

    // -----------------------------------------------------------------------
    // Make / Undo move
    // -----------------------------------------------------------------------

    /// Apply a move. Returns `UndoInfo` for exact reversal.
    ///
    /// The caller is responsible for supplying a pseudo-legal move with the
    /// correct flags; legality (king safety) is the move generator's job.
    pub fn make_move(&mut self, mv: Move) -> UndoInfo {
        let us = self.side_to_move;
        let moved = self
            .board
            .get(mv.from)
            .expect("make_move: no piece on from-square");

        let mut undo = UndoInfo {
            moved,
            captured: None,
            rook: None,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            kings: self.kings,
        };

        // The target is valid for exactly one ply; re-set below on a
        // double push.
        self.en_passant = None;

        // En-passant captures remove a pawn from a square other than `to`.
        if mv.flags.is_en_passant() {
            let cap_sq = Square::from_file_rank(mv.to.file(), mv.from.rank());
            if let Some(p) = self.board.get(cap_sq) {
                undo.captured = Some((cap_sq, p));
                self.board.set(cap_sq, None);
            }
        }

        if let Some(p) = self.board.relocate(mv.from, mv.to) {
            undo.captured = Some((mv.to, p));
        }

        // A promoting pawn is replaced by the chosen piece.
        if let Some(kind) = mv.promotion {
            self.board.set(
                mv.to,
                Some(Piece {
                    kind,
                    color: us,
                    has_moved: true,
                }),
            );
        }

        // Castling co-moves the rook.
        if mv.flags.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            if let Some(rook) = self.board.get(rook_from) {
                undo.rook = Some((rook_from, rook_to, rook));
                self.board.relocate(rook_from, rook_to);
            }
        }

        // Rights revocation: touching a king/rook home square, by moving
        // from it or capturing on it, strips the matching rights.
        self.castling_rights.0 &= CASTLING_MASK[mv.from.index()];
        self.castling_rights.0 &= CASTLING_MASK[mv.to.index()];

        if mv.flags.is_double_push() {
            let dr: i8 = if us == Color::White { 1 } else { -1 };
            self.en_passant = mv.from.offset(0, dr);
        }

        if moved.kind == PieceKind::King {
            self.kings[us.index()] = mv.to;
        }

        self.side_to_move = !us;
        undo
    }

    /// Reverse a move previously applied with `make_move`. Restoration is
    /// exact: board cells, has_moved flags, rights, en-passant target, king
    /// cache, and side to move all return to their prior values.
    pub fn undo_move(&mut self, mv: Move, undo: &UndoInfo) {
        self.board.set(mv.to, None);
        self.board.set(mv.from, Some(undo.moved));

        if let Some((sq, piece)) = undo.captured {
            self.board.set(sq, Some(piece));
        }

        if let Some((rook_from, rook_to, rook)) = undo.rook {
            self.board.set(rook_to, None);
            self.board.set(rook_from, Some(rook));
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.kings = undo.kings;
        self.side_to_move = undo.moved.color;
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board.render())
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// For a king-destination square (after castling), return (rook_from, rook_to).
pub fn castling_rook_squares(king_to: Square) -> (Square, Square) {
    match king_to.0 {
        // White kingside: king e1→g1, rook h1→f1.
        6 => (Square(7), Square(5)),
        // White queenside: king e1→c1, rook a1→d1.
        2 => (Square(0), Square(3)),
        // Black kingside: king e8→g8, rook h8→f8.
        62 => (Square(63), Square(61)),
        // Black queenside: king e8→c8, rook a8→d8.
        58 => (Square(56), Square(59)),
        _ => panic!("invalid castling king destination: {king_to}"),
    }
}

/// Mask table indexed by square. When a move touches a square, AND the
/// castling rights with this mask. E.g. if a rook on a1 moves (or is
/// captured there), White-queenside goes away. The king's home square
/// removes both of that colour's rights.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
