//! Move history and time travel.
//!
//! The history is an append-only log of move records with a parallel list
//! of position snapshots: `snapshots[i]` is the position after move `i`,
//! and `snapshots[0]` is the initial position. A cursor marks the viewed
//! ply; pushing a move while the cursor sits behind the tip forks the
//! timeline, discarding the old future.

use crate::engine::board::Position;
use crate::engine::types::{
    CastlingRights, ChessError, GameStatus, Move, Piece, SpecialMove, Square,
};

// =========================================================================
// MoveRecord
// =========================================================================

/// A played move as recorded in the history: enough to re-apply it, to
/// display it, and to understand what it did.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    /// The move that was played.
    pub mv: Move,
    /// The moving piece as it was before the move (has_moved flag intact).
    pub piece: Piece,
    /// Captured piece, if any (for en passant, the pawn behind the target).
    pub captured: Option<Piece>,
    /// Side-effect classification.
    pub special: SpecialMove,
    /// Castling rights before the move.
    pub rights_before: CastlingRights,
    /// En-passant target before the move.
    pub en_passant_before: Option<Square>,
    /// SAN for the move, including any `+`/`#` suffix.
    pub san: String,
    /// Game status after the move was applied.
    pub status_after: GameStatus,
}

// =========================================================================
// History
// =========================================================================

/// Ordered move log with snapshot-based navigation.
#[derive(Clone, Debug)]
pub struct History {
    records: Vec<MoveRecord>,
    snapshots: Vec<Position>,
    current: usize,
}

impl History {
    /// A fresh history rooted at `initial`.
    pub fn new(initial: Position) -> Self {
        History {
            records: Vec::new(),
            snapshots: vec![initial],
            current: 0,
        }
    }

    /// Number of recorded moves.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The viewed ply, in `0..=len()`.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Whether the viewer is at the newest position.
    pub fn at_tip(&self) -> bool {
        self.current == self.records.len()
    }

    /// All recorded moves (the full timeline, regardless of the cursor).
    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// The snapshot after move `i` (`i == 0` is the initial position).
    pub fn snapshot(&self, i: usize) -> Option<&Position> {
        self.snapshots.get(i)
    }

    /// Append a move played from the currently viewed position. If the
    /// cursor is behind the tip, the abandoned future is dropped first.
    pub fn push(&mut self, record: MoveRecord, snapshot: Position) {
        if self.current < self.records.len() {
            self.records.truncate(self.current);
            self.snapshots.truncate(self.current + 1);
        }
        self.records.push(record);
        self.snapshots.push(snapshot);
        self.current = self.records.len();
        debug_assert_eq!(self.snapshots.len(), self.records.len() + 1);
    }

    /// Move the cursor to ply `i` and return the stored snapshot.
    pub fn go_to(&mut self, i: usize) -> Result<&Position, ChessError> {
        if i > self.records.len() {
            return Err(ChessError::InvalidHistoryIndex {
                index: i,
                max: self.records.len(),
            });
        }
        self.current = i;
        Ok(&self.snapshots[i])
    }

    /// Rebuild the position at ply `i` by replaying recorded moves from the
    /// initial position. Slower than `go_to`, but must agree with it
    /// exactly; kept as the snapshot-free fallback path.
    pub fn replay_to(&self, i: usize) -> Result<Position, ChessError> {
        if i > self.records.len() {
            return Err(ChessError::InvalidHistoryIndex {
                index: i,
                max: self.records.len(),
            });
        }
        let mut pos = self.snapshots[0].clone();
        for record in &self.records[..i] {
            pos.make_move(record.mv);
        }
        Ok(pos)
    }

    /// Pieces captured in moves up to the viewed ply.
    pub fn captured_up_to_current(&self) -> Vec<Piece> {
        self.records[..self.current]
            .iter()
            .filter_map(|r| r.captured)
            .collect()
    }

    /// SAN strings for the full timeline, in order.
    pub fn notation(&self) -> Vec<String> {
        self.records.iter().map(|r| r.san.clone()).collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
