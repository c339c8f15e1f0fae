//! Stateful game controller wrapping Position.
//!
//! `Game` owns the live (position, history) pair and the transition rules
//! triggered by a move request: legality validation, special-move side
//! effects, castling-rights revocation, en-passant bookkeeping, check
//! flags, end-of-game detection, SAN labelling, and history recording.
//! It is the primary type the API layer interacts with.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::board::Position;
use crate::engine::history::{History, MoveRecord};
use crate::engine::movegen;
use crate::engine::san;
use crate::engine::types::{
    CastleSide, ChessError, Color, GameStatus, Move, Piece, PieceKind, SpecialMove, Square,
};

// =========================================================================
// MoveOutcome & PendingPromotion
// =========================================================================

/// Result of a successful move request.
#[derive(Clone, Debug)]
pub enum MoveOutcome {
    /// The move was applied and recorded.
    Played(MoveRecord),
    /// The move is a promotion and no piece was chosen; the game is waiting
    /// for `complete_promotion`.
    PromotionPending { from: Square, to: Square },
}

/// Descriptor of a promotion awaiting its piece choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingPromotion {
    pub from: Square,
    pub to: Square,
}

// =========================================================================
// Game
// =========================================================================

/// A complete chess game: live position, navigable history, status, and
/// metadata.
#[derive(Clone, Debug)]
pub struct Game {
    position: Position,
    history: History,
    status: GameStatus,
    in_check: [bool; 2],
    pending_promotion: Option<PendingPromotion>,

    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// A new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting())
    }

    /// A game from an arbitrary (already validated) position.
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            history: History::new(position.clone()),
            position,
            status: GameStatus::Active,
            in_check: [false; 2],
            pending_promotion: None,
            id: Uuid::new_v4().to_string(),
            white_player: "White".into(),
            black_player: "Black".into(),
            created_at: Utc::now(),
        };
        game.refresh_check_flags();
        game.status = game.compute_status();
        game
    }

    /// Reset to the standard starting position, clearing history and any
    /// pending promotion. Identity and players are kept.
    pub fn reset(&mut self) {
        self.position = Position::starting();
        self.history = History::new(self.position.clone());
        self.status = GameStatus::Active;
        self.in_check = [false; 2];
        self.pending_promotion = None;
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.in_check[color.index()]
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current_move_index(&self) -> usize {
        self.history.current_index()
    }

    pub fn pending_promotion(&self) -> Option<PendingPromotion> {
        self.pending_promotion
    }

    /// SAN strings of the full timeline.
    pub fn notation(&self) -> Vec<String> {
        self.history.notation()
    }

    /// Pieces captured up to the viewed ply.
    pub fn captured_pieces(&self) -> Vec<Piece> {
        self.history.captured_up_to_current()
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    /// Legal destination squares for the piece on `from` (deduplicated:
    /// the four promotion variants collapse to one destination).
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut dests: Vec<Square> = Vec::new();
        for mv in movegen::legal_moves_from(&self.position, from) {
            if !dests.contains(&mv.to) {
                dests.push(mv.to);
            }
        }
        dests
    }

    // -----------------------------------------------------------------
    // Move requests
    // -----------------------------------------------------------------

    /// Request the move `from` → `to`.
    ///
    /// Fails without touching any state when the source is empty, the piece
    /// belongs to the opponent, the game is over, or the destination is not
    /// in the piece's legal set. A pawn reaching the last rank without a
    /// `promotion` choice parks the move as pending and returns
    /// `MoveOutcome::PromotionPending`; any new request supersedes it.
    pub fn request_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }

        self.pending_promotion = None;

        let piece = self
            .position
            .board
            .get(from)
            .ok_or_else(|| invalid(from, to, "no piece on source square"))?;
        if piece.color != self.position.side_to_move {
            return Err(invalid(from, to, "piece belongs to the opponent"));
        }

        let candidates: Vec<Move> = movegen::legal_moves_from(&self.position, from)
            .into_iter()
            .filter(|m| m.to == to)
            .collect();
        if candidates.is_empty() {
            return Err(invalid(from, to, "destination is not a legal move"));
        }

        if candidates[0].promotion.is_some() {
            let Some(kind) = promotion else {
                self.pending_promotion = Some(PendingPromotion { from, to });
                return Ok(MoveOutcome::PromotionPending { from, to });
            };
            if !kind.is_promotion_choice() {
                return Err(ChessError::InvalidPromotion(kind.to_string()));
            }
            let mv = candidates
                .into_iter()
                .find(|m| m.promotion == Some(kind))
                .ok_or_else(|| ChessError::InvalidPromotion(kind.to_string()))?;
            return Ok(MoveOutcome::Played(self.apply(mv)));
        }

        Ok(MoveOutcome::Played(self.apply(candidates[0])))
    }

    /// Complete a pending promotion with the chosen piece.
    pub fn complete_promotion(&mut self, kind: PieceKind) -> Result<MoveRecord, ChessError> {
        let pending = self
            .pending_promotion
            .ok_or(ChessError::NoPendingPromotion)?;
        if !kind.is_promotion_choice() {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }

        let mv = movegen::legal_moves_from(&self.position, pending.from)
            .into_iter()
            .find(|m| m.to == pending.to && m.promotion == Some(kind))
            .ok_or_else(|| invalid(pending.from, pending.to, "pending promotion is stale"))?;

        self.pending_promotion = None;
        Ok(self.apply(mv))
    }

    /// Apply a validated legal move: board + rights + en passant + turn +
    /// check flags + status, then record it.
    fn apply(&mut self, mv: Move) -> MoveRecord {
        let piece = self
            .position
            .board
            .get(mv.from)
            .expect("apply: no piece on from-square");
        let rights_before = self.position.castling_rights;
        let en_passant_before = self.position.en_passant;
        let san_body = san::encode_move(&self.position, mv);

        let special = if mv.flags.is_castling() {
            let side = if mv.to.file() > mv.from.file() {
                CastleSide::King
            } else {
                CastleSide::Queen
            };
            SpecialMove::Castle(side)
        } else if mv.flags.is_en_passant() {
            SpecialMove::EnPassant
        } else if let Some(kind) = mv.promotion {
            SpecialMove::Promotion(kind)
        } else {
            SpecialMove::None
        };

        let undo = self.position.make_move(mv);
        self.refresh_check_flags();
        self.status = self.compute_status();

        let san = match self.status {
            GameStatus::Checkmate => format!("{san_body}#"),
            GameStatus::Check => format!("{san_body}+"),
            _ => san_body,
        };

        let record = MoveRecord {
            mv,
            piece,
            captured: undo.captured.map(|(_, p)| p),
            special,
            rights_before,
            en_passant_before,
            san,
            status_after: self.status,
        };
        self.history.push(record.clone(), self.position.clone());
        record
    }

    // -----------------------------------------------------------------
    // Time travel
    // -----------------------------------------------------------------

    /// View the position at ply `i` (0 = initial position). Viewing history
    /// is never terminal: game-over status only applies at the tip.
    pub fn go_to_move(&mut self, i: usize) -> Result<(), ChessError> {
        let snapshot = self.history.go_to(i)?.clone();
        self.position = snapshot;
        self.pending_promotion = None;
        self.refresh_check_flags();
        self.status = if self.history.at_tip() {
            self.compute_status()
        } else if self.in_check[self.position.side_to_move.index()] {
            GameStatus::Check
        } else {
            GameStatus::Active
        };
        Ok(())
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    fn refresh_check_flags(&mut self) {
        for color in [Color::White, Color::Black] {
            self.in_check[color.index()] = self.position.in_check(color);
        }
    }

    /// Scan the current player's legal moves: some → Check/Active; none →
    /// Checkmate (if attacked) or Stalemate.
    fn compute_status(&self) -> GameStatus {
        let has_moves = !movegen::legal_moves(&self.position).is_empty();
        let checked = self.in_check[self.position.side_to_move.index()];
        match (has_moves, checked) {
            (true, true) => GameStatus::Check,
            (true, false) => GameStatus::Active,
            (false, true) => GameStatus::Checkmate,
            (false, false) => GameStatus::Stalemate,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(from: Square, to: Square, reason: &str) -> ChessError {
    ChessError::InvalidMove {
        from: from.to_algebraic(),
        to: to.to_algebraic(),
        reason: reason.to_string(),
    }
}

// =========================================================================
// Tests
// =========================================================================
