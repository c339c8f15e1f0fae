pub mod attacks;
pub mod board;
pub mod game;
pub mod history;
pub mod movegen;
pub mod pgn;
pub mod san;
pub mod types;

pub use board::{Board, Position};
pub use game::{Game, MoveOutcome};
pub use history::{History, MoveRecord};
pub use movegen::{legal_moves, legal_moves_from};
pub use types::*;
