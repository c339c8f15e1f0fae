//! chess-rules: a two-player chess rules engine behind a small HTTP API.
//!
//! The [`engine`] module holds the rules core: board and position state,
//! move generation with a king-safety legality filter, check/checkmate/
//! stalemate detection, a navigable fork-on-write move history, and an
//! algebraic-notation codec with full-game PGN import/export. The [`api`]
//! module is the HTTP boundary; it consumes engine outputs and supplies
//! engine inputs but contains no chess logic.

pub mod api;
pub mod config;
pub mod engine;
