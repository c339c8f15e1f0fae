use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::engine::game::Game;
use crate::engine::types::Color;

/// A stored game plus its display-only board orientation. Orientation is
/// never consulted by the rules engine.
pub struct GameEntry {
    pub game: Game,
    pub orientation: Color,
}

impl GameEntry {
    pub fn new(game: Game) -> Self {
        GameEntry {
            game,
            orientation: Color::White,
        }
    }

    pub fn flip_orientation(&mut self) {
        self.orientation = !self.orientation;
    }
}

/// Games stored by UUID.
pub type GameStore = RwLock<HashMap<String, GameEntry>>;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    pub games: GameStore,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(AppState {
            games: RwLock::new(HashMap::new()),
            config,
            start_time: std::time::Instant::now(),
        })
    }
}
