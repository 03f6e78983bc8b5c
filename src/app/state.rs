//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::matchmaking::MatchmakingService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub matchmaking: Arc<MatchmakingService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            matchmaking: Arc::new(MatchmakingService::new()),
        }
    }
}
