//! Matchmaking, direction relay, and session lifecycle

pub mod queue;
pub mod service;

pub use queue::MatchQueue;
pub use service::MatchmakingService;
