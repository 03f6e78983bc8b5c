//! Game simulation modules
//!
//! The client-side core: every peer runs its own copy of this simulation and
//! mirrors the other player from relayed direction updates. Nothing in here
//! talks to the network.

pub mod board;
pub mod player;
pub mod sim;

pub use board::{Board, Color};
pub use player::{direction_vector, Player};
pub use sim::{RoundOutcome, SimPhase, Simulation};

/// Board edge length in cells
pub const BOARD_SIZE: usize = 64;

/// Grid units an agent covers per second while moving
pub const PLAYER_SPEED: f32 = 20.0;
