//! Headless game client
//!
//! Runs the same simulation core a browser client would, over the real
//! protocol: request a match, mirror the peer from relayed updates, steer the
//! local agent, and decide round outcomes locally.

pub mod bot;
pub mod session;

pub use session::{ClientError, GameClient, SessionSummary};
