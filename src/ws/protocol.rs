//! WebSocket protocol message definitions
//! These are the wire types for client-server communication

use serde::{Deserialize, Serialize};

/// Match identifier - a strictly increasing counter starting at 1, never reused
pub type MatchId = u64;

/// A player's heading on the grid
///
/// Serialized as its integer code on the wire. `None` is the pre-match and
/// post-round pause state; a running round only ever sees the four cardinal
/// directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    None = 0,
    Left = 1,
    Right = 2,
    Up = 3,
    Down = 4,
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction as u8
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Left),
            2 => Ok(Self::Right),
            3 => Ok(Self::Up),
            4 => Ok(Self::Down),
            other => Err(format!("invalid direction code: {other}")),
        }
    }
}

/// Which side of a match a connection plays
///
/// Serialized as 1 or 2 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PlayerSlot {
    One = 1,
    Two = 2,
}

impl PlayerSlot {
    /// The other side of the match
    pub fn peer(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Zero-based index for agent arrays
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl From<PlayerSlot> for u8 {
    fn from(slot: PlayerSlot) -> Self {
        slot as u8
    }
}

impl TryFrom<u8> for PlayerSlot {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid player number: {other}")),
        }
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Request a pairing with the next waiting client
    FindMatch,

    /// Announce a heading change for fan-out to the match peer
    UpdateDirection {
        direction: Direction,
        #[serde(rename = "match")]
        match_id: MatchId,
        #[serde(rename = "playerNum")]
        player_num: PlayerSlot,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// A pairing completed; sent once per side with its assigned role
    MatchFound {
        #[serde(rename = "match")]
        match_id: MatchId,
        #[serde(rename = "playerNum")]
        player_num: PlayerSlot,
    },

    /// A heading change relayed from the match peer
    Update {
        #[serde(rename = "playerNum")]
        player_num: PlayerSlot,
        direction: Direction,
    },

    /// The match peer disconnected; terminal for this match
    PlayerLeft,

    /// A message was rejected (unknown match, spoofed slot, not in a match)
    Error { code: String, message: String },
}
