//! Simulation loop - per-tick round state machine
//!
//! Drives both agents once per tick and orchestrates the round reset after a
//! collision. Each client runs one of these; outcomes are decided locally and
//! never reconciled with the peer.

use crate::ws::protocol::{Direction, PlayerSlot};

use super::{Board, Color, Player, BOARD_SIZE};

/// Seconds the outcome stays visible before the next round begins
pub const ROUND_END_DWELL: f32 = 2.0;

/// Spawn cell for player 1; player 2 mirrors it in the opposite corner
pub const PLAYER_ONE_SPAWN: (f32, f32) = (1.0, 1.0);
pub const PLAYER_TWO_SPAWN: (f32, f32) = ((BOARD_SIZE - 2) as f32, (BOARD_SIZE - 2) as f32);

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// One agent collided; the other side scored
    Loss { loser: PlayerSlot },
    /// Both agents collided on the same tick; nobody scored
    Draw,
}

/// Current phase of the loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimPhase {
    Running,
    /// Post-collision pause counting down to the next round
    RoundEnd { remaining: f32 },
}

/// The round state machine: a board, two agents, and a phase
pub struct Simulation {
    board: Board,
    players: [Player; 2],
    phase: SimPhase,
}

impl Simulation {
    /// Fresh session: agents on their spawn cells with heading None
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            players: [
                Player::new(PLAYER_ONE_SPAWN.0, PLAYER_ONE_SPAWN.1, Color::CYAN),
                Player::new(PLAYER_TWO_SPAWN.0, PLAYER_TWO_SPAWN.1, Color::ORANGE),
            ],
            phase: SimPhase::Running,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    /// Cumulative scores as (player 1, player 2)
    pub fn scores(&self) -> (u32, u32) {
        (self.players[0].score, self.players[1].score)
    }

    /// Apply a heading change (local input or a relayed peer update)
    pub fn set_direction(&mut self, slot: PlayerSlot, direction: Direction) {
        self.players[slot.index()].direction = direction;
    }

    /// Put both agents on their opposite default headings.
    ///
    /// Called once the post-match-found announcement period elapses; between
    /// rounds the reset applies the same headings itself.
    pub fn start_round(&mut self) {
        self.players[0].direction = Direction::Right;
        self.players[1].direction = Direction::Left;
    }

    /// Advance one tick; returns the outcome on the tick a round ends
    pub fn tick(&mut self, dt: f32) -> Option<RoundOutcome> {
        match self.phase {
            SimPhase::Running => self.tick_running(dt),
            SimPhase::RoundEnd { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.next_round();
                } else {
                    self.phase = SimPhase::RoundEnd { remaining };
                }
                None
            }
        }
    }

    fn tick_running(&mut self, dt: f32) -> Option<RoundOutcome> {
        let mut hit = [false, false];

        self.players[0].update(dt, &self.board, || hit[0] = true);
        self.players[1].update(dt, &self.board, || hit[1] = true);

        // Trails paint after both updates, collision tick included, matching
        // the draw order the collision sampling assumes.
        for player in &self.players {
            player.draw(&mut self.board);
        }

        let outcome = match hit {
            [false, false] => return None,
            [true, true] => RoundOutcome::Draw,
            [true, false] => {
                self.players[1].score += 1;
                RoundOutcome::Loss {
                    loser: PlayerSlot::One,
                }
            }
            [false, true] => {
                self.players[0].score += 1;
                RoundOutcome::Loss {
                    loser: PlayerSlot::Two,
                }
            }
        };

        self.phase = SimPhase::RoundEnd {
            remaining: ROUND_END_DWELL,
        };
        Some(outcome)
    }

    /// Clear the board and respawn both agents on their default headings
    fn next_round(&mut self) {
        self.board.clear();
        self.players[0].reset(PLAYER_ONE_SPAWN.0, PLAYER_ONE_SPAWN.1, Direction::Right);
        self.players[1].reset(PLAYER_TWO_SPAWN.0, PLAYER_TWO_SPAWN.1, Direction::Left);
        self.phase = SimPhase::Running;
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
