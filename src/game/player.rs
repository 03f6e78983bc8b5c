//! Player agent - per-player kinematic state and collision detection

use crate::ws::protocol::Direction;

use super::{Board, Color, BOARD_SIZE, PLAYER_SPEED};

/// Unit step for a heading, in grid cells
pub fn direction_vector(direction: Direction) -> (f32, f32) {
    match direction {
        Direction::None => (0.0, 0.0),
        Direction::Left => (-1.0, 0.0),
        Direction::Right => (1.0, 0.0),
        Direction::Up => (0.0, -1.0),
        Direction::Down => (0.0, 1.0),
    }
}

/// One player's agent: continuous position, heading, trail color, score
///
/// Created once per slot and never destroyed during a session; rounds only
/// reposition it. The score accumulates across rounds.
#[derive(Debug, Clone)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub direction: Direction,
    pub color: Color,
    pub score: u32,
}

impl Player {
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            x,
            y,
            direction: Direction::None,
            color,
            score: 0,
        }
    }

    /// True iff the position lies outside `[0, BOARD_SIZE)` on either axis
    pub fn is_out_of_bounds(&self) -> bool {
        self.x >= BOARD_SIZE as f32 || self.x < 0.0 || self.y < 0.0 || self.y >= BOARD_SIZE as f32
    }

    /// Advance one tick: collision check ahead, then movement.
    ///
    /// Samples the cell one step ahead of the current floored position; a
    /// non-background cell there, or an out-of-bounds position, invokes
    /// `on_collide` once. Both conditions require a moving heading, so a
    /// frozen agent never re-fires the callback. The agent still advances on
    /// its collision tick; reacting to the callback is the caller's job.
    pub fn update(&mut self, dt: f32, board: &Board, mut on_collide: impl FnMut()) {
        let step = PLAYER_SPEED * dt;

        let x0 = self.x.floor();
        let y0 = self.y.floor();

        let (dx, dy) = direction_vector(self.direction);

        let ahead = board.get_pixel(x0 + dx, y0 + dy);
        let trail_ahead = ahead != Color::BACKGROUND;
        let moving = self.direction != Direction::None;

        if moving && (trail_ahead || self.is_out_of_bounds()) {
            on_collide();
        }

        if moving {
            self.x += dx * step;
            self.y += dy * step;
        }
    }

    /// Paint the current floored cell in this player's color
    pub fn draw(&self, board: &mut Board) {
        board.set_pixel(self.x, self.y, self.color);
    }

    /// Reinitialize position and heading between rounds
    pub fn reset(&mut self, x: f32, y: f32, direction: Direction) {
        self.x = x;
        self.y = y;
        self.direction = direction;
    }
}
