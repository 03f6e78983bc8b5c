//! Trail-avoiding steering policy for the headless client

use rand::seq::SliceRandom;

use crate::game::{direction_vector, Board, Color, Player, BOARD_SIZE};
use crate::ws::protocol::Direction;

/// The two 90-degree turns available from a heading
fn turn_options(direction: Direction) -> Option<[Direction; 2]> {
    match direction {
        Direction::Left | Direction::Right => Some([Direction::Up, Direction::Down]),
        Direction::Up | Direction::Down => Some([Direction::Left, Direction::Right]),
        Direction::None => None,
    }
}

/// Whether one cell of travel along `direction` stays on the board and off
/// every trail
fn step_is_safe(board: &Board, player: &Player, direction: Direction) -> bool {
    let (dx, dy) = direction_vector(direction);
    let x = player.x.floor() + dx;
    let y = player.y.floor() + dy;
    if x < 0.0 || x >= BOARD_SIZE as f32 || y < 0.0 || y >= BOARD_SIZE as f32 {
        return false;
    }
    board.get_pixel(x, y) == Color::BACKGROUND
}

/// Pick a new heading, or None to keep the current one
///
/// Keeps going while the cell ahead is safe, otherwise takes a safe
/// 90-degree turn at random. A boxed-in agent keeps its heading and accepts
/// the crash. Idle agents are never steered.
pub fn choose_direction(board: &Board, player: &Player) -> Option<Direction> {
    let options = turn_options(player.direction)?;

    if step_is_safe(board, player, player.direction) {
        return None;
    }

    let safe: Vec<Direction> = options
        .into_iter()
        .filter(|&turn| step_is_safe(board, player, turn))
        .collect();
    safe.choose(&mut rand::thread_rng()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_heading_on_open_ground() {
        let board = Board::default();
        let mut player = Player::new(10.0, 10.0, Color::CYAN);
        player.direction = Direction::Right;
        assert_eq!(choose_direction(&board, &player), None);
    }

    #[test]
    fn never_steers_an_idle_agent() {
        let board = Board::default();
        let player = Player::new(10.0, 10.0, Color::CYAN);
        assert_eq!(choose_direction(&board, &player), None);
    }

    #[test]
    fn turns_away_from_the_wall() {
        let board = Board::default();
        let mut player = Player::new(63.0, 10.0, Color::CYAN);
        player.direction = Direction::Right;

        let turn = choose_direction(&board, &player);
        assert!(matches!(turn, Some(Direction::Up) | Some(Direction::Down)));
    }

    #[test]
    fn takes_the_only_open_turn() {
        let mut board = Board::default();
        // Trail ahead and above: the only safe turn is Down.
        board.set_pixel(11.0, 10.0, Color::ORANGE);
        board.set_pixel(10.0, 9.0, Color::ORANGE);

        let mut player = Player::new(10.0, 10.0, Color::CYAN);
        player.direction = Direction::Right;

        assert_eq!(choose_direction(&board, &player), Some(Direction::Down));
    }

    #[test]
    fn boxed_in_agent_keeps_its_heading() {
        let mut board = Board::default();
        board.set_pixel(11.0, 10.0, Color::ORANGE);
        board.set_pixel(10.0, 9.0, Color::ORANGE);
        board.set_pixel(10.0, 11.0, Color::ORANGE);

        let mut player = Player::new(10.0, 10.0, Color::CYAN);
        player.direction = Direction::Right;

        assert_eq!(choose_direction(&board, &player), None);
    }
}
