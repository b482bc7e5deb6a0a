//! Kickoff eval crate - static scoring of positions for the search.

use kickoff_core::{Board, Player};
use serde::{Deserialize, Serialize};

/// Score of a decided game. Finite so it survives negation and comparison.
pub const WIN_SCORE: i32 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Per row between the ball and the target gate.
    pub vertical: i32,
    /// Per column beyond the gate mouth.
    pub horizontal: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            vertical: 4,
            horizontal: 1,
        }
    }
}

/// Scores `board` from `player`'s point of view; higher is better.
///
/// A decided game is `±WIN_SCORE`. Otherwise the score is minus the weighted
/// distance from the ball to the gate `player` attacks.
pub fn evaluate(board: &Board, player: Player, weights: &EvalWeights) -> i32 {
    if let Some(winner) = board.winner() {
        return if winner == player { WIN_SCORE } else { -WIN_SCORE };
    }
    -distance_to_goal(board, player, weights)
}

/// Weighted distance from the ball to `player`'s target gate.
pub fn distance_to_goal(board: &Board, player: Player, weights: &EvalWeights) -> i32 {
    let ball = board.ball();
    let rows = (board.goal_row(player) - ball.y).abs();
    // the gate is three points wide, anything within one column is lined up
    let columns = (ball.x.abs() - 1).max(0);
    weights.vertical * rows + weights.horizontal * columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickoff_core::{Direction, Edge, EdgeCategory, Point};

    fn with_ball(x: i32, y: i32) -> Board {
        let mut board = Board::new(6, 8);
        board.set_ball(Point::new(x, y));
        board
    }

    #[test]
    fn test_start_position_is_symmetric() {
        let board = Board::new(6, 8);
        let weights = EvalWeights::default();
        assert_eq!(
            evaluate(&board, Player::One, &weights),
            evaluate(&board, Player::Two, &weights)
        );
        assert_eq!(evaluate(&board, Player::One, &weights), -20);
    }

    #[test]
    fn test_closer_row_strictly_better() {
        let weights = EvalWeights::default();
        for x in -3..=3 {
            for y in -3..3 {
                let lower = evaluate(&with_ball(x, y), Player::Two, &weights);
                let upper = evaluate(&with_ball(x, y + 1), Player::Two, &weights);
                assert!(upper > lower, "({x}, {y}): {upper} <= {lower}");

                let lower = evaluate(&with_ball(x, y), Player::One, &weights);
                let upper = evaluate(&with_ball(x, y + 1), Player::One, &weights);
                assert!(lower > upper, "({x}, {y}): {lower} <= {upper}");
            }
        }
    }

    #[test]
    fn test_horizontal_only_beyond_gate_mouth() {
        let weights = EvalWeights::default();
        let center = evaluate(&with_ball(0, 0), Player::One, &weights);
        assert_eq!(evaluate(&with_ball(1, 0), Player::One, &weights), center);
        assert_eq!(evaluate(&with_ball(-1, 0), Player::One, &weights), center);
        assert_eq!(evaluate(&with_ball(3, 0), Player::One, &weights), center - 2);
    }

    #[test]
    fn test_decided_games() {
        let weights = EvalWeights::default();
        let board = with_ball(0, 5);
        assert_eq!(evaluate(&board, Player::Two, &weights), WIN_SCORE);
        assert_eq!(evaluate(&board, Player::One, &weights), -WIN_SCORE);

        let mut stuck = Board::new(6, 8);
        for dir in Direction::ALL {
            stuck.set_edge_category(Edge::new(Point::ORIGIN, dir), EdgeCategory::Old);
        }
        // One is to move and has nowhere to go
        assert_eq!(evaluate(&stuck, Player::One, &weights), -WIN_SCORE);
        assert_eq!(evaluate(&stuck, Player::Two, &weights), WIN_SCORE);
    }

    #[test]
    fn test_custom_weights() {
        let weights = EvalWeights {
            vertical: 1,
            horizontal: 0,
        };
        assert_eq!(evaluate(&with_ball(3, 2), Player::Two, &weights), -3);
        assert_eq!(distance_to_goal(&with_ball(3, 2), Player::One, &weights), 7);
    }
}
