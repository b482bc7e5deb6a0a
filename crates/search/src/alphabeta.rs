//! Alpha-beta search over complete turns.
//!
//! A turn is a variable number of steps, and the depth budget is counted in
//! steps: every turn spends as much depth as it added steps. All nodes share
//! one board that `enumerate_moves` mutates and restores around each child.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use kickoff_core::{Board, Player, Steps};
use kickoff_eval::{evaluate, EvalWeights, WIN_SCORE};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bound of the alpha-beta window.
pub const INFINITY: i32 = WIN_SCORE;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Step budget from the root.
    pub depth: i32,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 6,
            weights: EvalWeights::default(),
        }
    }
}

/// Best turn found from a root position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The whole turn, including steps already in progress at the root.
    pub steps: Steps,
    /// How many of `steps` the search added.
    pub added: usize,
    pub score: i32,
    pub nodes: u64,
}

impl SearchOutcome {
    /// Copy of `root` with the added steps pushed. The turn is left
    /// uncommitted.
    ///
    /// `root` must be the board the search ran on. With an `added` larger
    /// than `steps` the whole of `steps` is pushed.
    pub fn apply(&self, root: &Board) -> Board {
        let mut board = root.clone();
        let start = self.steps.len().saturating_sub(self.added);
        for &dir in &self.steps[start..] {
            board.push_step(dir);
        }
        board
    }
}

struct AlphaBeta<'a> {
    player: Player,
    weights: &'a EvalWeights,
    cancel: &'a AtomicBool,
    nodes: u64,
}

impl AlphaBeta<'_> {
    #[inline]
    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    fn alphabeta(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
    ) -> i32 {
        self.nodes += 1;
        if self.cancelled() {
            return 0;
        }
        if depth <= 0 || board.winner().is_some() {
            return evaluate(board, self.player, self.weights);
        }

        let before = board.current_move().len();
        if maximizing {
            board.enumerate_moves(|child, steps| {
                let spent = (steps.len() - before) as i32;
                alpha = alpha.max(self.alphabeta(child, depth - spent, alpha, beta, false));
                beta > alpha && !self.cancelled()
            });
            alpha
        } else {
            board.enumerate_moves(|child, steps| {
                let spent = (steps.len() - before) as i32;
                beta = beta.min(self.alphabeta(child, depth - spent, alpha, beta, true));
                beta > alpha && !self.cancelled()
            });
            beta
        }
    }
}

/// Finds the best turn for the player to move on `board`.
///
/// Any steps already taken this turn are kept and the search continues from
/// them. Ties go to the turn enumerated first. Returns None when `cancel` is
/// raised before the search ends or when the game is already decided.
#[instrument(skip_all, fields(depth = config.depth, player = ?board.current_player()))]
pub fn search(board: &Board, config: &SearchConfig, cancel: &AtomicBool) -> Option<SearchOutcome> {
    if board.winner().is_some() {
        debug!("game already decided");
        return None;
    }

    let start = Instant::now();
    let mut root = board.clone();
    let before = root.current_move().len();
    let mut engine = AlphaBeta {
        player: root.current_player(),
        weights: &config.weights,
        cancel,
        nodes: 0,
    };

    let mut best: Option<Steps> = None;
    let mut best_score = -2 * INFINITY;
    root.enumerate_moves(|child, steps| {
        let spent = (steps.len() - before) as i32;
        // children scoring at or below the best so far cannot replace it
        let alpha = best_score.max(-INFINITY);
        let score = engine.alphabeta(child, config.depth - spent, alpha, INFINITY, false);
        if score > best_score {
            best_score = score;
            best = Some(Steps::from_slice(steps));
        }
        !engine.cancelled()
    });

    if engine.cancelled() {
        debug!(nodes = engine.nodes, "search cancelled");
        return None;
    }

    let steps = best?;
    debug!(
        nodes = engine.nodes,
        score = best_score,
        steps = steps.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );
    Some(SearchOutcome {
        added: steps.len() - before,
        steps,
        score: best_score,
        nodes: engine.nodes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kickoff_core::Direction::*;
    use kickoff_core::Point;

    fn run(board: &Board, depth: i32) -> Option<SearchOutcome> {
        let config = SearchConfig {
            depth,
            ..SearchConfig::default()
        };
        search(board, &config, &AtomicBool::new(false))
    }

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.depth, 6);
        assert_eq!(config.weights, EvalWeights::default());
    }

    #[test]
    fn test_scores_into_top_gate() {
        let mut board = Board::new(2, 2);
        board.set_current_player(Player::Two);
        let outcome = run(&board, 6).expect("a move");
        assert_eq!(outcome.steps.as_slice(), &[North, NorthWest]);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.score, WIN_SCORE);
        assert_eq!(outcome.nodes, 101);
    }

    /// Both sides keep playing their searched turn until the game ends.
    fn play_out(mut board: Board, depth: i32) -> Option<Player> {
        for _ in 0..64 {
            if let Some(winner) = board.winner() {
                return Some(winner);
            }
            board = run(&board, depth)?.apply(&board);
            if board.winner().is_none() {
                board.finish_move();
            }
        }
        None
    }

    #[test]
    fn test_scores_into_bottom_gate() {
        let board = Board::new(2, 2);
        let outcome = run(&board, 6).expect("a move");
        // East is enumerated before SouthEast and both win
        assert_eq!(outcome.steps.as_slice(), &[South, East]);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.score, WIN_SCORE);

        let applied = outcome.apply(&board);
        assert_eq!(applied.ball(), Point::new(1, -1));
        assert!(applied.can_finish_move());
        assert_eq!(play_out(applied, 6), Some(Player::One));
    }

    #[test]
    fn test_lost_position_still_moves() {
        let mut board = Board::new(2, 2);
        board.push_step(North);
        let outcome = run(&board, 6).expect("a move");
        // every continuation loses; the first one enumerated is kept
        assert_eq!(outcome.steps.as_slice(), &[North, NorthWest]);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.score, -WIN_SCORE);
    }

    #[test]
    fn test_apply_pushes_added_steps_only() {
        let mut board = Board::new(2, 2);
        board.push_step(North);
        let outcome = run(&board, 6).expect("a move");
        let applied = outcome.apply(&board);
        assert_eq!(applied.current_move(), outcome.steps.as_slice());
        assert_eq!(applied.current_player(), Player::One);
        assert_eq!(applied.winner(), Some(Player::Two));
    }

    #[test]
    fn test_apply_clamps_oversized_added() {
        let board = Board::new(2, 2);
        let outcome = SearchOutcome {
            steps: Steps::from_slice(&[North]),
            added: 3,
            score: 0,
            nodes: 0,
        };
        assert_eq!(outcome.apply(&board).current_move(), &[North]);
    }

    #[test]
    fn test_decided_game_has_no_move() {
        let mut board = Board::new(2, 2);
        board.push_step(North);
        board.push_step(North);
        assert!(board.winner().is_some());
        assert_eq!(run(&board, 6), None);
    }

    #[test]
    fn test_cancelled_search_returns_none() {
        let board = Board::new(2, 2);
        let cancel = AtomicBool::new(true);
        assert_eq!(search(&board, &SearchConfig::default(), &cancel), None);
    }

    #[test]
    fn test_zero_depth_scores_children_statically() {
        let board = Board::new(2, 2);
        let outcome = run(&board, 0).expect("a move");
        // every child is a leaf, one node each
        assert_eq!(outcome.nodes, 20);
        assert_eq!(outcome.score, WIN_SCORE);
    }
}
