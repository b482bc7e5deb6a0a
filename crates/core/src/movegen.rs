//! turn enumeration - depth-first over steps, push/pop backtracking
//! perft-style counters built on top of it

use rustc_hash::FxHashSet;

use crate::board::Board;
use crate::geometry::Direction;

impl Board {
    /// Visits every complete turn reachable from the current position.
    ///
    /// `visit` receives the board right after the turn and the turn's steps,
    /// including any steps already in progress when enumeration started. A
    /// finishable turn is committed for the duration of the call and undone
    /// afterwards; a decided game is visited once as-is. Returning `false`
    /// from `visit` stops the enumeration.
    ///
    /// The board is left exactly as it was, also when stopped early. `visit`
    /// may mutate the board it is given only if it restores it before
    /// returning.
    ///
    /// Returns whether the enumeration ran to completion.
    pub fn enumerate_moves<F>(&mut self, mut visit: F) -> bool
    where
        F: FnMut(&mut Board, &[Direction]) -> bool,
    {
        self.enumerate_from_here(&mut visit)
    }

    fn enumerate_from_here<F>(&mut self, visit: &mut F) -> bool
    where
        F: FnMut(&mut Board, &[Direction]) -> bool,
    {
        if self.winner().is_some() {
            let steps = self.current_move().to_vec();
            return visit(self, &steps);
        }

        if self.can_finish_move() {
            let steps = self.finish_move();
            let keep_going = visit(self, &steps);
            self.undo_finish_move(steps);
            return keep_going;
        }

        for dir in Direction::ALL {
            if !self.can_step_in_direction(dir) {
                continue;
            }
            self.push_step(dir);
            let keep_going = self.enumerate_from_here(visit);
            self.pop_step();
            if !keep_going {
                return false;
            }
        }
        true
    }
}

/// Number of complete turns available to the player to move.
pub fn count_turns(board: &mut Board) -> u64 {
    let mut count = 0u64;
    board.enumerate_moves(|_, _| {
        count += 1;
        true
    });
    count
}

/// perft - leaf count of the turn tree, `depth` turns deep
///
/// A decided game counts as a leaf no matter how much depth is left.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 || board.winner().is_some() {
        return 1;
    }
    if depth == 1 {
        return count_turns(board);
    }

    let mut nodes = 0u64;
    board.enumerate_moves(|child, _| {
        nodes += perft(child, depth - 1);
        true
    });
    nodes
}

/// Number of distinct positions after one turn. Different paths that claim
/// the same edges and stop on the same point count once.
pub fn distinct_positions(board: &mut Board) -> usize {
    let mut seen = FxHashSet::default();
    board.enumerate_moves(|child, _| {
        seen.insert(child.clone());
        true
    });
    seen.len()
}
