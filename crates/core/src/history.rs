//! Committed boards of a game, oldest first, with an optional focused entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::Board;
use crate::record::{BoardRecord, RecordError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    boards: Vec<Board>,
    focus: Option<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn board_at(&self, index: usize) -> Option<&Board> {
        self.boards.get(index)
    }

    pub fn focus(&self) -> Option<usize> {
        self.focus
    }

    /// Panics if `focus` points past the last board.
    pub fn set_focus(&mut self, focus: Option<usize>) {
        if let Some(index) = focus {
            assert!(
                index < self.boards.len(),
                "focus {index} out of {} boards",
                self.boards.len()
            );
        }
        self.focus = focus;
    }

    pub fn focus_last(&mut self) {
        self.focus = self.boards.len().checked_sub(1);
    }

    pub fn focused_board(&self) -> Option<&Board> {
        self.focus.map(|index| &self.boards[index])
    }

    pub fn focused_board_mut(&mut self) -> Option<&mut Board> {
        self.focus.map(|index| &mut self.boards[index])
    }

    pub fn push(&mut self, board: Board) {
        self.boards.push(board);
    }

    /// Removes the newest board. A focus on it moves to the one before.
    pub fn pop(&mut self) -> Option<Board> {
        let board = self.boards.pop()?;
        let len = self.boards.len();
        if len == 0 {
            self.focus = None;
        } else if self.focus == Some(len) {
            self.focus = Some(len - 1);
        }
        Some(board)
    }

    pub fn clear(&mut self) {
        self.focus = None;
        self.boards.clear();
    }

    /// Drops every board after the focused one, or all of them without a
    /// focus.
    pub fn clear_after_focus(&mut self) {
        let keep = self.focus.map_or(0, |index| index + 1);
        self.boards.truncate(keep);
    }

    pub fn to_record(&self) -> HistoryRecord {
        HistoryRecord {
            focus: self.focus,
            boards: self.boards.iter().map(Board::to_record).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub focus: Option<usize>,
    pub boards: Vec<BoardRecord>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("focus {focus} out of {len} boards")]
    FocusOutOfRange { focus: usize, len: usize },

    #[error("board {index}: {source}")]
    Board {
        index: usize,
        #[source]
        source: RecordError,
    },
}

impl TryFrom<HistoryRecord> for History {
    type Error = HistoryError;

    fn try_from(record: HistoryRecord) -> Result<Self, Self::Error> {
        let len = record.boards.len();
        if let Some(focus) = record.focus.filter(|&focus| focus >= len) {
            warn!(focus, len, "rejecting history record");
            return Err(HistoryError::FocusOutOfRange { focus, len });
        }

        let boards = record
            .boards
            .into_iter()
            .enumerate()
            .map(|(index, board)| {
                Board::try_from(board).map_err(|source| HistoryError::Board { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(History {
            boards,
            focus: record.focus,
        })
    }
}
