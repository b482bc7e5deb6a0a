//! Flat, serializable form of a [`Board`] for save files.
//!
//! Loading goes through [`TryFrom<BoardRecord>`], which checks every field
//! before a board is built, so corrupt input never reaches the rules code.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::{edge_shape, Board, EdgeCategory, Player, Size, Steps};
use crate::geometry::{Direction, Edge, Point};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoardRecord {
    pub width: i32,
    /// Includes the two gate rows.
    pub height: i32,
    pub ball: Point,
    /// Edge category codes in storage order.
    pub edges: Vec<u8>,
    pub current_player: u8,
    /// Direction codes of the turn in progress.
    pub current_move: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid board size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },

    #[error("expected {expected} edges, found {found}")]
    EdgeCountMismatch { expected: usize, found: usize },

    #[error("edge {index} has unknown category code {code}")]
    InvalidEdgeCategory { index: usize, code: u8 },

    #[error("edge slot {index} lies outside the board but is not empty")]
    OutsideEdgeClaimed { index: usize },

    #[error("unknown player code {0}")]
    InvalidPlayer(u8),

    #[error("ball at ({x}, {y}) is outside the board")]
    BallOutside { x: i32, y: i32 },

    #[error("step {index} has unknown direction code {code}")]
    InvalidDirection { index: usize, code: u8 },

    #[error("turn in progress does not match the claimed edges")]
    InconsistentMove,
}

impl Board {
    pub fn to_record(&self) -> BoardRecord {
        let size = self.size();
        BoardRecord {
            width: size.width,
            height: size.height,
            ball: self.ball(),
            edges: self.edge_slots().iter().map(|c| c.code()).collect(),
            current_player: self.current_player().index() as u8,
            current_move: self.current_move().iter().map(|d| d.index()).collect(),
        }
    }
}

impl TryFrom<BoardRecord> for Board {
    type Error = RecordError;

    fn try_from(record: BoardRecord) -> Result<Self, Self::Error> {
        validate(&record)
            .inspect_err(|err| warn!(error = %err, "rejecting board record"))
    }
}

fn validate(record: &BoardRecord) -> Result<Board, RecordError> {
    let BoardRecord { width, height, .. } = *record;
    if width <= 0 || width % 2 != 0 || height < 4 || height % 2 != 0 {
        return Err(RecordError::InvalidSize { width, height });
    }

    let shape = edge_shape(width / 2, height / 2);
    if record.edges.len() != shape.size() {
        return Err(RecordError::EdgeCountMismatch {
            expected: shape.size(),
            found: record.edges.len(),
        });
    }

    let edges = record
        .edges
        .iter()
        .enumerate()
        .map(|(index, &code)| {
            EdgeCategory::from_code(code).ok_or(RecordError::InvalidEdgeCategory { index, code })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Inside tests need a board of the declared size; this one only answers
    // geometry questions and reads back the edge slots.
    let size = Size { width, height };
    let scratch = Board::from_parts(size, Point::ORIGIN, edges.clone(), Player::One, Steps::new());

    for (index, &category) in edges.iter().enumerate() {
        let [x, y, dir] = shape.unmap(index);
        let inside = Direction::from_index(dir as u8)
            .is_some_and(|dir| scratch.is_edge_inside(Edge::new(Point::new(x, y), dir)));
        if !inside && category != EdgeCategory::Empty {
            return Err(RecordError::OutsideEdgeClaimed { index });
        }
    }

    let current_player = Player::from_index(record.current_player)
        .ok_or(RecordError::InvalidPlayer(record.current_player))?;

    let ball = record.ball;
    if !scratch.is_point_inside(ball) {
        return Err(RecordError::BallOutside { x: ball.x, y: ball.y });
    }

    let current_move = record
        .current_move
        .iter()
        .enumerate()
        .map(|(index, &code)| {
            Direction::from_index(code).ok_or(RecordError::InvalidDirection { index, code })
        })
        .collect::<Result<Steps, _>>()?;

    // walk the turn back from the ball: every step must sit on a New edge
    let mut point = ball;
    let mut walked = FxHashSet::default();
    for &dir in current_move.iter().rev() {
        let edge = Edge::new(point, dir.opposite());
        if !scratch.is_edge_inside(edge)
            || scratch.edge_category(edge) != EdgeCategory::New
            || !walked.insert(edge)
        {
            return Err(RecordError::InconsistentMove);
        }
        point = edge.end();
    }
    let new_edges = edges.iter().filter(|&&c| c == EdgeCategory::New).count();
    if new_edges != current_move.len() {
        return Err(RecordError::InconsistentMove);
    }

    Ok(Board::from_parts(size, ball, edges, current_player, current_move))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction::*;

    fn mid_turn_board() -> Board {
        let mut board = Board::new(4, 4);
        board.push_step(North);
        board.push_step(East);
        board.push_step(South);
        board.push_step(West);
        board.finish_move();
        board.push_step(NorthEast);
        board
    }

    #[test]
    fn test_round_trip() {
        let board = mid_turn_board();
        let record = board.to_record();
        assert_eq!(Board::try_from(record), Ok(board));
    }

    #[test]
    fn test_round_trip_json() {
        let board = mid_turn_board();
        let json = serde_json::to_string(&board.to_record()).expect("serialize");
        let record: BoardRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(Board::try_from(record), Ok(board));
    }

    #[test]
    fn test_rejects_bad_size() {
        let mut record = Board::new(4, 4).to_record();
        record.width = 5;
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::InvalidSize { width: 5, height: 6 })
        );
    }

    #[test]
    fn test_rejects_truncated_edges() {
        let mut record = Board::new(4, 4).to_record();
        let expected = record.edges.len();
        record.edges.pop();
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::EdgeCountMismatch {
                expected,
                found: expected - 1
            })
        );
    }

    #[test]
    fn test_rejects_unknown_category() {
        let mut record = Board::new(4, 4).to_record();
        record.edges[3] = 9;
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::InvalidEdgeCategory { index: 3, code: 9 })
        );
    }

    #[test]
    fn test_rejects_claimed_outside_slot() {
        let mut record = Board::new(4, 4).to_record();
        // slot 0 is (-2, -3, NW): outside the board
        record.edges[0] = EdgeCategory::Old.code();
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::OutsideEdgeClaimed { index: 0 })
        );
    }

    #[test]
    fn test_rejects_unknown_player() {
        let mut record = Board::new(4, 4).to_record();
        record.current_player = 2;
        assert_eq!(Board::try_from(record), Err(RecordError::InvalidPlayer(2)));
    }

    #[test]
    fn test_rejects_ball_outside() {
        let mut record = Board::new(4, 4).to_record();
        record.ball = Point::new(2, 3);
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::BallOutside { x: 2, y: 3 })
        );
    }

    #[test]
    fn test_rejects_unknown_direction() {
        let mut record = mid_turn_board().to_record();
        record.current_move[0] = 8;
        assert_eq!(
            Board::try_from(record),
            Err(RecordError::InvalidDirection { index: 0, code: 8 })
        );
    }

    #[test]
    fn test_rejects_move_without_new_edges() {
        let mut record = Board::new(4, 4).to_record();
        record.current_move = vec![North.index()];
        record.ball = Point::new(0, 1);
        assert_eq!(Board::try_from(record), Err(RecordError::InconsistentMove));
    }

    #[test]
    fn test_rejects_move_walking_an_edge_twice() {
        let mut board = Board::new(4, 4);
        board.set_edge_category(Edge::new(Point::ORIGIN, North), EdgeCategory::New);
        board.set_edge_category(Edge::new(Point::ORIGIN, East), EdgeCategory::New);
        let mut record = board.to_record();
        record.current_move = vec![North.index(), South.index()];
        assert_eq!(Board::try_from(record), Err(RecordError::InconsistentMove));
    }

    #[test]
    fn test_rejects_stray_new_edge() {
        let mut board = Board::new(4, 4);
        board.set_edge_category(Edge::new(Point::ORIGIN, North), EdgeCategory::New);
        assert_eq!(
            Board::try_from(board.to_record()),
            Err(RecordError::InconsistentMove)
        );
    }
}
