//! Kickoff core crate - board, rules and turn enumeration for paper soccer.

mod board;
mod config;
mod geometry;
mod history;
mod movegen;
mod record;
mod shape;

pub use board::{Board, EdgeCategory, Player, Size, Steps};
pub use config::{ConfigError, GameConfig};
pub use geometry::{Direction, Edge, Point};
pub use history::{History, HistoryError, HistoryRecord};
pub use movegen::{count_turns, distinct_positions, perft};
pub use record::{BoardRecord, RecordError};
pub use shape::Shape;
