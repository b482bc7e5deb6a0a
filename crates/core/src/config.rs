//! Game setup: board size and which seats are played by humans.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::board::{Board, Player};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: i32,
    /// Field height without the gates.
    pub height: i32,
    /// Indexed by [`Player::index`].
    pub human: [bool; 2],
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{dimension} {value} outside [{min}, {max}]", min = GameConfig::MIN_SIZE, max = GameConfig::MAX_SIZE)]
    SizeOutOfRange { dimension: &'static str, value: i32 },

    #[error("{dimension} {value} is odd")]
    OddSize { dimension: &'static str, value: i32 },
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 12,
            human: [true, false],
        }
    }
}

impl GameConfig {
    pub const MIN_SIZE: i32 = 2;
    pub const MAX_SIZE: i32 = 30;

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimension("width", self.width)
            .and_then(|()| check_dimension("height", self.height))
            .inspect_err(|err| warn!(error = %err, "invalid game config"))
    }

    pub fn is_player_human(&self, player: Player) -> bool {
        self.human[player.index()]
    }

    pub fn set_player_human(&mut self, player: Player, human: bool) {
        self.human[player.index()] = human;
    }

    /// Fresh board of the configured size.
    pub fn new_board(&self) -> Result<Board, ConfigError> {
        self.validate()?;
        Ok(Board::new(self.width, self.height))
    }
}

fn check_dimension(dimension: &'static str, value: i32) -> Result<(), ConfigError> {
    if !(GameConfig::MIN_SIZE..=GameConfig::MAX_SIZE).contains(&value) {
        return Err(ConfigError::SizeOutOfRange { dimension, value });
    }
    if value % 2 != 0 {
        return Err(ConfigError::OddSize { dimension, value });
    }
    Ok(())
}
