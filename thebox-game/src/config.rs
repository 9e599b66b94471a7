//! Rule configuration for a game session.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_BOX_ITEM_COUNT, EXPIRATION_WINDOW, HARDCORE_START};

/// Errors raised when a configuration would break the day loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("expiration window must be at least 1 turn")]
    ZeroExpirationWindow,
    #[error("hardcore start must be day 1 or later (got {0})")]
    HardcoreStartTooEarly(u32),
}

/// Tunable values of a game. Everything else about the rules is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "GameConfig::default_expiration_window")]
    pub expiration_window: u32,
    #[serde(default = "GameConfig::default_hardcore_start")]
    pub hardcore_start: u32,
    #[serde(default = "GameConfig::default_box_item_count")]
    pub box_item_count: u32,
}

impl GameConfig {
    const fn default_expiration_window() -> u32 {
        EXPIRATION_WINDOW
    }

    const fn default_hardcore_start() -> u32 {
        HARDCORE_START
    }

    const fn default_box_item_count() -> u32 {
        DEFAULT_BOX_ITEM_COUNT
    }

    /// Default rules with a custom box size.
    #[must_use]
    pub const fn with_box_item_count(box_item_count: u32) -> Self {
        Self {
            expiration_window: EXPIRATION_WINDOW,
            hardcore_start: HARDCORE_START,
            box_item_count,
        }
    }

    /// Check the configuration for values the day loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero expiration window or a hardcore start of 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.expiration_window == 0 {
            return Err(ConfigError::ZeroExpirationWindow);
        }
        if self.hardcore_start == 0 {
            return Err(ConfigError::HardcoreStartTooEarly(self.hardcore_start));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_box_item_count(DEFAULT_BOX_ITEM_COUNT)
    }
}
