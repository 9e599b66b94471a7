//! Error taxonomy of the game core.
//!
//! Draws from empty collections are not errors here: they surface as
//! notification events. What remains is construction failures and broken
//! bookkeeping, the latter being fatal.
use thiserror::Error;

use crate::config::ConfigError;
use crate::pool::{BoxItemId, PoolError};

/// Bookkeeping that should be impossible. Seeing one means a logic bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error(transparent)]
    Pool(PoolError),
    #[error("box item {item} is in the box and also on loan to {player}")]
    BoxItemDoubleBooked { item: BoxItemId, player: String },
    #[error("box item {item} is on loan to both {first} and {second}")]
    BoxItemSharedGrant {
        item: BoxItemId,
        first: String,
        second: String,
    },
    #[error("box item {0} is neither in the box nor on loan")]
    BoxItemVanished(BoxItemId),
    #[error("{player} accounts for the {item} more times than they own it")]
    HouseItemInBothPlaces { player: String, item: String },
    #[error("{player} chose to retrieve with nothing missing")]
    NothingToRetrieve { player: String },
    #[error("{player} accounts for {actual} house items, expected {expected}")]
    HouseItemCount {
        player: String,
        actual: usize,
        expected: usize,
    },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("could not load names")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl GameError {
    /// True when the error indicates corrupted state rather than bad input.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
