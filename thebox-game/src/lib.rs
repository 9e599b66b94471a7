//! The Box Game Engine
//!
//! Platform-agnostic core logic for The Box party elimination game.
//! This crate owns the day-by-day rules without any console, file or
//! logger setup; front ends plug in through the traits re-exported here.

pub mod choice;
pub mod config;
pub mod constants;
pub mod day;
pub mod error;
pub mod event;
pub mod player;
pub mod pool;
pub mod rng;
pub mod session;
pub mod snapshot;

// Re-export commonly used types
pub use choice::{
    AdvanceGate, AlwaysChoose, Choice, ChoiceContext, ChoiceParseError, ChoiceProvider, GateFn,
    NoPause, RandomChoices, ScriptedChoices,
};
pub use config::{ConfigError, GameConfig};
pub use constants::{DEFAULT_BOX_ITEM_COUNT, EXPIRATION_WINDOW, HARDCORE_START};
pub use day::{DayMode, DayOutcome, DaySimulator, ExpiredGrant, FivePmOutcome, Phase, Reward};
pub use error::{GameError, InvariantViolation};
pub use event::{Event, EventId, EventKind, EventSeverity, EventSink, NullSink, SinkFn};
pub use player::{BoxGrant, HouseChange, HouseItem, Player};
pub use pool::{BoxItemId, BoxPool, PoolError};
pub use rng::{DrawCounts, DrawStream, RngBundle};
pub use session::{GameSession, PlayReport};
pub use snapshot::{PlayerSnapshot, SessionSnapshot};

/// Trait for abstracting where player and house-item names come from.
/// Platform-specific implementations should provide this.
pub trait NameSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the ordered player roster. Duplicates become separate players.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    fn load_players(&self) -> Result<Vec<String>, Self::Error>;

    /// Load the ordered house-item catalog every player starts with.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_house_items(&self) -> Result<Vec<String>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use thiserror::Error;

    #[derive(Clone, Default)]
    struct FixtureSource;

    impl NameSource for FixtureSource {
        type Error = Infallible;

        fn load_players(&self) -> Result<Vec<String>, Self::Error> {
            Ok(vec!["Ada".into(), "Bo".into(), "Ada".into()])
        }

        fn load_house_items(&self) -> Result<Vec<String>, Self::Error> {
            Ok(vec!["lamp".into(), "mug".into()])
        }
    }

    #[derive(Debug, Error)]
    #[error("names unavailable")]
    struct Unavailable;

    struct BrokenSource;

    impl NameSource for BrokenSource {
        type Error = Unavailable;

        fn load_players(&self) -> Result<Vec<String>, Self::Error> {
            Err(Unavailable)
        }

        fn load_house_items(&self) -> Result<Vec<String>, Self::Error> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn session_from_source_keeps_duplicate_names() {
        let session =
            GameSession::from_source(&FixtureSource, GameConfig::default(), 0xABCD).unwrap();
        let names: Vec<&str> = session.players().iter().map(Player::name).collect();
        assert_eq!(names, vec!["Ada", "Bo", "Ada"]);
        assert_eq!(session.pool().len(), 100);
        assert_eq!(session.catalog().len(), 2);
    }

    #[test]
    fn source_failures_surface_as_game_errors() {
        let err = GameSession::from_source(&BrokenSource, GameConfig::default(), 1).unwrap_err();
        assert!(matches!(err, GameError::Source(_)));
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("names unavailable"));
    }
}
