use std::collections::HashMap;

use crate::NameSource;
use crate::choice::{AdvanceGate, ChoiceProvider};
use crate::config::GameConfig;
use crate::constants::LOG_TARGET_SESSION;
use crate::day::{DayMode, DayOutcome, DaySimulator};
use crate::error::{GameError, InvariantViolation};
use crate::event::{EventKind, EventSink, EventStamper};
use crate::player::{HouseItem, Player};
use crate::pool::{BoxItemId, BoxPool, PoolError};
use crate::rng::RngBundle;
use crate::snapshot::SessionSnapshot;

/// Summary returned when a bounded game stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    pub turns_played: u32,
    pub final_snapshot: SessionSnapshot,
}

/// A whole game: roster, box, turn counter and RNG streams.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    catalog: Vec<HouseItem>,
    players: Vec<Player>,
    pool: BoxPool,
    turn: u32,
    max_turns: Option<u32>,
    rng: RngBundle,
}

impl GameSession {
    /// Build a session from already-loaded names.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty roster or an invalid configuration.
    pub fn new(
        config: GameConfig,
        seed: u64,
        player_names: &[String],
        house_item_names: &[String],
    ) -> Result<Self, GameError> {
        config.validate()?;
        if player_names.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let catalog: Vec<HouseItem> = house_item_names.iter().map(HouseItem::new).collect();
        let players = player_names
            .iter()
            .map(|name| Player::new(name.as_str(), &catalog))
            .collect();
        log::debug!(
            target: LOG_TARGET_SESSION,
            "new session: {} players, {} house items, {} box items, seed {seed}",
            player_names.len(),
            catalog.len(),
            config.box_item_count
        );
        Ok(Self {
            config,
            seed,
            catalog,
            players,
            pool: BoxPool::new(config.box_item_count),
            turn: 0,
            max_turns: None,
            rng: RngBundle::from_user_seed(seed),
        })
    }

    /// Build a session by reading both name lists once from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Source`] when the source fails, plus everything
    /// [`GameSession::new`] can return.
    pub fn from_source<S: NameSource>(
        source: &S,
        config: GameConfig,
        seed: u64,
    ) -> Result<Self, GameError> {
        let players = source
            .load_players()
            .map_err(|err| GameError::Source(Box::new(err)))?;
        let house_items = source
            .load_house_items()
            .map_err(|err| GameError::Source(Box::new(err)))?;
        Self::new(config, seed, &players, &house_items)
    }

    /// Stop [`GameSession::play`] after `max_turns` days.
    ///
    /// The game itself has no end; this is an opt-in cap for automated runs.
    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Rules mode of a given day.
    #[must_use]
    pub const fn mode_for_turn(&self, turn: u32) -> DayMode {
        DayMode::for_turn(turn, self.config.hardcore_start)
    }

    /// Play the next day.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Invariant`] when the day left the bookkeeping in an
    /// impossible state. The session should be discarded after that.
    pub fn advance_day(
        &mut self,
        choices: &mut dyn ChoiceProvider,
        sink: &mut dyn EventSink,
    ) -> Result<DayOutcome, GameError> {
        self.turn = self.turn.saturating_add(1);
        let mode = self.mode_for_turn(self.turn);
        let outcome = DaySimulator::new(&self.config, &mut self.players, &mut self.pool, &self.rng)
            .run_day(mode, self.turn, choices, sink)?;
        self.check_invariants()?;
        Ok(outcome)
    }

    /// Announce the players and play day after day, passing `gate` between
    /// days.
    ///
    /// Without [`GameSession::with_max_turns`] this only returns on error or
    /// once the gate reports it is closed.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`GameSession::advance_day`].
    pub fn play(
        &mut self,
        choices: &mut dyn ChoiceProvider,
        gate: &mut dyn AdvanceGate,
        sink: &mut dyn EventSink,
    ) -> Result<PlayReport, GameError> {
        EventStamper::new(sink, self.turn).emit(EventKind::Welcome {
            players: self.players.iter().map(|p| p.name().to_string()).collect(),
        });
        loop {
            if self.max_turns.is_some_and(|max| self.turn >= max) {
                break;
            }
            self.advance_day(choices, sink)?;
            gate.advance(self.turn);
            if gate.is_closed() {
                log::info!(target: LOG_TARGET_SESSION, "gate closed after day {}", self.turn);
                break;
            }
        }
        log::debug!(target: LOG_TARGET_SESSION, "stopped after {} turns", self.turn);
        Ok(PlayReport {
            turns_played: self.turn,
            final_snapshot: self.snapshot(),
        })
    }

    /// Verify the box accounting and every player's house accounting.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut owners: HashMap<BoxItemId, &str> = HashMap::new();
        for player in &self.players {
            for grant in player.box_items() {
                if self.pool.contains(grant.item) {
                    return Err(InvariantViolation::BoxItemDoubleBooked {
                        item: grant.item,
                        player: player.name().to_string(),
                    });
                }
                if let Some(first) = owners.insert(grant.item, player.name()) {
                    return Err(InvariantViolation::BoxItemSharedGrant {
                        item: grant.item,
                        first: first.to_string(),
                        second: player.name().to_string(),
                    });
                }
            }
        }
        if let Some(item) = self
            .pool
            .checked_out()
            .into_iter()
            .find(|item| !owners.contains_key(item))
        {
            return Err(InvariantViolation::BoxItemVanished(item));
        }
        if let Some(item) = owners
            .keys()
            .find(|item| item.0 == 0 || item.0 > self.pool.capacity())
        {
            return Err(InvariantViolation::Pool(PoolError::Foreign(*item)));
        }

        let expected = self.catalog.len();
        for player in &self.players {
            if player.house_item_count() != expected {
                return Err(InvariantViolation::HouseItemCount {
                    player: player.name().to_string(),
                    actual: player.house_item_count(),
                    expected,
                });
            }
            let mut tally: HashMap<&HouseItem, i64> = HashMap::new();
            for item in &self.catalog {
                *tally.entry(item).or_default() += 1;
            }
            for item in player.held().iter().chain(player.missing()) {
                *tally.entry(item).or_default() -= 1;
            }
            if let Some((item, _)) = tally.iter().find(|(_, count)| **count < 0) {
                return Err(InvariantViolation::HouseItemInBothPlaces {
                    player: player.name().to_string(),
                    item: item.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Deterministically reseed the session's RNG streams.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = RngBundle::from_user_seed(seed);
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self.turn, &self.players, &self.pool, &self.rng)
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub const fn pool(&self) -> &BoxPool {
        &self.pool
    }

    /// Current turn; 0 before the first day.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// House items every player started with.
    #[must_use]
    pub fn catalog(&self) -> &[HouseItem] {
        &self.catalog
    }

    /// RNG streams driving this session.
    #[must_use]
    pub const fn rng_bundle(&self) -> &RngBundle {
        &self.rng
    }

    /// Mutable roster access for scripted setups.
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Mutable box access for scripted setups.
    pub const fn pool_mut(&mut self) -> &mut BoxPool {
        &mut self.pool
    }
}
