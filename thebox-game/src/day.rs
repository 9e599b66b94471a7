//! One simulated day: expiration sweep, the 5 PM event and the 9 PM event.
//!
//! Normal days reward a random player at 5 PM with either a retrieved house
//! item or a gift from the box. Hardcore days replace the reward with a second
//! loss and skip the expiration sweep. Both end with the 9 PM loss.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::choice::{Choice, ChoiceContext, ChoiceProvider};
use crate::config::GameConfig;
use crate::constants::LOG_TARGET_DAY;
use crate::error::{GameError, InvariantViolation};
use crate::event::{EventKind, EventSink, EventStamper};
use crate::player::{BoxGrant, HouseChange, HouseItem, Player};
use crate::pool::{BoxItemId, BoxPool};
use crate::rng::RngBundle;
use crate::snapshot::SessionSnapshot;

/// Rule set a day is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMode {
    Normal,
    Hardcore,
}

impl DayMode {
    /// Mode of a given day under the configured hardcore start.
    #[must_use]
    pub const fn for_turn(turn: u32, hardcore_start: u32) -> Self {
        if turn >= hardcore_start {
            Self::Hardcore
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub const fn is_hardcore(self) -> bool {
        matches!(self, Self::Hardcore)
    }
}

impl fmt::Display for DayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Hardcore => "hardcore",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FivePm,
    NinePm,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FivePm => "5 PM",
            Self::NinePm => "9 PM",
        })
    }
}

/// Grant returned to the box during the expiration sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiredGrant {
    pub seat: usize,
    pub grant: BoxGrant,
}

/// What the 5 PM winner walked away with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reward {
    Retrieved(HouseItem),
    Gift(BoxGrant),
    /// A gift was due but the box had nothing left.
    BoxEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FivePmOutcome {
    Winner {
        seat: usize,
        /// `None` when the winner was missing nothing and got a gift outright.
        choice: Option<Choice>,
        reward: Reward,
    },
    Loser {
        seat: usize,
        change: HouseChange,
    },
}

impl FivePmOutcome {
    #[must_use]
    pub const fn seat(&self) -> usize {
        match self {
            Self::Winner { seat, .. } | Self::Loser { seat, .. } => *seat,
        }
    }
}

/// Summary of a finished day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutcome {
    pub turn: u32,
    pub mode: DayMode,
    pub expired: SmallVec<[ExpiredGrant; 4]>,
    pub five_pm: FivePmOutcome,
    pub nine_pm_seat: usize,
    pub nine_pm: HouseChange,
}

impl DayOutcome {
    /// Box item handed out today, if any.
    #[must_use]
    pub const fn granted(&self) -> Option<BoxGrant> {
        match &self.five_pm {
            FivePmOutcome::Winner {
                reward: Reward::Gift(grant),
                ..
            } => Some(*grant),
            _ => None,
        }
    }
}

/// Runs days against borrowed session state.
pub struct DaySimulator<'a> {
    config: &'a GameConfig,
    players: &'a mut [Player],
    pool: &'a mut BoxPool,
    rng: &'a RngBundle,
}

impl<'a> DaySimulator<'a> {
    pub fn new(
        config: &'a GameConfig,
        players: &'a mut [Player],
        pool: &'a mut BoxPool,
        rng: &'a RngBundle,
    ) -> Self {
        Self {
            config,
            players,
            pool,
            rng,
        }
    }

    /// Play one full day.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NoPlayers`] for an empty roster and
    /// [`GameError::Invariant`] if an expired item cannot go back in the box.
    pub fn run_day(
        &mut self,
        mode: DayMode,
        turn: u32,
        choices: &mut dyn ChoiceProvider,
        sink: &mut dyn EventSink,
    ) -> Result<DayOutcome, GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }
        let mut events = EventStamper::new(sink, turn);
        events.emit(EventKind::DayStarted { mode });

        if log::log_enabled!(target: LOG_TARGET_DAY, log::Level::Debug) {
            SessionSnapshot::capture(turn, &*self.players, &*self.pool, self.rng)
                .log_debug(LOG_TARGET_DAY);
        }

        events.emit(EventKind::PhaseStarted {
            phase: Phase::FivePm,
        });
        let expired = if mode.is_hardcore() {
            SmallVec::new()
        } else {
            self.sweep_expired(turn, &mut events)?
        };
        let five_pm = match mode {
            DayMode::Normal => self.reward_winner(turn, choices, &mut events)?,
            DayMode::Hardcore => {
                let seat = self.pick_seat();
                events.emit(EventKind::UnluckyPlayer {
                    player: self.players[seat].name().to_string(),
                    phase: Phase::FivePm,
                });
                let change = self.lose_item(seat, &mut events);
                FivePmOutcome::Loser { seat, change }
            }
        };

        events.emit(EventKind::PhaseStarted {
            phase: Phase::NinePm,
        });
        let nine_pm_seat = self.pick_seat();
        events.emit(EventKind::UnluckyPlayer {
            player: self.players[nine_pm_seat].name().to_string(),
            phase: Phase::NinePm,
        });
        let nine_pm = self.lose_item(nine_pm_seat, &mut events);

        Ok(DayOutcome {
            turn,
            mode,
            expired,
            five_pm,
            nine_pm_seat,
            nine_pm,
        })
    }

    fn sweep_expired(
        &mut self,
        turn: u32,
        events: &mut EventStamper<'_>,
    ) -> Result<SmallVec<[ExpiredGrant; 4]>, GameError> {
        let mut expired = SmallVec::new();
        for (seat, player) in self.players.iter_mut().enumerate() {
            let Some(grant) = player.sweep_expired(turn) else {
                continue;
            };
            self.pool
                .return_item(grant.item)
                .map_err(InvariantViolation::Pool)?;
            log::debug!(
                target: LOG_TARGET_DAY,
                "{} returns box item {}",
                player.name(),
                grant.item
            );
            events.emit(EventKind::BoxItemExpired {
                player: player.name().to_string(),
                item: grant.item,
            });
            expired.push(ExpiredGrant { seat, grant });
        }
        Ok(expired)
    }

    fn reward_winner(
        &mut self,
        turn: u32,
        choices: &mut dyn ChoiceProvider,
        events: &mut EventStamper<'_>,
    ) -> Result<FivePmOutcome, GameError> {
        let seat = self.pick_seat();
        let name = self.players[seat].name().to_string();
        events.emit(EventKind::LuckyPlayer {
            player: name.clone(),
        });

        if !self.players[seat].has_missing_items() {
            events.emit(EventKind::FullHouseGift { player: name });
            let reward = self.gift(seat, turn, events)?;
            return Ok(FivePmOutcome::Winner {
                seat,
                choice: None,
                reward,
            });
        }

        events.emit(EventKind::ChoiceRequested {
            player: name.clone(),
        });
        let choice = choices.choose(&ChoiceContext {
            turn,
            player: &self.players[seat],
            box_available: self.pool.len(),
        });
        events.emit(EventKind::ChoiceMade {
            player: name,
            choice,
        });
        let reward = match choice {
            Choice::Retrieve => match self.retrieve_item(seat, events) {
                HouseChange::Retrieved(item) => Reward::Retrieved(item),
                _ => {
                    return Err(InvariantViolation::NothingToRetrieve {
                        player: self.players[seat].name().to_string(),
                    }
                    .into());
                }
            },
            Choice::Gift => self.gift(seat, turn, events)?,
        };
        Ok(FivePmOutcome::Winner {
            seat,
            choice: Some(choice),
            reward,
        })
    }

    fn gift(
        &mut self,
        seat: usize,
        turn: u32,
        events: &mut EventStamper<'_>,
    ) -> Result<Reward, GameError> {
        let player = &mut self.players[seat];
        let item: BoxItemId = match self.pool.withdraw_random(&mut *self.rng.pool()) {
            Ok(item) => item,
            Err(err) if err.is_invariant_violation() => {
                return Err(InvariantViolation::Pool(err).into());
            }
            Err(_) => {
                log::debug!(target: LOG_TARGET_DAY, "box is empty, {} gets nothing", player.name());
                events.emit(EventKind::BoxEmpty {
                    player: player.name().to_string(),
                });
                return Ok(Reward::BoxEmpty);
            }
        };
        let window = self.config.expiration_window;
        let grant = player.grant_box_item(item, turn, window);
        events.emit(EventKind::BoxItemGranted {
            player: player.name().to_string(),
            item,
            expires_on: grant.expires_on,
            window,
        });
        Ok(Reward::Gift(grant))
    }

    fn lose_item(&mut self, seat: usize, events: &mut EventStamper<'_>) -> HouseChange {
        let player = &mut self.players[seat];
        let change = player.lose_random_house_item(&mut *self.rng.house());
        let name = player.name().to_string();
        match &change {
            HouseChange::Lost(item) => events.emit(EventKind::HouseItemLost {
                player: name,
                item: item.clone(),
                remaining: player.held().to_vec(),
            }),
            _ => events.emit(EventKind::NothingToLose { player: name }),
        }
        change
    }

    fn retrieve_item(&mut self, seat: usize, events: &mut EventStamper<'_>) -> HouseChange {
        let player = &mut self.players[seat];
        let change = player.retrieve_random_house_item(&mut *self.rng.house());
        let name = player.name().to_string();
        match &change {
            HouseChange::Retrieved(item) => events.emit(EventKind::HouseItemRetrieved {
                player: name,
                item: item.clone(),
                held: player.held().to_vec(),
            }),
            _ => events.emit(EventKind::NothingToRetrieve { player: name }),
        }
        change
    }

    fn pick_seat(&self) -> usize {
        self.rng.roster().gen_range(0..self.players.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{AlwaysChoose, ScriptedChoices};
    use crate::event::{Event, NullSink};

    fn roster(names: &[&str], catalog: &[&str]) -> Vec<Player> {
        let catalog: Vec<HouseItem> = catalog.iter().map(|n| HouseItem::new(*n)).collect();
        names.iter().map(|n| Player::new(*n, &catalog)).collect()
    }

    #[test]
    fn hardcore_day_never_touches_the_box() {
        let config = GameConfig::with_box_item_count(3);
        let mut players = roster(&["Ada", "Bo"], &["lamp", "mug", "rug"]);
        let mut pool = BoxPool::new(3);
        let rng = RngBundle::from_user_seed(12);
        let mut events: Vec<Event> = Vec::new();
        let mut choices = ScriptedChoices::new([], Choice::Gift);

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Hardcore, 20, &mut choices, &mut events)
            .unwrap();

        assert!(matches!(outcome.five_pm, FivePmOutcome::Loser { .. }));
        assert!(matches!(outcome.nine_pm, HouseChange::Lost(_)));
        assert!(outcome.granted().is_none());
        assert_eq!(pool.len(), 3);
        assert_eq!(choices.asked(), 0);
        let missing: usize = players.iter().map(|p| p.missing().len()).sum();
        assert_eq!(missing, 2);
    }

    #[test]
    fn hardcore_day_skips_expiration() {
        let config = GameConfig::with_box_item_count(1);
        let mut players = roster(&["Ada"], &["lamp"]);
        let mut pool = BoxPool::new(1);
        let rng = RngBundle::from_user_seed(3);
        let item = pool.withdraw_random(&mut *rng.pool()).unwrap();
        players[0].grant_box_item(item, 1, 4);

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Hardcore, 30, &mut AlwaysChoose(Choice::Gift), &mut NullSink)
            .unwrap();
        assert!(outcome.expired.is_empty());
        assert_eq!(players[0].box_items().len(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn normal_day_with_full_house_gifts_without_asking() {
        let config = GameConfig::with_box_item_count(2);
        let mut players = roster(&["Ada"], &["lamp", "mug"]);
        let mut pool = BoxPool::new(2);
        let rng = RngBundle::from_user_seed(5);
        let mut choices = ScriptedChoices::new([], Choice::Retrieve);
        let mut events: Vec<Event> = Vec::new();

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 1, &mut choices, &mut events)
            .unwrap();

        let grant = outcome.granted().unwrap();
        assert_eq!(grant.expires_on, 5);
        assert_eq!(choices.asked(), 0);
        assert_eq!(pool.len(), 1);
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, EventKind::FullHouseGift { .. })));
    }

    #[test]
    fn winner_with_missing_items_can_retrieve() {
        let config = GameConfig::with_box_item_count(2);
        let mut players = roster(&["Ada"], &["lamp", "mug"]);
        let mut pool = BoxPool::new(2);
        let rng = RngBundle::from_user_seed(8);
        players[0].lose_random_house_item(&mut *rng.house());
        players[0].lose_random_house_item(&mut *rng.house());

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 2, &mut AlwaysChoose(Choice::Retrieve), &mut NullSink)
            .unwrap();

        assert!(matches!(
            outcome.five_pm,
            FivePmOutcome::Winner {
                choice: Some(Choice::Retrieve),
                reward: Reward::Retrieved(_),
                ..
            }
        ));
        // 9 PM takes the retrieved item straight back from the only player.
        assert!(matches!(outcome.nine_pm, HouseChange::Lost(_)));
        assert_eq!(players[0].held().len(), 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn empty_box_is_reported_not_fatal() {
        let config = GameConfig::with_box_item_count(0);
        let mut players = roster(&["Ada", "Bo", "Cy"], &["lamp"]);
        let mut pool = BoxPool::new(0);
        let rng = RngBundle::from_user_seed(1);
        let mut events: Vec<Event> = Vec::new();

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 1, &mut AlwaysChoose(Choice::Gift), &mut events)
            .unwrap();

        assert!(matches!(
            outcome.five_pm,
            FivePmOutcome::Winner {
                reward: Reward::BoxEmpty,
                ..
            }
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e.kind, EventKind::BoxEmpty { .. })));
    }

    #[test]
    fn sweep_returns_at_most_one_grant_per_player_per_day() {
        let config = GameConfig::with_box_item_count(3);
        let mut players = roster(&["Ada"], &[]);
        let mut pool = BoxPool::new(3);
        let rng = RngBundle::from_user_seed(21);
        for _ in 0..3 {
            let item = pool.withdraw_random(&mut *rng.pool()).unwrap();
            players[0].grant_box_item(item, 1, 4);
        }
        let first_due = players[0].box_items()[0].item;

        let outcome = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 9, &mut AlwaysChoose(Choice::Gift), &mut NullSink)
            .unwrap();

        assert_eq!(outcome.expired.len(), 1);
        assert_eq!(outcome.expired[0].grant.item, first_due);
        // Returned item is immediately available for the full-house gift.
        let granted = outcome.granted().unwrap();
        assert_eq!(granted.item, first_due);
        assert_eq!(players[0].box_items().len(), 3);
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn event_stream_orders_phases() {
        let config = GameConfig::with_box_item_count(2);
        let mut players = roster(&["Ada", "Bo"], &["lamp"]);
        let mut pool = BoxPool::new(2);
        let rng = RngBundle::from_user_seed(77);
        let mut events: Vec<Event> = Vec::new();

        DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 4, &mut AlwaysChoose(Choice::Gift), &mut events)
            .unwrap();

        assert!(matches!(events[0].kind, EventKind::DayStarted { mode: DayMode::Normal }));
        let five = events
            .iter()
            .position(|e| e.kind == EventKind::PhaseStarted { phase: Phase::FivePm })
            .unwrap();
        let nine = events
            .iter()
            .position(|e| e.kind == EventKind::PhaseStarted { phase: Phase::NinePm })
            .unwrap();
        assert!(five < nine);
        assert!(events.iter().all(|e| e.day() == 4));
        assert!(events.windows(2).all(|w| w[0].id.seq < w[1].id.seq));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let config = GameConfig::default();
        let mut players: Vec<Player> = Vec::new();
        let mut pool = BoxPool::new(1);
        let rng = RngBundle::from_user_seed(0);
        let err = DaySimulator::new(&config, &mut players, &mut pool, &rng)
            .run_day(DayMode::Normal, 1, &mut AlwaysChoose(Choice::Gift), &mut NullSink)
            .unwrap_err();
        assert!(matches!(err, GameError::NoPlayers));
    }

    #[test]
    fn mode_switches_at_hardcore_start() {
        assert_eq!(DayMode::for_turn(14, 15), DayMode::Normal);
        assert_eq!(DayMode::for_turn(15, 15), DayMode::Hardcore);
        assert_eq!(DayMode::for_turn(1_000, 15), DayMode::Hardcore);
    }
}
