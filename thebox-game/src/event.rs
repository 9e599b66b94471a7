//! Structured notifications emitted by the day simulator.
//!
//! Every state change is reported as an [`Event`]. Front ends decide how to
//! present them; the core never prints.
use serde::{Deserialize, Serialize};

use crate::choice::Choice;
use crate::constants::LOG_TARGET_DAY;
use crate::day::{DayMode, Phase};
use crate::player::HouseItem;
use crate::pool::BoxItemId;

/// Stable, deterministic identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Turn the event happened on; 0 before the first day.
    pub day: u32,
    /// Sequence number within the day (0-based).
    pub seq: u16,
}

impl EventId {
    #[must_use]
    pub const fn new(day: u32, seq: u16) -> Self {
        Self { day, seq }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Welcome {
        players: Vec<String>,
    },
    DayStarted {
        mode: DayMode,
    },
    PhaseStarted {
        phase: Phase,
    },
    /// 5 PM winner in normal mode.
    LuckyPlayer {
        player: String,
    },
    ChoiceRequested {
        player: String,
    },
    ChoiceMade {
        player: String,
        choice: Choice,
    },
    /// The winner is missing nothing, so the box gifts them directly.
    FullHouseGift {
        player: String,
    },
    /// Player picked to lose an item at 5 PM (hardcore) or 9 PM.
    UnluckyPlayer {
        player: String,
        phase: Phase,
    },
    HouseItemLost {
        player: String,
        item: HouseItem,
        remaining: Vec<HouseItem>,
    },
    HouseItemRetrieved {
        player: String,
        item: HouseItem,
        held: Vec<HouseItem>,
    },
    NothingToLose {
        player: String,
    },
    NothingToRetrieve {
        player: String,
    },
    BoxItemGranted {
        player: String,
        item: BoxItemId,
        expires_on: u32,
        window: u32,
    },
    BoxItemExpired {
        player: String,
        item: BoxItemId,
    },
    /// A gift was due but every box item is out on loan.
    BoxEmpty {
        player: String,
    },
}

/// Severity tier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
}

impl EventKind {
    #[must_use]
    pub const fn severity(&self) -> EventSeverity {
        match self {
            Self::HouseItemLost { .. } | Self::BoxItemExpired { .. } | Self::BoxEmpty { .. } => {
                EventSeverity::Warning
            }
            _ => EventSeverity::Info,
        }
    }

    /// Player the event is about, when there is one.
    #[must_use]
    pub fn player(&self) -> Option<&str> {
        match self {
            Self::Welcome { .. } | Self::DayStarted { .. } | Self::PhaseStarted { .. } => None,
            Self::LuckyPlayer { player }
            | Self::ChoiceRequested { player }
            | Self::ChoiceMade { player, .. }
            | Self::FullHouseGift { player }
            | Self::UnluckyPlayer { player, .. }
            | Self::HouseItemLost { player, .. }
            | Self::HouseItemRetrieved { player, .. }
            | Self::NothingToLose { player }
            | Self::NothingToRetrieve { player }
            | Self::BoxItemGranted { player, .. }
            | Self::BoxItemExpired { player, .. }
            | Self::BoxEmpty { player } => Some(player),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub const fn day(&self) -> u32 {
        self.id.day
    }
}

/// Receiver for the event stream.
pub trait EventSink {
    fn emit(&mut self, event: Event);
}

impl EventSink for Vec<Event> {
    fn emit(&mut self, event: Event) {
        self.push(event);
    }
}

/// Adapter turning a closure into an [`EventSink`].
pub struct SinkFn<F>(pub F);

impl<F: FnMut(Event)> EventSink for SinkFn<F> {
    fn emit(&mut self, event: Event) {
        (self.0)(event);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: Event) {}
}

/// Stamps events with ids before handing them to a sink.
pub(crate) struct EventStamper<'a> {
    sink: &'a mut dyn EventSink,
    day: u32,
    seq: u16,
}

impl<'a> EventStamper<'a> {
    pub(crate) fn new(sink: &'a mut dyn EventSink, day: u32) -> Self {
        Self { sink, day, seq: 0 }
    }

    pub(crate) fn emit(&mut self, kind: EventKind) {
        let id = EventId::new(self.day, self.seq);
        self.seq = self.seq.saturating_add(1);
        let level = match kind.severity() {
            EventSeverity::Warning => log::Level::Debug,
            EventSeverity::Info => log::Level::Trace,
        };
        log::log!(target: LOG_TARGET_DAY, level, "event {}.{}: {kind:?}", id.day, id.seq);
        self.sink.emit(Event { id, kind });
    }
}
