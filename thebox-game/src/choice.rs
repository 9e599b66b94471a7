//! External decision points: the retrieve-or-gift choice and the day gate.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::RNG_DOMAIN_CHOICE;
use crate::player::Player;
use crate::rng::stream_key;

/// What a 5 PM winner with missing items asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    /// Get one of their own missing house items back.
    Retrieve,
    /// Take a gift from the box instead.
    Gift,
}

impl Choice {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve item",
            Self::Gift => "gift from The Box",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Console input that is neither choice. Callers re-prompt on it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("expected 1 (retrieve) or 2 (gift), got {0:?}")]
pub struct ChoiceParseError(pub String);

impl FromStr for Choice {
    type Err = ChoiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "r" | "retrieve" => Ok(Self::Retrieve),
            "2" | "g" | "gift" => Ok(Self::Gift),
            _ => Err(ChoiceParseError(s.trim().to_string())),
        }
    }
}

/// Everything a provider may look at before answering.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceContext<'a> {
    pub turn: u32,
    pub player: &'a Player,
    /// Box items currently available for a gift.
    pub box_available: usize,
}

/// Source of retrieve-or-gift answers. Blocks until it has one.
pub trait ChoiceProvider {
    fn choose(&mut self, ctx: &ChoiceContext<'_>) -> Choice;
}

impl<P: ChoiceProvider + ?Sized> ChoiceProvider for &mut P {
    fn choose(&mut self, ctx: &ChoiceContext<'_>) -> Choice {
        (**self).choose(ctx)
    }
}

impl<P: ChoiceProvider + ?Sized> ChoiceProvider for Box<P> {
    fn choose(&mut self, ctx: &ChoiceContext<'_>) -> Choice {
        (**self).choose(ctx)
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct AlwaysChoose(pub Choice);

impl ChoiceProvider for AlwaysChoose {
    fn choose(&mut self, _ctx: &ChoiceContext<'_>) -> Choice {
        self.0
    }
}

/// Replays a fixed script, then keeps answering with the fallback.
#[derive(Debug, Clone)]
pub struct ScriptedChoices {
    script: VecDeque<Choice>,
    fallback: Choice,
    asked: usize,
}

impl ScriptedChoices {
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = Choice>, fallback: Choice) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
            asked: 0,
        }
    }

    /// How many times the provider was consulted.
    #[must_use]
    pub const fn asked(&self) -> usize {
        self.asked
    }
}

impl ChoiceProvider for ScriptedChoices {
    fn choose(&mut self, _ctx: &ChoiceContext<'_>) -> Choice {
        self.asked += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

/// Coin-flip answers from a seeded stream of their own.
#[derive(Debug, Clone)]
pub struct RandomChoices {
    rng: ChaCha20Rng,
}

impl RandomChoices {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(stream_key(seed, RNG_DOMAIN_CHOICE)),
        }
    }
}

impl ChoiceProvider for RandomChoices {
    fn choose(&mut self, _ctx: &ChoiceContext<'_>) -> Choice {
        if self.rng.gen_bool(0.5) {
            Choice::Retrieve
        } else {
            Choice::Gift
        }
    }
}

/// Gate passed between days. Returns once the next day may start.
pub trait AdvanceGate {
    fn advance(&mut self, finished_turn: u32);

    /// True once the gate will never open again, e.g. its input closed.
    /// The session stops after the current day when this turns true.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Gate that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPause;

impl AdvanceGate for NoPause {
    fn advance(&mut self, _finished_turn: u32) {}
}

/// Adapter turning a closure into an [`AdvanceGate`].
pub struct GateFn<F>(pub F);

impl<F: FnMut(u32)> AdvanceGate for GateFn<F> {
    fn advance(&mut self, finished_turn: u32) {
        (self.0)(finished_turn);
    }
}
