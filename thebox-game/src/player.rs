//! Per-player possession state: house items and borrowed box items.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pool::BoxItemId;

/// One household item owned by a single player.
///
/// Every player gets their own copy of each catalog name, so two players
/// holding a "lamp" hold two different items.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseItem(pub String);

impl HouseItem {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HouseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A box item on loan, stored with the turn it must go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxGrant {
    pub item: BoxItemId,
    pub expires_on: u32,
}

/// Result of moving a house item between held and missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HouseChange {
    Lost(HouseItem),
    Retrieved(HouseItem),
    NothingToLose,
    NothingToRetrieve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    held: Vec<HouseItem>,
    missing: Vec<HouseItem>,
    box_items: Vec<BoxGrant>,
}

impl Player {
    /// New player holding a fresh copy of the whole house catalog.
    #[must_use]
    pub fn new(name: impl Into<String>, catalog: &[HouseItem]) -> Self {
        Self {
            name: name.into(),
            held: catalog.to_vec(),
            missing: Vec::new(),
            box_items: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn held(&self) -> &[HouseItem] {
        &self.held
    }

    #[must_use]
    pub fn missing(&self) -> &[HouseItem] {
        &self.missing
    }

    /// Pending box grants in the order they were received.
    #[must_use]
    pub fn box_items(&self) -> &[BoxGrant] {
        &self.box_items
    }

    #[must_use]
    pub fn has_missing_items(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Held plus missing house items; constant for the whole game.
    #[must_use]
    pub fn house_item_count(&self) -> usize {
        self.held.len() + self.missing.len()
    }

    /// Move a uniformly random held item to missing.
    pub fn lose_random_house_item<R: Rng + ?Sized>(&mut self, rng: &mut R) -> HouseChange {
        if self.held.is_empty() {
            return HouseChange::NothingToLose;
        }
        let index = rng.gen_range(0..self.held.len());
        let item = self.held.remove(index);
        self.missing.push(item.clone());
        HouseChange::Lost(item)
    }

    /// Move a uniformly random missing item back to held.
    pub fn retrieve_random_house_item<R: Rng + ?Sized>(&mut self, rng: &mut R) -> HouseChange {
        if self.missing.is_empty() {
            return HouseChange::NothingToRetrieve;
        }
        let index = rng.gen_range(0..self.missing.len());
        let item = self.missing.remove(index);
        self.held.push(item.clone());
        HouseChange::Retrieved(item)
    }

    /// Record a box item received on `turn`; it expires `window` turns later.
    pub fn grant_box_item(&mut self, item: BoxItemId, turn: u32, window: u32) -> BoxGrant {
        let grant = BoxGrant {
            item,
            expires_on: turn.saturating_add(window),
        };
        self.box_items.push(grant);
        grant
    }

    /// Remove the first grant that has expired by `turn`.
    ///
    /// Only one grant is released per call even when several are due; the
    /// rest stay until later sweeps.
    pub fn sweep_expired(&mut self, turn: u32) -> Option<BoxGrant> {
        let index = self
            .box_items
            .iter()
            .position(|grant| grant.expires_on <= turn)?;
        Some(self.box_items.remove(index))
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
