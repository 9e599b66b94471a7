//! The box: a shared pool of fungible, numbered items.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Identifier of one box item. Ids run from 1 to the box capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxItemId(pub u32);

impl fmt::Display for BoxItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Failures raised by pool bookkeeping.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("the box is empty")]
    Empty,
    #[error("box item {0} is already in the box")]
    Duplicate(BoxItemId),
    #[error("box item {0} never belonged to this box")]
    Foreign(BoxItemId),
}

impl PoolError {
    /// True for the errors that mean the bookkeeping itself is broken.
    #[must_use]
    pub const fn is_invariant_violation(self) -> bool {
        matches!(self, Self::Duplicate(_) | Self::Foreign(_))
    }
}

/// Box items currently available for gifting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxPool {
    capacity: u32,
    available: BTreeSet<BoxItemId>,
}

impl BoxPool {
    /// A full box holding ids `1..=capacity`.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            available: (1..=capacity).map(BoxItemId).collect(),
        }
    }

    /// Remove and return one available item chosen uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Empty`] when every item is currently granted.
    pub fn withdraw_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<BoxItemId, PoolError> {
        if self.available.is_empty() {
            return Err(PoolError::Empty);
        }
        let index = rng.gen_range(0..self.available.len());
        let item = self
            .available
            .iter()
            .nth(index)
            .copied()
            .ok_or(PoolError::Empty)?;
        self.available.remove(&item);
        Ok(item)
    }

    /// Put an expired item back in the box.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Duplicate`] if the item is already available and
    /// [`PoolError::Foreign`] if the id is outside this box.
    pub fn return_item(&mut self, item: BoxItemId) -> Result<(), PoolError> {
        if item.0 == 0 || item.0 > self.capacity {
            return Err(PoolError::Foreign(item));
        }
        if !self.available.insert(item) {
            return Err(PoolError::Duplicate(item));
        }
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, item: BoxItemId) -> bool {
        self.available.contains(&item)
    }

    /// Items currently in the box, in id order.
    pub fn available(&self) -> impl Iterator<Item = BoxItemId> + '_ {
        self.available.iter().copied()
    }

    /// Items currently out of the box, in id order.
    #[must_use]
    pub fn checked_out(&self) -> Vec<BoxItemId> {
        (1..=self.capacity)
            .map(BoxItemId)
            .filter(|item| !self.available.contains(item))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }

    /// Number of items the box was created with.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }
}
