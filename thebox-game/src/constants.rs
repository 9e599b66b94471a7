//! Centralized tuning constants for The Box game logic.
//!
//! These are the defaults behind [`crate::GameConfig`]. Rule changes beyond
//! these values go through code review, not runtime configuration.

// Rules ---------------------------------------------------------------------
/// Turns a box item stays with a player before it returns to the box.
pub const EXPIRATION_WINDOW: u32 = 4;
/// First day played under hardcore rules.
pub const HARDCORE_START: u32 = 15;
/// Number of items the box starts with when no size is given.
pub const DEFAULT_BOX_ITEM_COUNT: u32 = 100;

// Logging targets -----------------------------------------------------------
pub(crate) const LOG_TARGET_DAY: &str = "thebox::day";
pub(crate) const LOG_TARGET_SESSION: &str = "thebox::session";

// RNG stream domains ---------------------------------------------------------
pub(crate) const RNG_DOMAIN_ROSTER: &[u8] = b"roster";
pub(crate) const RNG_DOMAIN_HOUSE: &[u8] = b"house";
pub(crate) const RNG_DOMAIN_BOX: &[u8] = b"box";
pub(crate) const RNG_DOMAIN_CHOICE: &[u8] = b"choice";
