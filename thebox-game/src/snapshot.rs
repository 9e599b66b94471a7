//! Serializable view of a whole session, used for the daily debug status.
use serde::{Deserialize, Serialize};

use crate::player::Player;
use crate::pool::{BoxItemId, BoxPool};
use crate::rng::{DrawCounts, RngBundle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    /// Sorted by name.
    pub held: Vec<String>,
    /// Sorted by name.
    pub missing: Vec<String>,
    /// Sorted by id.
    pub box_items: Vec<BoxItemId>,
}

impl PlayerSnapshot {
    #[must_use]
    pub fn capture(player: &Player) -> Self {
        let mut held: Vec<String> = player.held().iter().map(ToString::to_string).collect();
        held.sort();
        let mut missing: Vec<String> = player.missing().iter().map(ToString::to_string).collect();
        missing.sort();
        let mut box_items: Vec<BoxItemId> = player.box_items().iter().map(|g| g.item).collect();
        box_items.sort_unstable();
        Self {
            name: player.name().to_string(),
            held,
            missing,
            box_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub turn: u32,
    pub box_available: usize,
    /// Ids currently out of the box, sorted.
    pub box_checked_out: Vec<BoxItemId>,
    pub players: Vec<PlayerSnapshot>,
    /// Draws taken from each RNG stream so far.
    pub rng_draws: DrawCounts,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(turn: u32, players: &[Player], pool: &BoxPool, rng: &RngBundle) -> Self {
        Self {
            turn,
            box_available: pool.len(),
            box_checked_out: pool.checked_out(),
            players: players.iter().map(PlayerSnapshot::capture).collect(),
            rng_draws: rng.draw_counts(),
        }
    }

    /// Emit the snapshot at debug level as readable lines plus one JSON line.
    pub(crate) fn log_debug(&self, target: &str) {
        let checked_out: Vec<String> = self
            .box_checked_out
            .iter()
            .map(ToString::to_string)
            .collect();
        log::debug!(target: target, "Current status, day {}:", self.turn);
        log::debug!(target: target, "Box missing items: {}", checked_out.join(", "));
        for player in &self.players {
            let box_items: Vec<String> = player.box_items.iter().map(ToString::to_string).collect();
            log::debug!(target: target, "{}", player.name);
            log::debug!(target: target, " - has items: {}", player.held.join(", "));
            log::debug!(target: target, " - is missing items: {}", player.missing.join(", "));
            log::debug!(target: target, " - has from the box: {}", box_items.join(", "));
        }
        log::debug!(
            target: target,
            "RNG draws: roster {}, house {}, box {}",
            self.rng_draws.roster,
            self.rng_draws.house,
            self.rng_draws.pool
        );
        match serde_json::to_string(self) {
            Ok(json) => log::debug!(target: target, "status {json}"),
            Err(err) => log::warn!(target: target, "status snapshot not serializable: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::HouseItem;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn capture_sorts_every_collection() {
        let mut rng = SmallRng::seed_from_u64(4);
        let catalog = [HouseItem::new("sofa"), HouseItem::new("bed"), HouseItem::new("mug")];
        let mut player = Player::new("Ada", &catalog);
        let mut pool = BoxPool::new(4);
        for turn in 1..=3 {
            let item = pool.withdraw_random(&mut rng).unwrap();
            player.grant_box_item(item, turn, 4);
        }
        player.lose_random_house_item(&mut rng);

        let rng = RngBundle::from_user_seed(4);
        let snapshot = SessionSnapshot::capture(3, std::slice::from_ref(&player), &pool, &rng);
        assert_eq!(snapshot.box_available, 1);
        assert_eq!(snapshot.box_checked_out.len(), 3);
        let p = &snapshot.players[0];
        assert!(p.held.windows(2).all(|w| w[0] <= w[1]));
        assert!(p.box_items.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(p.box_items, snapshot.box_checked_out);
        assert_eq!(p.held.len() + p.missing.len(), 3);
        assert_eq!(snapshot.rng_draws, DrawCounts::default());
    }
}
