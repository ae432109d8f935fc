//! Level-up upgrades

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::player::PlayerStats;

pub const PICKUP_RADIUS_STEP: f32 = 15.0;
pub const RETURN_RADIUS_STEP: f32 = 20.0;
pub const MAX_CARRY_SLOTS: usize = 8;
pub const STAMINA_STEP: f32 = 25.0;
pub const DAMPENING_STEP: f32 = 10.0;
pub const MAX_DAMPENING: f32 = 60.0;
pub const XP_MULTIPLIER_STEP: f32 = 0.15;

/// Choices offered when the player levels up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    LongerReach,
    WiderReturn,
    ExtraSlot,
    Endurance,
    Calm,
    Scholar,
}

impl Upgrade {
    pub const ALL: [Upgrade; 6] = [
        Upgrade::LongerReach,
        Upgrade::WiderReturn,
        Upgrade::ExtraSlot,
        Upgrade::Endurance,
        Upgrade::Calm,
        Upgrade::Scholar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Upgrade::LongerReach => "Longer Reach",
            Upgrade::WiderReturn => "Wider Return",
            Upgrade::ExtraSlot => "Extra Slot",
            Upgrade::Endurance => "Endurance",
            Upgrade::Calm => "Calm Presence",
            Upgrade::Scholar => "Scholar",
        }
    }

    /// False when the stat is already maxed out
    pub fn is_available(&self, stats: &PlayerStats) -> bool {
        match self {
            Upgrade::ExtraSlot => stats.carry_slots < MAX_CARRY_SLOTS,
            Upgrade::Calm => stats.chaos_dampening < MAX_DAMPENING,
            _ => true,
        }
    }

    pub fn apply(&self, stats: &mut PlayerStats) {
        match self {
            Upgrade::LongerReach => stats.pickup_radius += PICKUP_RADIUS_STEP,
            Upgrade::WiderReturn => stats.return_radius += RETURN_RADIUS_STEP,
            Upgrade::ExtraSlot => stats.carry_slots = (stats.carry_slots + 1).min(MAX_CARRY_SLOTS),
            Upgrade::Endurance => stats.max_stamina += STAMINA_STEP,
            Upgrade::Calm => {
                stats.chaos_dampening = (stats.chaos_dampening + DAMPENING_STEP).min(MAX_DAMPENING)
            }
            Upgrade::Scholar => stats.xp_multiplier += XP_MULTIPLIER_STEP,
        }
    }
}

/// Up to `count` distinct upgrades still available for `stats`
pub fn offer<R: Rng>(stats: &PlayerStats, count: usize, rng: &mut R) -> Vec<Upgrade> {
    let mut pool: Vec<Upgrade> = Upgrade::ALL
        .into_iter()
        .filter(|u| u.is_available(stats))
        .collect();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}
