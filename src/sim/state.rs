//! Session state and core simulation types
//!
//! `GameState` owns every entity. Blocks, shelves and kids live in plain
//! vectors and refer to each other by index-backed ids; nothing is removed
//! until the session ends, so ids stay valid.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::block::{Block, Holder};
use super::collision::Aabb;
use super::generate::generate_world;
use super::kid::{AggressionTier, Kid};
use super::player::Player;
use super::shelf::Shelf;
use super::upgrade::{self, Upgrade};
use crate::config::WorldConfig;
use crate::consts::*;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Position in the owning vector
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(
    /// Stable handle for a block
    BlockId
);
entity_id!(
    /// Stable handle for a shelf
    ShelfId
);
entity_id!(
    /// Stable handle for a kid
    KidId
);

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    /// Survived until the target time
    Won,
    /// Chaos maxed out
    Lost,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// Why a session was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    Chaos,
}

/// Things that happened during a tick, for audio, UI and the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BlockPickedUp { block: BlockId },
    BlockSnatched { block: BlockId, kid: KidId },
    BlockShelved { block: BlockId, shelf: ShelfId },
    BlockStolen { block: BlockId, shelf: ShelfId, kid: KidId, carried: bool },
    BlockDropped { block: BlockId, kid: KidId },
    KidSpawned { kid: KidId, tier: AggressionTier },
    KidRepelled { kid: KidId },
    WaveIncreased { max_kids: usize },
    LevelUp { level: u32 },
    /// Host should push the upgrade-selection screen
    UpgradeRequested,
    /// Host should push the pause screen
    PauseRequested,
    Resumed,
    Won,
    Lost(LossReason),
}

/// Timed banner text (wave announcements)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub ttl: f32,
}

/// Rising score text at a world position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub pos: Vec2,
    pub ttl: f32,
}

/// Running totals for the end-of-session summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub blocks_picked_up: u32,
    pub blocks_snatched: u32,
    pub blocks_shelved: u32,
    pub blocks_stolen: u32,
    pub kids_repelled: u32,
}

/// XP needed to go from `level` to `level + 1`
pub fn xp_for_level(level: u32) -> u32 {
    (XP_BASE * XP_GROWTH.powi(level.saturating_sub(1) as i32)).floor() as u32
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub config: WorldConfig,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds survived
    pub elapsed: f32,
    pub target_time: f32,
    pub chaos: f32,
    pub max_chaos: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    /// Level-ups not yet turned into upgrades
    pub pending_upgrades: u32,
    /// Current wave's kid population cap
    pub max_kids: usize,
    pub spawn_timer: f32,
    pub audit_timer: f32,
    pub stats: SessionStats,
    pub player: Player,
    pub shelves: Vec<Shelf>,
    pub blocks: Vec<Block>,
    pub kids: Vec<Kid>,
    pub notifications: Vec<Notification>,
    pub floating_texts: Vec<FloatingText>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session and generate its world
    pub fn new(config: WorldConfig, seed: u64) -> Self {
        let world_size = config.world_size();
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Playing,
            time_ticks: 0,
            elapsed: 0.0,
            target_time: config.target_time,
            chaos: 0.0,
            max_chaos: config.max_chaos,
            level: 1,
            xp: 0,
            xp_to_next: xp_for_level(1),
            pending_upgrades: 0,
            max_kids: super::tick::max_kids_for_minutes(0.0),
            // First kid arrives on the first tick
            spawn_timer: SPAWN_INTERVAL,
            audit_timer: 0.0,
            stats: SessionStats::default(),
            player: Player::new(Vec2::new(world_size.x * 0.5, world_size.y - PLAYER_SIZE * 2.0)),
            shelves: Vec::new(),
            blocks: Vec::new(),
            kids: Vec::new(),
            notifications: Vec::new(),
            floating_texts: Vec::new(),
            events: Vec::new(),
            config,
        };
        generate_world(&mut state);
        state
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(Vec2::ZERO, self.config.world_size())
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn shelf(&self, id: ShelfId) -> Option<&Shelf> {
        self.shelves.get(id.index())
    }

    pub fn kid(&self, id: KidId) -> Option<&Kid> {
        self.kids.get(id.index())
    }

    /// Blocks on the floor plus blocks in kids' hands
    pub fn chaos_source(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.is_on_floor() || b.is_held_by_kid())
            .count()
    }

    pub fn chaos_percent(&self) -> f32 {
        if self.max_chaos <= 0.0 {
            return 0.0;
        }
        (self.chaos / self.max_chaos * 100.0).clamp(0.0, 100.0)
    }

    pub fn reduce_chaos(&mut self, amount: f32) {
        self.chaos = (self.chaos - amount).clamp(0.0, self.max_chaos);
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notifications.push(Notification {
            text: text.into(),
            ttl: NOTIFICATION_TTL,
        });
    }

    pub fn float_text(&mut self, text: impl Into<String>, pos: Vec2) {
        self.floating_texts.push(FloatingText {
            text: text.into(),
            pos,
            ttl: FLOATING_TEXT_TTL,
        });
    }

    /// Award a base XP amount scaled by the player's multiplier and the
    /// early-game boost. Returns the number of levels gained.
    pub fn award_xp(&mut self, base: u32, at: Vec2) -> u32 {
        let boost = if self.elapsed < EARLY_XP_WINDOW {
            EARLY_XP_BOOST
        } else {
            1.0
        };
        let amount = (base as f32 * self.player.stats.xp_multiplier * boost).floor() as u32;
        self.float_text(format!("+{amount} XP"), at);
        self.grant_xp(amount)
    }

    /// Add raw XP, levelling up as many times as it covers
    pub fn grant_xp(&mut self, amount: u32) -> u32 {
        self.xp += amount;
        let mut gained = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.xp_to_next = xp_for_level(self.level + 1);
            self.level += 1;
            gained += 1;
            self.player.refill_stamina();
            self.pending_upgrades += 1;
            log::info!("Level up: {} (next at {} XP)", self.level, self.xp_to_next);
            self.push_event(GameEvent::LevelUp { level: self.level });
            self.push_event(GameEvent::UpgradeRequested);
        }
        gained
    }

    /// Upgrades to show on the selection screen
    pub fn offer_upgrades(&mut self, count: usize) -> Vec<Upgrade> {
        upgrade::offer(&self.player.stats, count, &mut self.rng)
    }

    /// Spend one pending level-up on `choice`
    pub fn apply_upgrade(&mut self, choice: Upgrade) -> bool {
        if self.pending_upgrades == 0 || !choice.is_available(&self.player.stats) {
            return false;
        }
        self.pending_upgrades -= 1;
        choice.apply(&mut self.player.stats);
        log::info!("Upgrade applied: {}", choice.name());
        true
    }

    /// Spawn a kid, relocating it if it would overlap a shelf
    pub fn spawn_kid(&mut self, point: Vec2, tier: AggressionTier) -> KidId {
        let id = KidId(self.kids.len() as u32);
        let heading = self.rng.random_range(0.0..std::f32::consts::TAU);
        let size = Vec2::splat(KID_SIZE);
        let bounds = self.bounds();

        let mut pos = bounds.clamp_center(point, size);
        let shelves: Vec<Aabb> = self.shelves.iter().map(|s| s.bounds).collect();
        if shelves.iter().any(|s| s.overlaps(&Aabb::from_center(pos, size))) {
            match self.config.clear_spawn_point(&shelves) {
                Some(fallback) => {
                    log::warn!("Kid {} spawned inside a shelf at {:?}; moved to {:?}", id.0, pos, fallback);
                    pos = fallback;
                }
                None => log::error!("Kid {} spawned inside a shelf at {:?}; nowhere clear to move it", id.0, pos),
            }
        }

        self.kids.push(Kid::new(id, pos, tier, heading));
        log::debug!("Spawned kid {} (tier {}) at {:?}", id.0, tier.level(), pos);
        self.push_event(GameEvent::KidSpawned { kid: id, tier });
        id
    }

    /// Blocks the player is carrying, in pickup order
    pub fn carried_blocks(&self) -> impl Iterator<Item = &Block> {
        self.player.carried.iter().filter_map(|id| self.block(*id))
    }

    /// Where a held block should be drawn
    pub fn holder_position(&self, holder: Holder) -> Option<Vec2> {
        match holder {
            Holder::Player => Some(self.player.pos),
            Holder::Kid(id) => self.kid(id).map(|k| k.pos),
        }
    }
}
