//! The player: a librarian who carries blocks back to their shelves

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, slide_move};
use super::shelf::Shelf;
use super::state::BlockId;
use crate::consts::PLAYER_SIZE;

/// Base walking speed (units per second)
pub const PLAYER_SPEED: f32 = 220.0;
/// Speed multiplier while sprinting
pub const SPRINT_MULTIPLIER: f32 = 1.6;
/// Stamina spent per second of sprinting
pub const SPRINT_DRAIN: f32 = 30.0;
/// Stamina regained per second when not sprinting
pub const STAMINA_REGEN: f32 = 12.0;
/// Pointer steering stops this close to the pointer
pub const POINTER_DEADZONE: f32 = 4.0;

/// Upgradeable player stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Floor blocks and kid-held blocks within this distance are grabbed
    pub pickup_radius: f32,
    /// Shelves within this distance accept carried blocks
    pub return_radius: f32,
    /// Maximum blocks carried at once
    pub carry_slots: usize,
    pub max_stamina: f32,
    /// Percentage (0-100) shaved off chaos accrual
    pub chaos_dampening: f32,
    pub xp_multiplier: f32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            pickup_radius: 60.0,
            return_radius: 80.0,
            carry_slots: 3,
            max_stamina: 100.0,
            chaos_dampening: 0.0,
            xp_multiplier: 1.0,
        }
    }
}

/// Movement intent for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerControl {
    /// Raw movement axis (-1..1 each)
    pub movement: Vec2,
    /// Steer toward this point instead of `movement`
    pub pointer_target: Option<Vec2>,
    pub sprint: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub stats: PlayerStats,
    pub stamina: f32,
    /// Carried blocks, oldest first
    pub carried: Vec<BlockId>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        let stats = PlayerStats::default();
        Self {
            pos,
            vel: Vec2::ZERO,
            stamina: stats.max_stamina,
            stats,
            carried: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(PLAYER_SIZE))
    }

    pub fn free_slots(&self) -> usize {
        self.stats.carry_slots.saturating_sub(self.carried.len())
    }

    pub fn is_full(&self) -> bool {
        self.free_slots() == 0
    }

    pub fn refill_stamina(&mut self) {
        self.stamina = self.stats.max_stamina;
    }

    /// Walk (or sprint) with shelf collision and world bounds
    pub fn update(&mut self, control: &PlayerControl, shelves: &[Shelf], bounds: &Aabb, dt: f32) {
        let dir = match control.pointer_target {
            Some(target) if target.distance(self.pos) > POINTER_DEADZONE => {
                (target - self.pos).normalize_or_zero()
            }
            Some(_) => Vec2::ZERO,
            None => control.movement.clamp_length_max(1.0),
        };

        let moving = dir != Vec2::ZERO;
        let sprinting = control.sprint && moving && self.stamina > 0.0;
        if sprinting {
            self.stamina = (self.stamina - SPRINT_DRAIN * dt).max(0.0);
        } else {
            self.stamina = (self.stamina + STAMINA_REGEN * dt).min(self.stats.max_stamina);
        }

        let speed = if sprinting {
            PLAYER_SPEED * SPRINT_MULTIPLIER
        } else {
            PLAYER_SPEED
        };
        self.vel = dir * speed;

        let result = slide_move(
            self.pos,
            Vec2::splat(PLAYER_SIZE),
            self.vel * dt,
            bounds,
            shelves.iter().map(|s| &s.bounds),
        );
        self.pos = result.pos;
        if result.blocked_x {
            self.vel.x = 0.0;
        }
        if result.blocked_y {
            self.vel.y = 0.0;
        }
    }
}
