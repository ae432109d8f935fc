//! Kid agents: wander the library, steal blocks, flee the player
//!
//! Each kid runs a three-state machine (wandering, stealing, fleeing). Kids
//! never touch blocks or shelves directly: `Kid::update` reads a
//! [`KidContext`] and returns [`KidIntent`]s which the orchestrator applies.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, slide_move};
use super::shelf::Shelf;
use super::state::{BlockId, KidId, ShelfId};
use crate::consts::KID_SIZE;
use crate::{dir_to_heading, heading_to_dir};

/// Proximity to count as "at the shelf"
pub const REACH_EPSILON: f32 = 6.0;
/// Cooldown after finding a shelf already picked clean
pub const EMPTY_SHELF_COOLDOWN: f32 = 1.0;
/// Fleeing ends once the player is this many detection ranges away
pub const FLEE_RELEASE_FACTOR: f32 = 1.5;
/// Fleeing never lasts longer than this
pub const MAX_FLEE_TIME: f32 = 5.0;
/// Chance per second that a fleeing kid fumbles its block
pub const FLEE_DROP_RATE: f32 = 0.15;
/// Fraction of velocity kept (and reversed) on a blocked axis
pub const BOUNCE_DAMPING: f32 = 0.5;
/// Max heading nudge after a bounce (radians)
pub const WANDER_NUDGE: f32 = 0.6;
/// Speed multiplier after both axes were blocked
pub const BLOCKED_SPEED_SCALE: f32 = 0.5;
/// Speed multiplier recovery per second
pub const SPEED_RECOVERY: f32 = 0.5;
/// Below this speed (units/s) a moving kid counts as stuck
pub const STUCK_SPEED: f32 = 2.0;
/// Seconds stuck before forcing a new heading
pub const STUCK_TIME: f32 = 1.0;
/// Seconds to follow the heading after an unstick
pub const DETOUR_TIME: f32 = 0.5;
/// Wander heading re-roll interval range (seconds)
pub const DIRECTION_CHANGE_MIN: f32 = 1.5;
pub const DIRECTION_CHANGE_MAX: f32 = 3.5;
/// Only shelves this close are collision-tested
pub const NEARBY_SHELF_RADIUS: f32 = 200.0;
/// Dropped blocks land this far off the shelf edge
pub const DROP_OFFSET: f32 = 24.0;

/// How bold a kid is; higher tiers are faster and hold blocks for less time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AggressionTier {
    Mild = 1,
    Rowdy = 2,
    Wild = 3,
}

/// Movement and timing parameters for a tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KidTuning {
    pub speed: f32,
    pub flee_speed: f32,
    pub steal_cooldown: f32,
    pub grab_delay: f32,
    pub min_carry_time: f32,
    pub max_carry_time: f32,
    pub player_detection_range: f32,
    pub shelf_detection_range: f32,
}

impl AggressionTier {
    /// Tier for a given session age: <5 min mild, <10 min rowdy, then wild
    pub fn for_minutes(minutes: f32) -> Self {
        if minutes < 5.0 {
            AggressionTier::Mild
        } else if minutes < 10.0 {
            AggressionTier::Rowdy
        } else {
            AggressionTier::Wild
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn tuning(&self) -> KidTuning {
        match self {
            AggressionTier::Mild => KidTuning {
                speed: 80.0,
                flee_speed: 150.0,
                steal_cooldown: 6.0,
                grab_delay: 1.2,
                min_carry_time: 6.0,
                max_carry_time: 10.0,
                player_detection_range: 160.0,
                shelf_detection_range: 350.0,
            },
            AggressionTier::Rowdy => KidTuning {
                speed: 100.0,
                flee_speed: 175.0,
                steal_cooldown: 4.5,
                grab_delay: 0.8,
                min_carry_time: 4.5,
                max_carry_time: 8.0,
                player_detection_range: 140.0,
                shelf_detection_range: 450.0,
            },
            AggressionTier::Wild => KidTuning {
                speed: 120.0,
                flee_speed: 200.0,
                steal_cooldown: 3.0,
                grab_delay: 0.5,
                min_carry_time: 3.0,
                max_carry_time: 6.0,
                player_detection_range: 120.0,
                shelf_detection_range: 550.0,
            },
        }
    }
}

/// Behaviour state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KidState {
    Wandering,
    Stealing,
    Fleeing,
}

/// What a kid can see during its update
#[derive(Debug, Clone, Copy)]
pub struct KidContext<'a> {
    pub player_pos: Option<Vec2>,
    pub shelves: &'a [Shelf],
    pub bounds: Aabb,
}

/// Requests a kid makes of the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KidIntent {
    /// Started a flee episode because the player came close
    Repelled,
    /// Knock a random block off the shelf onto the floor
    StealAndDrop { shelf: ShelfId },
    /// Take a random block off the shelf and run with it
    StealAndCarry { shelf: ShelfId },
    /// Let go of the carried block at `at`
    DropCarried { block: BlockId, at: Vec2 },
}

/// A kid agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kid {
    pub id: KidId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub tier: AggressionTier,
    pub state: KidState,
    /// Shelf being approached while stealing
    pub target: Option<ShelfId>,
    /// Last shelf robbed (drops land near it)
    pub last_target: Option<ShelfId>,
    /// Block in hand; set by the orchestrator
    pub carrying: Option<BlockId>,
    /// Wander heading (radians)
    pub heading: f32,
    pub steal_cooldown: f32,
    pub grab_timer: f32,
    pub carry_timer: f32,
    /// Carry time after which the block is force-dropped
    pub carry_limit: f32,
    pub direction_timer: f32,
    pub flee_timer: f32,
    pub stuck_timer: f32,
    /// Seconds left following the heading regardless of state
    pub detour: f32,
    pub speed_scale: f32,
    /// One-shot flag: this flee episode has already been counted
    pub alerted: bool,
}

impl Kid {
    pub fn new(id: KidId, pos: Vec2, tier: AggressionTier, heading: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            tier,
            state: KidState::Wandering,
            target: None,
            last_target: None,
            carrying: None,
            heading,
            steal_cooldown: tier.tuning().steal_cooldown * 0.5,
            grab_timer: 0.0,
            carry_timer: 0.0,
            carry_limit: 0.0,
            direction_timer: DIRECTION_CHANGE_MIN,
            flee_timer: 0.0,
            stuck_timer: 0.0,
            detour: 0.0,
            speed_scale: 1.0,
            alerted: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(KID_SIZE))
    }

    /// Advance one tick; returns the intents raised this tick
    pub fn update<R: Rng>(&mut self, ctx: &KidContext<'_>, dt: f32, rng: &mut R) -> Vec<KidIntent> {
        let mut intents = Vec::new();
        let tuning = self.tier.tuning();

        self.steal_cooldown = (self.steal_cooldown - dt).max(0.0);
        self.direction_timer -= dt;
        self.detour = (self.detour - dt).max(0.0);
        self.speed_scale = (self.speed_scale + SPEED_RECOVERY * dt).min(1.0);

        // Carry timeout applies in every state
        if let Some(block) = self.carrying {
            self.carry_timer += dt;
            if self.carry_timer >= self.carry_limit {
                let at = self.drop_point(ctx, rng);
                intents.push(KidIntent::DropCarried { block, at });
                self.release_block();
                self.enter_wandering(tuning.steal_cooldown);
            }
        }

        let player_close = ctx
            .player_pos
            .is_some_and(|p| self.pos.distance(p) <= tuning.player_detection_range);

        match self.state {
            KidState::Wandering => {
                if player_close {
                    self.start_fleeing(&mut intents);
                } else if self.carrying.is_none() && self.steal_cooldown <= 0.0 {
                    if let Some(shelf) = self.find_target(ctx, tuning.shelf_detection_range) {
                        log::debug!("kid {} targets shelf {}", self.id.0, shelf.0);
                        self.state = KidState::Stealing;
                        self.target = Some(shelf);
                        self.grab_timer = 0.0;
                    }
                }
            }
            KidState::Stealing => {
                if player_close {
                    self.start_fleeing(&mut intents);
                } else {
                    self.update_stealing(ctx, dt, rng, &mut intents);
                }
            }
            KidState::Fleeing => {
                self.flee_timer += dt;
                if let Some(block) = self.carrying {
                    if rng.random::<f32>() < FLEE_DROP_RATE * dt {
                        let at = self.drop_point(ctx, rng);
                        intents.push(KidIntent::DropCarried { block, at });
                        self.release_block();
                    }
                }
                let calm = match ctx.player_pos {
                    None => true,
                    Some(p) => {
                        self.pos.distance(p) > tuning.player_detection_range * FLEE_RELEASE_FACTOR
                    }
                };
                if calm || self.flee_timer >= MAX_FLEE_TIME {
                    self.alerted = false;
                    self.state = KidState::Wandering;
                    self.target = None;
                }
            }
        }

        self.steer(ctx, dt, rng);
        intents
    }

    /// Orchestrator handed this kid a stolen block
    pub fn take_block(&mut self, block: BlockId) {
        self.carrying = Some(block);
    }

    /// Orchestrator found the shelf empty when applying a carry-steal
    pub fn steal_failed(&mut self) {
        self.enter_wandering(EMPTY_SHELF_COOLDOWN);
    }

    /// The player yanked the block away
    pub fn on_snatched(&mut self) {
        self.release_block();
        self.state = KidState::Fleeing;
        self.flee_timer = 0.0;
        self.target = None;
    }

    fn release_block(&mut self) {
        self.carrying = None;
        self.carry_timer = 0.0;
    }

    fn enter_wandering(&mut self, cooldown: f32) {
        self.state = KidState::Wandering;
        self.alerted = false;
        self.target = None;
        self.grab_timer = 0.0;
        self.steal_cooldown = self.steal_cooldown.max(cooldown);
    }

    fn start_fleeing(&mut self, intents: &mut Vec<KidIntent>) {
        if !self.alerted {
            self.alerted = true;
            intents.push(KidIntent::Repelled);
        }
        self.state = KidState::Fleeing;
        self.flee_timer = 0.0;
        self.target = None;
        self.grab_timer = 0.0;
    }

    fn update_stealing<R: Rng>(
        &mut self,
        ctx: &KidContext<'_>,
        dt: f32,
        rng: &mut R,
        intents: &mut Vec<KidIntent>,
    ) {
        let tuning = self.tier.tuning();
        let Some(shelf) = self.target.and_then(|id| ctx.shelves.get(id.index())) else {
            self.enter_wandering(EMPTY_SHELF_COOLDOWN);
            return;
        };
        if !self.reached(shelf) {
            return;
        }

        self.grab_timer += dt;
        if self.grab_timer < tuning.grab_delay {
            return;
        }
        self.grab_timer = 0.0;

        if !shelf.has_stock() {
            self.enter_wandering(EMPTY_SHELF_COOLDOWN);
            return;
        }

        self.last_target = Some(shelf.id);
        if rng.random_bool(0.5) {
            intents.push(KidIntent::StealAndDrop { shelf: shelf.id });
            self.enter_wandering(tuning.steal_cooldown);
        } else {
            intents.push(KidIntent::StealAndCarry { shelf: shelf.id });
            self.carry_timer = 0.0;
            self.carry_limit = rng.random_range(tuning.min_carry_time..=tuning.max_carry_time);
            self.steal_cooldown = tuning.steal_cooldown;
            self.state = KidState::Fleeing;
            self.flee_timer = 0.0;
            self.target = None;
        }
    }

    /// Bounding boxes within epsilon of each other
    pub fn reached(&self, shelf: &Shelf) -> bool {
        self.bounds().expanded(REACH_EPSILON).overlaps(&shelf.bounds)
    }

    /// Nearest stocked shelf within `range`
    fn find_target(&self, ctx: &KidContext<'_>, range: f32) -> Option<ShelfId> {
        self.nearest_stocked(ctx)
            .filter(|(_, dist)| *dist <= range)
            .map(|(id, _)| id)
    }

    fn nearest_stocked(&self, ctx: &KidContext<'_>) -> Option<(ShelfId, f32)> {
        ctx.shelves
            .iter()
            .filter(|s| s.has_stock())
            .map(|s| (s.id, s.bounds.distance_to_point(self.pos)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Near the last robbed shelf if it is close, otherwise at our feet
    fn drop_point<R: Rng>(&self, ctx: &KidContext<'_>, rng: &mut R) -> Vec2 {
        self.last_target
            .and_then(|id| ctx.shelves.get(id.index()))
            .filter(|s| s.bounds.distance_to_point(self.pos) <= NEARBY_SHELF_RADIUS)
            .map(|s| scatter_point(s, rng))
            .unwrap_or(self.pos)
    }

    fn desired_direction(&self, ctx: &KidContext<'_>) -> Vec2 {
        let wander = heading_to_dir(self.heading);
        if self.detour > 0.0 {
            return wander;
        }
        match self.state {
            KidState::Fleeing => ctx
                .player_pos
                .map(|p| (self.pos - p).normalize_or_zero())
                .filter(|d| *d != Vec2::ZERO)
                .unwrap_or(wander),
            KidState::Stealing => match self.target.and_then(|id| ctx.shelves.get(id.index())) {
                Some(shelf) if self.reached(shelf) => Vec2::ZERO,
                Some(shelf) => (shelf.pos - self.pos).normalize_or_zero(),
                None => wander,
            },
            KidState::Wandering if self.carrying.is_none() => self
                .nearest_stocked(ctx)
                .and_then(|(id, _)| ctx.shelves.get(id.index()))
                .map(|s| (s.pos - self.pos).normalize_or_zero())
                .unwrap_or(wander),
            KidState::Wandering => wander,
        }
    }

    fn steer<R: Rng>(&mut self, ctx: &KidContext<'_>, dt: f32, rng: &mut R) {
        let tuning = self.tier.tuning();

        if self.direction_timer <= 0.0 {
            self.heading = rng.random_range(0.0..TAU);
            self.direction_timer = rng.random_range(DIRECTION_CHANGE_MIN..DIRECTION_CHANGE_MAX);
        }

        let dir = self.desired_direction(ctx);
        let base = if self.state == KidState::Fleeing {
            tuning.flee_speed
        } else {
            tuning.speed
        };
        self.vel = dir * base * self.speed_scale;

        let here = self.pos;
        let obstacles = ctx
            .shelves
            .iter()
            .filter(move |s| s.pos.distance(here) <= NEARBY_SHELF_RADIUS)
            .map(|s| &s.bounds);
        let result = slide_move(self.pos, Vec2::splat(KID_SIZE), self.vel * dt, &ctx.bounds, obstacles);
        self.pos = result.pos;

        if result.blocked_both() {
            self.heading = rng.random_range(0.0..TAU);
            self.speed_scale = BLOCKED_SPEED_SCALE;
            self.detour = DETOUR_TIME;
            self.vel = heading_to_dir(self.heading) * tuning.speed * self.speed_scale;
        } else if result.blocked_any() {
            if result.blocked_x {
                self.vel.x = -self.vel.x * BOUNCE_DAMPING;
            }
            if result.blocked_y {
                self.vel.y = -self.vel.y * BOUNCE_DAMPING;
            }
            if self.state == KidState::Wandering && self.vel != Vec2::ZERO {
                self.heading = dir_to_heading(self.vel) + rng.random_range(-WANDER_NUDGE..WANDER_NUDGE);
            }
        }

        // Standing still at a shelf on purpose is not being stuck
        if dir == Vec2::ZERO || dt <= 0.0 {
            self.stuck_timer = 0.0;
            return;
        }
        let speed = self.pos.distance(here) / dt;
        if speed < STUCK_SPEED {
            self.stuck_timer += dt;
            if self.stuck_timer > STUCK_TIME {
                self.heading = rng.random_range(0.0..TAU);
                self.detour = DETOUR_TIME;
                self.stuck_timer = 0.0;
            }
        } else {
            self.stuck_timer = 0.0;
        }
    }
}

/// A floor point just above or below a shelf
pub fn scatter_point<R: Rng>(shelf: &Shelf, rng: &mut R) -> Vec2 {
    let x = rng.random_range(shelf.bounds.min.x..=shelf.bounds.max.x);
    let y = if rng.random_bool(0.5) {
        shelf.bounds.max.y + DROP_OFFSET
    } else {
        shelf.bounds.min.y - DROP_OFFSET
    };
    Vec2::new(x, y)
}
