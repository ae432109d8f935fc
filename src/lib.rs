//! Volume Keeper - A library shelving arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kids, shelves, chaos economy, waves)
//! - `config`: World generation parameters and tuning
//! - `input`: Action queries consumed by the simulation
//! - `audio`: Fire-and-forget sound cues
//! - `frame`: Drawable per-frame snapshot with viewport culling
//! - `session`: Fixed timestep host loop

pub mod audio;
pub mod config;
pub mod frame;
pub mod input;
pub mod session;
pub mod sim;

pub use config::{ConfigError, WorldConfig};
pub use session::Session;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the host will feed into the accumulator
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Entity footprints (square, side length in world units)
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const KID_SIZE: f32 = 28.0;
    pub const BLOCK_SIZE: f32 = 16.0;
    /// Shelf footprint (width, height)
    pub const SHELF_WIDTH: f32 = 120.0;
    pub const SHELF_HEIGHT: f32 = 40.0;

    /// Chaos meter ceiling (reaching it loses the session)
    pub const MAX_CHAOS: f32 = 100.0;
    /// Passive chaos decay when nothing is out of place (per second)
    pub const CHAOS_DECAY_RATE: f32 = 0.1;
    /// Flat chaos rewards; shelving > snatching > picking up
    pub const PICKUP_CHAOS_REDUCTION: f32 = 2.0;
    pub const SNATCH_CHAOS_REDUCTION: f32 = 4.0;
    pub const SHELVE_CHAOS_REDUCTION: f32 = 8.0;

    /// Base XP awards
    pub const PICKUP_XP: u32 = 5;
    pub const SNATCH_XP: u32 = 7;
    pub const SHELVE_XP: u32 = 10;
    /// Early-game XP boost window (seconds) and multiplier
    pub const EARLY_XP_WINDOW: f32 = 120.0;
    pub const EARLY_XP_BOOST: f32 = 1.5;
    /// Level requirement curve: floor(BASE * GROWTH^(level-1))
    pub const XP_BASE: f64 = 100.0;
    pub const XP_GROWTH: f64 = 1.45;

    /// Seconds between kid spawn attempts
    pub const SPAWN_INTERVAL: f32 = 15.0;
    /// Seconds between consistency audits
    pub const AUDIT_INTERVAL: f32 = 5.0;
    /// Default session length (seconds) before the player wins
    pub const TARGET_TIME: f32 = 15.0 * 60.0;

    /// Wave notification lifetime (seconds)
    pub const NOTIFICATION_TTL: f32 = 3.0;
    /// Floating score text lifetime (seconds)
    pub const FLOATING_TEXT_TTL: f32 = 1.0;
    /// Floating score text rise speed (units per second)
    pub const FLOATING_TEXT_RISE: f32 = 30.0;
}

/// Elapsed seconds to whole-and-fractional minutes
#[inline]
pub fn minutes(elapsed_secs: f32) -> f32 {
    elapsed_secs / 60.0
}

/// Unit vector for a heading angle (radians)
#[inline]
pub fn heading_to_dir(heading: f32) -> Vec2 {
    Vec2::new(heading.cos(), heading.sin())
}

/// Heading angle (radians) of a direction vector
#[inline]
pub fn dir_to_heading(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}
