//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (entities are updated in id order)
//! - No rendering, audio or platform dependencies

pub mod audit;
pub mod autopilot;
pub mod block;
pub mod collision;
pub mod generate;
pub mod kid;
pub mod player;
pub mod shelf;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use block::{Block, BlockColor, BlockLocation, Holder};
pub use collision::{Aabb, MoveResult, slide_move};
pub use kid::{AggressionTier, Kid, KidIntent, KidState};
pub use player::{Player, PlayerStats};
pub use shelf::Shelf;
pub use state::{
    BlockId, GameEvent, GamePhase, GameState, KidId, LossReason, SessionStats, ShelfId,
};
pub use tick::{TickInput, max_kids_for_minutes, step_chaos, tick};
pub use upgrade::Upgrade;
