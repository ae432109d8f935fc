//! Drawable per-frame snapshot
//!
//! The core never draws. Each frame the host asks for a [`FrameView`]: what
//! is on screen (entities outside the viewport are culled) plus HUD values.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::block::BlockColor;
use crate::sim::collision::Aabb;
use crate::sim::kid::KidState;
use crate::sim::state::{BlockId, FloatingText, GamePhase, GameState, KidId, ShelfId};

/// Default camera size in world units
pub const DEFAULT_VIEW_SIZE: Vec2 = Vec2::new(960.0, 540.0);
/// Entities this far outside the view are still drawn (partial overlap, shake)
pub const CULL_MARGIN: f32 = 64.0;

/// Camera rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: Vec2,
    pub size: Vec2,
}

impl Viewport {
    /// Center on `target`, keeping the view inside the world where possible
    pub fn follow(target: Vec2, size: Vec2, world: &Aabb) -> Self {
        let world_size = world.size();
        let axis = |t: f32, view: f32, min: f32, extent: f32| {
            if view >= extent {
                min + extent * 0.5
            } else {
                t.clamp(min + view * 0.5, min + extent - view * 0.5)
            }
        };
        Self {
            center: Vec2::new(
                axis(target.x, size.x, world.min.x, world_size.x),
                axis(target.y, size.y, world.min.y, world_size.y),
            ),
            size,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.center, self.size)
    }

    /// True if any part of `aabb` is within the view plus [`CULL_MARGIN`]
    pub fn is_visible(&self, aabb: &Aabb) -> bool {
        self.bounds().expanded(CULL_MARGIN).overlaps(aabb)
    }

    /// World to screen coordinates (top-left origin)
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - (self.center - self.size * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSprite {
    pub pos: Vec2,
    /// 0..1
    pub stamina: f32,
    pub carried: Vec<BlockColor>,
    pub carry_slots: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfSprite {
    pub id: ShelfId,
    pub pos: Vec2,
    pub color: BlockColor,
    pub stock: usize,
    pub capacity: usize,
    /// Robbed recently; renderer shakes it
    pub rattling: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSprite {
    pub id: BlockId,
    pub pos: Vec2,
    pub color: BlockColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KidSprite {
    pub id: KidId,
    pub pos: Vec2,
    pub state: KidState,
    pub tier: u8,
    pub carrying: Option<BlockColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    /// 0..100
    pub chaos_percent: f32,
    pub elapsed: f32,
    pub time_left: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub pending_upgrades: u32,
    pub kids: usize,
    pub max_kids: usize,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub viewport: Viewport,
    pub player: PlayerSprite,
    pub shelves: Vec<ShelfSprite>,
    pub blocks: Vec<BlockSprite>,
    pub kids: Vec<KidSprite>,
    pub hud: Hud,
    pub notifications: Vec<String>,
    pub floating_texts: Vec<FloatingText>,
}

impl FrameView {
    pub fn build(state: &GameState, viewport: Viewport) -> Self {
        let color_of = |id: BlockId| state.block(id).map(|b| b.color);

        let player = PlayerSprite {
            pos: state.player.pos,
            stamina: if state.player.stats.max_stamina > 0.0 {
                state.player.stamina / state.player.stats.max_stamina
            } else {
                0.0
            },
            carried: state.carried_blocks().map(|b| b.color).collect(),
            carry_slots: state.player.stats.carry_slots,
        };

        let shelves = state
            .shelves
            .iter()
            .filter(|s| viewport.is_visible(&s.bounds))
            .map(|s| ShelfSprite {
                id: s.id,
                pos: s.pos,
                color: s.color,
                stock: s.stock(),
                capacity: s.capacity(),
                rattling: s.rattle > 0.0,
            })
            .collect();

        let blocks = state
            .blocks
            .iter()
            .filter(|b| b.visible && viewport.is_visible(&b.bounds()))
            .map(|b| BlockSprite {
                id: b.id,
                pos: b.pos,
                color: b.color,
            })
            .collect();

        let kids = state
            .kids
            .iter()
            .filter(|k| viewport.is_visible(&k.bounds()))
            .map(|k| KidSprite {
                id: k.id,
                pos: k.pos,
                state: k.state,
                tier: k.tier.level(),
                carrying: k.carrying.and_then(color_of),
            })
            .collect();

        let hud = Hud {
            phase: state.phase,
            chaos_percent: state.chaos_percent(),
            elapsed: state.elapsed,
            time_left: (state.target_time - state.elapsed).max(0.0),
            level: state.level,
            xp: state.xp,
            xp_to_next: state.xp_to_next,
            pending_upgrades: state.pending_upgrades,
            kids: state.kids.len(),
            max_kids: state.max_kids,
        };

        Self {
            viewport,
            player,
            shelves,
            blocks,
            kids,
            hud,
            notifications: state.notifications.iter().map(|n| n.text.clone()).collect(),
            floating_texts: state
                .floating_texts
                .iter()
                .filter(|t| viewport.bounds().expanded(CULL_MARGIN).contains_point(t.pos))
                .cloned()
                .collect(),
        }
    }
}
