//! Volume blocks: the collectible items that belong on shelves

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, slide_move};
use super::state::{BlockId, KidId, ShelfId};
use crate::consts::BLOCK_SIZE;

/// Block colors; a block may only be shelved on a shelf of the same color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl BlockColor {
    pub const ALL: [BlockColor; 6] = [
        BlockColor::Red,
        BlockColor::Blue,
        BlockColor::Green,
        BlockColor::Yellow,
        BlockColor::Purple,
        BlockColor::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Blue => "blue",
            BlockColor::Green => "green",
            BlockColor::Yellow => "yellow",
            BlockColor::Purple => "purple",
            BlockColor::Orange => "orange",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        BlockColor::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Who is holding a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Holder {
    Player,
    Kid(KidId),
}

/// Where a block currently is. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockLocation {
    /// Lying on the floor (adds to chaos)
    Floor,
    /// Carried by the player or a kid
    Held(Holder),
    /// Sitting in a shelf slot
    Shelved { shelf: ShelfId, slot: usize },
}

/// A volume block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: BlockColor,
    pub location: BlockLocation,
    /// Drawn in the world (false while tucked in the player's arms)
    pub visible: bool,
}

impl Block {
    /// A block lying on the floor
    pub fn new(id: BlockId, color: BlockColor, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            color,
            location: BlockLocation::Floor,
            visible: true,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(BLOCK_SIZE))
    }

    #[inline]
    pub fn is_on_floor(&self) -> bool {
        self.location == BlockLocation::Floor
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        matches!(self.location, BlockLocation::Held(_))
    }

    #[inline]
    pub fn is_shelved(&self) -> bool {
        matches!(self.location, BlockLocation::Shelved { .. })
    }

    pub fn holder(&self) -> Option<Holder> {
        match self.location {
            BlockLocation::Held(holder) => Some(holder),
            _ => None,
        }
    }

    pub fn shelf(&self) -> Option<ShelfId> {
        match self.location {
            BlockLocation::Shelved { shelf, .. } => Some(shelf),
            _ => None,
        }
    }

    /// Held by a kid (counts toward chaos)
    pub fn is_held_by_kid(&self) -> bool {
        matches!(self.location, BlockLocation::Held(Holder::Kid(_)))
    }

    /// Floor -> Held. No-op (false) if already held or shelved.
    pub fn pickup(&mut self, holder: Holder) -> bool {
        if !self.is_on_floor() {
            return false;
        }
        self.location = BlockLocation::Held(holder);
        self.vel = Vec2::ZERO;
        self.visible = holder != Holder::Player;
        true
    }

    /// Held -> Held by someone else (snatching). False unless currently held.
    pub fn transfer(&mut self, holder: Holder) -> bool {
        if !self.is_held() {
            return false;
        }
        self.location = BlockLocation::Held(holder);
        self.visible = holder != Holder::Player;
        true
    }

    /// Any unshelved state -> Shelved. False if already shelved.
    pub fn shelve(&mut self, shelf: ShelfId, slot: usize) -> bool {
        if self.is_shelved() {
            return false;
        }
        self.location = BlockLocation::Shelved { shelf, slot };
        self.vel = Vec2::ZERO;
        self.visible = true;
        true
    }

    /// Shelved -> Floor, clearing the shelf reference
    pub fn unshelve(&mut self) -> bool {
        if !self.is_shelved() {
            return false;
        }
        self.location = BlockLocation::Floor;
        self.visible = true;
        true
    }

    /// Held -> Floor at `pos`, optionally tossed with `vel`
    pub fn drop_at(&mut self, pos: Vec2, vel: Vec2) -> bool {
        if !self.is_held() {
            return false;
        }
        self.location = BlockLocation::Floor;
        self.pos = pos;
        self.vel = vel;
        self.visible = true;
        true
    }

    /// Passive physics for floor blocks; damping is applied by the caller.
    /// A blocked axis loses its velocity.
    pub fn update<'a, I>(&mut self, dt: f32, bounds: &Aabb, obstacles: I)
    where
        I: IntoIterator<Item = &'a Aabb> + Clone,
    {
        if !self.is_on_floor() || self.vel == Vec2::ZERO {
            return;
        }
        let result = slide_move(self.pos, Vec2::splat(BLOCK_SIZE), self.vel * dt, bounds, obstacles);
        self.pos = result.pos;
        if result.blocked_x {
            self.vel.x = 0.0;
        }
        if result.blocked_y {
            self.vel.y = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        Block::new(BlockId(0), BlockColor::Red, Vec2::new(10.0, 10.0))
    }

    #[test]
    fn test_pickup_only_from_floor() {
        let mut b = block();
        assert!(b.pickup(Holder::Player));
        assert_eq!(b.holder(), Some(Holder::Player));
        assert!(!b.visible);

        // Already held: second pickup is a no-op
        assert!(!b.pickup(Holder::Kid(KidId(3))));
        assert_eq!(b.holder(), Some(Holder::Player));
    }

    #[test]
    fn test_shelve_and_unshelve() {
        let mut b = block();
        assert!(b.shelve(ShelfId(2), 4));
        assert_eq!(b.shelf(), Some(ShelfId(2)));
        assert!(!b.pickup(Holder::Player));
        assert!(!b.shelve(ShelfId(1), 0));

        assert!(b.unshelve());
        assert!(b.is_on_floor());
        assert_eq!(b.shelf(), None);
        assert!(!b.unshelve());
    }

    #[test]
    fn test_transfer_and_drop() {
        let mut b = block();
        assert!(!b.transfer(Holder::Player));
        b.pickup(Holder::Kid(KidId(0)));
        assert!(b.is_held_by_kid());
        assert!(b.transfer(Holder::Player));
        assert!(!b.is_held_by_kid());

        assert!(b.drop_at(Vec2::new(50.0, 60.0), Vec2::new(5.0, 0.0)));
        assert!(b.is_on_floor());
        let world = Aabb::new(Vec2::ZERO, Vec2::splat(200.0));
        b.update(1.0, &world, std::iter::empty::<&Aabb>());
        assert_eq!(b.pos, Vec2::new(55.0, 60.0));
    }

    #[test]
    fn test_update_stops_at_obstacle() {
        let mut b = block();
        b.vel = Vec2::new(25.0, 0.0);
        let world = Aabb::new(Vec2::ZERO, Vec2::splat(200.0));
        let wall = [Aabb::new(Vec2::new(30.0, 0.0), Vec2::new(40.0, 200.0))];
        b.update(1.0, &world, wall.iter());
        assert_eq!(b.pos, Vec2::new(10.0, 10.0));
        assert_eq!(b.vel.x, 0.0);
    }

    #[test]
    fn test_color_names() {
        assert_eq!(BlockColor::from_str("Purple"), Some(BlockColor::Purple));
        assert_eq!(BlockColor::from_str("teal"), None);
        assert_eq!(BlockColor::Orange.as_str(), "orange");
    }
}
