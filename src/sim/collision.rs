//! Collision detection and response for axis-aligned boxes
//!
//! Everything in the library is a box: shelves, kids, the player, blocks.
//! Movers resolve X and Y independently so they slide along shelf edges
//! instead of sticking to them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given full size centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if `other` lies entirely inside this box
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        other.min.x >= self.min.x
            && other.max.x <= self.max.x
            && other.min.y >= self.min.y
            && other.max.y <= self.max.y
    }

    /// Grow (or shrink, for negative margins) on every side
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb::new(self.min - Vec2::splat(margin), self.max + Vec2::splat(margin))
    }

    pub fn translated(&self, delta: Vec2) -> Aabb {
        Aabb {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Closest point on (or in) the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Euclidean distance from `p` to the box (0 when inside)
    #[inline]
    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        p.distance(self.closest_point(p))
    }

    /// Clamp a box of `size` centred at `center` so it stays inside this box
    pub fn clamp_center(&self, center: Vec2, size: Vec2) -> Vec2 {
        let half = size * 0.5;
        let lo = self.min + half;
        let hi = (self.max - half).max(lo);
        center.clamp(lo, hi)
    }
}

/// Result of an axis-separated move
#[derive(Debug, Clone, Copy)]
pub struct MoveResult {
    /// Final centre position
    pub pos: Vec2,
    /// X displacement was rejected
    pub blocked_x: bool,
    /// Y displacement was rejected
    pub blocked_y: bool,
}

impl MoveResult {
    #[inline]
    pub fn blocked_any(&self) -> bool {
        self.blocked_x || self.blocked_y
    }

    #[inline]
    pub fn blocked_both(&self) -> bool {
        self.blocked_x && self.blocked_y
    }
}

/// Move a box of `size` by `delta`, testing X then Y independently
///
/// An axis is rejected if the moved box would leave `bounds` or overlap any
/// obstacle. The rejected axis keeps its previous coordinate.
pub fn slide_move<'a, I>(pos: Vec2, size: Vec2, delta: Vec2, bounds: &Aabb, obstacles: I) -> MoveResult
where
    I: IntoIterator<Item = &'a Aabb> + Clone,
{
    let blocked = |center: Vec2| {
        let candidate = Aabb::from_center(center, size);
        !bounds.contains(&candidate) || obstacles.clone().into_iter().any(|o| o.overlaps(&candidate))
    };

    let mut pos = pos;
    let mut blocked_x = false;
    let mut blocked_y = false;

    if delta.x != 0.0 {
        let next = Vec2::new(pos.x + delta.x, pos.y);
        if blocked(next) {
            blocked_x = true;
        } else {
            pos = next;
        }
    }

    if delta.y != 0.0 {
        let next = Vec2::new(pos.x, pos.y + delta.y);
        if blocked(next) {
            blocked_y = true;
        } else {
            pos = next;
        }
    }

    MoveResult {
        pos,
        blocked_x,
        blocked_y,
    }
}

/// Circle-vs-box proximity test (radius queries against shelves)
#[inline]
pub fn within_radius_of_box(center: Vec2, radius: f32, aabb: &Aabb) -> bool {
    aabb.distance_to_point(center) <= radius
}
