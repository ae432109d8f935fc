//! Shelves: fixed-capacity, single-color block containers

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::block::{Block, BlockColor, BlockLocation};
use super::collision::Aabb;
use super::state::{BlockId, ShelfId};
use crate::consts::{SHELF_HEIGHT, SHELF_WIDTH};

/// Seconds a robbed shelf rattles
pub const RATTLE_DURATION: f32 = 0.6;

/// A shelf with an ordered, fixed-size slot array
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelf {
    pub id: ShelfId,
    pub pos: Vec2,
    pub color: BlockColor,
    /// Collision box (constant for the session)
    pub bounds: Aabb,
    slots: Vec<Option<BlockId>>,
    /// Visual rattle after a theft (seconds remaining)
    #[serde(default)]
    pub rattle: f32,
}

impl Shelf {
    pub fn new(id: ShelfId, pos: Vec2, color: BlockColor, capacity: usize) -> Self {
        Self {
            id,
            pos,
            color,
            bounds: Aabb::from_center(pos, Vec2::new(SHELF_WIDTH, SHELF_HEIGHT)),
            slots: vec![None; capacity],
            rattle: 0.0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<BlockId>] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<BlockId> {
        self.slots.get(index).copied().flatten()
    }

    /// Number of occupied slots
    pub fn stock(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn empty_slot_count(&self) -> usize {
        self.capacity() - self.stock()
    }

    pub fn has_empty_slots(&self) -> bool {
        self.slots.iter().any(|s| s.is_none())
    }

    pub fn has_stock(&self) -> bool {
        self.slots.iter().any(|s| s.is_some())
    }

    /// World position of a slot (slots run left to right along the shelf)
    pub fn slot_position(&self, index: usize) -> Vec2 {
        let width = self.bounds.size().x;
        let step = width / self.capacity().max(1) as f32;
        Vec2::new(self.bounds.min.x + step * (index as f32 + 0.5), self.pos.y)
    }

    /// Place `block` in the lowest empty slot
    ///
    /// Fails without side effects if the shelf is full, the color differs,
    /// or the block already sits on a shelf.
    pub fn add_block(&mut self, block: &mut Block) -> bool {
        if block.color != self.color || block.is_shelved() {
            return false;
        }
        let Some(index) = self.slots.iter().position(|s| s.is_none()) else {
            return false;
        };
        block.shelve(self.id, index);
        block.pos = self.slot_position(index);
        self.slots[index] = Some(block.id);
        true
    }

    /// Clear a slot and return its block to the floor
    pub fn remove_block(&mut self, index: usize, blocks: &mut [Block]) -> Option<BlockId> {
        let id = self.slots.get_mut(index)?.take()?;
        if let Some(block) = blocks.get_mut(id.index()) {
            block.unshelve();
        }
        Some(id)
    }

    /// Remove a uniformly chosen occupied slot
    pub fn remove_random_block<R: Rng>(&mut self, blocks: &mut [Block], rng: &mut R) -> Option<BlockId> {
        let occupied: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|_| i))
            .collect();
        if occupied.is_empty() {
            return None;
        }
        let index = occupied[rng.random_range(0..occupied.len())];
        self.rattle = RATTLE_DURATION;
        self.remove_block(index, blocks)
    }

    /// Clear every slot whose block disagrees about where it lives
    ///
    /// Returns the slot indices that were cleared.
    pub fn repair_slots(&mut self, blocks: &[Block]) -> Vec<usize> {
        let mut cleared = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(id) = *slot else { continue };
            let consistent = blocks.get(id.index()).is_some_and(|b| {
                b.color == self.color
                    && b.location
                        == BlockLocation::Shelved {
                            shelf: self.id,
                            slot: index,
                        }
            });
            if !consistent {
                *slot = None;
                cleared.push(index);
            }
        }
        cleared
    }

    pub fn update(&mut self, dt: f32) {
        if self.rattle > 0.0 {
            self.rattle = (self.rattle - dt).max(0.0);
        }
    }
}
