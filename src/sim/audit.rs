//! Periodic consistency audit
//!
//! Cross-checks the two sides of every block relationship (shelf slot vs.
//! block location, holder vs. held block) and repairs whatever disagrees.
//! A healthy session never reports anything here; violations are logged at
//! error level.

use glam::Vec2;

use super::block::{BlockLocation, Holder};
use super::state::{BlockId, GameState, KidId, ShelfId};
use crate::consts::BLOCK_SIZE;

/// An inconsistency found (and repaired) by the audit
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Slot pointed at a block that is not shelved there; slot cleared
    StaleShelfSlot { shelf: ShelfId, slot: usize },
    /// Block claimed a shelf slot that does not hold it; dropped to the floor
    OrphanShelvedBlock { block: BlockId },
    /// Player's carry list named a block the player is not holding
    StaleCarried { block: BlockId },
    /// Block held by someone who does not know about it; dropped
    OrphanHeldBlock { block: BlockId },
    /// Kid thought it carried a block it does not hold
    StaleKidCarry { kid: KidId, block: BlockId },
    ChaosOutOfRange { chaos: f32 },
}

/// Check every invariant and repair violations in place
pub fn run(state: &mut GameState) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_shelves(state, &mut violations);
    check_player(state, &mut violations);
    check_kids(state, &mut violations);

    if !(0.0..=state.max_chaos).contains(&state.chaos) {
        violations.push(Violation::ChaosOutOfRange { chaos: state.chaos });
        state.chaos = state.chaos.clamp(0.0, state.max_chaos);
    }

    for violation in &violations {
        log::error!("State audit at tick {}: {:?}", state.time_ticks, violation);
    }
    violations
}

fn check_shelves(state: &mut GameState, violations: &mut Vec<Violation>) {
    for shelf in &mut state.shelves {
        for slot in shelf.repair_slots(&state.blocks) {
            violations.push(Violation::StaleShelfSlot {
                shelf: shelf.id,
                slot,
            });
        }
    }

    for block in &mut state.blocks {
        let BlockLocation::Shelved { shelf, slot } = block.location else {
            continue;
        };
        let shelf = state.shelves.get(shelf.index());
        if shelf.is_some_and(|s| s.slot(slot) == Some(block.id)) {
            continue;
        }
        let at = shelf
            .map(|s| Vec2::new(s.pos.x, s.bounds.max.y + BLOCK_SIZE))
            .unwrap_or(block.pos);
        block.unshelve();
        block.pos = at;
        violations.push(Violation::OrphanShelvedBlock { block: block.id });
    }
}

fn check_player(state: &mut GameState, violations: &mut Vec<Violation>) {
    let blocks = &state.blocks;
    let mut kept: Vec<BlockId> = Vec::with_capacity(state.player.carried.len());
    for id in state.player.carried.drain(..) {
        let held = blocks
            .get(id.index())
            .is_some_and(|b| b.holder() == Some(Holder::Player));
        if held && !kept.contains(&id) {
            kept.push(id);
        } else {
            violations.push(Violation::StaleCarried { block: id });
        }
    }
    state.player.carried = kept;

    let player_pos = state.player.pos;
    for block in &mut state.blocks {
        if block.holder() == Some(Holder::Player) && !state.player.carried.contains(&block.id) {
            block.drop_at(player_pos, Vec2::ZERO);
            violations.push(Violation::OrphanHeldBlock { block: block.id });
        }
    }
}

fn check_kids(state: &mut GameState, violations: &mut Vec<Violation>) {
    for kid in &mut state.kids {
        let Some(block) = kid.carrying else { continue };
        let held = state
            .blocks
            .get(block.index())
            .is_some_and(|b| b.holder() == Some(Holder::Kid(kid.id)));
        if !held {
            kid.carrying = None;
            kid.carry_timer = 0.0;
            violations.push(Violation::StaleKidCarry { kid: kid.id, block });
        }
    }

    for block in &mut state.blocks {
        let Some(Holder::Kid(kid)) = block.holder() else {
            continue;
        };
        let kid = state.kids.get(kid.index());
        if kid.is_some_and(|k| k.carrying == Some(block.id)) {
            continue;
        }
        let at = kid.map(|k| k.pos).unwrap_or(block.pos);
        block.drop_at(at, Vec2::ZERO);
        violations.push(Violation::OrphanHeldBlock { block: block.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::sim::kid::AggressionTier;

    fn state() -> GameState {
        GameState::new(WorldConfig::default(), 77)
    }

    #[test]
    fn test_clean_state_has_no_violations() {
        let mut state = state();
        assert!(run(&mut state).is_empty());
    }

    #[test]
    fn test_stale_slot_is_cleared() {
        let mut state = state();
        let id = state.shelves[1].slot(2).unwrap();
        // Block forgets it was shelved
        state.blocks[id.index()].location = BlockLocation::Floor;

        let violations = run(&mut state);
        assert_eq!(
            violations,
            vec![Violation::StaleShelfSlot {
                shelf: ShelfId(1),
                slot: 2
            }]
        );
        assert_eq!(state.shelves[1].slot(2), None);
        assert!(run(&mut state).is_empty());
    }

    #[test]
    fn test_orphan_shelved_block_drops() {
        let mut state = state();
        // Free a block, then have it claim a slot that belongs to another
        let id = state.shelves[0].remove_block(0, &mut state.blocks).unwrap();
        state.blocks[id.index()].location = BlockLocation::Shelved {
            shelf: ShelfId(0),
            slot: 1,
        };

        let violations = run(&mut state);
        assert!(violations.contains(&Violation::OrphanShelvedBlock { block: id }));
        assert!(state.blocks[id.index()].is_on_floor());
        assert!(!state.blocks[id.index()].bounds().overlaps(&state.shelves[0].bounds));
    }

    #[test]
    fn test_player_carry_list_reconciled() {
        let mut state = state();
        let id = state.shelves[0].remove_block(0, &mut state.blocks).unwrap();
        // Listed but lying on the floor
        state.player.carried.push(id);

        let violations = run(&mut state);
        assert_eq!(violations, vec![Violation::StaleCarried { block: id }]);
        assert!(state.player.carried.is_empty());

        // Held but unlisted
        state.blocks[id.index()].pickup(Holder::Player);
        let violations = run(&mut state);
        assert_eq!(violations, vec![Violation::OrphanHeldBlock { block: id }]);
        assert!(state.blocks[id.index()].is_on_floor());
    }

    #[test]
    fn test_kid_carry_reconciled() {
        let mut state = state();
        let kid = state.spawn_kid(Vec2::new(40.0, 40.0), AggressionTier::Wild);
        let id = state.shelves[0].remove_block(0, &mut state.blocks).unwrap();
        state.kids[kid.index()].take_block(id);

        let violations = run(&mut state);
        assert_eq!(violations, vec![Violation::StaleKidCarry { kid, block: id }]);
        assert_eq!(state.kids[kid.index()].carrying, None);
    }

    #[test]
    fn test_chaos_clamped() {
        let mut state = state();
        state.chaos = -3.0;
        let violations = run(&mut state);
        assert_eq!(violations, vec![Violation::ChaosOutOfRange { chaos: -3.0 }]);
        assert_eq!(state.chaos, 0.0);
    }
}
