//! Idle/demo mode: a simple librarian AI
//!
//! Priorities, highest first: shelve what we carry, snatch from a fleeing
//! kid, pick up floor blocks, shadow a kid that is about to steal, and
//! otherwise drift back to the middle of the world.

use glam::Vec2;

use super::kid::KidState;
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::{PLAYER_SIZE, SHELF_HEIGHT};

/// Sprint when the target is further than this
const SPRINT_DISTANCE: f32 = 300.0;
/// Keep this fraction of stamina in reserve
const STAMINA_RESERVE: f32 = 0.4;

/// Build the input the AI would give this tick
pub fn autopilot_input(state: &GameState, input: &TickInput) -> TickInput {
    let mut input = input.clone();
    input.movement = Vec2::ZERO;
    input.pointer = choose_target(state);
    input.sprint = input.pointer.is_some_and(|t| {
        t.distance(state.player.pos) > SPRINT_DISTANCE
            && state.player.stamina > state.player.stats.max_stamina * STAMINA_RESERVE
    });
    input
}

fn nearest(from: Vec2, points: impl Iterator<Item = Vec2>) -> Option<Vec2> {
    points.min_by(|a, b| {
        a.distance_squared(from)
            .partial_cmp(&b.distance_squared(from))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

fn choose_target(state: &GameState) -> Option<Vec2> {
    let me = state.player.pos;

    // A shelf that takes something we're carrying; stand in the aisle beside it
    let offset = SHELF_HEIGHT * 0.5 + PLAYER_SIZE * 0.5 + 8.0;
    let drop_off = nearest(
        me,
        state
            .carried_blocks()
            .flat_map(|b| {
                state
                    .shelves
                    .iter()
                    .filter(move |s| s.color == b.color && s.has_empty_slots())
            })
            .flat_map(|s| {
                [
                    Vec2::new(s.pos.x, s.pos.y + offset),
                    Vec2::new(s.pos.x, s.pos.y - offset),
                ]
            }),
    );
    if state.player.is_full() {
        return drop_off;
    }

    let runner = nearest(
        me,
        state
            .kids
            .iter()
            .filter(|k| k.carrying.is_some())
            .map(|k| k.pos),
    );
    let floor = nearest(
        me,
        state.blocks.iter().filter(|b| b.is_on_floor()).map(|b| b.pos),
    );
    let thief = nearest(
        me,
        state
            .kids
            .iter()
            .filter(|k| k.state == KidState::Stealing)
            .map(|k| k.pos),
    );

    drop_off
        .or(runner)
        .or(floor)
        .or(thief)
        .or_else(|| Some(state.bounds().center()))
}
