//! Input abstraction
//!
//! The simulation never polls devices. A host implements [`InputSource`]
//! (keyboard, gamepad, replay file...) and [`tick_input`] turns the current
//! action state into a [`TickInput`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::tick::TickInput;

/// Logical actions the core understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Sprint,
    Pause,
    /// Steer toward the pointer while held
    PointerMove,
}

/// Something that can answer "is this action pressed" and "where is the pointer"
pub trait InputSource {
    fn is_pressed(&self, action: Action) -> bool;

    /// Pointer position in world coordinates
    fn pointer(&self) -> Vec2;
}

/// Sample an input source for one frame
///
/// Opposite directions cancel. `Pause` is a one-shot; the session clears it
/// after the first substep consumes it.
pub fn tick_input(source: &impl InputSource) -> TickInput {
    let axis = |neg: Action, pos: Action| {
        let mut v = 0.0;
        if source.is_pressed(neg) {
            v -= 1.0;
        }
        if source.is_pressed(pos) {
            v += 1.0;
        }
        v
    };

    TickInput {
        movement: Vec2::new(
            axis(Action::MoveLeft, Action::MoveRight),
            axis(Action::MoveUp, Action::MoveDown),
        ),
        pointer: source
            .is_pressed(Action::PointerMove)
            .then(|| source.pointer()),
        sprint: source.is_pressed(Action::Sprint),
        pause: source.is_pressed(Action::Pause),
        idle_mode: false,
    }
}

/// A fixed set of pressed actions; handy for scripted runs and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub pressed: Vec<Action>,
    pub pointer: Vec2,
}

impl ScriptedInput {
    pub fn press(mut self, action: Action) -> Self {
        if !self.pressed.contains(&action) {
            self.pressed.push(action);
        }
        self
    }

    pub fn at(mut self, pointer: Vec2) -> Self {
        self.pointer = pointer;
        self
    }
}

impl InputSource for ScriptedInput {
    fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    fn pointer(&self) -> Vec2 {
        self.pointer
    }
}
