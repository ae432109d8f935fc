//! Fixed timestep host loop
//!
//! Wraps a [`GameState`] with the frame accumulator. Hosts feed it variable
//! frame times and the current input; it runs whole simulation ticks.

use glam::Vec2;

use crate::config::WorldConfig;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::frame::{DEFAULT_VIEW_SIZE, FrameView, Viewport};
use crate::sim::state::{GameEvent, GameState};
use crate::sim::tick::{TickInput, tick};
use crate::sim::upgrade::Upgrade;

/// Upgrade cards shown per level-up
pub const UPGRADE_CHOICES: usize = 3;

/// A running session
pub struct Session {
    pub state: GameState,
    /// Input applied to every substep until replaced
    pub input: TickInput,
    pub view_size: Vec2,
    accumulator: f32,
}

impl Session {
    pub fn new(config: WorldConfig, seed: u64) -> Self {
        Self::from_state(GameState::new(config, seed))
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            state,
            input: TickInput::default(),
            view_size: DEFAULT_VIEW_SIZE,
            accumulator: 0.0,
        }
    }

    /// Replace the held input, keeping an unconsumed pause press
    pub fn set_input(&mut self, input: TickInput) {
        let pause = self.input.pause || input.pause;
        self.input = input;
        self.input.pause = pause;
    }

    /// Advance by a frame's worth of time; returns the ticks run
    ///
    /// Frame time is clamped to [`MAX_FRAME_DT`] and at most
    /// [`MAX_SUBSTEPS`] ticks run per call. Nothing runs while a level-up
    /// is waiting for an upgrade choice.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        if self.awaiting_upgrade() {
            self.accumulator = 0.0;
            return 0;
        }

        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.pause = false;

            if self.awaiting_upgrade() {
                self.accumulator = 0.0;
                break;
            }
        }
        substeps
    }

    pub fn awaiting_upgrade(&self) -> bool {
        self.state.pending_upgrades > 0 && !self.state.phase.is_terminal()
    }

    pub fn offer_upgrades(&mut self) -> Vec<Upgrade> {
        self.state.offer_upgrades(UPGRADE_CHOICES)
    }

    pub fn choose_upgrade(&mut self, choice: Upgrade) -> bool {
        self.state.apply_upgrade(choice)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn is_over(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Drawable snapshot with the camera on the player
    pub fn frame(&self) -> FrameView {
        let viewport = Viewport::follow(self.state.player.pos, self.view_size, &self.state.bounds());
        FrameView::build(&self.state, viewport)
    }
}
