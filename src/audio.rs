//! Sound cues
//!
//! The simulation only emits [`GameEvent`]s; this module maps them to
//! fire-and-forget sound effects. A failing backend never affects the game.

use thiserror::Error;

use crate::sim::state::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Block picked up off the floor
    Pickup,
    /// Block yanked out of a kid's hands
    Snatch,
    /// Block returned to its shelf
    Shelf,
    /// A kid stole a block
    Laugh,
    /// A kid spotted the player and ran
    Alert,
    LevelUp,
    /// More kids are coming
    WaveUp,
    Victory,
    Defeat,
}

impl SoundEffect {
    /// The cue for an event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        let effect = match event {
            GameEvent::BlockPickedUp { .. } => SoundEffect::Pickup,
            GameEvent::BlockSnatched { .. } => SoundEffect::Snatch,
            GameEvent::BlockShelved { .. } => SoundEffect::Shelf,
            GameEvent::BlockStolen { .. } => SoundEffect::Laugh,
            GameEvent::KidRepelled { .. } => SoundEffect::Alert,
            GameEvent::LevelUp { .. } => SoundEffect::LevelUp,
            GameEvent::WaveIncreased { .. } => SoundEffect::WaveUp,
            GameEvent::Won => SoundEffect::Victory,
            GameEvent::Lost(_) => SoundEffect::Defeat,
            _ => return None,
        };
        Some(effect)
    }

    /// Relative loudness of the cue
    fn gain(&self) -> f32 {
        match self {
            SoundEffect::Pickup => 0.4,
            SoundEffect::Snatch => 0.6,
            SoundEffect::Shelf => 0.5,
            SoundEffect::Laugh => 0.7,
            SoundEffect::Alert => 0.3,
            SoundEffect::LevelUp | SoundEffect::WaveUp => 0.8,
            SoundEffect::Victory | SoundEffect::Defeat => 1.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio device unavailable")]
    Unavailable,

    #[error("failed to play {effect:?}: {reason}")]
    Playback { effect: SoundEffect, reason: String },
}

/// Something that can actually make noise
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;
}

/// Backend for headless runs: cues go to the log
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        log::trace!("sound {:?} at {:.2}", effect, volume);
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(backend: Option<Box<dyn AudioBackend>>) -> Self {
        if backend.is_none() {
            log::warn!("No audio backend - audio disabled");
        }
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect; failures are logged and dropped
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.gain();
        if vol <= 0.0 {
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.play(effect, vol) {
            log::debug!("Audio cue dropped: {e}");
        }
    }

    /// Play the cues for a batch of drained events
    pub fn play_events<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for effect in events.into_iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }
}
