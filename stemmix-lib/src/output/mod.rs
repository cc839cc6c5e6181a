//! Audio-output abstraction shared by the mixer and one-shot player.
//!
//! The host environment is reduced to three seams: a playable handle with
//! mutable volume and pitch, a factory that allocates handles on the output
//! device, and a process-wide master volume control. The [`device`] backend
//! drives real hardware through rodio; the [`memory`] backend records every
//! write for tests and offline simulation.

mod device;
mod memory;

pub use device::{MasterGain, RodioBackend};
pub use memory::{HandleState, MemoryBackend, MemoryMaster};

use std::sync::Arc;
use std::time::Duration;

/// How a handle plays its clip when started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    /// Repeat seamlessly; used by mixer layers so fades never restart audio.
    Loop,
    /// Play through once; used by one-shot effects.
    Once,
}

/// A decoded audio clip shared between handles.
#[derive(Debug, Clone)]
pub struct Clip {
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Arc<Vec<f32>>,
}

impl Clip {
    pub fn new(
        name: impl Into<String>,
        channels: u16,
        sample_rate: u32,
        samples: Vec<f32>,
    ) -> Self {
        Self {
            name: name.into(),
            channels,
            sample_rate,
            samples: Arc::new(samples),
        }
    }

    /// Playback length of the clip at normal pitch.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    /// Synthesize a mono sine tone. Demos and tests use tones in place of
    /// decoded assets.
    pub fn sine(name: impl Into<String>, freq_hz: f32, seconds: f32, sample_rate: u32) -> Self {
        let frames = (seconds.max(0.0) * sample_rate as f32) as usize;
        let mut samples = Vec::with_capacity(frames);
        for frame in 0..frames {
            let t = frame as f32 / sample_rate as f32;
            samples.push((std::f32::consts::TAU * freq_hz * t).sin() * 0.5);
        }
        Self::new(name, 1, sample_rate, samples)
    }
}

/// Playable audio-output handle, exclusively owned by a mixer layer or a
/// one-shot voice for its lifetime.
pub trait AudioHandle: Send {
    fn set_clip(&mut self, clip: &Clip);
    fn set_pitch(&mut self, pitch: f32);
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;
    fn play(&mut self);
    fn stop(&mut self);
}

/// Allocates playable handles bound to the host output device.
pub trait HandleFactory {
    fn create_handle(&mut self, mode: PlayMode) -> Box<dyn AudioHandle>;
}

/// Process-wide output volume scalar mirrored from the mixer's master volume.
pub trait MasterControl: Send {
    fn set_master(&mut self, volume: f32);
    fn master(&self) -> f32;
}

/// Named clip storage with by-name lookup.
#[derive(Debug, Clone, Default)]
pub struct ClipLibrary {
    clips: Vec<Clip>,
}

impl ClipLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, clip: Clip) {
        self.clips.push(clip);
    }

    pub fn get(&self, index: usize) -> Option<&Clip> {
        self.clips.get(index)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// First clip with the given name.
    pub fn find_clip(&self, name: &str) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.name == name)
    }

    /// Indices of every clip with the given name. Duplicate names are legal;
    /// one-shot playback fires all of them.
    pub fn find_all(&self, name: &str) -> Vec<usize> {
        self.clips
            .iter()
            .enumerate()
            .filter(|(_, clip)| clip.name == name)
            .map(|(index, _)| index)
            .collect()
    }
}

impl FromIterator<Clip> for ClipLibrary {
    fn from_iter<I: IntoIterator<Item = Clip>>(iter: I) -> Self {
        Self {
            clips: iter.into_iter().collect(),
        }
    }
}
