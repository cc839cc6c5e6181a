//! Layered music mixing: tracks of independently faded layers.
//!
//! A [`Mixer`] owns the full track/layer data model plus one audio handle per
//! layer. An external per-frame tick drives volume recomputation; control
//! calls switch tracks, toggle layers, and adjust the master and music
//! volumes. Exactly one mixer is expected per host; it is constructed
//! explicitly and passed to whoever needs it.

mod controls;
mod cycle;

use log::warn;

use crate::error::MixError;
use crate::output::{AudioHandle, ClipLibrary, HandleFactory, MasterControl, PlayMode};
use crate::settings::MixerSettings;

/// One audio stream within a track, independently toggleable and fadeable.
pub struct Layer {
    name: String,
    volume: f32,
    rate: f32,
    clip: String,
    handle: Option<Box<dyn AudioHandle>>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Intended target volume before track and music multipliers.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn clip_name(&self) -> &str {
        &self.clip
    }

    /// Volume currently held by the output handle, if the layer is bound.
    pub fn handle_volume(&self) -> Option<f32> {
        self.handle.as_ref().map(|handle| handle.volume())
    }

    pub fn is_bound(&self) -> bool {
        self.handle.is_some()
    }
}

/// A named group of layers sharing a volume and fade-rate multiplier.
pub struct Track {
    name: String,
    track_volume: f32,
    track_rate: f32,
    layers: Vec<Layer>,
}

impl Track {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn track_volume(&self) -> f32 {
        self.track_volume
    }

    pub fn track_rate(&self) -> f32 {
        self.track_rate
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

/// Notification payload for track-change subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackChange {
    pub previous: usize,
    pub active: usize,
}

type TrackChangeFn = Box<dyn Fn(TrackChange) + Send>;

/// Layered music mixer.
///
/// All mutation goes through the methods here; the track/layer state and the
/// per-layer handles are exclusively owned by the mixer.
pub struct Mixer {
    tracks: Vec<Track>,
    index: usize,
    previous_index: usize,
    master_volume: f32,
    music_volume: f32,
    master: Box<dyn MasterControl>,
    subscribers: Vec<TrackChangeFn>,
}

impl Mixer {
    /// Build a mixer from static settings.
    ///
    /// No audio handles are allocated until [`initialize`](Self::initialize)
    /// is called. Fails when `start_index` does not name a track.
    pub fn new(settings: &MixerSettings, master: Box<dyn MasterControl>) -> Result<Self, MixError> {
        if !settings.tracks.is_empty() && settings.start_index >= settings.tracks.len() {
            return Err(MixError::IndexOutOfRange {
                kind: "track",
                index: settings.start_index,
                len: settings.tracks.len(),
            });
        }

        let tracks = settings
            .tracks
            .iter()
            .map(|track| Track {
                name: track.name.clone(),
                track_volume: track.track_volume,
                track_rate: track.track_rate,
                layers: track
                    .layers
                    .iter()
                    .map(|layer| Layer {
                        name: layer.name.clone(),
                        volume: layer.volume,
                        rate: layer.rate,
                        clip: layer.clip.clone(),
                        handle: None,
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            tracks,
            index: settings.start_index,
            previous_index: settings.start_index,
            master_volume: settings.master_volume,
            music_volume: settings.music_volume,
            master,
            subscribers: Vec::new(),
        })
    }

    /// Allocate one looped handle per layer, binding each layer's clip.
    ///
    /// Handles start playing at volume zero so later fades are audible
    /// without restarting audio. Re-initialization tears down existing
    /// handles first. Layers whose clip name is not in the library stay
    /// unbound and silent.
    pub fn initialize(&mut self, clips: &ClipLibrary, factory: &mut dyn HandleFactory) {
        self.clear();

        for track in &mut self.tracks {
            for layer in &mut track.layers {
                let Some(clip) = clips.find_clip(&layer.clip) else {
                    warn!(
                        "clip {:?} for layer {:?} not found; layer stays silent",
                        layer.clip, layer.name
                    );
                    continue;
                };
                let mut handle = factory.create_handle(PlayMode::Loop);
                handle.set_clip(clip);
                handle.set_volume(0.0);
                handle.stop();
                handle.play();
                layer.handle = Some(handle);
            }
        }
    }

    /// Stop and drop every layer handle.
    pub fn clear(&mut self) {
        for track in &mut self.tracks {
            for layer in &mut track.layers {
                if let Some(handle) = layer.handle.as_mut() {
                    handle.stop();
                }
                layer.handle = None;
            }
        }
    }

    pub fn active_index(&self) -> usize {
        self.index
    }

    /// Index that was active before the most recent track change.
    pub fn previous_index(&self) -> usize {
        self.previous_index
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}
