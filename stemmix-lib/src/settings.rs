//! Static track and layer definitions supplied before initialization.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MixError;

const DEFAULT_VOLUME: f32 = 1.0;
const DEFAULT_TRACK_RATE: f32 = 1.0;

/// One audio stream within a track.
///
/// `volume` is the intended target before track and music multipliers. A
/// `rate` of 0 snaps the output volume to its target; anything above that
/// interpolates toward it, higher being faster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerSettings {
    pub name: String,
    pub volume: f32,
    pub rate: f32,
    /// Name of the clip this layer plays, resolved against the clip library.
    pub clip: String,
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            volume: DEFAULT_VOLUME,
            rate: 0.0,
            clip: String::new(),
        }
    }
}

/// A named group of layers sharing a volume and fade-rate multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    pub name: String,
    pub track_volume: f32,
    pub track_rate: f32,
    pub layers: Vec<LayerSettings>,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            track_volume: DEFAULT_VOLUME,
            track_rate: DEFAULT_TRACK_RATE,
            layers: Vec::new(),
        }
    }
}

/// Full static configuration for a [`Mixer`](crate::mixer::Mixer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    pub tracks: Vec<TrackSettings>,
    pub start_index: usize,
    pub master_volume: f32,
    pub music_volume: f32,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            start_index: 0,
            master_volume: DEFAULT_VOLUME,
            music_volume: DEFAULT_VOLUME,
        }
    }
}

impl MixerSettings {
    /// Parse settings from a JSON string and sanitize all ranges.
    pub fn from_json_str(json: &str) -> Result<Self, MixError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Load settings from a JSON file and sanitize all ranges.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MixError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Clamp volumes to [0, 1] and rates to non-negative values.
    ///
    /// Sanitization happens once at load time; the mixer itself does not
    /// re-clamp on later mutation.
    pub fn sanitize(&mut self) {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        for track in &mut self.tracks {
            track.track_volume = track.track_volume.clamp(0.0, 1.0);
            track.track_rate = track.track_rate.max(0.0);
            for layer in &mut track.layers {
                layer.volume = layer.volume.clamp(0.0, 1.0);
                layer.rate = layer.rate.max(0.0);
            }
        }
    }
}

/// Static configuration for a [`OneShotPlayer`](crate::oneshot::OneShotPlayer).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OneShotSettings {
    pub volume: f32,
}

impl Default for OneShotSettings {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
        }
    }
}

impl OneShotSettings {
    /// Parse settings from a JSON string and sanitize all ranges.
    pub fn from_json_str(json: &str) -> Result<Self, MixError> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Clamp the effect volume to [0, 1].
    pub fn sanitize(&mut self) {
        self.volume = self.volume.clamp(0.0, 1.0);
    }
}
