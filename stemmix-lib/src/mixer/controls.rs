//! Control surface for the mixer: volumes, track changes, layer toggles.

use log::debug;

use crate::error::MixError;

use super::{Mixer, TrackChange};

const DEFAULT_TOGGLE_VOLUME: f32 = 1.0;

impl Mixer {
    /// Set the master volume and mirror it into the global output control.
    ///
    /// The global is re-asserted on every call even when the value is
    /// unchanged, so hosts that reset their own output volume pick the
    /// mixer's value back up.
    pub fn set_master_volume(&mut self, volume: f32) {
        if self.master_volume != volume {
            self.master_volume = volume;
        }
        self.master.set_master(volume);
    }

    /// Equivalent to `set_master_volume(0.0)`.
    pub fn mute(&mut self) {
        self.set_master_volume(0.0);
    }

    /// Set the music volume multiplier applied to every layer's output.
    ///
    /// The value is stored as given; range restriction is the caller's
    /// responsibility, matching the slider-driven configuration surface.
    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume;
    }

    /// Switch the active track, instantly silencing the previous one, then
    /// notify subscribers.
    pub fn change_track(&mut self, new_index: usize) -> Result<(), MixError> {
        if new_index >= self.tracks.len() {
            return Err(MixError::IndexOutOfRange {
                kind: "track",
                index: new_index,
                len: self.tracks.len(),
            });
        }

        self.previous_index = self.index;
        self.index = new_index;
        self.silence_previous_track();

        let change = TrackChange {
            previous: self.previous_index,
            active: self.index,
        };
        for subscriber in &self.subscribers {
            subscriber(change);
        }
        Ok(())
    }

    /// Advance to the next track, wrapping past the last one.
    pub fn next_track(&mut self) -> Result<(), MixError> {
        if self.tracks.is_empty() {
            return Err(MixError::IndexOutOfRange {
                kind: "track",
                index: 0,
                len: 0,
            });
        }
        self.change_track((self.index + 1) % self.tracks.len())
    }

    /// Toggle a layer's stored volume between zero and `volume` (default 1).
    ///
    /// `track` defaults to the active track. When `required_name` is given
    /// the toggle only applies if the layer's name matches, guarding against
    /// toggling the wrong layer after tracks are reordered.
    pub fn toggle_layer(
        &mut self,
        layer_index: usize,
        track_index: Option<usize>,
        volume: Option<f32>,
        required_name: Option<&str>,
    ) -> Result<(), MixError> {
        let track_index = track_index.unwrap_or(self.index);
        let track_count = self.tracks.len();
        let track = self
            .tracks
            .get_mut(track_index)
            .ok_or(MixError::IndexOutOfRange {
                kind: "track",
                index: track_index,
                len: track_count,
            })?;

        let layer_count = track.layers.len();
        let layer = track
            .layers
            .get_mut(layer_index)
            .ok_or(MixError::IndexOutOfRange {
                kind: "layer",
                index: layer_index,
                len: layer_count,
            })?;

        if let Some(required) = required_name {
            if layer.name != required {
                debug!(
                    "layer toggle skipped: layer {} is {:?}, expected {:?}",
                    layer_index, layer.name, required
                );
                return Ok(());
            }
        }

        layer.volume = if layer.volume == 0.0 {
            volume.unwrap_or(DEFAULT_TOGGLE_VOLUME)
        } else {
            0.0
        };
        Ok(())
    }

    /// Subscribe to track-change notifications, invoked synchronously after
    /// the indices update and the previous track is silenced.
    pub fn on_track_change<F>(&mut self, subscriber: F)
    where
        F: Fn(TrackChange) + Send + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }
}
