//! Per-tick volume recomputation and the fade interpolation step.

use std::time::Duration;

use crate::output::AudioHandle;

use super::Mixer;

impl Mixer {
    /// Recompute the active track's layer volumes for one frame.
    ///
    /// Each layer's target is its stored volume times the track volume times
    /// the music volume. Targets are approached at `layer rate * track rate`;
    /// a combined rate of zero snaps immediately. An empty or unbound track
    /// produces no writes.
    pub fn tick(&mut self, dt: Duration) {
        self.cycle(self.index, true, 1.0, dt);
    }

    /// Like [`tick`](Self::tick), with an extra multiplier applied to every
    /// layer target. Useful for duck-style attenuation of the whole track.
    pub fn tick_with_override(&mut self, dt: Duration, volume_override: f32) {
        self.cycle(self.index, true, volume_override, dt);
    }

    fn cycle(&mut self, track_index: usize, smooth: bool, volume_override: f32, dt: Duration) {
        let music_volume = self.music_volume;
        let Some(track) = self.tracks.get_mut(track_index) else {
            return;
        };
        let track_volume = track.track_volume;
        let track_rate = track.track_rate;

        for layer in &mut track.layers {
            let Some(handle) = layer.handle.as_mut() else {
                continue;
            };
            let target = layer.volume * track_volume * music_volume * volume_override;
            let rate = if smooth { layer.rate * track_rate } else { 0.0 };
            adjust_volume(handle.as_mut(), target, rate, music_volume, dt);
        }
    }

    /// Drive every layer of the previous track to silence immediately so no
    /// orphaned audio outlives a track switch.
    pub(super) fn silence_previous_track(&mut self) {
        let music_volume = self.music_volume;
        let Some(track) = self.tracks.get_mut(self.previous_index) else {
            return;
        };
        for layer in &mut track.layers {
            if let Some(handle) = layer.handle.as_mut() {
                adjust_volume(handle.as_mut(), 0.0, 0.0, music_volume, Duration::ZERO);
            }
        }
    }
}

/// Move a handle's volume toward `target * music_volume`.
///
/// A positive rate interpolates with a step proportional to elapsed time,
/// the rate acting as an inverse time constant; a rate of zero or less sets
/// the value immediately. Values already at rest are not rewritten.
pub(crate) fn adjust_volume(
    handle: &mut dyn AudioHandle,
    target: f32,
    rate: f32,
    music_volume: f32,
    dt: Duration,
) {
    let scaled = target * music_volume;
    let current = handle.volume();
    let next = if rate > 0.0 {
        lerp(current, scaled, dt.as_secs_f32() * rate)
    } else {
        scaled
    };
    if next != current {
        handle.set_volume(next);
    }
}

/// Linear interpolation with the interpolant clamped to [0, 1], so a step
/// never overshoots its endpoint.
fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}
