//! Fire-and-forget sound effects with pitch variance and self-cleanup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::warn;
use rand::Rng;

use crate::error::MixError;
use crate::output::{Clip, ClipLibrary, HandleFactory, PlayMode};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::settings::OneShotSettings;

/// Delay between allocating a transient handle and touching it, giving the
/// host time to finish setting the handle up.
const START_DELAY: Duration = Duration::from_millis(100);

const DEFAULT_VARIANCE_AMPLITUDE: f32 = 0.5;

/// One-shot sound-effect player.
///
/// Each effect plays on a transient handle owned by its continuation chain:
/// after [`START_DELAY`] the clip, pitch, and volume are assigned and
/// playback starts; once the clip's duration elapses the handle is stopped
/// and dropped. Dropping the player cancels all pending work so no
/// continuation touches a dead handle.
pub struct OneShotPlayer {
    volume: f32,
    clips: ClipLibrary,
    factory: Box<dyn HandleFactory>,
    scheduler: Arc<dyn Scheduler>,
    pending: Arc<Mutex<Vec<TaskHandle>>>,
    shutdown: Arc<AtomicBool>,
}

impl OneShotPlayer {
    pub fn new(
        settings: &OneShotSettings,
        clips: ClipLibrary,
        factory: Box<dyn HandleFactory>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            volume: settings.volume,
            clips,
            factory,
            scheduler,
            pending: Arc::new(Mutex::new(Vec::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Play the clip at `index` once at the given pitch.
    pub fn play(&mut self, index: usize, pitch: f32) -> Result<(), MixError> {
        let Some(clip) = self.clips.get(index) else {
            return Err(MixError::MissingClip(format!("#{}", index)));
        };
        let clip = clip.clone();
        self.fire(clip, pitch);
        Ok(())
    }

    /// Play every clip with the given name. Duplicate names all fire;
    /// an unknown name is a logged no-op.
    pub fn play_named(&mut self, name: &str, pitch: f32) {
        let matches = self.clips.find_all(name);
        if matches.is_empty() {
            warn!("no sound effect named {:?}", name);
            return;
        }
        for index in matches {
            if let Some(clip) = self.clips.get(index) {
                let clip = clip.clone();
                self.fire(clip, pitch);
            }
        }
    }

    /// Play with pitch `1 ± amplitude`, drawn uniformly.
    pub fn play_with_variance(&mut self, index: usize, amplitude: f32) -> Result<(), MixError> {
        self.play(index, varied_pitch(amplitude))
    }

    /// Like [`play_with_variance`](Self::play_with_variance) with the
    /// default amplitude of 0.5.
    pub fn play_with_default_variance(&mut self, index: usize) -> Result<(), MixError> {
        self.play_with_variance(index, DEFAULT_VARIANCE_AMPLITUDE)
    }

    /// Name-lookup variant of [`play_with_variance`](Self::play_with_variance).
    pub fn play_named_with_variance(&mut self, name: &str, amplitude: f32) {
        self.play_named(name, varied_pitch(amplitude));
    }

    fn fire(&mut self, clip: Clip, pitch: f32) {
        let handle = self.factory.create_handle(PlayMode::Once);
        let volume = self.volume;
        let duration = clip.duration();
        let scheduler = Arc::clone(&self.scheduler);
        let pending = Arc::clone(&self.pending);
        let shutdown = Arc::clone(&self.shutdown);

        let start = self.scheduler.after(
            START_DELAY,
            Box::new(move || {
                if shutdown.load(Ordering::SeqCst) {
                    return;
                }
                let mut handle = handle;
                handle.set_clip(&clip);
                handle.set_pitch(pitch);
                handle.set_volume(volume);
                handle.play();

                let dispose = scheduler.after(
                    duration,
                    Box::new(move || {
                        // Checked here too: a drop can drain `pending` before
                        // this task's handle is registered there.
                        if shutdown.load(Ordering::SeqCst) {
                            return;
                        }
                        let mut handle = handle;
                        handle.stop();
                    }),
                );
                pending.lock().unwrap().push(dispose);
            }),
        );

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|task| !task.is_cancelled());
        pending.push(start);
    }
}

impl Drop for OneShotPlayer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for task in self.pending.lock().unwrap().drain(..) {
            task.cancel();
        }
    }
}

fn varied_pitch(amplitude: f32) -> f32 {
    if amplitude <= 0.0 {
        return 1.0;
    }
    let mut rng = rand::thread_rng();
    1.0 + rng.gen_range(-amplitude..=amplitude)
}
