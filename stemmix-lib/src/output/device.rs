//! Default audio device backend built on rodio.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use log::{debug, error, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use super::{AudioHandle, Clip, HandleFactory, MasterControl, PlayMode};

const STREAM_OPEN_ATTEMPTS: usize = 20;
const STREAM_OPEN_BACKOFF: Duration = Duration::from_millis(100);

/// Shared master gain folded into every handle's sink writes.
///
/// rodio has no process-wide volume, so the master scalar lives here and each
/// handle multiplies it into its next sink write. The mixer re-writes layer
/// volumes every tick, so master changes propagate within a frame.
#[derive(Clone)]
pub struct MasterGain {
    volume: Arc<Mutex<f32>>,
}

impl MasterGain {
    fn new() -> Self {
        Self {
            volume: Arc::new(Mutex::new(1.0)),
        }
    }

    fn get(&self) -> f32 {
        *self.volume.lock().unwrap()
    }
}

impl MasterControl for MasterGain {
    fn set_master(&mut self, volume: f32) {
        *self.volume.lock().unwrap() = volume;
    }

    fn master(&self) -> f32 {
        self.get()
    }
}

/// Handle factory connected to the default output device.
///
/// The owned [`OutputStream`] keeps the device open for as long as the
/// backend lives; handles each own a sink connected to its mixer.
pub struct RodioBackend {
    stream: OutputStream,
    master: MasterGain,
}

impl RodioBackend {
    /// Open the default output device with bounded retry behavior.
    pub fn open() -> Option<Self> {
        let stream = open_default_stream_with_retry()?;
        Some(Self {
            stream,
            master: MasterGain::new(),
        })
    }

    /// Master control sharing this backend's gain state.
    pub fn master_control(&self) -> MasterGain {
        self.master.clone()
    }
}

impl HandleFactory for RodioBackend {
    fn create_handle(&mut self, mode: PlayMode) -> Box<dyn AudioHandle> {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        Box::new(RodioHandle {
            sink,
            mode,
            master: self.master.clone(),
            clip: None,
            volume: 0.0,
            pitch: 1.0,
            queued: false,
        })
    }
}

// Devices can report busy briefly while another process releases them, so a
// handful of spaced attempts is made before giving up.
fn open_default_stream_with_retry() -> Option<OutputStream> {
    for attempt in 1..=STREAM_OPEN_ATTEMPTS {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) if attempt < STREAM_OPEN_ATTEMPTS => {
                warn!("output device not ready (attempt {}): {}", attempt, err);
                thread::sleep(STREAM_OPEN_BACKOFF);
            }
            Err(err) => {
                error!(
                    "no usable output device after {} attempts: {}",
                    STREAM_OPEN_ATTEMPTS, err
                );
            }
        }
    }
    None
}

struct RodioHandle {
    sink: Sink,
    mode: PlayMode,
    master: MasterGain,
    clip: Option<Clip>,
    volume: f32,
    pitch: f32,
    queued: bool,
}

impl AudioHandle for RodioHandle {
    fn set_clip(&mut self, clip: &Clip) {
        self.clip = Some(clip.clone());
        self.sink.clear();
        self.queued = false;
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
        self.sink.set_speed(pitch);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.sink.set_volume(volume * self.master.get());
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn play(&mut self) {
        if !self.queued {
            let Some(clip) = self.clip.as_ref() else {
                debug!("play requested before a clip was bound");
                return;
            };
            let source = SamplesBuffer::new(
                clip.channels,
                clip.sample_rate,
                clip.samples.as_ref().clone(),
            );
            match self.mode {
                PlayMode::Loop => self.sink.append(source.repeat_infinite()),
                PlayMode::Once => self.sink.append(source),
            }
            self.queued = true;
        }
        self.sink.set_speed(self.pitch);
        self.sink.play();
    }

    fn stop(&mut self) {
        self.sink.clear();
        self.queued = false;
    }
}
