//! Recording in-memory backend for tests and offline simulation.

use std::sync::{Arc, Mutex};

use super::{AudioHandle, Clip, HandleFactory, MasterControl, PlayMode};

/// Observable state behind a memory handle.
#[derive(Debug, Clone)]
pub struct HandleState {
    pub mode: PlayMode,
    pub clip: Option<String>,
    pub pitch: f32,
    pub volume: f32,
    pub playing: bool,
    pub play_calls: u32,
    pub stop_calls: u32,
    pub volume_writes: u32,
}

impl HandleState {
    fn new(mode: PlayMode) -> Self {
        Self {
            mode,
            clip: None,
            pitch: 1.0,
            volume: 0.0,
            playing: false,
            play_calls: 0,
            stop_calls: 0,
            volume_writes: 0,
        }
    }
}

struct MemoryHandle {
    state: Arc<Mutex<HandleState>>,
}

impl AudioHandle for MemoryHandle {
    fn set_clip(&mut self, clip: &Clip) {
        self.state.lock().unwrap().clip = Some(clip.name.clone());
    }

    fn set_pitch(&mut self, pitch: f32) {
        self.state.lock().unwrap().pitch = pitch;
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        state.volume_writes += 1;
    }

    fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    fn play(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = true;
        state.play_calls += 1;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.stop_calls += 1;
    }
}

/// Factory handing out recording handles.
///
/// Clones share the same handle registry, so a backend can be cloned for
/// inspection before being moved into a mixer or one-shot player. Handles are
/// indexed in creation order.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    handles: Arc<Mutex<Vec<Arc<Mutex<HandleState>>>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_count(&self) -> usize {
        self.handles.lock().unwrap().len()
    }

    /// Snapshot of the state recorded by the handle at `index`.
    pub fn state(&self, index: usize) -> Option<HandleState> {
        self.handles
            .lock()
            .unwrap()
            .get(index)
            .map(|state| state.lock().unwrap().clone())
    }

    /// Snapshots of every handle in creation order.
    pub fn states(&self) -> Vec<HandleState> {
        self.handles
            .lock()
            .unwrap()
            .iter()
            .map(|state| state.lock().unwrap().clone())
            .collect()
    }
}

impl HandleFactory for MemoryBackend {
    fn create_handle(&mut self, mode: PlayMode) -> Box<dyn AudioHandle> {
        let state = Arc::new(Mutex::new(HandleState::new(mode)));
        self.handles.lock().unwrap().push(state.clone());
        Box::new(MemoryHandle { state })
    }
}

#[derive(Debug)]
struct MasterState {
    volume: f32,
    writes: u32,
}

/// Master control recording the last written global volume.
#[derive(Debug, Clone)]
pub struct MemoryMaster {
    state: Arc<Mutex<MasterState>>,
}

impl MemoryMaster {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MasterState {
                volume: 1.0,
                writes: 0,
            })),
        }
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().unwrap().volume
    }

    pub fn writes(&self) -> u32 {
        self.state.lock().unwrap().writes
    }
}

impl Default for MemoryMaster {
    fn default() -> Self {
        Self::new()
    }
}

impl MasterControl for MemoryMaster {
    fn set_master(&mut self, volume: f32) {
        let mut state = self.state.lock().unwrap();
        state.volume = volume;
        state.writes += 1;
    }

    fn master(&self) -> f32 {
        self.volume()
    }
}
