//! Delayed one-shot task scheduling with explicit cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CANCEL_POLL_MS: u64 = 10;

/// Cancellation handle for a scheduled task.
#[derive(Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Prevent the task from running if it has not fired yet.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Fire-and-forget delayed callbacks with cancellation.
pub trait Scheduler: Send + Sync {
    /// Run `task` once after `delay` unless the returned handle is cancelled
    /// first.
    fn after(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> TaskHandle;
}

/// Thread-backed scheduler.
///
/// Each task sleeps on its own timer thread, polling the cancel flag in
/// slices. Dropping the scheduler cancels everything still pending so no
/// task outlives its owner.
pub struct TimerScheduler {
    pending: Mutex<Vec<TaskHandle>>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TimerScheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> TaskHandle {
        let handle = TaskHandle::new();
        {
            let mut pending = self.pending.lock().unwrap();
            pending.retain(|entry| !entry.is_cancelled());
            pending.push(handle.clone());
        }

        let timer_handle = handle.clone();
        std::thread::spawn(move || {
            let slice = Duration::from_millis(CANCEL_POLL_MS);
            let mut remaining = delay;
            while !remaining.is_zero() {
                if timer_handle.is_cancelled() {
                    return;
                }
                let step = remaining.min(slice);
                std::thread::sleep(step);
                remaining -= step;
            }
            if !timer_handle.is_cancelled() {
                task();
            }
        });

        handle
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        for handle in self.pending.lock().unwrap().drain(..) {
            handle.cancel();
        }
    }
}

struct StepTask {
    due: Duration,
    handle: TaskHandle,
    task: Option<Box<dyn FnOnce() + Send>>,
}

struct StepInner {
    now: Duration,
    queue: Vec<StepTask>,
}

/// Cooperative scheduler advanced explicitly by the host's frame loop.
///
/// Due tasks fire during [`advance`](Self::advance) on the calling thread, in
/// schedule order, preserving a single-threaded mutation model. Tasks
/// scheduled from inside a firing task join the queue and are considered from
/// the next `advance` on.
pub struct StepScheduler {
    inner: Mutex<StepInner>,
}

impl StepScheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StepInner {
                now: Duration::ZERO,
                queue: Vec::new(),
            }),
        }
    }

    /// Advance the clock by `dt`, firing every due, uncancelled task.
    pub fn advance(&self, dt: Duration) {
        // Collect first, run after releasing the lock: tasks may schedule
        // follow-up work through this same scheduler.
        let due = {
            let mut inner = self.inner.lock().unwrap();
            inner.now += dt;
            let now = inner.now;
            let mut fired = Vec::new();
            inner.queue.retain_mut(|entry| {
                if entry.handle.is_cancelled() {
                    return false;
                }
                if entry.due <= now {
                    if let Some(task) = entry.task.take() {
                        fired.push(task);
                    }
                    return false;
                }
                true
            });
            fired
        };

        for task in due {
            task();
        }
    }

    /// Number of tasks still waiting to fire.
    pub fn pending(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .queue
            .iter()
            .filter(|entry| !entry.handle.is_cancelled())
            .count()
    }
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for StepScheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce() + Send>) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut inner = self.inner.lock().unwrap();
        let due = inner.now + delay;
        inner.queue.push(StepTask {
            due,
            handle: handle.clone(),
            task: Some(task),
        });
        handle
    }
}
