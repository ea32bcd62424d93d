//! Seam to whatever actually produces audio.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Preparing,
    Ready,
    Completed,
    /// Terminal: nothing retries a failed engine, the host decides what to do.
    Failed(String),
}

impl EngineStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub trait PlaybackEngine: Send + Sync + 'static {
    fn status(&self) -> EngineStatus;

    fn position_ms(&self) -> u32;

    fn duration_ms(&self) -> u32;

    fn is_playing(&self) -> bool;
}

#[derive(Debug)]
struct Track {
    status: EngineStatus,
    duration: u32,
    offset: u32,
    started: Option<Instant>,
}

impl Track {
    fn position(&self) -> u32 {
        let running = self
            .started
            .map(|at| u32::try_from(at.elapsed().as_millis()).unwrap_or(u32::MAX))
            .unwrap_or(0);
        self.offset.saturating_add(running).min(self.duration)
    }
}

/// Clock-driven engine for headless hosts. Clones share the same track.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    track: Arc<Mutex<Track>>,
}

impl SimulatedEngine {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            track: Arc::new(Mutex::new(Track {
                status: EngineStatus::Ready,
                duration: duration_ms,
                offset: 0,
                started: None,
            })),
        }
    }

    pub fn play(&self) {
        let mut track = self.track.lock();
        if track.status.is_failed() || track.started.is_some() {
            return;
        }
        if track.status == EngineStatus::Completed {
            track.offset = 0;
        }
        track.status = EngineStatus::Ready;
        track.started = Some(Instant::now());
    }

    pub fn pause(&self) {
        let mut track = self.track.lock();
        track.offset = track.position();
        track.started = None;
    }

    pub fn stop(&self) {
        let mut track = self.track.lock();
        track.offset = 0;
        track.started = None;
    }

    pub fn seek(&self, position_ms: u32) {
        let mut track = self.track.lock();
        track.offset = position_ms.min(track.duration);
        if track.started.is_some() {
            track.started = Some(Instant::now());
        }
    }

    pub fn fail(&self, reason: impl Into<String>) {
        let mut track = self.track.lock();
        track.offset = track.position();
        track.started = None;
        track.status = EngineStatus::Failed(reason.into());
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn status(&self) -> EngineStatus {
        let mut track = self.track.lock();
        if track.started.is_some() && track.position() >= track.duration {
            track.offset = track.duration;
            track.started = None;
            track.status = EngineStatus::Completed;
        }
        track.status.clone()
    }

    fn position_ms(&self) -> u32 {
        self.track.lock().position()
    }

    fn duration_ms(&self) -> u32 {
        self.track.lock().duration
    }

    fn is_playing(&self) -> bool {
        self.track.lock().started.is_some()
    }
}
