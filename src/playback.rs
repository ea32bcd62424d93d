//! Playback state bus.
//!
//! Holds the transport state, position and duration the widget renders, independent of the
//! engine actually producing audio. Every change is broadcast as a [`PlaybackEvent`] tagged
//! with the [`Origin`] that caused it, so a subscriber can skip echoes of its own changes.

use parking_lot::Mutex;
use std::sync::Arc;
use strum::{Display as StrumDisplay, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Who asked for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum Origin {
    /// The widget itself, e.g. its play/pause button.
    Widget,
    /// The host through the widget's controller.
    Controller,
    /// Anything else publishing into the bus (engine poller, tests).
    External,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    StateChanged {
        old: PlaybackStatus,
        new: PlaybackStatus,
        origin: Origin,
    },
    ProgressChanged {
        position: u32,
        duration: u32,
        percentage: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&PlaybackEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    status: PlaybackStatus,
    position: u32,
    duration: u32,
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl Inner {
    fn progress(&self) -> PlaybackEvent {
        let percentage = if self.duration == 0 {
            0.0
        } else {
            (self.position as f64 / self.duration as f64).clamp(0.0, 1.0)
        };
        PlaybackEvent::ProgressChanged {
            position: self.position,
            duration: self.duration,
            percentage,
        }
    }
}

/// Shared handle to the playback state. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct PlaybackState {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("PlaybackState")
            .field("status", &inner.status)
            .field("position", &inner.position)
            .field("duration", &inner.duration)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&PlaybackEvent) + Send + Sync + 'static) -> ListenerId {
        let mut inner = self.inner.lock();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(lid, _)| *lid != id);
        inner.listeners.len() != before
    }

    pub fn status(&self) -> PlaybackStatus {
        self.inner.lock().status
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    pub fn position(&self) -> u32 {
        self.inner.lock().position
    }

    pub fn duration(&self) -> u32 {
        self.inner.lock().duration
    }

    pub fn start(&self, origin: Origin) {
        self.transition(PlaybackStatus::Playing, origin);
    }

    pub fn pause(&self, origin: Origin) {
        self.transition(PlaybackStatus::Paused, origin);
    }

    /// Stops playback and rewinds the position.
    pub fn stop(&self, origin: Origin) {
        if self.transition(PlaybackStatus::Stopped, origin) {
            self.set_position(0);
        }
    }

    pub fn set_position(&self, position: u32) {
        let event = {
            let mut inner = self.inner.lock();
            inner.position = position;
            inner.progress()
        };
        self.dispatch(&event);
    }

    pub fn set_duration(&self, duration: u32) {
        let event = {
            let mut inner = self.inner.lock();
            inner.duration = duration;
            inner.progress()
        };
        self.dispatch(&event);
    }

    fn transition(&self, new: PlaybackStatus, origin: Origin) -> bool {
        let old = {
            let mut inner = self.inner.lock();
            let old = inner.status;
            if old == new {
                return false;
            }
            inner.status = new;
            old
        };
        log::debug!("playback {} -> {} ({})", old, new, origin);
        self.dispatch(&PlaybackEvent::StateChanged { old, new, origin });
        true
    }

    // Listeners run without the lock held so they may publish again.
    fn dispatch(&self, event: &PlaybackEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_state_change_carries_origin() {
        let state = PlaybackState::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        state.subscribe(move |e| sink.lock().push(*e));

        state.start(Origin::Widget);
        state.start(Origin::Controller);
        state.pause(Origin::Controller);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert_eq!(
            seen[0],
            PlaybackEvent::StateChanged {
                old: PlaybackStatus::Stopped,
                new: PlaybackStatus::Playing,
                origin: Origin::Widget,
            }
        );
        assert_eq!(
            seen[1],
            PlaybackEvent::StateChanged {
                old: PlaybackStatus::Playing,
                new: PlaybackStatus::Paused,
                origin: Origin::Controller,
            }
        );
    }

    #[test]
    fn test_progress_percentage() {
        let state = PlaybackState::new();
        let last = Arc::new(Mutex::new(None));
        let sink = last.clone();
        state.subscribe(move |e| *sink.lock() = Some(*e));

        state.set_position(500);
        assert_eq!(
            *last.lock(),
            Some(PlaybackEvent::ProgressChanged {
                position: 500,
                duration: 0,
                percentage: 0.0,
            })
        );
        state.set_duration(2000);
        assert_eq!(
            *last.lock(),
            Some(PlaybackEvent::ProgressChanged {
                position: 500,
                duration: 2000,
                percentage: 0.25,
            })
        );
    }

    #[test]
    fn test_listener_may_publish_reentrantly() {
        let state = PlaybackState::new();
        let echo = state.clone();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        state.subscribe(move |e| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let PlaybackEvent::StateChanged { new, origin, .. } = e
                && *origin != Origin::External
                && *new == PlaybackStatus::Playing
            {
                echo.pause(Origin::External);
            }
        });

        state.start(Origin::Controller);
        assert_eq!(state.status(), PlaybackStatus::Paused);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_and_stop_rewinds() {
        let state = PlaybackState::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = state.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        state.start(Origin::External);
        state.set_position(42);
        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.stop(Origin::External);
        assert_eq!(state.position(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!("paused".parse::<PlaybackStatus>().unwrap(), PlaybackStatus::Paused);
    }
}
