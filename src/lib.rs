//! Floating overlay music-player widget.
//!
//! A collapsed play/pause button that can be dragged around and docks to the screen edges,
//! expanding into a five-button control strip. Everything is driven by an `advance(elapsed)`
//! frame tick from the host, with window surfaces placed through [`floatwm::WindowManager`].

pub mod anim;
pub mod color;
pub mod config;
pub mod events;
pub mod math;
pub mod playback;
pub mod sys;
pub mod touch;
pub mod widget;

pub use config::{Configuration, WidgetConfig};
pub use playback::{PlaybackState, PlaybackStatus};
pub use widget::{Controller, FloatingPlayer, WidgetState};
