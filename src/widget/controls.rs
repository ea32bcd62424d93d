use crate::color::{Color, is_bright};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumIter, IntoEnumIterator};

/// Opaque reference to an icon or image the host knows how to draw.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct IconRef(String);

floatwm::impl_string_newtype!(IconRef);

impl From<&str> for IconRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Album art shown on the collapsed button and the strip's last slot.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumCover {
    pub icon: IconRef,
    /// Dominant colour of the artwork, if the host extracted one.
    pub dominant: Option<Color>,
}

impl AlbumCover {
    pub fn new(icon: impl Into<IconRef>) -> Self {
        Self {
            icon: icon.into(),
            dominant: None,
        }
    }

    pub fn with_dominant(mut self, color: Color) -> Self {
        self.dominant = Some(color);
        self
    }

    /// Bright covers get a translucent placeholder fill so the icons stay readable.
    pub fn needs_placeholder(&self) -> bool {
        self.dominant.is_some_and(is_bright)
    }
}

/// The five slots of the expanded strip, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, StrumDisplay)]
pub enum ControlButton {
    Playlist,
    Previous,
    PlayPause,
    Next,
    Album,
}

impl ControlButton {
    pub const COUNT: usize = 5;

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    /// Buttons that react to touches with a press animation and bubbles.
    pub fn is_transport(self) -> bool {
        matches!(self, Self::Previous | Self::PlayPause | Self::Next)
    }
}

/// Host hooks for the strip's buttons.
///
/// `on_playlist_clicked` and `on_play_pause_clicked` return true when the host consumed the
/// click, which suppresses the widget's own reaction (collapsing, toggling playback).
pub trait ControlsListener {
    fn on_playlist_clicked(&mut self) -> bool {
        false
    }

    fn on_playlist_long_clicked(&mut self) {}

    fn on_previous_clicked(&mut self) {}

    fn on_previous_long_clicked(&mut self) {}

    fn on_play_pause_clicked(&mut self) -> bool {
        false
    }

    fn on_play_pause_long_clicked(&mut self) {}

    fn on_next_clicked(&mut self) {}

    fn on_next_long_clicked(&mut self) {}

    fn on_album_clicked(&mut self) {}

    fn on_album_long_clicked(&mut self) {}
}

pub trait WidgetStateListener {
    fn on_widget_state_changed(&mut self, _state: super::WidgetState) {}

    /// Centre of the collapsed button once it came to rest.
    fn on_widget_position_changed(&mut self, _cx: i32, _cy: i32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::opaque;

    #[test]
    fn test_button_indexes() {
        assert_eq!(ControlButton::PlayPause.index(), 2);
        assert_eq!(ControlButton::from_index(4), Some(ControlButton::Album));
        assert_eq!(ControlButton::from_index(5), None);
        let transport: Vec<_> = ControlButton::iter().filter(|b| b.is_transport()).collect();
        assert_eq!(
            transport,
            vec![
                ControlButton::Previous,
                ControlButton::PlayPause,
                ControlButton::Next
            ]
        );
    }

    #[test]
    fn test_album_placeholder() {
        assert!(!AlbumCover::new("a.png").needs_placeholder());
        assert!(
            AlbumCover::new("a.png")
                .with_dominant(opaque(240, 240, 230))
                .needs_placeholder()
        );
        assert!(
            !AlbumCover::new("a.png")
                .with_dominant(opaque(10, 10, 30))
                .needs_placeholder()
        );
    }
}
