//! Collapsed play/pause button with its click bubbles and progress ring.

use super::controls::{AlbumCover, IconRef};
use crate::anim::{Tween, frames};
use crate::color::{Color, ColorChanger};
use crate::config::{Configuration, Icons};
use crate::math::{between, custom_function, is_between, normalize, rotate_x, rotate_y};
use crate::playback::{Origin, PlaybackEvent, PlaybackStatus};
use crate::touch::{BoundsPolicy, EdgeOffset, Footprint};
use floatwm::{Point, Size};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;

pub const BUBBLES_ANGLE_STEP: f64 = 18.0;
pub const BUTTON_BUBBLES: usize = (360.0 / BUBBLES_ANGLE_STEP) as usize;
/// Alpha of the tint drawn over bright album covers, out of 255.
pub const ALBUM_PLACEHOLDER_ALPHA: u8 = 100;

const CLICK_UNITS: u32 = 8;
const PROGRESS_STEP_UNITS: u32 = 3;
const PROGRESS_CHANGES_UNITS: u32 = 6;
const BUBBLES_ALPHA: [(f64, f64); 5] = [
    (0.0, 0.0),
    (0.0, 0.3),
    (255.0, 0.5),
    (225.0, 0.7),
    (0.0, 1.0),
];

pub fn click_duration() -> Duration {
    frames(CLICK_UNITS)
}

/// Time the ring takes to appear or disappear when progress display is toggled.
pub fn progress_changes_duration() -> Duration {
    frames(PROGRESS_CHANGES_UNITS)
}

/// Window of the click animation in which the colour and icons switch over.
fn color_window() -> (f64, f64) {
    let total = click_duration().as_secs_f64();
    let length = total / 4.0;
    let start = (total - length) / 2.0;
    (start, start + length)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ButtonBubble {
    radius: f64,
    speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonFrame {
    pub scale: f64,
    pub color: Color,
    pub play_alpha: u8,
    pub pause_alpha: u8,
    /// Sweep of the progress arc in degrees, clockwise from twelve o'clock.
    pub progress_degrees: f64,
    pub bubbles_alpha: u8,
    pub bubbles_color: Color,
    /// Opacity of the whole button surface.
    pub alpha: f64,
}

#[derive(Debug)]
pub struct PlayPauseButton {
    radius: f64,
    playing_color: Color,
    paused_color: Color,
    bubbles_min_size: f64,
    bubbles_max_size: f64,
    icons: Icons,
    frame: ButtonFrame,
    color_changer: ColorChanger,
    click: Option<Duration>,
    to_playing: bool,
    start_angle: f64,
    bubbles: Vec<ButtonBubble>,
    bubbles_time: f64,
    touch: Tween,
    progress: f64,
    ring: Tween,
    progress_enabled: bool,
    album_cover: Option<AlbumCover>,
    rng: StdRng,
}

impl PlayPauseButton {
    pub fn new(config: &Configuration, status: PlaybackStatus, rng: StdRng) -> Self {
        let mut button = Self {
            radius: config.radius(),
            playing_color: config.playing_color,
            paused_color: config.paused_color,
            bubbles_min_size: config.bubbles_min_size,
            bubbles_max_size: config.bubbles_max_size,
            icons: config.icons.clone(),
            frame: ButtonFrame {
                scale: 1.0,
                color: config.paused_color,
                play_alpha: 255,
                pause_alpha: 0,
                progress_degrees: 0.0,
                bubbles_alpha: 0,
                bubbles_color: config.paused_color,
                alpha: 1.0,
            },
            color_changer: ColorChanger::default(),
            click: None,
            to_playing: false,
            start_angle: 0.0,
            bubbles: Vec::with_capacity(BUTTON_BUBBLES),
            bubbles_time: 0.0,
            touch: Tween::new(1.0),
            progress: 0.0,
            ring: Tween::new(0.0),
            progress_enabled: false,
            album_cover: None,
            rng,
        };
        button.snap_to(status == PlaybackStatus::Playing);
        button
    }

    /// The button surface is a square twice the button's diameter, leaving room for bubbles.
    pub fn surface_size(&self) -> Size {
        Size::new(self.radius * 4.0, self.radius * 4.0)
    }

    pub fn bounds_policy(&self, offset: EdgeOffset) -> BoundsPolicy {
        BoundsPolicy::new(
            Footprint::Button {
                radius: self.radius,
            },
            offset,
        )
    }

    pub fn frame(&self) -> &ButtonFrame {
        &self.frame
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.frame.alpha = between(alpha, 0.0, 1.0);
    }

    pub fn is_animation_in_progress(&self) -> bool {
        self.click.is_some()
    }

    fn snap_to(&mut self, playing: bool) {
        if playing {
            self.frame.color = self.playing_color;
            self.frame.play_alpha = 0;
            self.frame.pause_alpha = 255;
        } else {
            self.frame.color = self.paused_color;
            self.frame.play_alpha = 255;
            self.frame.pause_alpha = 0;
        }
    }

    /// Starts the click animation towards the opposite of `status`. Ignored while one runs.
    pub fn on_click(&mut self, status: PlaybackStatus) -> bool {
        if self.is_animation_in_progress() {
            return false;
        }
        self.to_playing = status != PlaybackStatus::Playing;
        let (from, to) = if self.to_playing {
            (self.paused_color, self.playing_color)
        } else {
            (self.playing_color, self.paused_color)
        };
        self.color_changer = ColorChanger::new(from, to);
        self.frame.bubbles_color = to;

        self.start_angle = 360.0 * self.rng.random::<f64>();
        self.bubbles.clear();
        for _ in 0..BUTTON_BUBBLES {
            let speed = 0.5 + 0.5 * self.rng.random::<f64>();
            let size = self.bubbles_min_size
                + (self.bubbles_max_size - self.bubbles_min_size) * self.rng.random::<f64>();
            self.bubbles.push(ButtonBubble {
                radius: size / 2.0,
                speed,
            });
        }
        self.bubbles_time = 0.0;
        self.click = Some(Duration::ZERO);
        true
    }

    pub fn on_touch_down(&mut self) {
        self.touch.start(1.0, 0.9, super::expand::TOUCH_ANIMATION_DURATION);
    }

    pub fn on_touch_up(&mut self) {
        self.touch.start(0.9, 1.0, super::expand::TOUCH_ANIMATION_DURATION);
    }

    /// Reacts to playback changes. Changes the widget made itself are already being animated.
    pub fn on_playback_event(&mut self, event: &PlaybackEvent) {
        match *event {
            PlaybackEvent::StateChanged { new, origin, .. } => {
                if origin == Origin::Widget {
                    return;
                }
                self.snap_to(new == PlaybackStatus::Playing);
            }
            PlaybackEvent::ProgressChanged { percentage, .. } => self.on_progress(percentage),
        }
    }

    fn on_progress(&mut self, percentage: f64) {
        if !self.progress_enabled {
            self.progress = percentage;
            return;
        }
        if percentage > self.progress {
            let duration = frames(PROGRESS_STEP_UNITS);
            if self
                .ring
                .try_start(self.progress * 360.0, percentage * 360.0, duration)
            {
                self.progress = percentage;
            }
        } else {
            self.progress = percentage;
            self.ring.set(percentage * 360.0);
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_progress_enabled(&self) -> bool {
        self.progress_enabled
    }

    /// Shows or hides the progress ring, sweeping it in from zero or out to zero.
    pub fn enable_progress_changes(&mut self, enable: bool) {
        if self.progress_enabled == enable {
            return;
        }
        self.progress_enabled = enable;
        let full = self.progress * 360.0;
        let (from, to) = if enable { (0.0, full) } else { (full, 0.0) };
        self.ring.start(from, to, progress_changes_duration());
    }

    pub fn set_album_cover(&mut self, cover: Option<AlbumCover>) {
        self.album_cover = cover;
    }

    pub fn album_cover(&self) -> Option<&AlbumCover> {
        self.album_cover.as_ref()
    }

    /// Alpha of the tint over the album cover, when the cover needs one.
    pub fn placeholder_alpha(&self) -> Option<u8> {
        self.album_cover
            .as_ref()
            .filter(|c| c.needs_placeholder())
            .map(|_| ALBUM_PLACEHOLDER_ALPHA)
    }

    /// Icons to draw, each with its alpha. Both show during the click cross-fade.
    pub fn icons(&self) -> Vec<(&IconRef, u8)> {
        let mut icons = Vec::with_capacity(2);
        if self.frame.play_alpha > 0 {
            icons.push((&self.icons.play, self.frame.play_alpha));
        }
        if self.frame.pause_alpha > 0 {
            icons.push((&self.icons.pause, self.frame.pause_alpha));
        }
        icons
    }

    /// Advances the animations. Outside the click animation the button follows `status`, in
    /// case it changed without being animated.
    pub fn advance(&mut self, elapsed: Duration, status: PlaybackStatus) {
        self.touch.advance(elapsed);
        self.frame.scale = self.touch.value();
        self.ring.advance(elapsed);
        self.frame.progress_degrees = self.ring.value();

        let Some(played) = self.click else {
            self.snap_to(status == PlaybackStatus::Playing);
            return;
        };
        let played = played + elapsed;
        let total = click_duration();
        if played >= total {
            self.click = None;
            self.bubbles_time = 0.0;
            self.frame.bubbles_alpha = 0;
            self.snap_to(self.to_playing);
            return;
        }
        self.click = Some(played);

        let fraction = played.as_secs_f64() / total.as_secs_f64();
        self.frame.bubbles_alpha = custom_function(fraction, &BUBBLES_ALPHA) as u8;
        self.bubbles_time = fraction;

        let position = played.as_secs_f64();
        let (start, end) = color_window();
        if is_between(position, start, end) {
            let t = normalize(position, start, end);
            self.frame.color = self.color_changer.next_color(t);
            let rising = between(255.0 * t, 0.0, 255.0) as u8;
            let falling = between(255.0 * (1.0 - t), 0.0, 255.0) as u8;
            if self.to_playing {
                self.frame.pause_alpha = rising;
                self.frame.play_alpha = falling;
            } else {
                self.frame.play_alpha = rising;
                self.frame.pause_alpha = falling;
            }
        }
    }

    /// Bubble centres in surface coordinates with their radii; empty when idle.
    pub fn bubbles(&self) -> Vec<(Point, f64)> {
        if !self.is_animation_in_progress() {
            return Vec::new();
        }
        let c = self.radius * 2.0;
        self.bubbles
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let angle = self.start_angle + BUBBLES_ANGLE_STEP * i as f64;
                let y = c * (1.0 - self.bubbles_time * b.speed);
                let point = Point::new(rotate_x(c, y, c, c, angle), rotate_y(c, y, c, c, angle));
                (point, b.radius)
            })
            .collect()
    }
}
