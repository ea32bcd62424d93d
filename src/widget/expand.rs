//! Expanded strip and its expand/collapse keyframe engine.
//!
//! A phase whose end was skipped over since the previous tick is evaluated once at its end.

use super::WidgetState;
use super::controls::{AlbumCover, ControlButton, ControlsListener, IconRef};
use crate::anim::{Tween, frames};
use crate::color::{Color, ColorChanger};
use crate::config::{Configuration, Icons};
use crate::math::{accelerate_decelerate, between, custom_function, enlarge, is_between, normalize, reduce};
use crate::playback::PlaybackState;
use crate::touch::{BoundsPolicy, EdgeOffset, Footprint};
use floatwm::{Point, Rect, RectF, Size};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString, IntoEnumIterator};

pub const STRIP_BUBBLES: usize = 30;
pub const TOUCH_ANIMATION_DURATION: Duration = Duration::from_millis(100);

const BUBBLES_ALPHA: [(f64, f64); 4] = [(0.0, 0.0), (255.0, 0.33), (255.0, 0.66), (0.0, 1.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// The edge button the play/pause button trades places with.
    pub fn edge_button(self) -> ControlButton {
        match self {
            Self::Left => ControlButton::Album,
            Self::Right => ControlButton::Playlist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum StripState {
    Collapsed,
    Expanding,
    Expanded,
    Collapsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
enum Phase {
    Color,
    Grow,
    PlayAtEdge,
    HideElements,
    RevealElements,
    SwapOut,
    Bubbles,
    FadeElements,
    SwapBack,
    Shrink,
}

#[derive(Debug, Clone, Copy)]
struct Keyframe {
    phase: Phase,
    start: u32,
    end: u32,
}

const fn kf(phase: Phase, start: u32, end: u32) -> Keyframe {
    Keyframe { phase, start, end }
}

/// Phases laid out in frame-units over a transition of `units` frame-units.
#[derive(Debug)]
pub struct Timeline {
    pub units: u32,
    keyframes: &'static [Keyframe],
}

impl Timeline {
    pub fn duration(&self) -> Duration {
        frames(self.units)
    }
}

pub static EXPAND_TIMELINE: Timeline = Timeline {
    units: 34,
    keyframes: &[
        kf(Phase::Color, 0, 9),
        kf(Phase::Grow, 0, 12),
        kf(Phase::PlayAtEdge, 0, 10),
        kf(Phase::HideElements, 0, 20),
        kf(Phase::RevealElements, 20, 27),
        kf(Phase::SwapOut, 10, 18),
        kf(Phase::Bubbles, 18, 32),
    ],
};

pub static COLLAPSE_TIMELINE: Timeline = Timeline {
    units: 12,
    keyframes: &[
        kf(Phase::FadeElements, 0, 3),
        kf(Phase::HideElements, 3, 12),
        kf(Phase::SwapBack, 3, 12),
        kf(Phase::Shrink, 2, 12),
    ],
};

pub fn bubbles_replay_duration() -> Duration {
    frames(32 - 18)
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripFrame {
    pub background: RectF,
    pub color: Color,
    pub buttons: [Rect; ControlButton::COUNT],
    /// 0..=255; the play/pause slot is always opaque.
    pub alphas: [u8; ControlButton::COUNT],
    pub bubbles_alpha: u8,
    pub bubbles_time: f64,
    pub window_alpha: f64,
    /// Linear progress of the running transition.
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StripLayout {
    width: f64,
    radius: f64,
    step: f64,
    button_padding: f64,
    prev_next_extra_padding: f64,
}

impl StripLayout {
    fn padding(&self, button: ControlButton) -> f64 {
        match button {
            ControlButton::Previous | ControlButton::Next => {
                self.button_padding + self.prev_next_extra_padding
            }
            _ => self.button_padding,
        }
    }

    fn slot_with(&self, index: usize, padding: f64) -> Rect {
        let i = index as f64;
        Rect::from_f64(
            i * self.step + padding,
            self.radius + padding,
            (i + 1.0) * self.step - padding,
            self.radius * 3.0 - padding,
        )
    }

    fn slot(&self, button: ControlButton) -> Rect {
        self.slot_with(button.index(), self.padding(button))
    }

    fn element(&self, button: ControlButton, t: f64) -> Rect {
        let slot = self.slot(button);
        let size = t * (self.step / 2.0 - self.padding(button));
        let cx = slot.center_x() as f64;
        let cy = slot.center_y() as f64;
        Rect::from_f64(cx - size, cy - size, cx + size, cy + size)
    }

    /// Play/pause button parked over the edge button's slot.
    fn play_at(&self, left: f64) -> Rect {
        let play = self.slot(ControlButton::PlayPause);
        let left = left as i32;
        Rect::new(left, play.top, left + play.width(), play.bottom)
    }

    fn background(&self, direction: Direction, t: f64) -> RectF {
        let height = self.radius * 2.0;
        let top = self.radius;
        let bottom = top + height;
        match direction {
            Direction::Left => {
                let right = self.width;
                RectF::new(right - height - (self.width - height) * t, top, right, bottom)
            }
            Direction::Right => RectF::new(0.0, top, height + (self.width - height) * t, bottom),
        }
    }

    fn collapsed(&self, direction: Direction, color: Color) -> StripFrame {
        let mut buttons = [Rect::default(); ControlButton::COUNT];
        for button in ControlButton::iter() {
            buttons[button.index()] = self.element(button, 0.0);
        }
        let edge = self.slot(direction.edge_button());
        buttons[ControlButton::PlayPause.index()] = self.play_at(edge.left as f64);
        let mut alphas = [0; ControlButton::COUNT];
        alphas[ControlButton::PlayPause.index()] = 255;
        StripFrame {
            background: self.background(direction, 0.0),
            color,
            buttons,
            alphas,
            bubbles_alpha: 0,
            bubbles_time: 0.0,
            window_alpha: 0.0,
            percent: 0.0,
        }
    }

    fn expanded(&self, direction: Direction, color: Color) -> StripFrame {
        let mut frame = self.collapsed(direction, color);
        for button in ControlButton::iter() {
            frame.buttons[button.index()] = self.element(button, 1.0);
            frame.alphas[button.index()] = 255;
        }
        frame.buttons[ControlButton::PlayPause.index()] = self.slot(ControlButton::PlayPause);
        frame.background = RectF::new(0.0, self.radius, self.width, self.radius * 3.0);
        frame.window_alpha = 1.0;
        frame.percent = 1.0;
        frame
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct StripBubble {
    cx: f64,
    cy: f64,
    radius: f64,
    speed: f64,
}

#[derive(Debug)]
pub struct ExpandCollapseWidget {
    layout: StripLayout,
    height: f64,
    padding: f64,
    playing_color: Color,
    paused_color: Color,
    expanded_color: Color,
    bubbles_min_size: f64,
    bubbles_max_size: f64,
    state: StripState,
    direction: Direction,
    position: Duration,
    color_changer: ColorChanger,
    frame: StripFrame,
    bubbles: Vec<StripBubble>,
    replay: Option<Duration>,
    press: Tween,
    pressed: Option<ControlButton>,
    icons: Icons,
    album_cover: Option<AlbumCover>,
    playback: PlaybackState,
    rng: StdRng,
}

impl ExpandCollapseWidget {
    pub fn new(config: &Configuration, playback: PlaybackState, rng: StdRng) -> Self {
        let layout = StripLayout {
            width: config.widget_width,
            radius: config.radius(),
            step: config.widget_width / ControlButton::COUNT as f64,
            button_padding: config.button_padding,
            prev_next_extra_padding: config.prev_next_extra_padding,
        };
        let direction = Direction::default();
        let mut widget = Self {
            layout,
            height: config.widget_height,
            padding: config.widget_padding,
            playing_color: config.playing_color,
            paused_color: config.paused_color,
            expanded_color: config.expanded_color,
            bubbles_min_size: config.bubbles_min_size,
            bubbles_max_size: config.bubbles_max_size,
            state: StripState::Collapsed,
            direction,
            position: Duration::ZERO,
            color_changer: ColorChanger::new(config.paused_color, config.expanded_color),
            frame: layout.collapsed(direction, config.paused_color),
            bubbles: Vec::with_capacity(STRIP_BUBBLES),
            replay: None,
            press: Tween::new(1.0),
            pressed: None,
            icons: config.icons.clone(),
            album_cover: None,
            playback,
            rng,
        };
        widget.frame = layout.collapsed(direction, widget.resting_color());
        widget
    }

    pub fn state(&self) -> StripState {
        self.state
    }

    pub fn is_animation_in_progress(&self) -> bool {
        matches!(self.state, StripState::Expanding | StripState::Collapsing)
    }

    pub fn is_expanded(&self) -> bool {
        self.state == StripState::Expanded
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes the side the next transition anchors to. Refused mid-transition.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.is_animation_in_progress() {
            return false;
        }
        self.direction = direction;
        true
    }

    pub fn frame(&self) -> &StripFrame {
        &self.frame
    }

    /// Surface size including the padding the bubbles spill into.
    pub fn surface_size(&self) -> Size {
        Size::new(
            self.layout.width + self.padding * 2.0,
            self.height * 2.0 + self.padding * 2.0,
        )
    }

    pub fn bounds_policy(&self, offset: EdgeOffset) -> BoundsPolicy {
        BoundsPolicy::new(
            Footprint::Strip {
                radius: self.layout.radius,
                width: self.layout.width,
            },
            offset,
        )
    }

    fn resting_color(&self) -> Color {
        if self.playback.is_playing() {
            self.playing_color
        } else {
            self.paused_color
        }
    }

    pub fn expand(&mut self, direction: Direction) -> bool {
        if self.state != StripState::Collapsed {
            return false;
        }
        self.direction = direction;
        let from = self.resting_color();
        self.color_changer = ColorChanger::new(from, self.expanded_color);
        self.frame = self.layout.collapsed(direction, from);
        self.randomize_bubbles();
        self.state = StripState::Expanding;
        self.position = Duration::ZERO;
        log::debug!("strip expanding to the {}", direction);
        self.evaluate(&EXPAND_TIMELINE, Duration::ZERO, Duration::ZERO);
        true
    }

    pub fn collapse(&mut self) -> bool {
        if self.state != StripState::Expanded {
            return false;
        }
        self.color_changer = ColorChanger::new(self.expanded_color, self.resting_color());
        self.replay = None;
        self.frame.bubbles_time = 0.0;
        self.state = StripState::Collapsing;
        self.position = Duration::ZERO;
        log::debug!("strip collapsing to the {}", self.direction);
        self.evaluate(&COLLAPSE_TIMELINE, Duration::ZERO, Duration::ZERO);
        true
    }

    pub fn reset(&mut self) {
        self.state = StripState::Collapsed;
        self.position = Duration::ZERO;
        self.replay = None;
        self.pressed = None;
        self.press.set(1.0);
        self.frame = self.layout.collapsed(self.direction, self.resting_color());
    }

    /// Advances transitions and decorations; reports the state reached by a finished transition.
    pub fn advance(&mut self, elapsed: Duration) -> Option<WidgetState> {
        self.press.advance(elapsed);
        self.advance_replay(elapsed);

        let timeline = match self.state {
            StripState::Expanding => &EXPAND_TIMELINE,
            StripState::Collapsing => &COLLAPSE_TIMELINE,
            StripState::Collapsed | StripState::Expanded => return None,
        };
        let prev = self.position;
        let total = timeline.duration();
        self.position = (prev + elapsed).min(total);
        self.evaluate(timeline, prev, self.position);
        if self.position < total {
            return None;
        }

        if self.state == StripState::Expanding {
            self.frame = self.layout.expanded(self.direction, self.expanded_color);
            self.state = StripState::Expanded;
            Some(WidgetState::Expanded)
        } else {
            self.frame = self.layout.collapsed(self.direction, self.color_changer.next_color(1.0));
            self.state = StripState::Collapsed;
            Some(WidgetState::Collapsed)
        }
    }

    fn evaluate(&mut self, timeline: &Timeline, prev: Duration, now: Duration) {
        let at = now.as_secs_f64();
        for keyframe in timeline.keyframes {
            let start = frames(keyframe.start);
            let end = frames(keyframe.end);
            let t = if is_between(at, start.as_secs_f64(), end.as_secs_f64()) {
                normalize(at, start.as_secs_f64(), end.as_secs_f64())
            } else if prev < end && now > end {
                1.0
            } else {
                continue;
            };
            self.apply(keyframe.phase, t);
        }

        let percent = now.as_secs_f64() / timeline.duration().as_secs_f64();
        self.frame.percent = percent;
        self.frame.window_alpha = match self.state {
            StripState::Expanding => (percent * 12.0).min(1.0),
            StripState::Collapsing if percent > 0.9 => (1.0 - percent) * 10.0,
            StripState::Collapsing => 1.0,
            StripState::Collapsed => 0.0,
            StripState::Expanded => 1.0,
        };
    }

    fn apply(&mut self, phase: Phase, t: f64) {
        let play = ControlButton::PlayPause.index();
        let edge = self.layout.slot(self.direction.edge_button());
        let slot = self.layout.slot(ControlButton::PlayPause);
        match phase {
            Phase::Color => self.frame.color = self.color_changer.next_color(t),
            Phase::Grow => {
                self.frame.background = self.layout.background(self.direction, accelerate_decelerate(t));
            }
            Phase::Shrink => {
                let time = accelerate_decelerate(t);
                self.frame.color = self.color_changer.next_color(time);
                self.frame.background = self.layout.background(self.direction, 1.0 - time);
            }
            Phase::PlayAtEdge => self.frame.buttons[play] = self.layout.play_at(edge.left as f64),
            Phase::HideElements => {
                for button in ControlButton::iter().filter(|b| *b != ControlButton::PlayPause) {
                    self.frame.alphas[button.index()] = 0;
                }
            }
            Phase::RevealElements => self.elements(t),
            Phase::FadeElements => self.elements(1.0 - t),
            Phase::SwapOut => {
                let time = accelerate_decelerate(t);
                let left = match self.direction {
                    Direction::Left => reduce(edge.left as f64, slot.left as f64, time),
                    Direction::Right => enlarge(edge.left as f64, slot.left as f64, time),
                };
                self.frame.buttons[play] = self.layout.play_at(left);
            }
            Phase::SwapBack => {
                let time = accelerate_decelerate(t);
                let left = match self.direction {
                    Direction::Left => enlarge(slot.left as f64, edge.left as f64, time),
                    Direction::Right => reduce(slot.left as f64, edge.left as f64, time),
                };
                self.frame.buttons[play] = self.layout.play_at(left);
            }
            Phase::Bubbles => {
                self.frame.bubbles_alpha = custom_function(t, &BUBBLES_ALPHA) as u8;
                self.frame.bubbles_time = t;
            }
        }
    }

    fn elements(&mut self, t: f64) {
        let alpha = between(t * 255.0, 0.0, 255.0) as u8;
        for button in ControlButton::iter().filter(|b| *b != ControlButton::PlayPause) {
            self.frame.buttons[button.index()] = self.layout.element(button, t);
            self.frame.alphas[button.index()] = alpha;
        }
    }

    fn randomize_bubbles(&mut self) {
        let half = STRIP_BUBBLES / 2;
        let step = self.layout.width / half as f64;
        self.bubbles.clear();
        for i in 0..STRIP_BUBBLES {
            let index = (i % half) as f64;
            let speed = 0.3 + 0.7 * self.rng.random::<f64>();
            let size = self.bubbles_min_size
                + (self.bubbles_max_size - self.bubbles_min_size) * self.rng.random::<f64>();
            let jitter = step * self.rng.random::<f64>();
            let sign = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            self.bubbles.push(StripBubble {
                cx: self.padding + index * step + jitter * sign,
                cy: self.height + self.padding,
                radius: size / 2.0,
                speed,
            });
        }
    }

    fn advance_replay(&mut self, elapsed: Duration) {
        let Some(played) = self.replay else {
            return;
        };
        let played = played + elapsed;
        let duration = bubbles_replay_duration();
        if played >= duration {
            self.replay = None;
            self.frame.bubbles_time = 0.0;
            self.frame.bubbles_alpha = 0;
            return;
        }
        let t = played.as_secs_f64() / duration.as_secs_f64();
        self.replay = Some(played);
        self.frame.bubbles_time = t;
        self.frame.bubbles_alpha = custom_function(t, &BUBBLES_ALPHA) as u8;
    }

    pub fn bubbles(&self) -> Vec<(Point, f64)> {
        let half = STRIP_BUBBLES / 2;
        let time = self.frame.bubbles_time;
        self.bubbles
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let travel = b.speed * time;
                let cy = if i < half {
                    b.cy * (1.0 - travel)
                } else {
                    b.cy * (1.0 + travel)
                };
                (Point::new(b.cx, cy), b.radius)
            })
            .collect()
    }

    /// Slot under a surface-local point. Slots span the whole step, without padding.
    pub fn touched_area(&self, x: f64, y: f64) -> Option<ControlButton> {
        (0..ControlButton::COUNT)
            .find(|&i| self.layout.slot_with(i, 0.0).contains(x as i32, y as i32))
            .and_then(ControlButton::from_index)
    }

    pub fn on_click(&mut self, x: f64, y: f64) -> Option<ControlButton> {
        if !self.is_expanded() {
            return None;
        }
        let Some(button) = self.touched_area(x, y) else {
            log::warn!("click outside any control at ({}, {})", x, y);
            return None;
        };
        if button.is_transport() && self.replay.is_none() {
            self.randomize_bubbles();
            self.replay = Some(Duration::ZERO);
        }
        Some(button)
    }

    pub fn on_long_click(&mut self, x: f64, y: f64) -> Option<ControlButton> {
        if !self.is_expanded() {
            return None;
        }
        let button = self.touched_area(x, y);
        if button.is_none() {
            log::warn!("long click outside any control at ({}, {})", x, y);
        }
        button
    }

    pub fn on_touched(&mut self, x: f64, y: f64) {
        if let Some(button) = self.touched_area(x, y)
            && button.is_transport()
        {
            self.pressed = Some(button);
            self.press.start(1.0, 0.9, TOUCH_ANIMATION_DURATION);
        }
    }

    pub fn on_released(&mut self, x: f64, y: f64) {
        if let Some(button) = self.touched_area(x, y)
            && button.is_transport()
        {
            self.pressed = Some(button);
            self.press.start(0.9, 1.0, TOUCH_ANIMATION_DURATION);
        }
    }

    pub fn pressed(&self) -> Option<(ControlButton, f64)> {
        self.pressed.map(|b| (b, self.press.value()))
    }

    pub fn set_album_cover(&mut self, cover: Option<AlbumCover>) {
        self.album_cover = cover;
    }

    pub fn album_cover(&self) -> Option<&AlbumCover> {
        self.album_cover.as_ref()
    }

    /// Icon drawn in a slot; the play/pause slot follows the playback status.
    pub fn icon(&self, button: ControlButton) -> &IconRef {
        match button {
            ControlButton::Playlist => &self.icons.playlist,
            ControlButton::Previous => &self.icons.prev,
            ControlButton::PlayPause if self.playback.is_playing() => &self.icons.pause,
            ControlButton::PlayPause => &self.icons.play,
            ControlButton::Next => &self.icons.next,
            ControlButton::Album => self
                .album_cover
                .as_ref()
                .map(|c| &c.icon)
                .unwrap_or(&self.icons.album),
        }
    }
}

pub(super) fn dispatch_click(
    listener: &mut dyn ControlsListener,
    button: ControlButton,
    long: bool,
) -> bool {
    match (button, long) {
        (ControlButton::Playlist, false) => return listener.on_playlist_clicked(),
        (ControlButton::PlayPause, false) => return listener.on_play_pause_clicked(),
        (ControlButton::Previous, false) => listener.on_previous_clicked(),
        (ControlButton::Next, false) => listener.on_next_clicked(),
        (ControlButton::Album, false) => listener.on_album_clicked(),
        (ControlButton::Playlist, true) => listener.on_playlist_long_clicked(),
        (ControlButton::Previous, true) => listener.on_previous_long_clicked(),
        (ControlButton::PlayPause, true) => listener.on_play_pause_long_clicked(),
        (ControlButton::Next, true) => listener.on_next_long_clicked(),
        (ControlButton::Album, true) => listener.on_album_long_clicked(),
    }
    false
}
