//! The floating player: collapsed button, expanded strip and remove target wired together.
//!
//! [`FloatingPlayer`] owns the three surfaces and their [`TouchManager`]s. Every gesture event
//! goes through one queue so that handlers may trigger further movement without re-entering
//! each other. Delayed work is a named [`PendingAction`] ticked by [`FloatingPlayer::advance`].

pub mod button;
pub mod controls;
pub mod expand;
pub mod remove;

use crate::config::Configuration;
use crate::playback::{ListenerId, Origin, PlaybackEvent, PlaybackState, PlaybackStatus};
use crate::touch::{BoundsPolicy, DockTicket, GestureEvent, TouchEvent, TouchManager};
use button::PlayPauseButton;
use controls::{AlbumCover, ControlButton, ControlsListener, WidgetStateListener};
use expand::{Direction, ExpandCollapseWidget, StripState};
use floatwm::{DisplayMetrics, Point, SurfaceName, WindowManager};
use rand::SeedableRng;
use rand::rngs::StdRng;
use remove::RemoveTarget;
use std::collections::VecDeque;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

pub const BUTTON_SURFACE: &str = "floatplay-button";
pub const STRIP_SURFACE: &str = "floatplay-strip";
pub const REMOVE_SURFACE: &str = "floatplay-remove";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WidgetState {
    Collapsed,
    Expanded,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
enum Surface {
    Button,
    Strip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum PendingAction {
    ShowExpanded,
    RevealRemoveTarget,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    action: PendingAction,
    remaining: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expansion {
    Waiting,
    /// The button was busy when docking was requested; asked again every frame.
    Retry,
    Docking {
        ticket: DockTicket,
        direction: Direction,
    },
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

pub struct FloatingPlayer<W: WindowManager> {
    wm: W,
    config: Configuration,
    metrics: DisplayMetrics,
    playback: PlaybackState,
    inbox: async_channel::Receiver<PlaybackEvent>,
    subscription: ListenerId,
    button: PlayPauseButton,
    strip: ExpandCollapseWidget,
    remove: RemoveTarget,
    button_touch: TouchManager,
    strip_touch: TouchManager,
    ppb_to_exp: BoundsPolicy,
    exp_to_ppb: BoundsPolicy,
    button_name: SurfaceName,
    strip_name: SurfaceName,
    remove_name: SurfaceName,
    shown: bool,
    released: bool,
    ready_to_remove: bool,
    expansion: Option<Expansion>,
    pending: Vec<Pending>,
    queue: VecDeque<(Surface, GestureEvent)>,
    pumping: bool,
    state_listener: Option<Box<dyn WidgetStateListener>>,
    controls_listener: Option<Box<dyn ControlsListener>>,
}

impl<W: WindowManager> std::fmt::Debug for FloatingPlayer<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloatingPlayer")
            .field("shown", &self.shown)
            .field("strip", &self.strip.state())
            .field("button", &self.button_touch.position())
            .field("expansion", &self.expansion)
            .finish_non_exhaustive()
    }
}

impl<W: WindowManager> FloatingPlayer<W> {
    pub fn new(wm: W, config: Configuration, metrics: DisplayMetrics, playback: PlaybackState) -> Self {
        let (tx, inbox) = async_channel::unbounded();
        let subscription = playback.subscribe(move |event| {
            let _ = tx.try_send(*event);
        });

        let mut rng = make_rng(config.random_seed);
        let button = PlayPauseButton::new(&config, playback.status(), StdRng::from_rng(&mut rng));
        let strip = ExpandCollapseWidget::new(&config, playback.clone(), StdRng::from_rng(&mut rng));
        let remove = RemoveTarget::new(&config, &metrics);

        let screen = metrics.usable();
        let button_name = SurfaceName::new(BUTTON_SURFACE);
        let strip_name = SurfaceName::new(STRIP_SURFACE);
        let button_touch = TouchManager::new(
            button_name.clone(),
            button.surface_size(),
            screen,
            button.bounds_policy(config.edge_offset_collapsed),
            config.gesture,
        );
        let strip_touch = TouchManager::new(
            strip_name.clone(),
            strip.surface_size(),
            screen,
            strip.bounds_policy(config.edge_offset_expanded),
            config.gesture,
        );

        Self {
            ppb_to_exp: button.bounds_policy(config.edge_offset_expanded),
            exp_to_ppb: strip.bounds_policy(config.edge_offset_collapsed),
            wm,
            config,
            metrics,
            playback,
            inbox,
            subscription,
            button,
            strip,
            remove,
            button_touch,
            strip_touch,
            button_name,
            strip_name,
            remove_name: SurfaceName::new(REMOVE_SURFACE),
            shown: false,
            released: true,
            ready_to_remove: false,
            expansion: None,
            pending: Vec::new(),
            queue: VecDeque::new(),
            pumping: false,
            state_listener: None,
            controls_listener: None,
        }
    }

    pub fn window_manager(&self) -> &W {
        &self.wm
    }

    pub fn window_manager_mut(&mut self) -> &mut W {
        &mut self.wm
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn button(&self) -> &PlayPauseButton {
        &self.button
    }

    pub fn strip(&self) -> &ExpandCollapseWidget {
        &self.strip
    }

    pub fn remove_target(&self) -> &RemoveTarget {
        &self.remove
    }

    pub fn button_position(&self) -> Point {
        self.button_touch.position()
    }

    pub fn strip_position(&self) -> Point {
        self.strip_touch.position()
    }

    pub fn button_touch(&self) -> &TouchManager {
        &self.button_touch
    }

    pub fn strip_touch(&self) -> &TouchManager {
        &self.strip_touch
    }

    pub fn is_ready_to_remove(&self) -> bool {
        self.ready_to_remove
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = PendingAction> + '_ {
        self.pending.iter().map(|p| p.action)
    }

    pub fn controller(&mut self) -> Controller<'_, W> {
        Controller { player: self }
    }

    pub fn set_metrics(&mut self, metrics: DisplayMetrics) {
        self.metrics = metrics;
        self.button_touch.set_screen(metrics.usable());
        self.strip_touch.set_screen(metrics.usable());
        self.remove.set_metrics(&metrics);
    }

    /// Shows the collapsed button centred on `(cx, cy)` and docks it. No-op while shown.
    pub fn show(&mut self, cx: f64, cy: f64) {
        if self.shown {
            return;
        }
        self.shown = true;
        self.released = true;
        let height = self.config.widget_height;

        self.remove.reset();
        // may still be attached, sliding out after the previous removal
        let result = if self.wm.is_attached(&self.remove_name) {
            self.wm.update_surface(&self.remove_name, self.remove.position())
        } else {
            self.wm.add_surface(&self.remove_name, self.remove.position())
        };
        if let Err(e) = result {
            log::warn!("{}", e);
        }

        let at = Point::new((cx - height).trunc(), (cy - height).trunc());
        self.place(Surface::Button, at);
        if let Err(e) = self.wm.add_surface(&self.button_name, at) {
            log::warn!("{}", e);
        }
        self.button.set_alpha(1.0);
        self.button.enable_progress_changes(true);
        log::debug!("widget shown at ({}, {})", cx, cy);
        self.button_touch.animate_to_bounds(None);
        self.pump();
    }

    /// Removes every surface and reports [`WidgetState::Removed`]. Idempotent.
    pub fn hide(&mut self) {
        self.hide_internal(true);
    }

    fn hide_internal(&mut self, by_public: bool) {
        if !self.shown {
            return;
        }
        self.shown = false;
        self.released = true;
        self.ready_to_remove = false;
        self.pending.clear();
        self.expansion = None;

        let mut out = Vec::new();
        self.button_touch.reset(&mut out);
        self.strip_touch.reset(&mut out);

        if let Err(e) = self.wm.remove_surface(&self.button_name) {
            log::debug!("{}", e);
        }
        if by_public {
            self.remove.reset();
            if let Err(e) = self.wm.remove_surface(&self.remove_name) {
                log::debug!("{}", e);
            }
        }
        if let Err(e) = self.wm.remove_surface(&self.strip_name) {
            log::debug!("{}", e);
        }
        if self.strip.state() != StripState::Collapsed {
            self.strip.reset();
            self.button.enable_progress_changes(true);
        }
        self.button.set_alpha(1.0);

        log::info!("widget removed");
        self.notify_state(WidgetState::Removed);
    }

    /// Fades the progress ring out, then docks the button and opens the strip from it.
    pub fn expand(&mut self) -> bool {
        if !self.shown || self.strip.state() != StripState::Collapsed || self.expansion.is_some() {
            return false;
        }
        self.remove.reset();
        if self.wm.is_attached(&self.remove_name)
            && let Err(e) = self.wm.update_surface(&self.remove_name, self.remove.position())
        {
            log::debug!("{}", e);
        }
        self.button.enable_progress_changes(false);
        self.expansion = Some(Expansion::Waiting);
        self.schedule(PendingAction::ShowExpanded, button::progress_changes_duration());
        true
    }

    fn check_space_and_show_expanded(&mut self) {
        let position = self.button_touch.position();
        let screen = self.metrics.usable();
        let direction = if position.x + self.config.widget_height > screen.width / 2.0 {
            Direction::Left
        } else {
            Direction::Right
        };
        self.expansion = match self.button_touch.animate_to_bounds(Some(&self.ppb_to_exp)) {
            Some(ticket) => Some(Expansion::Docking { ticket, direction }),
            None => Some(Expansion::Retry),
        };
    }

    fn show_expanded(&mut self, direction: Direction) {
        let button = self.button_touch.position();
        let height = self.config.widget_height;
        let x = match direction {
            Direction::Left => button.x - (self.config.widget_width - height * 1.5).trunc(),
            Direction::Right => button.x + (height / 2.0).trunc(),
        };
        let at = Point::new(x, button.y);
        self.place(Surface::Strip, at);
        if let Err(e) = self.wm.add_surface(&self.strip_name, at) {
            log::warn!("{}", e);
        }
        self.strip.expand(direction);
    }

    pub fn collapse(&mut self) -> bool {
        if !self.strip.is_expanded() {
            return false;
        }
        let cx = self.strip_touch.position().x + self.strip.surface_size().width / 2.0;
        let direction = if cx > self.metrics.usable().width / 2.0 {
            Direction::Left
        } else {
            Direction::Right
        };
        self.strip.set_direction(direction);
        self.update_button_position();
        if self.strip.collapse() {
            self.button_touch.animate_to_bounds(None);
            self.strip_touch.animate_to_bounds(Some(&self.exp_to_ppb));
        }
        self.pump();
        true
    }

    fn update_button_position(&mut self) {
        let strip = self.strip_touch.position();
        let radius = self.config.radius();
        let x = match self.strip.direction() {
            Direction::Right => strip.x - radius,
            Direction::Left => {
                strip.x + self.config.widget_width - self.config.widget_height - radius
            }
        };
        self.place(Surface::Button, Point::new(x.trunc(), strip.y));
        self.notify_position();
    }

    pub fn on_button_touch(&mut self, event: &TouchEvent) {
        let mut out = Vec::new();
        self.button_touch.on_touch(&mut self.wm, event, &mut out);
        self.enqueue(Surface::Button, out);
        self.pump();
    }

    pub fn on_strip_touch(&mut self, event: &TouchEvent) {
        let mut out = Vec::new();
        self.strip_touch.on_touch(&mut self.wm, event, &mut out);
        self.enqueue(Surface::Strip, out);
        self.pump();
    }

    pub fn advance(&mut self, elapsed: Duration) {
        while let Ok(event) = self.inbox.try_recv() {
            self.button.on_playback_event(&event);
        }

        for action in self.due_actions(elapsed) {
            self.run_pending(action);
        }

        let mut out = Vec::new();
        self.button_touch.advance(&mut self.wm, elapsed, &mut out);
        self.enqueue(Surface::Button, out);
        let mut out = Vec::new();
        self.strip_touch.advance(&mut self.wm, elapsed, &mut out);
        self.enqueue(Surface::Strip, out);
        self.pump();

        if self.expansion == Some(Expansion::Retry) {
            self.check_space_and_show_expanded();
        }

        self.button.advance(elapsed, self.playback.status());
        if let Some(state) = self.strip.advance(elapsed) {
            self.on_strip_state(state);
        }
        match self.strip.state() {
            StripState::Expanding => self.button.set_alpha(1.0 - self.strip.frame().percent),
            StripState::Collapsing => self.button.set_alpha(self.strip.frame().percent),
            StripState::Collapsed | StripState::Expanded => {}
        }

        let update = self.remove.advance(elapsed, self.button_touch.position());
        if let Some(at) = update.position
            && self.wm.is_attached(&self.remove_name)
            && let Err(e) = self.wm.update_surface(&self.remove_name, at)
        {
            log::debug!("{}", e);
        }
        if update.slid_out
            && !self.shown
            && let Err(e) = self.wm.remove_surface(&self.remove_name)
        {
            log::debug!("{}", e);
        }
    }

    fn schedule(&mut self, action: PendingAction, delay: Duration) {
        self.pending.retain(|p| p.action != action);
        self.pending.push(Pending {
            action,
            remaining: delay,
        });
    }

    fn due_actions(&mut self, elapsed: Duration) -> Vec<PendingAction> {
        let mut due = Vec::new();
        self.pending.retain_mut(|p| {
            if p.remaining <= elapsed {
                due.push(p.action);
                false
            } else {
                p.remaining -= elapsed;
                true
            }
        });
        due
    }

    fn run_pending(&mut self, action: PendingAction) {
        log::debug!("running pending action {}", action);
        match action {
            PendingAction::ShowExpanded => self.check_space_and_show_expanded(),
            PendingAction::RevealRemoveTarget => {
                if self.shown && !self.released && self.strip.state() == StripState::Collapsed {
                    self.remove.slide_in();
                }
            }
        }
    }

    fn on_strip_state(&mut self, state: WidgetState) {
        match state {
            WidgetState::Collapsed => {
                if let Err(e) = self.wm.remove_surface(&self.strip_name) {
                    log::debug!("{}", e);
                }
                self.button.set_alpha(1.0);
                self.button.enable_progress_changes(true);
            }
            WidgetState::Expanded => self.button.set_alpha(0.0),
            WidgetState::Removed => {}
        }
        log::debug!("widget {}", state);
        self.notify_state(state);
        self.notify_position();
    }

    fn place(&mut self, surface: Surface, at: Point) {
        let mut out = Vec::new();
        match surface {
            Surface::Button => self.button_touch.place(&mut self.wm, at, &mut out),
            Surface::Strip => self.strip_touch.place(&mut self.wm, at, &mut out),
        }
        self.enqueue(surface, out);
    }

    fn enqueue(&mut self, surface: Surface, events: Vec<GestureEvent>) {
        self.queue.extend(events.into_iter().map(|e| (surface, e)));
    }

    fn pump(&mut self) {
        if self.pumping {
            return;
        }
        self.pumping = true;
        while let Some((surface, event)) = self.queue.pop_front() {
            log::trace!("{} gesture {:?}", surface, event);
            match surface {
                Surface::Button => self.on_button_gesture(event),
                Surface::Strip => self.on_strip_gesture(event),
            }
        }
        self.pumping = false;
    }

    fn on_button_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Touched { .. } => {
                self.released = false;
                let threshold = self.config.gesture.long_click_threshold();
                self.schedule(PendingAction::RevealRemoveTarget, threshold);
                self.button.on_touch_down();
            }
            GestureEvent::Click { .. } => self.on_play_pause_button_clicked(),
            GestureEvent::LongClick { .. } => {
                self.released = true;
                self.expand();
            }
            GestureEvent::Moved { .. } => {
                let button = self.button_touch.position();
                let ready = self.remove.is_ready_to_remove(button);
                if ready != self.ready_to_remove {
                    self.ready_to_remove = ready;
                    self.remove.set_overlapped(ready);
                }
                if let Some(at) = self.remove.follow(button)
                    && let Err(e) = self.wm.update_surface(&self.remove_name, at)
                {
                    log::debug!("{}", e);
                }
            }
            GestureEvent::Released { .. } => {
                self.button.on_touch_up();
                self.released = true;
                self.remove.slide_out();
                if self.remove.is_ready_to_remove(self.button_touch.position()) {
                    self.hide_internal(false);
                } else {
                    self.notify_position();
                }
            }
            GestureEvent::AnimationCompleted => self.notify_position(),
            GestureEvent::DockFinished(ticket) => {
                if let Some(Expansion::Docking {
                    ticket: expected,
                    direction,
                }) = self.expansion
                    && expected == ticket
                {
                    self.expansion = None;
                    self.show_expanded(direction);
                }
            }
            GestureEvent::TouchOutside => {}
        }
    }

    fn on_play_pause_button_clicked(&mut self) {
        if self.button.is_animation_in_progress() {
            return;
        }
        let consumed = self
            .controls_listener
            .as_mut()
            .is_some_and(|l| l.on_play_pause_clicked());
        if !consumed {
            self.button.on_click(self.playback.status());
            self.toggle_playback();
        }
    }

    fn toggle_playback(&mut self) {
        if self.playback.status() == PlaybackStatus::Playing {
            self.playback.pause(Origin::Widget);
        } else {
            self.playback.start(Origin::Widget);
        }
    }

    fn on_strip_gesture(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::Click { x, y } => {
                if let Some(button) = self.strip.on_click(x, y) {
                    self.on_control_clicked(button, false);
                }
            }
            GestureEvent::LongClick { x, y } => {
                if let Some(button) = self.strip.on_long_click(x, y) {
                    self.on_control_clicked(button, true);
                }
            }
            GestureEvent::Touched { x, y } => self.strip.on_touched(x, y),
            GestureEvent::Released { x, y } => self.strip.on_released(x, y),
            GestureEvent::Moved { .. } | GestureEvent::AnimationCompleted => {
                self.update_button_position();
            }
            GestureEvent::TouchOutside => {
                if !self.strip.is_animation_in_progress() {
                    self.collapse();
                }
            }
            GestureEvent::DockFinished(_) => {}
        }
    }

    fn on_control_clicked(&mut self, button: ControlButton, long: bool) {
        log::debug!("{} {}", button, if long { "long clicked" } else { "clicked" });
        let consumed = match self.controls_listener.as_mut() {
            Some(listener) => expand::dispatch_click(listener.as_mut(), button, long),
            None => false,
        };
        if long || consumed {
            return;
        }
        match button {
            ControlButton::Playlist => {
                self.collapse();
            }
            ControlButton::PlayPause => self.toggle_playback(),
            ControlButton::Previous | ControlButton::Next | ControlButton::Album => {}
        }
    }

    fn notify_state(&mut self, state: WidgetState) {
        if let Some(listener) = self.state_listener.as_mut() {
            listener.on_widget_state_changed(state);
        }
    }

    fn notify_position(&mut self) {
        let position = self.button_touch.position();
        let height = self.config.widget_height;
        if let Some(listener) = self.state_listener.as_mut() {
            listener.on_widget_position_changed(
                (position.x + height) as i32,
                (position.y + height) as i32,
            );
        }
    }

    /// Rebuilds every component for a new configuration, keeping the button where it was.
    pub fn reconfigure(&mut self, config: Configuration) {
        let center = self.shown.then(|| {
            let p = self.button_touch.position();
            (p.x + self.config.widget_height, p.y + self.config.widget_height)
        });
        let listener = self.state_listener.take();
        self.hide();
        self.state_listener = listener;

        let mut rng = make_rng(config.random_seed);
        let status = self.playback.status();
        let mut button = PlayPauseButton::new(&config, status, StdRng::from_rng(&mut rng));
        let mut strip = ExpandCollapseWidget::new(&config, self.playback.clone(), StdRng::from_rng(&mut rng));
        button.set_album_cover(self.button.album_cover().cloned());
        strip.set_album_cover(self.strip.album_cover().cloned());
        let screen = self.metrics.usable();
        self.button_touch = TouchManager::new(
            self.button_name.clone(),
            button.surface_size(),
            screen,
            button.bounds_policy(config.edge_offset_collapsed),
            config.gesture,
        );
        self.strip_touch = TouchManager::new(
            self.strip_name.clone(),
            strip.surface_size(),
            screen,
            strip.bounds_policy(config.edge_offset_expanded),
            config.gesture,
        );
        self.ppb_to_exp = button.bounds_policy(config.edge_offset_expanded);
        self.exp_to_ppb = strip.bounds_policy(config.edge_offset_collapsed);
        self.remove = RemoveTarget::new(&config, &self.metrics);
        self.button = button;
        self.strip = strip;
        self.config = config;
        log::info!("widget reconfigured");

        if let Some((cx, cy)) = center {
            self.show(cx, cy);
        }
    }
}

impl<W: WindowManager> Drop for FloatingPlayer<W> {
    fn drop(&mut self) {
        self.playback.unsubscribe(self.subscription);
    }
}

/// Host-facing controls. Safe to use before the widget is shown.
pub struct Controller<'a, W: WindowManager> {
    player: &'a mut FloatingPlayer<W>,
}

impl<W: WindowManager> Controller<'_, W> {
    pub fn start(&mut self) {
        self.player.playback.start(Origin::Controller);
    }

    pub fn pause(&mut self) {
        self.player.playback.pause(Origin::Controller);
    }

    pub fn stop(&mut self) {
        self.player.playback.stop(Origin::Controller);
    }

    pub fn status(&self) -> PlaybackStatus {
        self.player.playback.status()
    }

    /// Playback position in ms.
    pub fn position(&self) -> u32 {
        self.player.playback.position()
    }

    pub fn set_position(&mut self, position: u32) {
        self.player.playback.set_position(position);
    }

    /// Track length in ms.
    pub fn duration(&self) -> u32 {
        self.player.playback.duration()
    }

    pub fn set_duration(&mut self, duration: u32) {
        self.player.playback.set_duration(duration);
    }

    pub fn album_cover(&mut self, cover: Option<AlbumCover>) {
        self.player.button.set_album_cover(cover.clone());
        self.player.strip.set_album_cover(cover);
    }

    pub fn set_controls_listener(&mut self, listener: Option<Box<dyn ControlsListener>>) {
        self.player.controls_listener = listener;
    }

    pub fn set_state_listener(&mut self, listener: Option<Box<dyn WidgetStateListener>>) {
        self.player.state_listener = listener;
    }

    pub fn playback_state(&self) -> &PlaybackState {
        &self.player.playback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::touch::TouchAction;
    use floatwm::InMemoryWindowManager;
    use std::cell::RefCell;
    use std::rc::Rc;

    const FRAME: Duration = Duration::from_millis(16);

    #[derive(Default)]
    struct Recorder {
        states: Rc<RefCell<Vec<WidgetState>>>,
    }

    impl WidgetStateListener for Recorder {
        fn on_widget_state_changed(&mut self, state: WidgetState) {
            self.states.borrow_mut().push(state);
        }
    }

    fn player() -> (FloatingPlayer<InMemoryWindowManager>, Rc<RefCell<Vec<WidgetState>>>) {
        let config = WidgetConfig {
            random_seed: Some(1),
            ..Default::default()
        }
        .build()
        .unwrap();
        let metrics = DisplayMetrics::new(1080.0, 1920.0);
        let mut p = FloatingPlayer::new(
            InMemoryWindowManager::new(),
            config,
            metrics,
            PlaybackState::new(),
        );
        let recorder = Recorder::default();
        let states = recorder.states.clone();
        p.controller().set_state_listener(Some(Box::new(recorder)));
        (p, states)
    }

    fn run(p: &mut FloatingPlayer<InMemoryWindowManager>, total: Duration) {
        let mut t = Duration::ZERO;
        while t < total {
            p.advance(FRAME);
            t += FRAME;
        }
    }

    #[test]
    fn test_show_docks_button() {
        let (mut p, _) = player();
        p.show(800.0, 700.0);
        p.show(10.0, 10.0);
        assert!(p.window_manager().is_attached(&SurfaceName::new(BUTTON_SURFACE)));
        assert!(p.window_manager().is_attached(&SurfaceName::new(REMOVE_SURFACE)));
        run(&mut p, Duration::from_millis(500));
        // right half of the screen: right edge is 1080 - 3r - offset
        assert_eq!(p.button_position().x, 1080.0 - 180.0 - 24.0);
        assert_eq!(p.button_position().y, 580.0);
    }

    #[test]
    fn test_hide_twice_reports_once() {
        let (mut p, states) = player();
        p.show(100.0, 700.0);
        p.hide();
        p.hide();
        assert_eq!(*states.borrow(), vec![WidgetState::Removed]);
        assert_eq!(p.window_manager().attached().count(), 0);
    }

    #[test]
    fn test_expand_then_collapse() {
        let (mut p, states) = player();
        p.show(100.0, 700.0);
        run(&mut p, Duration::from_millis(500));
        assert!(p.expand());
        assert!(!p.expand());
        assert_eq!(p.pending_actions().collect::<Vec<_>>(), vec![PendingAction::ShowExpanded]);

        run(&mut p, Duration::from_secs(4));
        assert_eq!(p.strip().state(), StripState::Expanded);
        assert_eq!(p.strip().direction(), Direction::Right);
        assert!(p.window_manager().is_attached(&SurfaceName::new(STRIP_SURFACE)));
        assert_eq!(p.button().frame().alpha, 0.0);

        assert!(p.collapse());
        run(&mut p, Duration::from_secs(2));
        assert_eq!(p.strip().state(), StripState::Collapsed);
        assert!(!p.window_manager().is_attached(&SurfaceName::new(STRIP_SURFACE)));
        assert_eq!(p.button().frame().alpha, 1.0);
        assert!(p.button().is_progress_enabled());
        assert_eq!(
            *states.borrow(),
            vec![WidgetState::Expanded, WidgetState::Collapsed]
        );
    }

    #[test]
    fn test_button_click_toggles_playback() {
        let (mut p, _) = player();
        p.show(100.0, 700.0);
        run(&mut p, Duration::from_millis(500));
        let origin = p.button_position();
        let raw = Point::new(origin.x + 120.0, origin.y + 120.0);
        p.on_button_touch(&TouchEvent::on_surface(TouchAction::Down, raw, origin, Duration::ZERO));
        p.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Up,
            raw,
            origin,
            Duration::from_millis(50),
        ));
        assert_eq!(p.controller().status(), PlaybackStatus::Playing);
        assert!(p.button().is_animation_in_progress());
    }

    // Long-presses the docked button, then drags it onto the revealed remove target and lets go.
    fn drop_onto_remove_target(p: &mut FloatingPlayer<InMemoryWindowManager>) {
        let origin = p.button_position();
        let grab = Point::new(origin.x + 120.0, origin.y + 120.0);
        p.on_button_touch(&TouchEvent::on_surface(TouchAction::Down, grab, origin, Duration::ZERO));
        // nudge past the slop so the press is not a long click
        let step = Point::new(grab.x + 20.0, grab.y);
        p.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Move,
            step,
            origin,
            Duration::from_millis(1000),
        ));
        run(p, Duration::from_millis(900));
        assert!(p.remove_target().is_shown());

        // drag the button centre onto the remove target
        let target = p.remove_target().position();
        let centre = Point::new(target.x + 60.0, target.y + 60.0);
        let now = p.button_position();
        let raw = Point::new(
            grab.x + (centre.x - 120.0 - origin.x),
            grab.y + (centre.y - 120.0 - origin.y),
        );
        p.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Move,
            raw,
            now,
            Duration::from_millis(60_000),
        ));
        assert!(p.is_ready_to_remove());
        p.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Up,
            raw,
            p.button_position(),
            Duration::from_millis(120_000),
        ));
    }

    #[test]
    fn test_drop_onto_remove_target_removes_widget() {
        let (mut p, states) = player();
        p.show(100.0, 700.0);
        run(&mut p, Duration::from_millis(500));

        drop_onto_remove_target(&mut p);
        assert_eq!(*states.borrow(), vec![WidgetState::Removed]);
        assert!(!p.is_shown());
        assert!(p.window_manager().is_attached(&SurfaceName::new(REMOVE_SURFACE)));
        run(&mut p, Duration::from_millis(400));
        assert!(!p.window_manager().is_attached(&SurfaceName::new(REMOVE_SURFACE)));
    }

    #[test]
    fn test_show_during_slide_out_parks_remove_target() {
        let (mut p, _) = player();
        p.show(100.0, 700.0);
        run(&mut p, Duration::from_millis(500));
        drop_onto_remove_target(&mut p);
        p.advance(FRAME);
        p.advance(FRAME);
        let remove = SurfaceName::new(REMOVE_SURFACE);
        assert!(p.window_manager().is_attached(&remove));

        p.show(100.0, 700.0);
        run(&mut p, Duration::from_secs(2));
        let hidden = p.remove_target().position();
        assert!(hidden.y >= 1920.0);
        assert_eq!(p.window_manager().origin(&remove), Some(hidden));
    }

    #[test]
    fn test_hide_mid_drag_lets_next_show_dock() {
        let (mut p, _) = player();
        p.show(100.0, 700.0);
        run(&mut p, Duration::from_millis(500));
        let origin = p.button_position();
        let grab = Point::new(origin.x + 120.0, origin.y + 120.0);
        p.on_button_touch(&TouchEvent::on_surface(TouchAction::Down, grab, origin, Duration::ZERO));
        p.on_button_touch(&TouchEvent::on_surface(
            TouchAction::Move,
            Point::new(grab.x + 30.0, grab.y),
            origin,
            Duration::from_millis(20),
        ));
        assert!(p.button_touch().is_dragging());

        p.hide();
        p.show(540.0, 900.0);
        run(&mut p, Duration::from_millis(960));
        assert!(!p.button_touch().is_dragging());
        assert_eq!(p.button_position(), Point::new(1080.0 - 180.0 - 24.0, 780.0));
    }
}
