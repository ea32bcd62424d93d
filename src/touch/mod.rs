//! Gesture tracking and position authority for one floating surface.
//!
//! A [`TouchManager`] turns raw touch samples into [`GestureEvent`]s and is the only writer
//! of its surface's position. Exactly one authority (finger, fling or dock) holds it at a time.

pub mod bounds;
pub mod dock;
pub mod fling;

pub use bounds::{BoundsPolicy, EdgeOffset, Footprint, StickyBounds};
pub use dock::{DOCK_DURATION, DockTicket, dock_target};
pub use fling::{FLING_DURATION, fling_target};

use dock::DockAnimation;
use floatwm::{Point, Size, SurfaceName, WindowManager};
use fling::FlingAnimation;
use std::time::Duration;
use strum::Display as StrumDisplay;

/// Weight of the newest sample in the smoothed release velocity.
pub const VELOCITY_SMOOTHING: f64 = 0.2;

/// Extra hold time on top of the long-press timeout before the remove target appears.
pub const LONG_CLICK_GRACE: Duration = Duration::from_millis(128);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Finger travel in px after which a press becomes a drag.
    pub touch_slop: f64,
    pub long_press_timeout: Duration,
    /// Release speed in px/s above which a drag turns into a fling.
    pub min_fling_velocity: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            touch_slop: 8.0,
            long_press_timeout: Duration::from_millis(500),
            min_fling_velocity: 50.0,
        }
    }
}

impl GestureConfig {
    pub fn long_click_threshold(&self) -> Duration {
        self.long_press_timeout + LONG_CLICK_GRACE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
    Outside,
}

/// One raw touch sample. `local` is relative to the surface, `raw` to the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub local: Point,
    pub raw: Point,
    pub time: Duration,
}

impl TouchEvent {
    pub fn new(action: TouchAction, local: Point, raw: Point, time: Duration) -> Self {
        Self {
            action,
            local,
            raw,
            time,
        }
    }

    pub fn on_surface(action: TouchAction, raw: Point, origin: Point, time: Duration) -> Self {
        let local = Point::new(raw.x - origin.x, raw.y - origin.y);
        Self::new(action, local, raw, time)
    }

    pub fn outside(time: Duration) -> Self {
        Self::new(TouchAction::Outside, Point::default(), Point::default(), time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Touched { x: f64, y: f64 },
    Click { x: f64, y: f64 },
    LongClick { x: f64, y: f64 },
    /// The surface moved by this much, whoever moved it.
    Moved { dx: f64, dy: f64 },
    Released { x: f64, y: f64 },
    TouchOutside,
    /// A docking animation ran to its end.
    AnimationCompleted,
    /// A docking animation ended, naturally or not.
    DockFinished(DockTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, StrumDisplay)]
pub enum GestureKind {
    Tap,
    LongPress,
    Drag,
    Fling,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Session {
    origin: Point,
    down_local: Point,
    down_raw: Point,
    last_raw: Point,
    last_time: Duration,
    held: Duration,
    scrolling: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Authority {
    Idle,
    Gesture(Session),
    Fling(FlingAnimation),
    Dock(DockAnimation),
}

#[derive(Debug)]
pub struct TouchManager {
    name: SurfaceName,
    size: Size,
    screen: Size,
    position: Point,
    bounds: BoundsPolicy,
    config: GestureConfig,
    authority: Authority,
    velocity: Point,
    next_ticket: u64,
    last_gesture: Option<GestureKind>,
}

impl TouchManager {
    pub fn new(
        name: SurfaceName,
        size: Size,
        screen: Size,
        bounds: BoundsPolicy,
        config: GestureConfig,
    ) -> Self {
        Self {
            name,
            size,
            screen,
            position: Point::default(),
            bounds,
            config,
            authority: Authority::Idle,
            velocity: Point::default(),
            next_ticket: 0,
            last_gesture: None,
        }
    }

    pub fn name(&self) -> &SurfaceName {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn screen(&self) -> Size {
        self.screen
    }

    pub fn set_screen(&mut self, screen: Size) {
        self.screen = screen;
    }

    pub fn bounds(&self) -> &BoundsPolicy {
        &self.bounds
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn velocity(&self) -> Point {
        self.velocity
    }

    pub fn last_gesture(&self) -> Option<GestureKind> {
        self.last_gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.authority, Authority::Gesture(_))
    }

    pub fn is_flinging(&self) -> bool {
        matches!(self.authority, Authority::Fling(_))
    }

    pub fn is_docking(&self) -> bool {
        matches!(self.authority, Authority::Dock(_))
    }

    pub fn is_animating(&self) -> bool {
        self.is_flinging() || self.is_docking()
    }

    /// Moves the surface from outside any gesture, taking authority from a running animation.
    ///
    /// An interrupted dock still reports its ticket; an interrupted fling does not dock.
    pub fn place(&mut self, wm: &mut dyn WindowManager, position: Point, out: &mut Vec<GestureEvent>) {
        self.stop_animations(out);
        self.position = position;
        if wm.is_attached(&self.name)
            && let Err(e) = wm.update_surface(&self.name, position)
        {
            log::warn!("{}", e);
        }
    }

    /// Ends any fling or docking without follow-up.
    pub fn stop_animations(&mut self, out: &mut Vec<GestureEvent>) {
        match self.authority {
            Authority::Dock(anim) => {
                log::debug!("{}: docking interrupted", self.name);
                self.authority = Authority::Idle;
                out.push(GestureEvent::DockFinished(anim.ticket));
            }
            Authority::Fling(_) => {
                log::debug!("{}: fling interrupted", self.name);
                self.authority = Authority::Idle;
            }
            Authority::Idle | Authority::Gesture(_) => {}
        }
    }

    /// Drops every authority, including a finger still down; its remaining samples are
    /// ignored until the next `Down`.
    pub fn reset(&mut self, out: &mut Vec<GestureEvent>) {
        self.stop_animations(out);
        if let Authority::Gesture(_) = self.authority {
            log::debug!("{}: gesture abandoned", self.name);
            self.authority = Authority::Idle;
        }
        self.velocity = Point::default();
    }

    /// Starts docking against `bounds`, or the surface's own policy.
    ///
    /// Dropped (returning `None`) while any other authority holds the position; the caller
    /// retries after the running animation reports back.
    pub fn animate_to_bounds(&mut self, bounds: Option<&dyn StickyBounds>) -> Option<DockTicket> {
        if !matches!(self.authority, Authority::Idle) {
            log::debug!("{}: docking request dropped", self.name);
            return None;
        }
        Some(self.start_dock(bounds))
    }

    /// Throws the surface with `velocity` px/s. Zero velocity docks straight away.
    pub fn fling(&mut self, velocity: Point) -> bool {
        if !matches!(self.authority, Authority::Idle) {
            return false;
        }
        if velocity.x == 0.0 && velocity.y == 0.0 {
            self.start_dock(None);
            return true;
        }
        let to = fling_target(self.position, self.size, self.screen, &self.bounds, velocity);
        log::debug!("{}: fling to ({:.1}, {:.1})", self.name, to.x, to.y);
        self.authority = Authority::Fling(FlingAnimation::new(self.position, to));
        true
    }

    fn start_dock(&mut self, bounds: Option<&dyn StickyBounds>) -> DockTicket {
        let bounds = bounds.unwrap_or(&self.bounds);
        let to = dock_target(self.position, self.size, self.screen, bounds);
        let ticket = DockTicket(self.next_ticket);
        self.next_ticket += 1;
        log::debug!("{}: docking to ({:.1}, {:.1})", self.name, to.x, to.y);
        self.authority = Authority::Dock(DockAnimation::new(self.position, to, ticket));
        ticket
    }

    // Records and reports the move only once the window manager accepted it.
    fn move_to(
        &mut self,
        wm: &mut dyn WindowManager,
        to: Point,
        out: &mut Vec<GestureEvent>,
    ) -> Result<(), floatwm::SurfaceError> {
        wm.update_surface(&self.name, to)?;
        let (dx, dy) = (to.x - self.position.x, to.y - self.position.y);
        self.position = to;
        out.push(GestureEvent::Moved { dx, dy });
        Ok(())
    }

    pub fn on_touch(
        &mut self,
        wm: &mut dyn WindowManager,
        event: &TouchEvent,
        out: &mut Vec<GestureEvent>,
    ) {
        match event.action {
            TouchAction::Down => self.on_down(event, out),
            TouchAction::Move => self.on_move(wm, event, out),
            TouchAction::Up => self.on_up(event, out),
            TouchAction::Cancel => {
                if self.is_dragging() {
                    self.authority = Authority::Idle;
                }
            }
            TouchAction::Outside => out.push(GestureEvent::TouchOutside),
        }
    }

    fn on_down(&mut self, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        match self.authority {
            Authority::Dock(_) => {
                log::debug!("{}: touch ignored while docking", self.name);
                return;
            }
            Authority::Fling(_) => log::debug!("{}: fling taken over by touch", self.name),
            Authority::Idle | Authority::Gesture(_) => {}
        }
        self.velocity = Point::default();
        self.authority = Authority::Gesture(Session {
            origin: self.position,
            down_local: event.local,
            down_raw: event.raw,
            last_raw: event.raw,
            last_time: event.time,
            held: Duration::ZERO,
            scrolling: false,
        });
        out.push(GestureEvent::Touched {
            x: event.local.x,
            y: event.local.y,
        });
    }

    fn on_move(&mut self, wm: &mut dyn WindowManager, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        let Authority::Gesture(mut session) = self.authority else {
            return;
        };

        let dt = event.time.saturating_sub(session.last_time).as_secs_f64();
        if dt > 0.0 {
            let vx = (event.raw.x - session.last_raw.x) / dt;
            let vy = (event.raw.y - session.last_raw.y) / dt;
            self.velocity = Point::new(
                crate::math::smooth(self.velocity.x, vx, VELOCITY_SMOOTHING),
                crate::math::smooth(self.velocity.y, vy, VELOCITY_SMOOTHING),
            );
        }
        session.last_raw = event.raw;
        session.last_time = event.time;

        let dx = event.raw.x - session.down_raw.x;
        let dy = event.raw.y - session.down_raw.y;
        if !session.scrolling && dx.hypot(dy) > self.config.touch_slop {
            session.scrolling = true;
        }
        self.authority = Authority::Gesture(session);

        if session.scrolling {
            let to = session.origin.offset(dx, dy);
            if let Err(e) = self.move_to(wm, to, out) {
                log::warn!("{}", e);
            }
        }
    }

    fn on_up(&mut self, event: &TouchEvent, out: &mut Vec<GestureEvent>) {
        // Sessions ended by a cancel or a long click have no authority left to release.
        let Authority::Gesture(session) = self.authority else {
            return;
        };
        self.authority = Authority::Idle;
        let (x, y) = (event.local.x, event.local.y);

        if !session.scrolling {
            out.push(GestureEvent::Click { x, y });
            out.push(GestureEvent::Released { x, y });
            self.last_gesture = Some(GestureKind::Tap);
            self.start_dock(None);
        } else if self.velocity.x.hypot(self.velocity.y) > self.config.min_fling_velocity {
            out.push(GestureEvent::Released { x, y });
            self.last_gesture = Some(GestureKind::Fling);
            self.fling(self.velocity);
        } else {
            out.push(GestureEvent::Released { x, y });
            self.last_gesture = Some(GestureKind::Drag);
            self.start_dock(None);
        }
        self.velocity = Point::default();
    }

    pub fn advance(&mut self, wm: &mut dyn WindowManager, elapsed: Duration, out: &mut Vec<GestureEvent>) {
        match self.authority {
            Authority::Idle => {}
            Authority::Gesture(mut session) => {
                if session.scrolling {
                    return;
                }
                session.held += elapsed;
                if session.held >= self.config.long_press_timeout {
                    // Long click ends the session; the eventual up is not processed.
                    self.authority = Authority::Idle;
                    self.last_gesture = Some(GestureKind::LongPress);
                    out.push(GestureEvent::LongClick {
                        x: session.down_local.x,
                        y: session.down_local.y,
                    });
                } else {
                    self.authority = Authority::Gesture(session);
                }
            }
            Authority::Fling(mut anim) => {
                let (to, done) = anim.step(elapsed);
                self.authority = Authority::Fling(anim);
                let detached = self.move_to(wm, to, out).is_err();
                if detached || done {
                    self.authority = Authority::Idle;
                    self.start_dock(None);
                }
            }
            Authority::Dock(mut anim) => {
                let (to, done) = anim.step(elapsed);
                self.authority = Authority::Dock(anim);
                if let Err(e) = self.move_to(wm, to, out) {
                    log::debug!("{}: docking cancelled, {}", self.name, e);
                    self.authority = Authority::Idle;
                    out.push(GestureEvent::DockFinished(anim.ticket));
                } else if done {
                    self.authority = Authority::Idle;
                    out.push(GestureEvent::AnimationCompleted);
                    out.push(GestureEvent::DockFinished(anim.ticket));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floatwm::InMemoryWindowManager;

    const FRAME: Duration = Duration::from_millis(16);

    fn setup() -> (InMemoryWindowManager, TouchManager) {
        let name = SurfaceName::new("button");
        let mut wm = InMemoryWindowManager::new();
        let mut tm = TouchManager::new(
            name.clone(),
            Size::new(200.0, 200.0),
            Size::new(1000.0, 2000.0),
            BoundsPolicy::new(Footprint::Button { radius: 50.0 }, EdgeOffset::default()),
            GestureConfig::default(),
        );
        let mut out = Vec::new();
        tm.place(&mut wm, Point::new(-50.0, 500.0), &mut out);
        wm.add_surface(&name, tm.position()).unwrap();
        (wm, tm)
    }

    fn touch(tm: &TouchManager, action: TouchAction, raw: (f64, f64), ms: u64) -> TouchEvent {
        TouchEvent::on_surface(
            action,
            Point::new(raw.0, raw.1),
            tm.position(),
            Duration::from_millis(ms),
        )
    }

    fn settle(wm: &mut InMemoryWindowManager, tm: &mut TouchManager, out: &mut Vec<GestureEvent>) {
        for _ in 0..100 {
            tm.advance(wm, FRAME, out);
        }
    }

    #[test]
    fn test_tap_clicks_and_docks() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        let e = touch(&tm, TouchAction::Up, (52.0, 601.0), 80);
        tm.on_touch(&mut wm, &e, &mut out);

        assert!(matches!(out[0], GestureEvent::Touched { .. }));
        assert!(matches!(out[1], GestureEvent::Click { .. }));
        assert!(matches!(out[2], GestureEvent::Released { .. }));
        assert_eq!(tm.last_gesture(), Some(GestureKind::Tap));
        assert!(tm.is_docking());
    }

    #[test]
    fn test_reset_abandons_live_drag() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        let e = touch(&tm, TouchAction::Move, (80.0, 600.0), 20);
        tm.on_touch(&mut wm, &e, &mut out);
        assert!(tm.is_dragging());

        tm.reset(&mut out);
        assert!(!tm.is_dragging());
        assert_eq!(tm.velocity(), Point::default());

        // the finger lifting afterwards belongs to the abandoned session
        out.clear();
        let e = touch(&tm, TouchAction::Up, (80.0, 600.0), 40);
        tm.on_touch(&mut wm, &e, &mut out);
        assert!(out.is_empty());
        assert!(!tm.is_animating());
        assert!(tm.animate_to_bounds(None).is_some());
    }

    #[test]
    fn test_drag_reports_every_pixel() {
        let (mut wm, mut tm) = setup();
        let start = tm.position();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        for i in 1..=20u64 {
            // slow enough to stay under the fling threshold on release
            let e = touch(&tm, TouchAction::Move, (50.0 + i as f64 * 7.0, 600.0 + i as f64 * 3.0), i * 1000);
            tm.on_touch(&mut wm, &e, &mut out);
        }
        let (sx, sy) = out.iter().fold((0.0, 0.0), |acc, e| match e {
            GestureEvent::Moved { dx, dy } => (acc.0 + dx, acc.1 + dy),
            _ => acc,
        });
        assert_eq!(tm.position(), Point::new(start.x + 140.0, start.y + 60.0));
        assert!((start.x + sx - tm.position().x).abs() < 1e-9);
        assert!((start.y + sy - tm.position().y).abs() < 1e-9);
        assert_eq!(wm.origin(tm.name()), Some(tm.position()));

        let e = touch(&tm, TouchAction::Up, (190.0, 660.0), 21_000);
        tm.on_touch(&mut wm, &e, &mut out);
        assert_eq!(tm.last_gesture(), Some(GestureKind::Drag));
        assert!(!out.iter().any(|e| matches!(e, GestureEvent::Click { .. })));
        assert!(tm.is_docking());
    }

    #[test]
    fn test_long_press_swallows_up() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        for _ in 0..40 {
            tm.advance(&mut wm, FRAME, &mut out);
        }
        let long_clicks = out
            .iter()
            .filter(|e| matches!(e, GestureEvent::LongClick { .. }))
            .count();
        assert_eq!(long_clicks, 1);
        out.clear();

        let e = touch(&tm, TouchAction::Up, (50.0, 600.0), 700);
        tm.on_touch(&mut wm, &e, &mut out);
        assert!(out.is_empty());
        assert_eq!(tm.last_gesture(), Some(GestureKind::LongPress));
        assert!(!tm.is_animating());
    }

    #[test]
    fn test_cancel_aborts_session() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        let e = touch(&tm, TouchAction::Cancel, (50.0, 600.0), 10);
        tm.on_touch(&mut wm, &e, &mut out);
        let e = touch(&tm, TouchAction::Up, (50.0, 600.0), 20);
        tm.on_touch(&mut wm, &e, &mut out);
        assert_eq!(out.len(), 1);
        assert!(!tm.is_animating());
    }

    #[test]
    fn test_down_is_ignored_while_docking() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        tm.place(&mut wm, Point::new(300.0, 500.0), &mut out);
        assert!(tm.animate_to_bounds(None).is_some());
        assert!(tm.animate_to_bounds(None).is_none());
        let e = touch(&tm, TouchAction::Down, (350.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        assert!(out.is_empty());
        assert!(tm.is_docking());
    }

    #[test]
    fn test_dock_lands_on_edge_and_reports_once() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        tm.place(&mut wm, Point::new(300.0, 2500.0), &mut out);
        let ticket = tm.animate_to_bounds(None).unwrap();
        settle(&mut wm, &mut tm, &mut out);

        assert_eq!(tm.position(), Point::new(-50.0, 1850.0));
        assert_eq!(wm.origin(tm.name()), Some(tm.position()));
        let finished: Vec<_> = out
            .iter()
            .filter(|e| matches!(e, GestureEvent::DockFinished(_)))
            .collect();
        assert_eq!(finished, vec![&GestureEvent::DockFinished(ticket)]);
        assert_eq!(
            out.iter()
                .filter(|e| matches!(e, GestureEvent::AnimationCompleted))
                .count(),
            1
        );
    }

    #[test]
    fn test_detached_surface_cancels_dock() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        tm.place(&mut wm, Point::new(300.0, 500.0), &mut out);
        let ticket = tm.animate_to_bounds(None).unwrap();
        wm.detach(tm.name());
        tm.advance(&mut wm, FRAME, &mut out);
        assert_eq!(out, vec![GestureEvent::DockFinished(ticket)]);
        assert!(!tm.is_animating());
    }

    #[test]
    fn test_zero_fling_docks_without_displacement() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        tm.place(&mut wm, Point::new(100.0, 500.0), &mut out);
        assert!(tm.fling(Point::default()));
        assert!(tm.is_docking());
        assert_eq!(tm.position(), Point::new(100.0, 500.0));
    }

    #[test]
    fn test_fast_release_flings_then_docks() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        for i in 1..=6u64 {
            let e = touch(&tm, TouchAction::Move, (50.0 + i as f64 * 40.0, 600.0), i * 16);
            tm.on_touch(&mut wm, &e, &mut out);
        }
        let e = touch(&tm, TouchAction::Up, (290.0, 600.0), 100);
        tm.on_touch(&mut wm, &e, &mut out);
        assert_eq!(tm.last_gesture(), Some(GestureKind::Fling));
        assert!(tm.is_flinging());

        settle(&mut wm, &mut tm, &mut out);
        assert!(!tm.is_animating());
        assert_eq!(tm.position().x, 850.0);
    }

    #[test]
    fn test_touch_takes_over_fling() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        assert!(tm.fling(Point::new(5000.0, 0.0)));
        tm.advance(&mut wm, FRAME, &mut out);
        let e = touch(&tm, TouchAction::Down, (50.0, 600.0), 0);
        tm.on_touch(&mut wm, &e, &mut out);
        assert!(tm.is_dragging());
        tm.advance(&mut wm, FRAME, &mut out);
        assert!(!tm.is_animating());
    }

    #[test]
    fn test_outside_touch() {
        let (mut wm, mut tm) = setup();
        let mut out = Vec::new();
        tm.on_touch(&mut wm, &TouchEvent::outside(Duration::ZERO), &mut out);
        assert_eq!(out, vec![GestureEvent::TouchOutside]);
    }
}
