//! Remove target that slides up while the collapsed button is dragged.

use crate::anim::Tween;
use crate::color::Color;
use crate::config::Configuration;
use crate::math::{rotate_x, rotate_y};
use floatwm::{DisplayMetrics, Point, RectF, Size};
use std::time::Duration;

pub const SCALE_DEFAULT: f64 = 1.0;
pub const SCALE_LARGE: f64 = 1.5;
pub const SLIDE_DURATION: Duration = Duration::from_millis(200);
pub const OVERLAP_DURATION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slide {
    Hidden,
    In,
    Out,
}

/// Result of one remove-target tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoveUpdate {
    /// New surface origin, when the target moved.
    pub position: Option<Point>,
    /// Set on the tick the slide-out finished.
    pub slid_out: bool,
}

#[derive(Debug)]
pub struct RemoveTarget {
    radius: f64,
    height: f64,
    size: f64,
    default_color: Color,
    overlapped_color: Color,
    stroke_width: f64,
    screen: Size,
    hidden: Point,
    visible: Point,
    position: Point,
    slide: Slide,
    slide_y: Tween,
    animated_y: Option<f64>,
    scale: Tween,
    overlapped: bool,
}

impl RemoveTarget {
    pub fn new(config: &Configuration, metrics: &DisplayMetrics) -> Self {
        let radius = config.radius();
        let height = config.widget_height;
        let mut target = Self {
            radius,
            height,
            size: radius * SCALE_LARGE * 2.0,
            default_color: config.cross_color,
            overlapped_color: config.cross_overlapped_color,
            stroke_width: config.cross_stroke_width,
            screen: metrics.usable(),
            hidden: Point::default(),
            visible: Point::default(),
            position: Point::default(),
            slide: Slide::Hidden,
            slide_y: Tween::new(0.0),
            animated_y: None,
            scale: Tween::new(SCALE_DEFAULT),
            overlapped: false,
        };
        target.set_metrics(metrics);
        target
    }

    /// Recomputes the resting positions for new display metrics.
    pub fn set_metrics(&mut self, metrics: &DisplayMetrics) {
        let screen = metrics.usable();
        let x = (screen.width / 2.0 - self.radius * SCALE_LARGE).trunc();
        let hidden_y = (screen.height + self.height + metrics.navigation_bar_height).trunc();
        let bar = if metrics.has_navigation_bar() {
            0.0
        } else {
            self.height
        };
        let visible_y = (screen.height - self.radius - bar).trunc();
        self.screen = screen;
        self.hidden = Point::new(x, hidden_y);
        self.visible = Point::new(x, visible_y);
        if self.slide == Slide::Hidden {
            self.position = self.hidden;
        }
    }

    pub fn surface_size(&self) -> Size {
        Size::new(self.size, self.size)
    }

    pub fn hidden_position(&self) -> Point {
        self.hidden
    }

    pub fn visible_position(&self) -> Point {
        self.visible
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// True from the start of the slide-in until the slide-out finished.
    pub fn is_shown(&self) -> bool {
        self.slide != Slide::Hidden
    }

    pub fn slide_in(&mut self) {
        self.slide = Slide::In;
        self.slide_y
            .start(self.hidden.y, self.visible.y, SLIDE_DURATION);
        self.animated_y = Some(self.hidden.y);
    }

    /// Slides back out of the screen. Returns false when it was not shown.
    pub fn slide_out(&mut self) -> bool {
        if self.slide == Slide::Hidden {
            return false;
        }
        self.slide = Slide::Out;
        self.slide_y
            .start(self.visible.y, self.hidden.y, SLIDE_DURATION);
        true
    }

    /// Stops showing immediately, as when the widget expands.
    pub fn reset(&mut self) {
        self.slide = Slide::Hidden;
        self.slide_y.cancel();
        self.animated_y = None;
        self.position = self.hidden;
    }

    pub fn advance(&mut self, elapsed: Duration, button: Point) -> RemoveUpdate {
        self.scale.advance(elapsed);
        if !self.slide_y.is_running() {
            return RemoveUpdate {
                position: None,
                slid_out: false,
            };
        }
        let finished = self.slide_y.advance(elapsed);
        self.animated_y = Some(self.slide_y.value().trunc());
        let position = self.follow(button);
        let slid_out = finished && self.slide == Slide::Out;
        if slid_out {
            self.slide = Slide::Hidden;
            self.animated_y = None;
        }
        RemoveUpdate { position, slid_out }
    }

    /// Tilts the target towards the dragged button. Returns the new origin while shown.
    pub fn follow(&mut self, button: Point) -> Option<Point> {
        if !self.is_shown() {
            return None;
        }
        let animated_y = *self.animated_y.get_or_insert(self.visible.y);
        let tg_alpha = (self.screen.width / 2.0 - button.x) / (self.visible.y - button.y);
        if tg_alpha.is_nan() {
            return None;
        }
        let rotation = 360.0 - tg_alpha.atan().to_degrees();
        let max_distance = self.screen.width.hypot(self.screen.height);
        let distance =
            (animated_y - button.y).hypot(self.visible.x - self.hidden.x) / max_distance;
        let y = animated_y - self.radius * distance;
        let x = rotate_x(self.visible.x, y, self.hidden.x, animated_y, rotation).trunc();
        let y = rotate_y(self.visible.x, y, self.hidden.x, animated_y, rotation).trunc();
        self.position = Point::new(x, y);
        Some(self.position)
    }

    /// Whether the button's centre sits over the target.
    pub fn is_ready_to_remove(&self, button: Point) -> bool {
        let bounds = RectF::new(
            self.position.x,
            self.position.y,
            self.position.x + self.height,
            self.position.y + self.height,
        );
        bounds.contains(Point::new(button.x + self.height, button.y + self.height))
    }

    /// Grows and recolours the cross while the button is over it. Returns true on a change.
    pub fn set_overlapped(&mut self, overlapped: bool) -> bool {
        if self.overlapped == overlapped {
            return false;
        }
        self.overlapped = overlapped;
        let to = if overlapped { SCALE_LARGE } else { SCALE_DEFAULT };
        self.scale.start(self.scale.value(), to, OVERLAP_DURATION);
        true
    }

    pub fn is_overlapped(&self) -> bool {
        self.overlapped
    }

    pub fn scale(&self) -> f64 {
        self.scale.value()
    }

    pub fn color(&self) -> Color {
        if self.overlapped {
            self.overlapped_color
        } else {
            self.default_color
        }
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Ring radius and the two cross strokes, in unscaled surface coordinates.
    pub fn cross(&self) -> (f64, [(Point, Point); 2]) {
        let c = ((self.size as i32) >> 1) as f64;
        let ring = self.radius * 0.75;
        let arm = ring * 0.5;
        let line = |angle: f64| {
            let a = Point::new(rotate_x(c, c + arm, c, c, angle), rotate_y(c, c + arm, c, c, angle));
            let b = Point::new(
                rotate_x(c, c + arm, c, c, angle + 180.0),
                rotate_y(c, c + arm, c, c, angle + 180.0),
            );
            (a, b)
        };
        (ring, [line(45.0), line(135.0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;

    fn target(nav: f64) -> RemoveTarget {
        let config = WidgetConfig::default().build().unwrap();
        let metrics = DisplayMetrics::new(1080.0, 1920.0).with_bars(60.0, nav);
        RemoveTarget::new(&config, &metrics)
    }

    #[test]
    fn test_resting_positions() {
        let t = target(120.0);
        // usable height 1740, radius 60
        assert_eq!(t.hidden_position(), Point::new(450.0, 1980.0));
        assert_eq!(t.visible_position(), Point::new(450.0, 1680.0));
        assert_eq!(t.surface_size(), Size::new(180.0, 180.0));

        let t = target(0.0);
        assert_eq!(t.visible_position(), Point::new(450.0, 1860.0 - 60.0 - 120.0));
    }

    #[test]
    fn test_slide_in_and_out() {
        let mut t = target(120.0);
        let button = Point::new(480.0, 900.0);
        assert!(!t.slide_out());
        t.slide_in();
        assert!(t.is_shown());
        let update = t.advance(SLIDE_DURATION, button);
        assert!(update.position.is_some());
        assert!(!update.slid_out);

        assert!(t.slide_out());
        let update = t.advance(Duration::from_millis(100), button);
        assert!(!update.slid_out);
        let update = t.advance(Duration::from_millis(100), button);
        assert!(update.slid_out);
        assert!(!t.is_shown());
        assert_eq!(t.follow(button), None);
    }

    #[test]
    fn test_follow_without_tilt_stays_on_axis() {
        let mut t = target(120.0);
        t.slide_in();
        t.advance(SLIDE_DURATION, Point::new(480.0, 900.0));
        // button centred above the target: no rotation beyond a full turn
        let p = t.follow(Point::new(540.0, 900.0)).unwrap();
        assert!((p.x - 450.0).abs() <= 1.0);
        assert!(p.y < 1680.0 && p.y > 1680.0 - 60.0);
    }

    #[test]
    fn test_ready_to_remove_and_overlap() {
        let mut t = target(120.0);
        t.slide_in();
        t.advance(SLIDE_DURATION, Point::new(540.0, 900.0));
        let at = t.position();
        let over = Point::new(at.x - 60.0, at.y - 60.0);
        assert!(t.is_ready_to_remove(over));
        assert!(!t.is_ready_to_remove(Point::new(0.0, 0.0)));

        assert!(t.set_overlapped(true));
        assert!(!t.set_overlapped(true));
        assert_eq!(t.color(), crate::color::opaque(0xff, 0x4b, 0x3a));
        t.advance(OVERLAP_DURATION, over);
        assert_eq!(t.scale(), SCALE_LARGE);
    }
}
