use super::bounds::StickyBounds;
use crate::anim::{Easing, Tween};
use floatwm::{Point, Size};
use std::time::Duration;

pub const FLING_DURATION: Duration = Duration::from_millis(200);

/// Endpoint of a fling released at `position` with `velocity` px/s.
///
/// Horizontally the view always lands on a sticky edge, half its short side past it, so the
/// follow-up docking settles it back inside. Vertically it travels the projected distance.
pub fn fling_target(
    position: Point,
    size: Size,
    screen: Size,
    bounds: &dyn StickyBounds,
    velocity: Point,
) -> Point {
    let secs = FLING_DURATION.as_secs_f64();
    let dx = velocity.x * secs;
    let dy = velocity.y * secs;
    let overrun = size.width.min(size.height) / 2.0;

    let x = if dx + position.x > screen.width / 2.0 {
        bounds.sticky_right(screen.width) + overrun
    } else {
        bounds.sticky_left(screen.width) - overrun
    };
    Point::new(x, position.y + dy)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FlingAnimation {
    x: Tween,
    y: Tween,
}

impl FlingAnimation {
    pub fn new(from: Point, to: Point) -> Self {
        let mut x = Tween::new(from.x).with_easing(Easing::Decelerate);
        let mut y = Tween::new(from.y).with_easing(Easing::Decelerate);
        x.start(from.x, to.x, FLING_DURATION);
        y.start(from.y, to.y, FLING_DURATION);
        Self { x, y }
    }

    pub fn step(&mut self, elapsed: Duration) -> (Point, bool) {
        let done = self.x.advance(elapsed) | self.y.advance(elapsed);
        (Point::new(self.x.value(), self.y.value()), done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::touch::bounds::{BoundsPolicy, EdgeOffset, Footprint};

    #[test]
    fn test_fling_lands_on_projected_side() {
        let policy = BoundsPolicy::new(Footprint::Button { radius: 50.0 }, EdgeOffset::default());
        let screen = Size::new(1000.0, 2000.0);
        let size = Size::new(200.0, 200.0);

        // started on the left half, thrown hard to the right
        let target = fling_target(
            Point::new(100.0, 600.0),
            size,
            screen,
            &policy,
            Point::new(3000.0, -500.0),
        );
        assert_eq!(target, Point::new(950.0, 500.0));

        let target = fling_target(
            Point::new(700.0, 600.0),
            size,
            screen,
            &policy,
            Point::new(-4000.0, 0.0),
        );
        assert_eq!(target, Point::new(-150.0, 600.0));
    }

    #[test]
    fn test_step_decelerates() {
        let mut anim = FlingAnimation::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (first, _) = anim.step(Duration::from_millis(50));
        let (second, _) = anim.step(Duration::from_millis(50));
        assert!(first.x > second.x - first.x);
        let (last, done) = anim.step(Duration::from_millis(100));
        assert!(done);
        assert_eq!(last.x, 100.0);
    }
}
