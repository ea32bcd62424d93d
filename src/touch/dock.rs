use super::bounds::StickyBounds;
use crate::anim::{Easing, Tween};
use floatwm::{Point, Size};
use std::time::Duration;

pub const DOCK_DURATION: Duration = Duration::from_millis(300);

/// Identifies one docking request; reported back exactly once when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DockTicket(pub(crate) u64);

/// Where a view at `position` rests under `bounds`.
///
/// The horizontal edge follows the screen half holding the view's centre. The vertical
/// position only changes when it already lies outside the top/bottom edges.
pub fn dock_target(position: Point, size: Size, screen: Size, bounds: &dyn StickyBounds) -> Point {
    let cx = position.x + size.width / 2.0;
    let cy = position.y + size.height / 2.0;

    let x = if cx < screen.width / 2.0 {
        bounds.sticky_left(screen.width)
    } else {
        bounds.sticky_right(screen.width)
    };

    let top = bounds.sticky_top(screen.height);
    let bottom = bounds.sticky_bottom(screen.height);
    let y = if position.y > bottom || position.y < top {
        if cy < screen.height / 2.0 { top } else { bottom }
    } else {
        position.y
    };

    Point::new(x, y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DockAnimation {
    x: Tween,
    y: Tween,
    pub ticket: DockTicket,
}

impl DockAnimation {
    pub fn new(from: Point, to: Point, ticket: DockTicket) -> Self {
        let mut x = Tween::new(from.x).with_easing(Easing::Overshoot);
        let mut y = Tween::new(from.y).with_easing(Easing::Overshoot);
        x.start(from.x, to.x, DOCK_DURATION);
        y.start(from.y, to.y, DOCK_DURATION);
        Self { x, y, ticket }
    }

    /// Advances the animation, returning the new position and whether it finished.
    pub fn step(&mut self, elapsed: Duration) -> (Point, bool) {
        let done = self.x.advance(elapsed) | self.y.advance(elapsed);
        (Point::new(self.x.value(), self.y.value()), done)
    }
}
