use serde::{Deserialize, Serialize};

/// Sticky edges a floating view docks against, in window-origin coordinates.
pub trait StickyBounds {
    fn sticky_left(&self, screen_width: f64) -> f64;

    fn sticky_right(&self, screen_width: f64) -> f64;

    fn sticky_top(&self, screen_height: f64) -> f64;

    fn sticky_bottom(&self, screen_height: f64) -> f64;
}

/// Shape of a floating surface relative to its window origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Footprint {
    /// Circle of `radius` centred in a `4 * radius` square surface.
    Button { radius: f64 },
    /// Pill of `width x 2 * radius` starting `radius` below the surface top.
    Strip { radius: f64, width: f64 },
}

impl Footprint {
    fn left(&self, _screen_width: f64) -> f64 {
        match *self {
            Self::Button { radius } => -radius,
            Self::Strip { .. } => 0.0,
        }
    }

    fn right(&self, screen_width: f64) -> f64 {
        match *self {
            Self::Button { radius } => screen_width - radius * 3.0,
            Self::Strip { width, .. } => screen_width - width,
        }
    }

    fn top(&self, _screen_height: f64) -> f64 {
        match *self {
            Self::Button { radius } | Self::Strip { radius, .. } => -radius,
        }
    }

    fn bottom(&self, screen_height: f64) -> f64 {
        match *self {
            Self::Button { radius } | Self::Strip { radius, .. } => screen_height - radius * 3.0,
        }
    }
}

/// Pixel inset from the screen edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeOffset {
    pub x: f64,
    pub y: f64,
}

impl EdgeOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A footprint's sticky edges pulled inwards by an edge offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsPolicy {
    pub footprint: Footprint,
    pub offset: EdgeOffset,
}

impl BoundsPolicy {
    pub fn new(footprint: Footprint, offset: EdgeOffset) -> Self {
        Self { footprint, offset }
    }
}

impl StickyBounds for BoundsPolicy {
    fn sticky_left(&self, screen_width: f64) -> f64 {
        self.footprint.left(screen_width) + self.offset.x
    }

    fn sticky_right(&self, screen_width: f64) -> f64 {
        self.footprint.right(screen_width) - self.offset.x
    }

    fn sticky_top(&self, screen_height: f64) -> f64 {
        self.footprint.top(screen_height) + self.offset.y
    }

    fn sticky_bottom(&self, screen_height: f64) -> f64 {
        self.footprint.bottom(screen_height) - self.offset.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_policy_edges() {
        let policy = BoundsPolicy::new(Footprint::Button { radius: 50.0 }, EdgeOffset::new(10.0, 20.0));
        assert_eq!(policy.sticky_left(1000.0), -40.0);
        assert_eq!(policy.sticky_right(1000.0), 840.0);
        assert_eq!(policy.sticky_top(2000.0), -30.0);
        assert_eq!(policy.sticky_bottom(2000.0), 1830.0);
    }

    #[test]
    fn test_strip_policy_edges() {
        let policy = BoundsPolicy::new(
            Footprint::Strip {
                radius: 50.0,
                width: 500.0,
            },
            EdgeOffset::new(8.0, 0.0),
        );
        assert_eq!(policy.sticky_left(1000.0), 8.0);
        assert_eq!(policy.sticky_right(1000.0), 492.0);
        assert_eq!(policy.sticky_top(2000.0), -50.0);
        assert_eq!(policy.sticky_bottom(2000.0), 1850.0);
    }
}
