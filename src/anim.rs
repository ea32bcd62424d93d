//! Time-driven value tweens.
//!
//! A [`Tween`] owns no clock; the host's frame loop feeds it elapsed time.

use std::time::Duration;

/// Nominal duration of one frame-unit used to express keyframe timelines.
pub const FRAME_SPEED: Duration = Duration::from_millis(70);

pub const fn frames(count: u32) -> Duration {
    Duration::from_millis(FRAME_SPEED.as_millis() as u64 * count as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    Decelerate,
    Overshoot,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::Decelerate => crate::math::decelerate(t),
            Self::Overshoot => crate::math::overshoot(t, crate::math::OVERSHOOT_TENSION),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
    running: bool,
    value: f64,
}

impl Tween {
    pub fn new(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            easing: Easing::Linear,
            running: false,
            value,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Restarts from `from` towards `to`; a running tween is replaced.
    pub fn start(&mut self, from: f64, to: f64, duration: Duration) {
        self.from = from;
        self.to = to;
        self.duration = duration;
        self.elapsed = Duration::ZERO;
        self.value = from;
        self.running = true;
    }

    /// Starts only when idle, returning whether it started.
    pub fn try_start(&mut self, from: f64, to: f64, duration: Duration) -> bool {
        if self.running {
            return false;
        }
        self.start(from, to, duration);
        true
    }

    /// Stops where it is.
    pub fn cancel(&mut self) {
        self.running = false;
    }

    /// Jumps to `value` without animating.
    pub fn set(&mut self, value: f64) {
        self.running = false;
        self.value = value;
        self.from = value;
        self.to = value;
    }

    /// Returns true on the tick the tween reaches its end.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += elapsed;
        if self.elapsed >= self.duration {
            self.value = self.to;
            self.running = false;
            return true;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.value = self.from + (self.to - self.from) * self.easing.apply(t);
        false
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames() {
        assert_eq!(frames(34), Duration::from_millis(2380));
        assert_eq!(frames(0), Duration::ZERO);
    }

    #[test]
    fn test_tween_reaches_target_exactly() {
        let mut tween = Tween::new(0.1);
        tween.start(0.1, 0.3, Duration::from_millis(100));
        assert!(!tween.advance(Duration::from_millis(40)));
        assert!(tween.value() > 0.1 && tween.value() < 0.3);
        assert!(tween.advance(Duration::from_millis(80)));
        assert_eq!(tween.value(), 0.3);
        assert!(!tween.is_running());
        assert!(!tween.advance(Duration::from_millis(10)));
    }

    #[test]
    fn test_try_start_is_not_reentrant() {
        let mut tween = Tween::new(0.0);
        assert!(tween.try_start(0.0, 1.0, Duration::from_millis(50)));
        assert!(!tween.try_start(0.0, 5.0, Duration::from_millis(50)));
        tween.advance(Duration::from_millis(50));
        assert_eq!(tween.value(), 1.0);
    }

    #[test]
    fn test_easing_shapes_intermediate_values() {
        let mut linear = Tween::new(0.0);
        let mut eased = Tween::new(0.0).with_easing(Easing::Decelerate);
        linear.start(0.0, 100.0, Duration::from_millis(100));
        eased.start(0.0, 100.0, Duration::from_millis(100));
        linear.advance(Duration::from_millis(30));
        eased.advance(Duration::from_millis(30));
        assert!(eased.value() > linear.value());

        let mut bouncy = Tween::new(0.0).with_easing(Easing::Overshoot);
        bouncy.start(0.0, 100.0, Duration::from_millis(300));
        bouncy.advance(Duration::from_millis(210));
        assert!(bouncy.value() > 100.0);
        assert!(bouncy.advance(Duration::from_millis(90)));
        assert_eq!(bouncy.value(), 100.0);
    }

    #[test]
    fn test_zero_duration_completes_on_first_tick() {
        let mut tween = Tween::new(0.0);
        tween.start(0.0, 4.0, Duration::ZERO);
        assert!(tween.advance(Duration::ZERO));
        assert_eq!(tween.value(), 4.0);
    }
}
