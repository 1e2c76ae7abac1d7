//! Animation timing.
//!
//! A [`Clock`] is a shared handle to the current animation time. It only
//! moves when the event loop advances it, so everything downstream (value
//! interpolation, transition completion, the inter-step delay) is a pure
//! function of the last `advance_to()` call. Tests drive the clock by hand.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use keyframe::functions::{EaseInOutCubic, Linear};
use keyframe::EasingFunction;

/// Shared monotonic time source for animations.
///
/// Cloning returns a handle to the same underlying time; two clocks compare
/// equal when they share it.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    inner: Rc<RefCell<ClockInner>>,
}

#[derive(Debug, Default)]
struct ClockInner {
    /// Unadjusted time of the last `advance_to()`.
    raw: Duration,
    /// Rate-adjusted time handed out to animations.
    adjusted: Duration,
    /// Multiplier applied to raw time deltas; `0.5` runs animations at half
    /// speed.
    rate: Option<f64>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current rate-adjusted time.
    pub fn now(&self) -> Duration {
        self.inner.borrow().adjusted
    }

    /// Moves the clock forward to a new raw timestamp.
    ///
    /// Going backwards is clamped to no movement; the adjusted time never
    /// decreases.
    pub fn advance_to(&self, raw: Duration) {
        let mut inner = self.inner.borrow_mut();
        let delta = raw.saturating_sub(inner.raw);
        inner.raw = raw;
        let delta = match inner.rate {
            Some(rate) => delta.mul_f64(rate),
            None => delta,
        };
        inner.adjusted += delta;
    }

    /// Sets the rate applied to subsequent raw deltas.
    ///
    /// Already-elapsed time is unaffected, so changing the rate mid-flight
    /// never makes animations jump.
    pub fn set_rate(&self, rate: f64) {
        self.inner.borrow_mut().rate = Some(rate.max(0.));
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Clock {}

/// Easing curve of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Linear,
    /// Cubic ease-in/ease-out, the banner's slide curve.
    EaseInOutCubic,
}

impl Curve {
    /// Maps linear progress `x` in [0, 1] to eased progress.
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Curve::Linear => Linear.y(x),
            Curve::EaseInOutCubic => EaseInOutCubic.y(x),
        }
    }
}

/// A value transitioning from one number to another over a fixed duration.
#[derive(Clone)]
pub struct Animation {
    clock: Clock,
    from: f64,
    to: f64,
    started_at: Duration,
    duration: Duration,
    curve: Curve,
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, duration: Duration, curve: Curve) -> Self {
        let started_at = clock.now();
        Self {
            clock,
            from,
            to,
            started_at,
            duration,
            curve,
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn is_done(&self) -> bool {
        self.clock.now() >= self.started_at + self.duration
    }

    /// Returns the current eased value.
    pub fn value(&self) -> f64 {
        if self.duration.is_zero() || self.is_done() {
            return self.to;
        }

        let passed = (self.clock.now() - self.started_at).as_secs_f64();
        let progress = passed / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * self.curve.apply(progress)
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("started_at", &self.started_at)
            .field("duration", &self.duration)
            .field("curve", &self.curve)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn clock_handles_share_time() {
        let clock = Clock::new();
        let other = clock.clone();
        clock.advance_to(Duration::from_millis(250));
        assert_eq!(other.now(), Duration::from_millis(250));
        assert_eq!(clock, other);
        assert_ne!(clock, Clock::new());
    }

    #[test]
    fn clock_never_goes_backwards() {
        let clock = Clock::new();
        clock.advance_to(Duration::from_millis(100));
        clock.advance_to(Duration::from_millis(40));
        assert_eq!(clock.now(), Duration::from_millis(100));
    }

    #[test]
    fn rate_slows_subsequent_deltas_only() {
        let clock = Clock::new();
        clock.advance_to(Duration::from_millis(100));
        clock.set_rate(0.5);
        clock.advance_to(Duration::from_millis(300));
        assert_eq!(clock.now(), Duration::from_millis(200));
    }

    #[test]
    fn curve_endpoints() {
        for curve in [Curve::Linear, Curve::EaseInOutCubic] {
            assert_abs_diff_eq!(curve.apply(0.), 0., epsilon = 1e-9);
            assert_abs_diff_eq!(curve.apply(1.), 1., epsilon = 1e-9);
        }
        // Symmetric around the midpoint.
        assert_abs_diff_eq!(Curve::EaseInOutCubic.apply(0.5), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn animation_interpolates_and_completes() {
        let clock = Clock::new();
        let anim = Animation::new(
            clock.clone(),
            0.,
            100.,
            Duration::from_millis(1000),
            Curve::Linear,
        );

        assert_abs_diff_eq!(anim.value(), 0.);
        assert!(!anim.is_done());

        clock.advance_to(Duration::from_millis(500));
        assert_abs_diff_eq!(anim.value(), 50.);

        clock.advance_to(Duration::from_millis(1000));
        assert!(anim.is_done());
        assert_abs_diff_eq!(anim.value(), 100.);

        clock.advance_to(Duration::from_millis(5000));
        assert_abs_diff_eq!(anim.value(), 100.);
    }

    #[test]
    fn zero_duration_is_instantly_done() {
        let anim = Animation::new(Clock::new(), 3., 7., Duration::ZERO, Curve::EaseInOutCubic);
        assert!(anim.is_done());
        assert_abs_diff_eq!(anim.value(), 7.);
    }
}
