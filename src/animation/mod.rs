//! Animations driven by a shared [`Clock`].

use std::time::Duration;

use keyframe::functions::{EaseIn, EaseInCubic, EaseInOut, EaseOut, EaseOutCubic, Linear};
use keyframe::EasingFunction;
use overview_config as config;
pub use overview_config::Curve;

mod clock;

pub use clock::Clock;

/// A single value moving from `from` to `to` over a fixed duration.
#[derive(Debug, Clone)]
pub struct Animation {
    from: f64,
    to: f64,
    duration: Duration,
    start_time: Duration,
    curve: Curve,
    clock: Clock,
}

impl Animation {
    pub fn new(clock: Clock, from: f64, to: f64, config: config::Animation) -> Self {
        let duration = if config.off || clock.should_complete_instantly() {
            Duration::ZERO
        } else {
            Duration::from_millis(u64::from(config.duration_ms))
        };
        Self::ease(clock, from, to, duration, config.curve)
    }

    pub fn ease(clock: Clock, from: f64, to: f64, duration: Duration, curve: Curve) -> Self {
        let start_time = clock.now();
        Self {
            from,
            to,
            duration,
            start_time,
            curve,
            clock,
        }
    }

    pub fn is_done(&self) -> bool {
        self.clock.now() >= self.start_time + self.duration
    }

    pub fn value(&self) -> f64 {
        if self.is_done() {
            return self.to;
        }

        let passed = self.clock.now().saturating_sub(self.start_time);
        let x = passed.as_secs_f64() / self.duration.as_secs_f64();
        let y = ease(self.curve, x.clamp(0., 1.));
        self.from + (self.to - self.from) * y
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

pub fn ease(curve: Curve, x: f64) -> f64 {
    match curve {
        Curve::Linear => Linear.y(x),
        Curve::EaseIn => EaseIn.y(x),
        Curve::EaseOut => EaseOut.y(x),
        Curve::EaseInOut => EaseInOut.y(x),
        Curve::FastOutLinearIn => EaseInCubic.y(x),
        Curve::EaseOutCubic => EaseOutCubic.y(x),
    }
}

/// What happens to an in-flight animation of the same property when a new one starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preemption {
    /// Start from the current animated value and head for the new target.
    #[default]
    ImmediatelyAnimateToNewTarget,
    /// Jump to the new target right away.
    ImmediatelySetNewTarget,
}

/// Parameters for a property change that the window system should animate.
///
/// Property setters take `Option<&AnimationSettings>`; `None` applies the change at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSettings {
    pub duration: Duration,
    pub curve: Curve,
    pub preemption: Preemption,
}

impl AnimationSettings {
    pub fn new(duration: Duration, curve: Curve) -> Self {
        Self {
            duration,
            curve,
            preemption: Preemption::default(),
        }
    }

    /// Returns `None` for a disabled preset.
    pub fn from_config(config: config::Animation) -> Option<Self> {
        (!config.off).then(|| {
            Self::new(
                Duration::from_millis(u64::from(config.duration_ms)),
                config.curve,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn linear_animation_follows_clock() {
        let clock = Clock::with_time(Duration::ZERO);
        let anim = Animation::new(
            clock.clone(),
            0.,
            10.,
            config::Animation::new(200, Curve::Linear),
        );

        assert!(!anim.is_done());
        assert_abs_diff_eq!(anim.value(), 0., epsilon = 1e-6);

        clock.advance(Duration::from_millis(50));
        assert_abs_diff_eq!(anim.value(), 2.5, epsilon = 1e-6);

        clock.advance(Duration::from_millis(150));
        assert!(anim.is_done());
        assert_abs_diff_eq!(anim.value(), 10., epsilon = 1e-6);
    }

    #[test]
    fn disabled_animation_is_done_immediately() {
        let clock = Clock::with_time(Duration::ZERO);
        let mut config = config::Animation::new(200, Curve::EaseOut);
        config.off = true;
        let anim = Animation::new(clock, 1., 0., config);
        assert!(anim.is_done());
        assert_abs_diff_eq!(anim.value(), 0., epsilon = 1e-6);
    }

    #[test]
    fn complete_instantly_clock() {
        let clock = Clock::with_time(Duration::ZERO);
        clock.set_complete_instantly(true);
        let anim = Animation::new(clock, 0., 1., config::Animation::new(250, Curve::Linear));
        assert!(anim.is_done());
    }

    #[test]
    fn curves_hit_endpoints() {
        for curve in [
            Curve::Linear,
            Curve::EaseIn,
            Curve::EaseOut,
            Curve::EaseInOut,
            Curve::FastOutLinearIn,
            Curve::EaseOutCubic,
        ] {
            assert_abs_diff_eq!(ease(curve, 0.), 0., epsilon = 1e-2);
            assert_abs_diff_eq!(ease(curve, 1.), 1., epsilon = 1e-2);
        }
    }

    #[test]
    fn settings_from_disabled_preset() {
        let mut config = config::Animation::new(250, Curve::Linear);
        assert_eq!(
            AnimationSettings::from_config(config),
            Some(AnimationSettings::new(
                Duration::from_millis(250),
                Curve::Linear
            ))
        );
        config.off = true;
        assert_eq!(AnimationSettings::from_config(config), None);
    }
}
