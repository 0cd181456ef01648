use std::f64::consts::FRAC_PI_2;

use foundation::time::Time;

use crate::batch::Channel;

pub const DEFAULT_TRANSITION_S: f64 = 1.0;

/// Time-based crossfade between the two height channels.
///
/// `incoming` is the channel the current transition is heading to; the next
/// statistics refresh writes the other one.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphAnimator {
    incoming: Channel,
    start: Time,
    duration_s: f64,
    from: f64,
    blend: f64,
}

impl Default for MorphAnimator {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSITION_S)
    }
}

impl MorphAnimator {
    pub fn new(duration_s: f64) -> Self {
        Self {
            incoming: Channel::A,
            start: Time::ZERO,
            duration_s,
            from: 0.0,
            blend: 0.0,
        }
    }

    pub fn blend(&self) -> f64 {
        self.blend
    }

    pub fn incoming(&self) -> Channel {
        self.incoming
    }

    /// Channel the next refresh must write into.
    pub fn next_channel(&self) -> Channel {
        self.incoming.other()
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }

    /// Flips to the next channel and restarts the timer from the current
    /// blend. Returns the channel that now receives values.
    pub fn begin_transition(&mut self, now: Time) -> Channel {
        self.incoming = self.incoming.other();
        self.start = now;
        self.from = self.blend;
        self.incoming
    }

    pub fn is_settled(&self) -> bool {
        self.blend == self.incoming.blend_target()
    }

    pub fn tick(&mut self, now: Time) -> f64 {
        let to = self.incoming.blend_target();
        let t = if self.duration_s > 0.0 {
            (now.since(self.start) / self.duration_s).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.blend = if t >= 1.0 {
            to
        } else {
            self.from + (to - self.from) * (t * FRAC_PI_2).sin()
        };
        self.blend
    }
}

#[cfg(test)]
mod tests {
    use super::MorphAnimator;
    use crate::batch::Channel;
    use foundation::time::Time;

    #[test]
    fn first_refresh_targets_channel_b() {
        let mut m = MorphAnimator::default();
        assert_eq!(m.next_channel(), Channel::B);
        assert_eq!(m.begin_transition(Time(0.0)), Channel::B);
        assert_eq!(m.tick(Time(0.0)), 0.0);
        assert_eq!(m.tick(Time(1.0)), 1.0);
        assert!(m.is_settled());
    }

    #[test]
    fn blend_is_monotonic_and_exact_at_end() {
        let mut m = MorphAnimator::new(1.0);
        m.begin_transition(Time(10.0));
        let mut prev = 0.0;
        for i in 0..=20 {
            let b = m.tick(Time(10.0 + i as f64 * 0.05));
            assert!(b >= prev, "step {i}: {b} < {prev}");
            prev = b;
        }
        assert_eq!(m.tick(Time(11.0)), 1.0);
        assert_eq!(m.tick(Time(42.0)), 1.0);

        m.begin_transition(Time(50.0));
        let mut prev = 1.0;
        for i in 0..=20 {
            let b = m.tick(Time(50.0 + i as f64 * 0.05));
            assert!(b <= prev);
            prev = b;
        }
        assert_eq!(prev, 0.0);
    }

    #[test]
    fn mid_transition_refresh_restarts_from_partial_blend() {
        let mut m = MorphAnimator::new(1.0);
        m.begin_transition(Time(0.0));
        let partial = m.tick(Time(0.5));
        assert!(partial > 0.0 && partial < 1.0);

        assert_eq!(m.begin_transition(Time(0.5)), Channel::A);
        assert_eq!(m.tick(Time(0.5)), partial);
        let later = m.tick(Time(0.75));
        assert!(later < partial && later > 0.0);
        assert_eq!(m.tick(Time(1.5)), 0.0);
    }

    #[test]
    fn clock_going_backwards_holds_start() {
        let mut m = MorphAnimator::new(1.0);
        m.begin_transition(Time(5.0));
        assert_eq!(m.tick(Time(4.0)), 0.0);
    }
}
