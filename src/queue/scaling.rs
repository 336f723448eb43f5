//! Auto-scaling of the effective queue depth
//!
//! The scaler only counts evaluations and proposes a new depth; the queue
//! applies it and reports it. Counters reset whenever a streak breaks or a
//! resize is proposed.

use crate::queue::config::AutoScalingPolicy;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ScalingDirection {
    Grow,
    Shrink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScalingDecision {
    Hold,
    Resize {
        from: usize,
        to: usize,
        direction: ScalingDirection,
    },
}

#[derive(Debug, Default)]
pub(crate) struct AutoScaler {
    consecutive_pressure: usize,
    consecutive_idle: usize,
}

impl AutoScaler {
    /// Record one evaluation and decide whether the depth should change
    ///
    /// `base_depth` is the configured depth; the result never goes below it
    /// nor above the policy ceiling.
    pub(crate) fn observe(
        &mut self,
        policy: &AutoScalingPolicy,
        base_depth: usize,
        current_depth: usize,
        len: usize,
        pressured: bool,
    ) -> ScalingDecision {
        if pressured {
            self.consecutive_idle = 0;
            self.consecutive_pressure += 1;
            if self.consecutive_pressure < policy.pressure_window() {
                return ScalingDecision::Hold;
            }
            self.consecutive_pressure = 0;

            let target = grown_depth(current_depth, policy.growth_factor())
                .min(policy.max_scaled_depth());
            return resize(current_depth, target, ScalingDirection::Grow);
        }

        self.consecutive_pressure = 0;

        let idle = current_depth > base_depth
            && (len as f64) <= (current_depth as f64) * policy.low_watermark();
        if !idle {
            self.consecutive_idle = 0;
            return ScalingDecision::Hold;
        }

        self.consecutive_idle += 1;
        if self.consecutive_idle < policy.idle_window() {
            return ScalingDecision::Hold;
        }
        self.consecutive_idle = 0;

        let target = shrunk_depth(current_depth, policy.growth_factor()).max(base_depth);
        resize(current_depth, target, ScalingDirection::Shrink)
    }

    #[cfg(test)]
    pub(crate) fn streaks(&self) -> (usize, usize) {
        (self.consecutive_pressure, self.consecutive_idle)
    }
}

fn resize(from: usize, to: usize, direction: ScalingDirection) -> ScalingDecision {
    if from == to {
        ScalingDecision::Hold
    } else {
        ScalingDecision::Resize {
            from,
            to,
            direction,
        }
    }
}

// Always at least one slot larger, so small depths still grow.
fn grown_depth(current: usize, factor: f64) -> usize {
    let scaled = ((current as f64) * factor).ceil() as usize;
    scaled.max(current.saturating_add(1))
}

fn shrunk_depth(current: usize, factor: f64) -> usize {
    ((current as f64) / factor).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::config::QueueSettings;

    fn policy() -> AutoScalingPolicy {
        QueueSettings {
            max_queue_depth: 10,
            ..QueueSettings::default()
        }
        .validate()
        .unwrap()
        .auto_scaling()
        .clone()
    }

    #[test]
    fn test_grows_after_pressure_window() {
        let policy = policy();
        let mut scaler = AutoScaler::default();

        assert_eq!(scaler.observe(&policy, 10, 10, 11, true), ScalingDecision::Hold);
        assert_eq!(scaler.observe(&policy, 10, 10, 12, true), ScalingDecision::Hold);
        assert_eq!(
            scaler.observe(&policy, 10, 10, 13, true),
            ScalingDecision::Resize {
                from: 10,
                to: 15,
                direction: ScalingDirection::Grow
            }
        );
        assert_eq!(scaler.streaks(), (0, 0));
    }

    #[test]
    fn test_broken_streak_resets_pressure() {
        let policy = policy();
        let mut scaler = AutoScaler::default();

        scaler.observe(&policy, 10, 10, 11, true);
        scaler.observe(&policy, 10, 10, 11, true);
        scaler.observe(&policy, 10, 10, 5, false);
        assert_eq!(scaler.observe(&policy, 10, 10, 11, true), ScalingDecision::Hold);
    }

    #[test]
    fn test_growth_is_capped() {
        let policy = policy();
        let mut scaler = AutoScaler::default();

        for _ in 0..2 {
            scaler.observe(&policy, 10, 38, 50, true);
        }
        assert_eq!(
            scaler.observe(&policy, 10, 38, 50, true),
            ScalingDecision::Resize {
                from: 38,
                to: 40,
                direction: ScalingDirection::Grow
            }
        );

        for _ in 0..2 {
            scaler.observe(&policy, 10, 40, 50, true);
        }
        assert_eq!(scaler.observe(&policy, 10, 40, 50, true), ScalingDecision::Hold);
    }

    #[test]
    fn test_shrinks_after_idle_window_but_not_below_base() {
        let policy = policy();
        let mut scaler = AutoScaler::default();

        for _ in 0..4 {
            assert_eq!(scaler.observe(&policy, 10, 12, 0, false), ScalingDecision::Hold);
        }
        assert_eq!(
            scaler.observe(&policy, 10, 12, 0, false),
            ScalingDecision::Resize {
                from: 12,
                to: 10,
                direction: ScalingDirection::Shrink
            }
        );
    }

    #[test]
    fn test_never_shrinks_at_base_depth() {
        let policy = policy();
        let mut scaler = AutoScaler::default();

        for _ in 0..20 {
            assert_eq!(scaler.observe(&policy, 10, 10, 0, false), ScalingDecision::Hold);
        }
    }

    #[test]
    fn test_grown_depth_always_increases() {
        assert_eq!(grown_depth(1, 1.01), 2);
        assert_eq!(grown_depth(5, 1.5), 8);
        assert_eq!(shrunk_depth(8, 1.5), 5);
    }
}
