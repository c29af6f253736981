use std::time::Duration;

use recall_core::config::{IntervalPreset, SchedulerConfig};

use crate::error::{Result, SchedulerError};

/// Number of reminder steps in a chain.
pub const STEP_COUNT: usize = 6;
/// Step every new chain starts at.
pub const FIRST_STEP: u8 = 1;
/// Step value that means "no further reminder".
pub const TERMINAL_STEP: u8 = 7;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Maps a step index to the delay before that step's firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalPolicy {
    delays: [Duration; STEP_COUNT],
}

impl IntervalPolicy {
    /// 1 hour, 1 day, 3 days, 1 week, 2 weeks, 4 weeks.
    pub fn production() -> Self {
        Self::from_secs([HOUR, DAY, 3 * DAY, WEEK, 2 * WEEK, 4 * WEEK])
    }

    /// Second-scale sequence for watching a full chain complete in under two minutes.
    pub fn staging() -> Self {
        Self::from_secs([10, 11, 13, 14, 20, 24])
    }

    /// Build a policy from exactly six strictly increasing, non-zero delays.
    pub fn custom(delays: &[Duration]) -> Result<Self> {
        let delays: [Duration; STEP_COUNT] = delays.try_into().map_err(|_| {
            SchedulerError::InvalidIntervals(format!(
                "expected {STEP_COUNT} delays, got {}",
                delays.len()
            ))
        })?;
        if delays[0].is_zero() {
            return Err(SchedulerError::InvalidIntervals(
                "first delay must be greater than zero".to_string(),
            ));
        }
        if let Some(i) = delays.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SchedulerError::InvalidIntervals(format!(
                "delay for step {} is not longer than step {}",
                i + 2,
                i + 1
            )));
        }
        Ok(Self { delays })
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        match config.intervals {
            IntervalPreset::Production => Ok(Self::production()),
            IntervalPreset::Staging => Ok(Self::staging()),
            IntervalPreset::Custom => {
                let delays: Vec<Duration> =
                    config.custom.iter().copied().map(Duration::from_secs).collect();
                Self::custom(&delays)
            }
        }
    }

    /// Delay before the firing of `step`.
    ///
    /// Returns `None` for [`TERMINAL_STEP`] and for any step outside 1..=6.
    pub fn next_delay(&self, step: u8) -> Option<Duration> {
        match step {
            1..=6 => Some(self.delays[usize::from(step - 1)]),
            _ => None,
        }
    }

    /// Time from registration to the terminal firing.
    pub fn chain_length(&self) -> Duration {
        self.delays.iter().sum()
    }

    fn from_secs(secs: [u64; STEP_COUNT]) -> Self {
        Self {
            delays: secs.map(Duration::from_secs),
        }
    }
}

impl Default for IntervalPolicy {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strictly_increasing(policy: &IntervalPolicy) {
        let delays: Vec<Duration> = (1..=6).filter_map(|s| policy.next_delay(s)).collect();
        assert_eq!(delays.len(), STEP_COUNT);
        assert!(delays.windows(2).all(|w| w[0] < w[1]), "{delays:?}");
    }

    #[test]
    fn production_matches_design_values() {
        let p = IntervalPolicy::production();
        assert_eq!(p.next_delay(1), Some(Duration::from_secs(3_600)));
        assert_eq!(p.next_delay(2), Some(Duration::from_secs(86_400)));
        assert_eq!(p.next_delay(3), Some(Duration::from_secs(3 * 86_400)));
        assert_eq!(p.next_delay(4), Some(Duration::from_secs(7 * 86_400)));
        assert_eq!(p.next_delay(5), Some(Duration::from_secs(14 * 86_400)));
        assert_eq!(p.next_delay(6), Some(Duration::from_secs(28 * 86_400)));
        assert_strictly_increasing(&p);
    }

    #[test]
    fn staging_is_strictly_increasing() {
        assert_strictly_increasing(&IntervalPolicy::staging());
    }

    #[test]
    fn terminal_and_unknown_steps_return_none() {
        let p = IntervalPolicy::production();
        assert_eq!(p.next_delay(TERMINAL_STEP), None);
        assert_eq!(p.next_delay(0), None);
        assert_eq!(p.next_delay(8), None);
        assert_eq!(p.next_delay(u8::MAX), None);
    }

    #[test]
    fn custom_rejects_wrong_length() {
        let delays = vec![Duration::from_secs(1); 5];
        assert!(IntervalPolicy::custom(&delays).is_err());
    }

    #[test]
    fn custom_rejects_non_increasing() {
        let delays: Vec<Duration> = [1, 2, 3, 3, 5, 6].map(Duration::from_secs).to_vec();
        let err = IntervalPolicy::custom(&delays).unwrap_err();
        assert!(err.to_string().contains("step 4"), "{err}");
    }

    #[test]
    fn custom_rejects_zero_first_delay() {
        let delays: Vec<Duration> = [0, 2, 3, 4, 5, 6].map(Duration::from_secs).to_vec();
        assert!(IntervalPolicy::custom(&delays).is_err());
    }

    #[test]
    fn from_config_builds_custom_sequence() {
        let config = SchedulerConfig {
            intervals: IntervalPreset::Custom,
            custom: vec![1, 2, 4, 8, 16, 32],
        };
        let p = IntervalPolicy::from_config(&config).unwrap();
        assert_eq!(p.next_delay(6), Some(Duration::from_secs(32)));
        assert_eq!(p.chain_length(), Duration::from_secs(63));
    }

    #[test]
    fn from_config_defaults_to_production() {
        let p = IntervalPolicy::from_config(&SchedulerConfig::default()).unwrap();
        assert_eq!(p, IntervalPolicy::production());
    }
}
