//! Configuration for the placement engine.

use crate::error::TimetableError;

/// Largest hour domain the calendar accepts.
pub const MAX_HOURS_PER_DAY: u8 = 24;

/// Tunables for one placement run.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Size of the hour domain: hours are numbered `1..=hours_per_day`
    pub hours_per_day: u8,
    /// Iteration cap for the conflict-driven repair phase
    pub max_repair_iterations: usize,
    /// Only the first N teachers of the workload ranking count as "most
    /// constrained" during the greedy phase (None = every ranked teacher)
    pub constrained_teacher_limit: Option<usize>,
    /// Teachers without any availability records inherit the school hours
    pub inherit_school_hours: bool,
    /// Wall clock budget for the repair phase in milliseconds.
    /// Runs that hit it are no longer reproducible.
    pub repair_time_budget_ms: Option<u64>,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hours_per_day: 10,
            max_repair_iterations: 100,
            constrained_teacher_limit: None,
            inherit_school_hours: false,
            repair_time_budget_ms: None,
            verbosity: 0,
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.hours_per_day == 0 || self.hours_per_day > MAX_HOURS_PER_DAY {
            return Err(TimetableError::InvalidConfig(format!(
                "hours_per_day must be within 1..={}, got {}",
                MAX_HOURS_PER_DAY, self.hours_per_day
            )));
        }
        if self.constrained_teacher_limit == Some(0) {
            return Err(TimetableError::InvalidConfig(
                "constrained_teacher_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hours_per_day, 10);
        assert_eq!(config.max_repair_iterations, 100);
    }

    #[test]
    fn test_rejects_empty_hour_domain() {
        let config = EngineConfig {
            hours_per_day: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TimetableError::InvalidConfig(_))
        ));

        let config = EngineConfig {
            hours_per_day: 25,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_teacher_limit() {
        let config = EngineConfig {
            constrained_teacher_limit: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
