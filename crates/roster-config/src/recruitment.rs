//! Recruitment window and estimator settings.

use chrono::Duration;
use roster_core::controller::{DEFAULT_WINDOW_HOURS, RecruitmentPolicy};
use roster_core::conversion::{ConversionEstimator, DEFAULT_CONVERSION_RATE};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
const fn default_window_hours() -> u32 {
    DEFAULT_WINDOW_HOURS as u32
}

/// Waitlist size assumed when a study is initialized without one.
const fn default_waitlist() -> u32 {
    50
}

const fn default_fallback_conversion_rate() -> f64 {
    DEFAULT_CONVERSION_RATE
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecruitmentConfig {
    /// Length of each recruitment window, in hours.
    #[serde(default = "default_window_hours")]
    pub window_hours: u32,

    /// Waitlist count used by `initialize_study` when the caller omits one.
    #[serde(default = "default_waitlist")]
    pub default_waitlist: u32,

    /// Conversion rate reported before any window has closed.
    #[serde(default = "default_fallback_conversion_rate")]
    pub fallback_conversion_rate: f64,
}

impl Default for RecruitmentConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            default_waitlist: default_waitlist(),
            fallback_conversion_rate: default_fallback_conversion_rate(),
        }
    }
}

impl RecruitmentConfig {
    /// Build the reducer policy, validating the configured values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero window or a fallback
    /// rate outside `[0, 1]`.
    pub fn policy(&self) -> Result<RecruitmentPolicy, ConfigError> {
        if self.window_hours == 0 {
            return Err(ConfigError::InvalidValue {
                field: "recruitment.window_hours".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.fallback_conversion_rate) {
            return Err(ConfigError::InvalidValue {
                field: "recruitment.fallback_conversion_rate".into(),
                reason: format!("{} is not within [0, 1]", self.fallback_conversion_rate),
            });
        }

        Ok(RecruitmentPolicy {
            window_duration: Duration::hours(i64::from(self.window_hours)),
            estimator: ConversionEstimator::with_fallback(self.fallback_conversion_rate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_core_policy() {
        let config = RecruitmentConfig::default();
        assert_eq!(config.window_hours, 24);
        assert_eq!(config.default_waitlist, 50);
        assert_eq!(config.policy().unwrap(), RecruitmentPolicy::default());
    }

    #[test]
    fn zero_window_is_invalid() {
        let config = RecruitmentConfig {
            window_hours: 0,
            ..RecruitmentConfig::default()
        };
        assert!(matches!(
            config.policy(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn fallback_rate_must_be_a_ratio() {
        let config = RecruitmentConfig {
            fallback_conversion_rate: 1.5,
            ..RecruitmentConfig::default()
        };
        assert!(matches!(
            config.policy(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
