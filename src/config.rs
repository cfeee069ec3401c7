//! Scoring engine configuration

use thiserror::Error;

/// Points for a full production-range match
pub const PRODUCTION_WEIGHT: u8 = 25;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("minimum score must be between 0 and 100, got {0}")]
    MinimumScore(u8),

    #[error("production tolerance must be in [0, 1), got {0}")]
    ProductionTolerance(f64),

    #[error("partial credit must not exceed {max}, got {value}")]
    PartialCredit { value: u8, max: u8 },
}

/// Tunables for [`crate::scoring::select`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringConfig {
    /// Entries scoring below this are dropped
    pub minimum_score: u8,
    /// Fraction outside the production range that still earns partial credit
    pub production_tolerance: f64,
    /// Points awarded inside the tolerance band
    pub partial_credit: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            minimum_score: 1,
            production_tolerance: 0.20,
            partial_credit: 10,
        }
    }
}

impl ScoringConfig {
    pub fn new(
        minimum_score: u8,
        production_tolerance: f64,
        partial_credit: u8,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            minimum_score,
            production_tolerance,
            partial_credit,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_score > 100 {
            return Err(ConfigError::MinimumScore(self.minimum_score));
        }
        if !(0.0..1.0).contains(&self.production_tolerance) {
            return Err(ConfigError::ProductionTolerance(self.production_tolerance));
        }
        if self.partial_credit > PRODUCTION_WEIGHT {
            return Err(ConfigError::PartialCredit {
                value: self.partial_credit,
                max: PRODUCTION_WEIGHT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert_eq!(
            ScoringConfig::new(101, 0.2, 10),
            Err(ConfigError::MinimumScore(101))
        );
        assert_eq!(
            ScoringConfig::new(1, 1.0, 10),
            Err(ConfigError::ProductionTolerance(1.0))
        );
        assert!(matches!(
            ScoringConfig::new(1, f64::NAN, 10),
            Err(ConfigError::ProductionTolerance(_))
        ));
        assert_eq!(
            ScoringConfig::new(1, 0.2, 30),
            Err(ConfigError::PartialCredit { value: 30, max: 25 })
        );
    }
}
