//! Configuration for shepherd operations
//!
//! The two day thresholds are policy values with no baked-in default: they
//! must be supplied by the deployment, either programmatically or through
//! the daemon's configuration file.

use crate::ShepherdError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the shepherd service
///
/// `claim_expiry_days` should normally exceed `nudge_interval_days`, so a
/// claimant is reminded before the claim is taken away. The shepherd does
/// not enforce that ordering; when both thresholds are met a claim is
/// nudged and released in the same sweep.
///
/// # Examples
///
/// ```
/// use dibs_shepherd::ShepherdConfig;
///
/// let config = ShepherdConfig::new(7, 14).unwrap();
/// assert_eq!(config.sweep_interval_minutes, 60);
///
/// // Zero thresholds are rejected
/// assert!(ShepherdConfig::new(0, 14).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShepherdConfig {
    /// Days without a nudge (or since creation) before a reminder is due
    pub nudge_interval_days: u64,

    /// Days without activity before an active claim is auto-released
    pub claim_expiry_days: u64,

    /// How often to run the sweep cycle (in minutes)
    /// Default: every 60 minutes (hourly)
    #[serde(default = "default_sweep_interval_minutes")]
    pub sweep_interval_minutes: u64,

    /// Advisory wall-clock budget for one sweep (in seconds)
    ///
    /// When exhausted, the remaining claims are deferred to the next run.
    /// Unset means no budget.
    #[serde(default)]
    pub sweep_budget_secs: Option<u64>,
}

fn default_sweep_interval_minutes() -> u64 {
    60
}

impl ShepherdConfig {
    /// Create a configuration with the given day thresholds
    ///
    /// The sweep interval defaults to hourly and no sweep budget is set.
    pub fn new(nudge_interval_days: u64, claim_expiry_days: u64) -> Result<Self, ShepherdError> {
        let config = Self {
            nudge_interval_days,
            claim_expiry_days,
            sweep_interval_minutes: default_sweep_interval_minutes(),
            sweep_budget_secs: None,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate threshold and interval values
    ///
    /// Called by [`ShepherdConfig::new`]; deployments that deserialize a
    /// config must call it themselves.
    pub fn validate(&self) -> Result<(), ShepherdError> {
        if self.nudge_interval_days == 0 {
            return Err(ShepherdError::Config(
                "nudge_interval_days must be greater than zero".to_string(),
            ));
        }
        if self.claim_expiry_days == 0 {
            return Err(ShepherdError::Config(
                "claim_expiry_days must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval_minutes == 0 {
            return Err(ShepherdError::Config(
                "sweep_interval_minutes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_minutes * 60)
    }

    /// Get the per-sweep budget as Duration, if configured
    pub fn sweep_budget(&self) -> Option<Duration> {
        self.sweep_budget_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config() {
        let config = ShepherdConfig::new(7, 14).unwrap();
        assert_eq!(config.nudge_interval_days, 7);
        assert_eq!(config.claim_expiry_days, 14);
        assert_eq!(config.sweep_interval_minutes, 60);
        assert_eq!(config.sweep_budget_secs, None);
    }

    #[test]
    fn test_zero_thresholds_rejected() {
        assert!(ShepherdConfig::new(0, 14).is_err());
        assert!(ShepherdConfig::new(7, 0).is_err());

        let mut config = ShepherdConfig::new(7, 14).unwrap();
        config.sweep_interval_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_conversions() {
        let mut config = ShepherdConfig::new(7, 14).unwrap();
        assert_eq!(config.sweep_interval(), Duration::from_secs(60 * 60));
        assert_eq!(config.sweep_budget(), None);

        config.sweep_budget_secs = Some(30);
        assert_eq!(config.sweep_budget(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_serde_defaults() {
        // Thresholds are required; the sweep interval defaults to hourly
        let config: ShepherdConfig =
            serde_json::from_str(r#"{"nudge_interval_days": 7, "claim_expiry_days": 14}"#).unwrap();
        assert_eq!(config.sweep_interval_minutes, 60);
        assert_eq!(config.sweep_budget_secs, None);

        assert!(serde_json::from_str::<ShepherdConfig>(r#"{"nudge_interval_days": 7}"#).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut config = ShepherdConfig::new(3, 21).unwrap();
        config.sweep_budget_secs = Some(120);

        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: ShepherdConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(config.nudge_interval_days, deserialized.nudge_interval_days);
        assert_eq!(config.claim_expiry_days, deserialized.claim_expiry_days);
        assert_eq!(config.sweep_budget_secs, deserialized.sweep_budget_secs);
    }
}
