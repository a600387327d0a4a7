use crate::{
    error::{RoiError, RoiResult},
    types::DEFAULT_CONVERSION_VALUE,
};
use serde::{Deserialize, Serialize};

/// ROAS cut points for the performance tiers. Each bound is the inclusive
/// lower edge of its tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    #[serde(default = "default_break_even")]
    pub break_even: f64,
    #[serde(default = "default_profitable")]
    pub profitable: f64,
    #[serde(default = "default_highly_profitable")]
    pub highly_profitable: f64,
}

fn default_break_even() -> f64 {
    1.0
}

fn default_profitable() -> f64 {
    2.0
}

fn default_highly_profitable() -> f64 {
    5.0
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            break_even: default_break_even(),
            profitable: default_profitable(),
            highly_profitable: default_highly_profitable(),
        }
    }
}

fn default_conversion_value() -> f64 {
    DEFAULT_CONVERSION_VALUE
}

/// Run-wide engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Currency units of revenue per approved conversion.
    #[serde(default = "default_conversion_value")]
    pub conversion_value: f64,
    #[serde(default)]
    pub tier_thresholds: TierThresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conversion_value: DEFAULT_CONVERSION_VALUE,
            tier_thresholds: TierThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Load from `{data_dir}/engine_config.json`.
    /// In tests, use `EngineConfig::default()`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/engine_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_conversion_value(mut self, conversion_value: f64) -> Self {
        self.conversion_value = conversion_value;
        self
    }

    /// Reject values that would poison every revenue figure of the run.
    pub fn validate(&self) -> RoiResult<()> {
        if !self.conversion_value.is_finite() || self.conversion_value < 0.0 {
            return Err(RoiError::InvalidConfig {
                reason: format!(
                    "conversion_value must be finite and non-negative, got {}",
                    self.conversion_value
                ),
            });
        }

        let t = &self.tier_thresholds;
        let all_finite = [t.break_even, t.profitable, t.highly_profitable]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite || !(t.break_even < t.profitable && t.profitable < t.highly_profitable) {
            return Err(RoiError::InvalidConfig {
                reason: format!(
                    "tier thresholds must be finite and strictly increasing, got {} / {} / {}",
                    t.break_even, t.profitable, t.highly_profitable
                ),
            });
        }

        Ok(())
    }
}
