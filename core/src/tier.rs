//! Performance tier classification on ROAS.

use crate::{aggregate::GroupTable, config::TierThresholds};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    /// ROAS could not be computed (zero spend).
    Undefined,
    LossMaking,
    BreakEven,
    Profitable,
    HighlyProfitable,
}

impl PerformanceTier {
    pub const ALL: [PerformanceTier; 5] = [
        Self::Undefined,
        Self::LossMaking,
        Self::BreakEven,
        Self::Profitable,
        Self::HighlyProfitable,
    ];

    /// Intervals are closed at the lower bound: roas == break_even is
    /// BreakEven, roas == highly_profitable is HighlyProfitable.
    pub fn classify(roas: Option<f64>, thresholds: &TierThresholds) -> Self {
        match roas {
            Some(r) if r.is_nan() => Self::Undefined,
            Some(r) if r < thresholds.break_even => Self::LossMaking,
            Some(r) if r < thresholds.profitable => Self::BreakEven,
            Some(r) if r < thresholds.highly_profitable => Self::Profitable,
            Some(_) => Self::HighlyProfitable,
            None => Self::Undefined,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::LossMaking => "Loss Making",
            Self::BreakEven => "Break Even",
            Self::Profitable => "Profitable",
            Self::HighlyProfitable => "Highly Profitable",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::LossMaking => "loss_making",
            Self::BreakEven => "break_even",
            Self::Profitable => "profitable",
            Self::HighlyProfitable => "highly_profitable",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Return the campaign table with a tier on every row.
pub fn assign_tiers(mut campaigns: GroupTable, thresholds: &TierThresholds) -> GroupTable {
    for row in &mut campaigns.rows {
        row.performance_tier = Some(PerformanceTier::classify(row.roas, thresholds));
    }
    campaigns
}
