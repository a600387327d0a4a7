//! The canonical input record.
//!
//! Every derivation step downstream of the normalizer assumes all of these
//! fields are present and the counters are non-negative.

use crate::types::CampaignId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fields a raw input row must carry to be accepted.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "campaign_id",
    "reporting_start",
    "reporting_end",
    "impressions",
    "clicks",
    "spent",
    "total_conversion",
    "approved_conversion",
    "age",
    "gender",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub campaign_id: CampaignId,
    pub reporting_start: NaiveDate,
    pub reporting_end: NaiveDate,
    pub impressions: f64,
    pub clicks: f64,
    pub spent: f64,
    pub total_conversion: f64,
    pub approved_conversion: f64,
    /// Age bracket label, e.g. "30-34", or "Unknown".
    pub age: String,
    /// Gender code, e.g. "M", or "Unknown".
    pub gender: String,
}

impl CampaignRecord {
    /// Length of the reporting window in days. Negative when the window is
    /// inverted; such records pass through untouched.
    pub fn campaign_duration_days(&self) -> i64 {
        (self.reporting_end - self.reporting_start).num_days()
    }
}

/// Clamp a raw counter into the engine's domain: non-finite and negative
/// values collapse to zero so they cannot poison a group sum.
pub fn sanitize_counter(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
