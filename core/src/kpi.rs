//! KPI deriver: per-record ratios from raw counters.
//!
//! Zero-denominator policy:
//!   ctr, conversion_rate, approved_conversion_rate, cpm -> 0.0
//!   cost_per_acquisition                              -> None
//!
//! A 0% rate is a real business outcome. A cost per acquisition with
//! nothing acquired is not a number at all.

use crate::{dimension::DimensionTags, record::CampaignRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordKpis {
    pub ctr: f64,
    pub conversion_rate: f64,
    pub approved_conversion_rate: f64,
    pub cpm: f64,
    pub cost_per_acquisition: Option<f64>,
}

impl RecordKpis {
    pub fn derive(record: &CampaignRecord) -> Self {
        Self {
            ctr: rate(record.clicks, record.impressions),
            conversion_rate: rate(record.total_conversion, record.clicks),
            approved_conversion_rate: rate(record.approved_conversion, record.total_conversion),
            cpm: rate(record.spent, record.impressions) * 1000.0,
            cost_per_acquisition: ratio(record.spent, record.approved_conversion),
        }
    }
}

/// A canonical record with its KPIs and grouping keys attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedRecord {
    #[serde(flatten)]
    pub record: CampaignRecord,
    #[serde(flatten)]
    pub kpis: RecordKpis,
    #[serde(flatten)]
    pub tags: DimensionTags,
}

impl FeaturedRecord {
    pub fn build(record: CampaignRecord) -> Self {
        let kpis = RecordKpis::derive(&record);
        let tags = DimensionTags::derive(&record);
        Self { record, kpis, tags }
    }
}

/// Attach KPIs and dimension tags to every record. Input order is kept.
pub fn derive_features(records: Vec<CampaignRecord>) -> Vec<FeaturedRecord> {
    records.into_iter().map(FeaturedRecord::build).collect()
}

/// `numerator / denominator`, or 0.0 when the denominator is not positive.
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator).unwrap_or(0.0)
}

/// `numerator / denominator`, or `None` when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}
