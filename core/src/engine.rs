//! The ROI engine: orchestrates one batch run.
//!
//! EXECUTION ORDER:
//!   1. Normalize raw rows            (run_raw only)
//!   2. Derive KPIs + dimension tags
//!   3. Overall metrics
//!   4. Campaign table -> tiers
//!   5. Demographic tables (gender, age_group, demographic_segment)
//!   6. Time tables (monthly, day_of_week)
//!
//! RULES:
//!   - Each step returns its output; nothing writes into shared state.
//!   - The six aggregation calls read the same featured records and are
//!     independent of each other.
//!   - Zero denominators are results, not errors.

use crate::{
    aggregate::{aggregate, overall},
    config::EngineConfig,
    dimension::Dimension,
    error::RoiResult,
    kpi::{derive_features, FeaturedRecord},
    normalize::{normalize_rows, RawRow},
    record::CampaignRecord,
    result_set::{DemographicMetrics, ResultSet, TimeMetrics},
    tier::assign_tiers,
    types::RunId,
};

pub struct RoiEngine {
    config: EngineConfig,
}

impl RoiEngine {
    /// Fails fast on an invalid config, before any record is touched.
    pub fn new(config: EngineConfig) -> RoiResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run over raw JSON rows. Schema errors abort the run.
    pub fn run_raw(&self, run_id: RunId, rows: &[RawRow]) -> RoiResult<ResultSet> {
        let batch = normalize_rows(rows)?;
        let mut results = self.run(run_id, batch.records)?;
        results.data_quality = Some(batch.report);
        Ok(results)
    }

    /// Run over records already in canonical form.
    pub fn run(&self, run_id: RunId, records: Vec<CampaignRecord>) -> RoiResult<ResultSet> {
        let features = derive_features(records);
        log::info!("{run_id}: derived KPIs for {} records", features.len());
        Ok(self.assemble(run_id, &features))
    }

    fn assemble(&self, run_id: RunId, features: &[FeaturedRecord]) -> ResultSet {
        let cv = self.config.conversion_value;

        let overall_metrics = overall(features, cv);

        let campaign_metrics = assign_tiers(
            aggregate(features, Dimension::CampaignId, cv),
            &self.config.tier_thresholds,
        );

        let demographic_metrics = DemographicMetrics {
            gender: aggregate(features, Dimension::Gender, cv),
            age_group: aggregate(features, Dimension::AgeGroup, cv),
            demographic_segment: aggregate(features, Dimension::DemographicSegment, cv),
        };

        let time_metrics = TimeMetrics {
            monthly: aggregate(features, Dimension::Month, cv),
            day_of_week: aggregate(features, Dimension::DayOfWeek, cv).ordered_by_weekday(),
        };

        log::info!(
            "{run_id}: Spend=${:.2} Revenue=${:.2} Profit=${:.2} ROI={} ROAS={} campaigns={}",
            overall_metrics.total_spend,
            overall_metrics.total_revenue,
            overall_metrics.total_profit,
            fmt_metric(overall_metrics.roi),
            fmt_metric(overall_metrics.roas),
            campaign_metrics.len()
        );

        ResultSet {
            run_id,
            conversion_value: cv,
            data_quality: None,
            overall_metrics,
            campaign_metrics,
            demographic_metrics,
            time_metrics,
        }
    }
}

/// Render an optional metric for logs and summaries.
pub fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}
