//! The materialized output of one engine run.
//!
//! Every named result has a fixed shape. The table names below are the
//! stable contract with reporting and visualization.

use crate::{
    aggregate::{GroupTable, OverallMetrics},
    error::{RoiError, RoiResult},
    normalize::DataQualityReport,
    types::RunId,
};
use serde::{Deserialize, Serialize};

pub const OVERALL_METRICS: &str = "overall_metrics";
pub const CAMPAIGN_METRICS: &str = "campaign_metrics";
pub const DEMOGRAPHIC_GENDER: &str = "demographic_metrics_gender";
pub const DEMOGRAPHIC_AGE_GROUP: &str = "demographic_metrics_age_group";
pub const DEMOGRAPHIC_SEGMENT: &str = "demographic_metrics_demographic_segment";
pub const TIME_MONTHLY: &str = "time_metrics_monthly";
pub const TIME_DAY_OF_WEEK: &str = "time_metrics_day_of_week";

/// Names of all group tables, in export order.
pub const TABLE_NAMES: [&str; 6] = [
    CAMPAIGN_METRICS,
    DEMOGRAPHIC_GENDER,
    DEMOGRAPHIC_AGE_GROUP,
    DEMOGRAPHIC_SEGMENT,
    TIME_MONTHLY,
    TIME_DAY_OF_WEEK,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicMetrics {
    pub gender: GroupTable,
    pub age_group: GroupTable,
    pub demographic_segment: GroupTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMetrics {
    pub monthly: GroupTable,
    /// Ordered Monday→Sunday.
    pub day_of_week: GroupTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub run_id: RunId,
    pub conversion_value: f64,
    pub data_quality: Option<DataQualityReport>,
    pub overall_metrics: OverallMetrics,
    pub campaign_metrics: GroupTable,
    pub demographic_metrics: DemographicMetrics,
    pub time_metrics: TimeMetrics,
}

impl ResultSet {
    /// Every group table with its export name.
    pub fn tables(&self) -> [(&'static str, &GroupTable); 6] {
        [
            (CAMPAIGN_METRICS, &self.campaign_metrics),
            (DEMOGRAPHIC_GENDER, &self.demographic_metrics.gender),
            (DEMOGRAPHIC_AGE_GROUP, &self.demographic_metrics.age_group),
            (DEMOGRAPHIC_SEGMENT, &self.demographic_metrics.demographic_segment),
            (TIME_MONTHLY, &self.time_metrics.monthly),
            (TIME_DAY_OF_WEEK, &self.time_metrics.day_of_week),
        ]
    }

    pub fn table(&self, name: &str) -> RoiResult<&GroupTable> {
        self.tables()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t)
            .ok_or_else(|| RoiError::TableNotFound { name: name.into() })
    }
}
