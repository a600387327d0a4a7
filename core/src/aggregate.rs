//! Aggregator: rolls featured records into group-level ROI tables.
//!
//! One call groups by one dimension. Shares are relative to the totals of
//! that call only, so shares from different dimensions are not comparable.
//!
//! Every key present in the input yields exactly one row, including keys
//! with zero spend. Their roi / roas / efficiency_score stay `None`.

use crate::{
    dimension::{weekday_rank, Dimension},
    error::RoiResult,
    kpi::{rate, ratio, FeaturedRecord},
    record::{sanitize_counter, CampaignRecord},
    tier::PerformanceTier,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Summed raw counters for one group (or the whole batch).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CounterTotals {
    pub spent: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub total_conversion: f64,
    pub approved_conversion: f64,
    pub records: usize,
    /// Counter values that were negative or non-finite and counted as 0.
    pub rejected_values: usize,
}

impl CounterTotals {
    pub fn add(&mut self, record: &CampaignRecord) {
        let spent = self.accept(record.spent);
        let impressions = self.accept(record.impressions);
        let clicks = self.accept(record.clicks);
        let total_conversion = self.accept(record.total_conversion);
        let approved_conversion = self.accept(record.approved_conversion);

        self.spent += spent;
        self.impressions += impressions;
        self.clicks += clicks;
        self.total_conversion += total_conversion;
        self.approved_conversion += approved_conversion;
        self.records += 1;
    }

    pub fn merge(&mut self, other: &CounterTotals) {
        self.spent += other.spent;
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.total_conversion += other.total_conversion;
        self.approved_conversion += other.approved_conversion;
        self.records += other.records;
        self.rejected_values += other.rejected_values;
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a CampaignRecord>) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record);
        }
        totals
    }

    fn accept(&mut self, value: f64) -> f64 {
        let clean = sanitize_counter(value);
        if clean != value && value != 0.0 {
            self.rejected_values += 1;
        }
        clean
    }
}

/// The revenue and ratio block shared by group rows and the overall row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoiFigures {
    pub revenue: f64,
    pub profit: f64,
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl RoiFigures {
    pub fn compute(totals: &CounterTotals, conversion_value: f64) -> Self {
        let revenue = totals.approved_conversion * conversion_value;
        let profit = revenue - totals.spent;
        Self {
            revenue,
            profit,
            roi: ratio(profit, totals.spent),
            roas: ratio(revenue, totals.spent),
            cpa: ratio(totals.spent, totals.approved_conversion),
            ctr: rate(totals.clicks, totals.impressions),
            conversion_rate: rate(totals.approved_conversion, totals.clicks),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub key: String,
    pub spent: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub approved_conversion: f64,
    pub revenue: f64,
    pub profit: f64,
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    /// Campaign table only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    /// Campaign table only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    pub spend_share: Option<f64>,
    pub conversion_share: Option<f64>,
    pub efficiency_score: Option<f64>,
    /// Set by the tier classifier, campaign table only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance_tier: Option<PerformanceTier>,
}

impl GroupMetrics {
    pub fn from_totals(
        key: String,
        dimension: Dimension,
        totals: &CounterTotals,
        grand: &CounterTotals,
        conversion_value: f64,
    ) -> Self {
        let figures = RoiFigures::compute(totals, conversion_value);
        let spend_share = ratio(totals.spent, grand.spent);
        let conversion_share = ratio(totals.approved_conversion, grand.approved_conversion);
        let efficiency_score = match (conversion_share, spend_share) {
            (Some(conv), Some(spend)) => ratio(conv, spend),
            _ => None,
        };
        let campaign_only = dimension == Dimension::CampaignId;

        Self {
            key,
            spent: totals.spent,
            impressions: totals.impressions,
            clicks: totals.clicks,
            approved_conversion: totals.approved_conversion,
            revenue: figures.revenue,
            profit: figures.profit,
            roi: figures.roi,
            roas: figures.roas,
            cpa: figures.cpa,
            ctr: campaign_only.then_some(figures.ctr),
            conversion_rate: campaign_only.then_some(figures.conversion_rate),
            spend_share,
            conversion_share,
            efficiency_score,
            performance_tier: None,
        }
    }
}

/// All group rows produced by one aggregation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTable {
    pub dimension: Dimension,
    pub rows: Vec<GroupMetrics>,
}

impl GroupTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: &str) -> Option<&GroupMetrics> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Reorder rows Monday→Sunday. Keys that are not weekday names go last.
    pub fn ordered_by_weekday(mut self) -> Self {
        self.rows.sort_by_key(|r| weekday_rank(&r.key).unwrap_or(usize::MAX));
        self
    }

    /// Rows as JSON objects with the key under the dimension's column name.
    pub fn to_json_rows(&self) -> RoiResult<Vec<Value>> {
        let column = self.dimension.column_name();
        self.rows
            .iter()
            .map(|row| -> RoiResult<Value> {
                let mut value = serde_json::to_value(row)?;
                if let Value::Object(map) = &mut value {
                    if let Some(key) = map.remove("key") {
                        map.insert(column.to_string(), key);
                    }
                }
                Ok(value)
            })
            .collect()
    }

    /// Highest ROI first; rows with undefined ROI are excluded.
    pub fn top_by_roi(&self, n: usize) -> Vec<&GroupMetrics> {
        let mut ranked: Vec<&GroupMetrics> = self.rows.iter().filter(|r| r.roi.is_some()).collect();
        ranked.sort_by(|a, b| cmp_defined(b.roi, a.roi));
        ranked.truncate(n);
        ranked
    }

    /// Lowest CPA first; rows with undefined CPA are excluded.
    pub fn lowest_cpa(&self, n: usize) -> Vec<&GroupMetrics> {
        let mut ranked: Vec<&GroupMetrics> = self.rows.iter().filter(|r| r.cpa.is_some()).collect();
        ranked.sort_by(|a, b| cmp_defined(a.cpa, b.cpa));
        ranked.truncate(n);
        ranked
    }

    pub fn tier_counts(&self) -> HashMap<PerformanceTier, usize> {
        let mut counts = HashMap::new();
        for tier in self.rows.iter().filter_map(|r| r.performance_tier) {
            *counts.entry(tier).or_insert(0) += 1;
        }
        counts
    }

    pub fn spend_share_total(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.spend_share).sum()
    }

    pub fn conversion_share_total(&self) -> f64 {
        self.rows.iter().filter_map(|r| r.conversion_share).sum()
    }
}

fn cmp_defined(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Group `records` by `dimension` and reduce each group to its metrics.
/// Rows come out in ascending key order.
pub fn aggregate(
    records: &[FeaturedRecord],
    dimension: Dimension,
    conversion_value: f64,
) -> GroupTable {
    let mut groups: BTreeMap<&str, CounterTotals> = BTreeMap::new();
    for row in records {
        groups
            .entry(dimension.key_of(row))
            .or_default()
            .add(&row.record);
    }

    let mut grand = CounterTotals::default();
    for totals in groups.values() {
        grand.merge(totals);
    }

    if grand.rejected_values > 0 {
        log::warn!(
            "{}: {} negative or non-finite counters counted as 0",
            dimension.column_name(),
            grand.rejected_values
        );
    }

    let rows: Vec<GroupMetrics> = groups
        .into_iter()
        .map(|(key, totals)| {
            GroupMetrics::from_totals(key.to_string(), dimension, &totals, &grand, conversion_value)
        })
        .collect();

    log::debug!(
        "Aggregated {} records by {} into {} groups",
        records.len(),
        dimension.column_name(),
        rows.len()
    );

    GroupTable { dimension, rows }
}

/// Whole-batch metrics, no grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallMetrics {
    pub record_count: usize,
    pub total_spend: f64,
    pub total_impressions: f64,
    pub total_clicks: f64,
    pub total_conversions: f64,
    pub total_revenue: f64,
    pub total_profit: f64,
    pub roi: Option<f64>,
    pub roas: Option<f64>,
    pub cpa: Option<f64>,
    pub ctr: f64,
    pub conversion_rate: f64,
}

impl OverallMetrics {
    pub fn from_totals(totals: &CounterTotals, conversion_value: f64) -> Self {
        let figures = RoiFigures::compute(totals, conversion_value);
        Self {
            record_count: totals.records,
            total_spend: totals.spent,
            total_impressions: totals.impressions,
            total_clicks: totals.clicks,
            total_conversions: totals.approved_conversion,
            total_revenue: figures.revenue,
            total_profit: figures.profit,
            roi: figures.roi,
            roas: figures.roas,
            cpa: figures.cpa,
            ctr: figures.ctr,
            conversion_rate: figures.conversion_rate,
        }
    }
}

pub fn overall(records: &[FeaturedRecord], conversion_value: f64) -> OverallMetrics {
    let totals = CounterTotals::from_records(records.iter().map(|r| &r.record));
    OverallMetrics::from_totals(&totals, conversion_value)
}

/// Running sums for the per-record context columns of one group.
#[derive(Debug, Clone, Copy, Default)]
struct ContextAccumulator {
    spent: f64,
    approved_conversion: f64,
    ctr_sum: f64,
    records: usize,
    cpa_sum: f64,
    cpa_count: usize,
}

impl ContextAccumulator {
    fn add(&mut self, row: &FeaturedRecord) {
        self.spent += sanitize_counter(row.record.spent);
        self.approved_conversion += sanitize_counter(row.record.approved_conversion);
        self.ctr_sum += row.kpis.ctr;
        self.records += 1;
        if let Some(cpa) = row.kpis.cost_per_acquisition {
            self.cpa_sum += cpa;
            self.cpa_count += 1;
        }
    }

    fn avg_ctr(&self) -> f64 {
        rate(self.ctr_sum, self.records as f64)
    }

    /// Mean over records with a defined CPA; `None` when there are none.
    fn avg_cpa(&self) -> Option<f64> {
        ratio(self.cpa_sum, self.cpa_count as f64)
    }
}

/// Campaign and segment context attached to each record.
///
/// Averages are means of the per-record KPIs, not ratios of summed
/// counters, so they differ from the group tables on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextFeatures {
    pub campaign_total_spend: f64,
    pub campaign_avg_ctr: f64,
    pub campaign_avg_cpa: Option<f64>,
    pub campaign_total_conversions: f64,
    pub segment_avg_ctr: f64,
    pub segment_avg_cpa: Option<f64>,
    pub segment_total_spend: f64,
}

/// A featured record with its campaign and segment context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub features: FeaturedRecord,
    #[serde(flatten)]
    pub context: ContextFeatures,
}

/// Attach campaign-level and demographic-segment-level context to every
/// record. Input order is kept.
pub fn enrich(records: Vec<FeaturedRecord>) -> Vec<EnrichedRecord> {
    let mut campaigns: BTreeMap<String, ContextAccumulator> = BTreeMap::new();
    let mut segments: BTreeMap<String, ContextAccumulator> = BTreeMap::new();
    for row in &records {
        campaigns
            .entry(row.record.campaign_id.clone())
            .or_default()
            .add(row);
        segments
            .entry(row.tags.demographic_segment.clone())
            .or_default()
            .add(row);
    }

    records
        .into_iter()
        .map(|features| {
            let campaign = campaigns
                .get(&features.record.campaign_id)
                .copied()
                .unwrap_or_default();
            let segment = segments
                .get(&features.tags.demographic_segment)
                .copied()
                .unwrap_or_default();
            let context = ContextFeatures {
                campaign_total_spend: campaign.spent,
                campaign_avg_ctr: campaign.avg_ctr(),
                campaign_avg_cpa: campaign.avg_cpa(),
                campaign_total_conversions: campaign.approved_conversion,
                segment_avg_ctr: segment.avg_ctr(),
                segment_avg_cpa: segment.avg_cpa(),
                segment_total_spend: segment.spent,
            };
            EnrichedRecord { features, context }
        })
        .collect()
}
