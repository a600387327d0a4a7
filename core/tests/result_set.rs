//! End-to-end runs and the shape of the assembled result set.

use campaign_roi_core::{
    config::EngineConfig,
    dimension::{Dimension, WEEKDAY_ORDER},
    engine::RoiEngine,
    error::RoiError,
    record::CampaignRecord,
    result_set::{ResultSet, TABLE_NAMES},
    synthetic::{self, SyntheticConfig},
    tier::PerformanceTier,
};
use chrono::NaiveDate;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn run(records: Vec<CampaignRecord>) -> ResultSet {
    RoiEngine::new(EngineConfig::default())
        .unwrap()
        .run("result-set-test".into(), records)
        .unwrap()
}

fn record(campaign: &str, impressions: f64, clicks: f64, spent: f64, approved: f64) -> CampaignRecord {
    let day = NaiveDate::from_ymd_opt(2017, 8, 17).unwrap();
    CampaignRecord {
        campaign_id: campaign.into(),
        reporting_start: day,
        reporting_end: day,
        impressions,
        clicks,
        spent,
        total_conversion: approved,
        approved_conversion: approved,
        age: "25-34".into(),
        gender: "MALE".into(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The documented two-record C1 scenario, end to end.
#[test]
fn worked_example_end_to_end() {
    let results = run(vec![
        record("C1", 1000.0, 50.0, 10.0, 2.0),
        record("C1", 0.0, 0.0, 5.0, 0.0),
    ]);

    let c1 = results.campaign_metrics.row("C1").unwrap();
    assert_eq!(c1.spent, 15.0);
    assert_eq!(c1.revenue, 200.0);
    assert_eq!(c1.profit, 185.0);
    assert!((c1.roi.unwrap() - 12.3333).abs() < 1e-3);
    assert!((c1.roas.unwrap() - 13.3333).abs() < 1e-3);
    assert_eq!(c1.cpa, Some(7.5));
    assert_eq!(c1.ctr, Some(0.05));
    assert_eq!(c1.performance_tier, Some(PerformanceTier::HighlyProfitable));

    let segment = results
        .demographic_metrics
        .demographic_segment
        .row("MALE_25-34");
    assert!(segment.is_some());
}

/// A lone zero-spend record still shows up in the campaign table.
#[test]
fn zero_spend_run_keeps_the_campaign_row() {
    let results = run(vec![record("C0", 0.0, 0.0, 0.0, 0.0)]);

    let row = results.campaign_metrics.row("C0").expect("row present");
    assert_eq!(row.roi, None);
    assert_eq!(row.roas, None);
    assert_eq!(row.efficiency_score, None);
    assert_eq!(row.performance_tier, Some(PerformanceTier::Undefined));
    assert_eq!(results.overall_metrics.roi, None);
}

#[test]
fn tables_are_named_and_typed() {
    let results = run(synthetic::generate(&SyntheticConfig::default()));

    let names: Vec<&str> = results.tables().iter().map(|(n, _)| *n).collect();
    assert_eq!(names, TABLE_NAMES.to_vec());

    assert_eq!(results.campaign_metrics.dimension, Dimension::CampaignId);
    assert_eq!(results.demographic_metrics.gender.dimension, Dimension::Gender);
    assert_eq!(results.demographic_metrics.age_group.dimension, Dimension::AgeGroup);
    assert_eq!(
        results.demographic_metrics.demographic_segment.dimension,
        Dimension::DemographicSegment
    );
    assert_eq!(results.time_metrics.monthly.dimension, Dimension::Month);
    assert_eq!(results.time_metrics.day_of_week.dimension, Dimension::DayOfWeek);

    assert!(matches!(
        results.table("campaign_metrics_weekly"),
        Err(RoiError::TableNotFound { .. })
    ));
}

/// Only the campaign table is tiered.
#[test]
fn only_campaigns_carry_tiers() {
    let results = run(synthetic::generate(&SyntheticConfig::default()));

    assert!(results
        .campaign_metrics
        .rows
        .iter()
        .all(|r| r.performance_tier.is_some()));
    for (name, table) in results.tables().into_iter().skip(1) {
        assert!(
            table.rows.iter().all(|r| r.performance_tier.is_none()),
            "{name} should not carry tiers"
        );
    }
}

/// Fourteen days cover every weekday, delivered Monday→Sunday.
#[test]
fn day_of_week_table_is_ordered() {
    let results = run(synthetic::generate(&SyntheticConfig::default()));

    let keys: Vec<&str> = results
        .time_metrics
        .day_of_week
        .rows
        .iter()
        .map(|r| r.key.as_str())
        .collect();
    assert_eq!(keys, WEEKDAY_ORDER.to_vec());
}

/// Every table in a run splits the same total spend.
#[test]
fn all_tables_account_for_total_spend() {
    let results = run(synthetic::generate(&SyntheticConfig {
        campaigns: 4,
        days: 40,
        ..SyntheticConfig::default()
    }));
    let total = results.overall_metrics.total_spend;

    for (name, table) in results.tables() {
        let spent: f64 = table.rows.iter().map(|r| r.spent).sum();
        assert!(
            (spent - total).abs() < 1e-6,
            "{name}: spend {spent} != overall {total}"
        );
        assert!((table.spend_share_total() - 1.0).abs() < 1e-9);
    }
}

/// The result set serializes with the published field names.
#[test]
fn serialized_result_set_exposes_contract_names() {
    let results = run(vec![record("C1", 1000.0, 50.0, 10.0, 2.0)]);
    let json = serde_json::to_value(&results).unwrap();

    assert!(json["overall_metrics"]["roi"].is_number());
    assert!(json["campaign_metrics"]["rows"][0]["performance_tier"].is_string());
    assert!(json["demographic_metrics"]["gender"].is_object());
    assert!(json["demographic_metrics"]["age_group"].is_object());
    assert!(json["demographic_metrics"]["demographic_segment"].is_object());
    assert!(json["time_metrics"]["monthly"].is_object());
    assert!(json["time_metrics"]["day_of_week"].is_object());
}
