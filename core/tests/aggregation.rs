//! Group-level ROI tables: sums, ratios, shares, and the overall row.

use campaign_roi_core::{
    aggregate::{aggregate, overall},
    dimension::{Dimension, WEEKDAY_ORDER},
    kpi::{derive_features, FeaturedRecord},
    record::CampaignRecord,
};
use chrono::{Days, NaiveDate};

// ── Helpers ──────────────────────────────────────────────────────────────────

const CV: f64 = 100.0;
const TOL: f64 = 1e-9;

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
        age: "30-34".into(),
        gender: "M".into(),
    }
}

fn mixed_batch() -> Vec<FeaturedRecord> {
    let mut rows = vec![
        record("C1", 1000.0, 50.0, 10.0, 2.0),
        record("C1", 0.0, 0.0, 5.0, 0.0),
        record("C2", 4000.0, 80.0, 40.0, 1.0),
        record("C3", 300.0, 3.0, 25.0, 0.0),
    ];
    rows[2].gender = "F".into();
    rows[3].age = "45-49".into();
    rows[3].reporting_start = NaiveDate::from_ymd_opt(2017, 9, 2).unwrap();
    derive_features(rows)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Two rows of campaign C1 roll up to the documented campaign figures.
#[test]
fn campaign_rollup_matches_worked_example() {
    let features = derive_features(vec![
        record("C1", 1000.0, 50.0, 10.0, 2.0),
        record("C1", 0.0, 0.0, 5.0, 0.0),
    ]);

    let table = aggregate(&features, Dimension::CampaignId, CV);
    assert_eq!(table.len(), 1);

    let c1 = table.row("C1").expect("C1 row");
    assert_eq!(c1.spent, 15.0);
    assert_eq!(c1.approved_conversion, 2.0);
    assert_eq!(c1.revenue, 200.0);
    assert_eq!(c1.profit, 185.0);
    assert!((c1.roi.unwrap() - 185.0 / 15.0).abs() < TOL);
    assert!((c1.roas.unwrap() - 200.0 / 15.0).abs() < TOL);
    assert_eq!(c1.cpa, Some(7.5));
    assert_eq!(c1.ctr, Some(0.05));
}

/// A zero-spend, zero-conversion campaign keeps its row with undefined ratios.
#[test]
fn zero_spend_group_is_kept_with_undefined_ratios() {
    let features = derive_features(vec![record("C0", 100.0, 1.0, 0.0, 0.0)]);

    let table = aggregate(&features, Dimension::CampaignId, CV);
    let row = table.row("C0").expect("zero-spend row must be present");

    assert_eq!(row.roi, None);
    assert_eq!(row.roas, None);
    assert_eq!(row.efficiency_score, None);
    assert_eq!(row.cpa, None);
    assert_eq!(row.revenue, 0.0);
}

/// Groups without approved conversions never report a CPA of 0.
#[test]
fn groups_without_conversions_have_undefined_cpa() {
    let features = mixed_batch();
    let table = aggregate(&features, Dimension::CampaignId, CV);

    let c3 = table.row("C3").unwrap();
    assert_eq!(c3.approved_conversion, 0.0);
    assert_eq!(c3.cpa, None);
}

/// Shares sum to 1 within every single aggregation call.
#[test]
fn shares_sum_to_one_per_call() {
    let features = mixed_batch();

    for dimension in Dimension::ALL {
        let table = aggregate(&features, dimension, CV);
        assert!(
            (table.spend_share_total() - 1.0).abs() < TOL,
            "{dimension:?}: spend shares sum to {}",
            table.spend_share_total()
        );
        assert!(
            (table.conversion_share_total() - 1.0).abs() < TOL,
            "{dimension:?}: conversion shares sum to {}",
            table.conversion_share_total()
        );
    }
}

/// Shares are relative to the call's own groups, not a global total.
#[test]
fn shares_are_scoped_to_the_dimension() {
    let features = mixed_batch();

    let gender = aggregate(&features, Dimension::Gender, CV);
    let male = gender.row("M").unwrap();
    let female = gender.row("F").unwrap();

    assert!((male.spend_share.unwrap() - 40.0 / 80.0).abs() < TOL);
    assert!((female.spend_share.unwrap() - 40.0 / 80.0).abs() < TOL);
    assert!((male.conversion_share.unwrap() - 2.0 / 3.0).abs() < TOL);
    assert!((male.efficiency_score.unwrap() - (2.0 / 3.0) / 0.5).abs() < TOL);
}

/// When nothing converted, conversion shares and efficiency are undefined.
#[test]
fn no_conversions_anywhere_leaves_shares_undefined() {
    let features = derive_features(vec![
        record("A", 100.0, 1.0, 5.0, 0.0),
        record("B", 100.0, 1.0, 15.0, 0.0),
    ]);

    let table = aggregate(&features, Dimension::CampaignId, CV);
    for row in &table.rows {
        assert_eq!(row.conversion_share, None);
        assert_eq!(row.efficiency_score, None);
        assert!(row.spend_share.is_some());
    }
    assert!((table.spend_share_total() - 1.0).abs() < TOL);
}

/// Every distinct key yields exactly one row.
#[test]
fn grouping_is_exhaustive() {
    let features = mixed_batch();

    assert_eq!(aggregate(&features, Dimension::CampaignId, CV).len(), 3);
    assert_eq!(aggregate(&features, Dimension::Gender, CV).len(), 2);
    assert_eq!(aggregate(&features, Dimension::AgeGroup, CV).len(), 2);
    assert_eq!(aggregate(&features, Dimension::DemographicSegment, CV).len(), 3);

    let monthly = aggregate(&features, Dimension::Month, CV);
    let keys: Vec<&str> = monthly.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["2017-08", "2017-09"]);
}

/// Only the campaign table carries ctr and conversion_rate.
#[test]
fn ctr_is_campaign_level_only() {
    let features = mixed_batch();

    assert!(aggregate(&features, Dimension::CampaignId, CV)
        .rows
        .iter()
        .all(|r| r.ctr.is_some() && r.conversion_rate.is_some()));
    assert!(aggregate(&features, Dimension::Gender, CV)
        .rows
        .iter()
        .all(|r| r.ctr.is_none() && r.conversion_rate.is_none()));
}

/// Seven single-record days give seven rows whose spend shares sum to 1.
#[test]
fn seven_days_seven_rows() {
    let monday = NaiveDate::from_ymd_opt(2017, 8, 14).unwrap();
    let rows: Vec<CampaignRecord> = (0..7u64)
        .map(|d| {
            let mut r = record("C1", 100.0, 1.0, 1.0 + d as f64, 1.0);
            r.reporting_start = monday.checked_add_days(Days::new(d)).unwrap();
            r.reporting_end = r.reporting_start;
            r
        })
        .collect();
    let features = derive_features(rows);

    let table = aggregate(&features, Dimension::DayOfWeek, CV);
    assert_eq!(table.len(), 7);
    assert!((table.spend_share_total() - 1.0).abs() < TOL);

    let ordered = table.ordered_by_weekday();
    let keys: Vec<&str> = ordered.rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, WEEKDAY_ORDER.to_vec());
    assert!((ordered.spend_share_total() - 1.0).abs() < TOL);
}

/// The overall row uses the same arithmetic as a single group.
#[test]
fn overall_matches_single_group_arithmetic() {
    let features = mixed_batch();
    let all = overall(&features, CV);

    let mut as_one_group = features.clone();
    for f in &mut as_one_group {
        f.record.campaign_id = "ALL".into();
    }
    let table = aggregate(&as_one_group, Dimension::CampaignId, CV);
    let group = table.row("ALL").unwrap();

    assert_eq!(all.record_count, 4);
    assert_eq!(all.total_spend, group.spent);
    assert_eq!(all.total_revenue, group.revenue);
    assert_eq!(all.total_profit, group.profit);
    assert_eq!(all.roi, group.roi);
    assert_eq!(all.roas, group.roas);
    assert_eq!(all.cpa, group.cpa);
    assert_eq!(Some(all.ctr), group.ctr);
    assert_eq!(Some(all.conversion_rate), group.conversion_rate);
    assert_eq!(group.spend_share, Some(1.0));
}

/// An empty batch produces empty tables and an all-undefined overall row.
#[test]
fn empty_batch_is_not_an_error() {
    let all = overall(&[], CV);
    assert_eq!(all.record_count, 0);
    assert_eq!(all.roi, None);
    assert_eq!(all.ctr, 0.0);

    assert!(aggregate(&[], Dimension::Gender, CV).is_empty());
}

/// Group rows export with the key under the dimension's column name.
#[test]
fn json_rows_use_dimension_column_name() {
    let features = mixed_batch();
    let table = aggregate(&features, Dimension::AgeGroup, CV);

    let rows = table.to_json_rows().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].get("age_group").is_some());
    assert!(rows[0].get("key").is_none());
}

#[test]
fn rankings_skip_undefined_values() {
    let features = derive_features(vec![
        record("A", 100.0, 1.0, 10.0, 1.0),
        record("B", 100.0, 1.0, 10.0, 3.0),
        record("Z", 100.0, 1.0, 0.0, 0.0),
    ]);
    let table = aggregate(&features, Dimension::CampaignId, CV);

    let top: Vec<&str> = table.top_by_roi(5).iter().map(|r| r.key.as_str()).collect();
    assert_eq!(top, vec!["B", "A"]);

    let cheapest: Vec<&str> = table.lowest_cpa(1).iter().map(|r| r.key.as_str()).collect();
    assert_eq!(cheapest, vec!["B"]);
}
