//! Synthetic campaign dataset: seeded, reproducible canonical records.
//!
//! Shape: campaigns × days × (a few demographic buckets per day).
//! A small share of rows has zero impressions or zero spend so the
//! degenerate-denominator paths are exercised on every run.

use crate::{record::CampaignRecord, rng::SeededRng};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

pub const AGE_BRACKETS: [&str; 4] = ["30-34", "35-39", "40-44", "45-49"];
pub const GENDERS: [&str; 2] = ["M", "F"];

const ZERO_IMPRESSION_RATE: f64 = 0.03;
const ZERO_SPEND_RATE: f64 = 0.05;
const MAX_IMPRESSIONS: f64 = 500_000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub seed: u64,
    pub campaigns: u32,
    pub days: u32,
    /// Demographic buckets reported per campaign per day.
    pub rows_per_day: u32,
    pub start_date: NaiveDate,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            campaigns: 3,
            days: 14,
            rows_per_day: 3,
            start_date: NaiveDate::from_ymd_opt(2017, 8, 17).unwrap_or_default(),
        }
    }
}

pub fn generate(config: &SyntheticConfig) -> Vec<CampaignRecord> {
    let mut records = Vec::new();

    for c in 0..config.campaigns {
        let mut rng = SeededRng::derive(config.seed, c as u64);
        let campaign_id = format!("C{}", 100 + c);

        // Per-campaign quality: baseline CTR, CPC and approval rate.
        let base_ctr = rng.uniform(0.005, 0.02);
        let cpc = rng.uniform(0.8, 1.6);
        let conversion_rate = rng.uniform(0.02, 0.1);
        let approval_rate = rng.uniform(0.3, 0.7);

        for d in 0..config.days {
            let Some(start) = config.start_date.checked_add_days(Days::new(d as u64)) else {
                break;
            };

            for _ in 0..config.rows_per_day {
                let gender = *rng.pick(&GENDERS);
                let age = *rng.pick(&AGE_BRACKETS);

                let impressions = if rng.chance(ZERO_IMPRESSION_RATE) {
                    0.0
                } else {
                    rng.heavy_tail(5_000.0, 1.5).min(MAX_IMPRESSIONS).floor()
                };
                let clicks = rng.jittered_count(impressions, base_ctr);
                let spent = if rng.chance(ZERO_SPEND_RATE) {
                    0.0
                } else {
                    (clicks * cpc * 100.0).round() / 100.0
                };
                let total_conversion = rng.jittered_count(clicks, conversion_rate);
                let approved_conversion = rng
                    .jittered_count(total_conversion, approval_rate)
                    .min(total_conversion);

                records.push(CampaignRecord {
                    campaign_id: campaign_id.clone(),
                    reporting_start: start,
                    reporting_end: start,
                    impressions,
                    clicks,
                    spent,
                    total_conversion,
                    approved_conversion,
                    age: age.to_string(),
                    gender: gender.to_string(),
                });
            }
        }
    }

    log::debug!(
        "Generated {} synthetic records (seed {}, {} campaigns, {} days)",
        records.len(),
        config.seed,
        config.campaigns,
        config.days
    );
    records
}
