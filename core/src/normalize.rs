//! Record normalizer: raw JSON rows to canonical records.
//!
//! This is the boundary of the engine. The required schema is checked
//! once here; nothing downstream tests for column presence again.
//!
//! Cleaning rules:
//!   1. Absent required field        -> fatal schema error
//!   2. Null / non-numeric counter   -> 0 (imputed)
//!   3. Negative / non-finite counter -> 0 (clipped)
//!   4. Null / blank age or gender   -> "Unknown"
//!   5. Unparseable date             -> fatal
//!   6. Exact duplicate rows         -> dropped, first occurrence kept
//!
//! Duplicates compare every column of the cleaned row, including columns
//! the engine does not use (`ad_id`, `interest`, ...). Two ads that report
//! identical counters for the same campaign and day are two rows.

use crate::{
    error::{RoiError, RoiResult},
    record::{CampaignRecord, REQUIRED_FIELDS},
    types::UNKNOWN,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

pub type RawRow = Map<String, Value>;

/// Counts of everything the normalizer had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub duplicates_removed: usize,
    pub imputed_counters: usize,
    pub clipped_counters: usize,
    pub imputed_categoricals: usize,
    pub negative_durations: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub records: Vec<CampaignRecord>,
    pub report: DataQualityReport,
}

/// Parse a JSON array of row objects.
pub fn parse_rows(json: &str) -> RoiResult<Vec<RawRow>> {
    Ok(serde_json::from_str(json)?)
}

/// Validate and clean raw rows into canonical records.
pub fn normalize_rows(rows: &[RawRow]) -> RoiResult<NormalizedBatch> {
    let mut report = DataQualityReport {
        input_rows: rows.len(),
        ..DataQualityReport::default()
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut seen = HashSet::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        check_schema(index, row)?;

        let record = CampaignRecord {
            campaign_id: campaign_id(index, &row["campaign_id"])?,
            reporting_start: date_field(index, "reporting_start", &row["reporting_start"])?,
            reporting_end: date_field(index, "reporting_end", &row["reporting_end"])?,
            impressions: counter(&row["impressions"], &mut report),
            clicks: counter(&row["clicks"], &mut report),
            spent: counter(&row["spent"], &mut report),
            total_conversion: counter(&row["total_conversion"], &mut report),
            approved_conversion: counter(&row["approved_conversion"], &mut report),
            age: categorical(&row["age"], false, &mut report),
            gender: categorical(&row["gender"], true, &mut report),
        };

        if !seen.insert(dedup_key(&record, row)?) {
            report.duplicates_removed += 1;
            continue;
        }

        if record.campaign_duration_days() < 0 {
            report.negative_durations += 1;
        }

        records.push(record);
    }

    report.output_rows = records.len();
    log_report(&report);

    Ok(NormalizedBatch { records, report })
}

fn check_schema(index: usize, row: &RawRow) -> RoiResult<()> {
    match REQUIRED_FIELDS.iter().find(|field| !row.contains_key(**field)) {
        Some(field) => Err(RoiError::MissingField {
            row: index,
            field: *field,
        }),
        None => Ok(()),
    }
}

fn campaign_id(index: usize, value: &Value) -> RoiResult<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RoiError::MissingField {
            row: index,
            field: "campaign_id",
        }),
    }
}

fn counter(value: &Value, report: &mut DataQualityReport) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        None => {
            report.imputed_counters += 1;
            0.0
        }
        Some(v) if !v.is_finite() || v < 0.0 => {
            report.clipped_counters += 1;
            0.0
        }
        // -0.0 would otherwise serialize differently in the duplicate key.
        Some(v) if v == 0.0 => 0.0,
        Some(v) => v,
    }
}

fn categorical(value: &Value, upper: bool, report: &mut DataQualityReport) -> String {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    if text.is_empty() {
        report.imputed_categoricals += 1;
        UNKNOWN.to_string()
    } else if upper {
        text.to_uppercase()
    } else {
        text
    }
}

fn date_field(index: usize, field: &'static str, value: &Value) -> RoiResult<NaiveDate> {
    let text = value.as_str().unwrap_or_default();
    parse_date(text).ok_or_else(|| RoiError::InvalidDate {
        row: index,
        field,
        value: value.to_string(),
    })
}

/// Accepts `2017-08-17`, `17/08/2017`, `2017-08-17 00:00:00` and RFC 3339.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// Canonical JSON of the cleaned record merged with the passthrough columns.
/// Object keys serialize sorted, so column order in the input is irrelevant.
fn dedup_key(record: &CampaignRecord, row: &RawRow) -> RoiResult<String> {
    let mut key = match serde_json::to_value(record)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (column, value) in row {
        if !REQUIRED_FIELDS.contains(&column.as_str()) {
            key.insert(column.clone(), value.clone());
        }
    }
    Ok(Value::Object(key).to_string())
}

fn log_report(report: &DataQualityReport) {
    log::info!(
        "Normalized {} of {} rows",
        report.output_rows,
        report.input_rows
    );
    if report.duplicates_removed > 0 {
        log::warn!("Removed {} duplicate rows", report.duplicates_removed);
    }
    if report.imputed_counters > 0 {
        log::warn!(
            "{} null or non-numeric counters imputed as 0",
            report.imputed_counters
        );
    }
    if report.clipped_counters > 0 {
        log::warn!(
            "{} negative or non-finite counters clipped to 0",
            report.clipped_counters
        );
    }
    if report.imputed_categoricals > 0 {
        log::warn!(
            "{} missing age/gender values set to \"{UNKNOWN}\"",
            report.imputed_categoricals
        );
    }
    if report.negative_durations > 0 {
        log::warn!(
            "{} records have reporting_end before reporting_start",
            report.negative_durations
        );
    }
}
