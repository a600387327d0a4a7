//! Dimension tagger: grouping keys derived from each record.
//!
//! Calendar fields come from `reporting_start` only.

use crate::{kpi::FeaturedRecord, record::CampaignRecord};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Display order for the day-of-week table.
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTags {
    /// `gender + "_" + age`, e.g. "M_30-34".
    pub demographic_segment: String,
    pub year: i32,
    pub month: u32,
    pub iso_week: u32,
    /// Full English weekday name.
    pub day_of_week: String,
    /// Calendar-month bucket, "YYYY-MM".
    pub month_bucket: String,
}

impl DimensionTags {
    pub fn derive(record: &CampaignRecord) -> Self {
        let start = record.reporting_start;
        Self {
            demographic_segment: demographic_segment(&record.gender, &record.age),
            year: start.year(),
            month: start.month(),
            iso_week: start.iso_week().week(),
            day_of_week: weekday_name(start.weekday()).to_string(),
            month_bucket: month_bucket(start),
        }
    }
}

pub fn demographic_segment(gender: &str, age: &str) -> String {
    format!("{gender}_{age}")
}

pub fn month_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_ORDER[weekday.num_days_from_monday() as usize]
}

/// Position of a weekday name in Monday→Sunday order.
pub fn weekday_rank(name: &str) -> Option<usize> {
    WEEKDAY_ORDER.iter().position(|d| *d == name)
}

/// The axes the aggregator can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    CampaignId,
    Gender,
    AgeGroup,
    DemographicSegment,
    Month,
    DayOfWeek,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Self::CampaignId,
        Self::Gender,
        Self::AgeGroup,
        Self::DemographicSegment,
        Self::Month,
        Self::DayOfWeek,
    ];

    /// Column name the grouping key is published under.
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::CampaignId => "campaign_id",
            Self::Gender => "gender",
            Self::AgeGroup => "age_group",
            Self::DemographicSegment => "demographic_segment",
            Self::Month => "month",
            Self::DayOfWeek => "day_of_week",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.column_name() == name)
    }

    pub fn key_of<'a>(&self, row: &'a FeaturedRecord) -> &'a str {
        match self {
            Self::CampaignId => &row.record.campaign_id,
            Self::Gender => &row.record.gender,
            Self::AgeGroup => &row.record.age,
            Self::DemographicSegment => &row.tags.demographic_segment,
            Self::Month => &row.tags.month_bucket,
            Self::DayOfWeek => &row.tags.day_of_week,
        }
    }
}
