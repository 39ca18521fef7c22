//! Per-country dataset descriptors produced by the builder.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::boundary::FileType;
use crate::error::ConfigError;

/// Expected update frequency, as named on the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UpdateFrequency {
    Live,
    EveryDay,
    EveryWeek,
    EveryTwoWeeks,
    EveryMonth,
    EveryThreeMonths,
    EverySixMonths,
    EveryYear,
    AsNeeded,
    Never,
}

impl UpdateFrequency {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::EveryDay => "Every day",
            Self::EveryWeek => "Every week",
            Self::EveryTwoWeeks => "Every two weeks",
            Self::EveryMonth => "Every month",
            Self::EveryThreeMonths => "Every three months",
            Self::EverySixMonths => "Every six months",
            Self::EveryYear => "Every year",
            Self::AsNeeded => "As needed",
            Self::Never => "Never",
        }
    }

    /// Value stored in the catalog's `data_update_frequency` field.
    pub fn catalog_code(&self) -> &'static str {
        match self {
            Self::Live => "0",
            Self::EveryDay => "1",
            Self::EveryWeek => "7",
            Self::EveryTwoWeeks => "14",
            Self::EveryMonth => "30",
            Self::EveryThreeMonths => "90",
            Self::EverySixMonths => "180",
            Self::EveryYear => "365",
            Self::AsNeeded => "-2",
            Self::Never => "-1",
        }
    }

    const ALL: [UpdateFrequency; 10] = [
        Self::Live,
        Self::EveryDay,
        Self::EveryWeek,
        Self::EveryTwoWeeks,
        Self::EveryMonth,
        Self::EveryThreeMonths,
        Self::EverySixMonths,
        Self::EveryYear,
        Self::AsNeeded,
        Self::Never,
    ];
}

impl TryFrom<String> for UpdateFrequency {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|freq| freq.label().eq_ignore_ascii_case(wanted) || freq.catalog_code() == wanted)
            .ok_or(ConfigError::UnknownFrequency(value))
    }
}

impl From<UpdateFrequency> for String {
    fn from(value: UpdateFrequency) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for UpdateFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive span of years represented across a country's admin levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl YearRange {
    /// Smallest range covering every year, or None when empty.
    pub fn covering<I: IntoIterator<Item = i32>>(years: I) -> Option<Self> {
        years.into_iter().fold(None, |range, year| match range {
            None => Some(Self { first: year, last: year }),
            Some(Self { first, last }) => Some(Self {
                first: first.min(year),
                last: last.max(year),
            }),
        })
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.first, 1, 1)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.last, 12, 31)
    }

    /// Catalog reference period: `[2014-01-01T00:00:00 TO 2014-12-31T23:59:59]`.
    pub fn to_reference_period(&self) -> String {
        let fmt_date = |date: Option<NaiveDate>| {
            date.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        format!(
            "[{}T00:00:00 TO {}T23:59:59]",
            fmt_date(self.start_date()),
            fmt_date(self.end_date())
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub name: String,
    pub url: String,
    pub description: String,
    pub file_type: FileType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub name: String,
    pub title: String,
    pub country_iso3: String,
    pub country_name: String,
    pub maintainer: Uuid,
    pub organization: Uuid,
    pub update_frequency: UpdateFrequency,
    pub subnational: bool,
    pub tags: Vec<String>,
    pub year_range: YearRange,
    pub source: String,
    pub resources: Vec<ResourceDescriptor>,
}

/// Everything the publisher needs for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedDataset {
    pub admin_levels: Vec<String>,
    pub dataset: DatasetDescriptor,
    pub resource_names: Vec<String>,
}

/// What the builder decided for a country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Published(PublishedDataset),
    /// Every admin level is already hosted on the catalog.
    SkippedRedundant,
    /// The catalog does not accept this country as a location.
    SkippedInvalidLocation,
}

impl BuildOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Published(_) => "published",
            Self::SkippedRedundant => "skipped_redundant",
            Self::SkippedInvalidLocation => "skipped_invalid_location",
        }
    }

    pub fn published(&self) -> Option<&PublishedDataset> {
        match self {
            Self::Published(published) => Some(published),
            _ => None,
        }
    }
}
