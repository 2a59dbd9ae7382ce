//! Target period a calculation run is versioned by.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::value_object::ValueObject;

/// Calendar month a run computes impact for (`YYYY-MM`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetPeriod {
    year: i32,
    month: u32,
}

impl TargetPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, ImpactError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| Self {
                year: d.year(),
                month: d.month(),
            })
            .ok_or_else(|| ImpactError::invalid_input(format!("invalid period {year}-{month}")))
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Whole years elapsed since `base_year` (never negative).
    pub fn years_since(&self, base_year: i32) -> u32 {
        u32::try_from(self.year - base_year).unwrap_or(0)
    }

    /// Calendar year `offset` years after this period.
    pub fn year_after(&self, offset: u32) -> i32 {
        self.year + offset as i32
    }
}

impl ValueObject for TargetPeriod {}

impl core::fmt::Display for TargetPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TargetPeriod {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|e| ImpactError::invalid_input(format!("period {s:?}: {e}")))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl TryFrom<String> for TargetPeriod {
    type Error = ImpactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TargetPeriod> for String {
    fn from(value: TargetPeriod) -> Self {
        value.to_string()
    }
}
