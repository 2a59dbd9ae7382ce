//! Immutable input snapshots supplied by collaborators.
//!
//! Collectors load these once, up front; the engine only reads them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::id::IndustryId;
use crate::value_object::UnitInterval;

/// Measured AI usage for one occupation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationRecord {
    /// Raw occupation code as delivered by the source (normalized by the mapper).
    pub code: String,
    #[serde(default)]
    pub title: String,
    pub automation_rate: UnitInterval,
    pub augmentation_rate: UnitInterval,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<UnitInterval>,
}

impl OccupationRecord {
    pub fn new(
        code: impl Into<String>,
        automation_rate: UnitInterval,
        augmentation_rate: UnitInterval,
    ) -> Self {
        Self {
            code: code.into(),
            title: String::new(),
            automation_rate,
            augmentation_rate,
            tasks: Vec::new(),
            confidence: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_confidence(mut self, confidence: UnitInterval) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Occupation rate source snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupationRateSnapshot {
    pub occupations: Vec<OccupationRecord>,
}

impl OccupationRateSnapshot {
    pub fn new(occupations: Vec<OccupationRecord>) -> Self {
        Self { occupations }
    }

    pub fn is_empty(&self) -> bool {
        self.occupations.is_empty()
    }
}

/// Employment of an industry, broken down by occupation when available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentBreakdown {
    /// Raw occupation code → employment count.
    ByOccupation(BTreeMap<String, u64>),
    /// Only the industry total is known.
    Total(u64),
}

/// Employment record for one industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryEmploymentRecord {
    pub industry: IndustryId,
    pub employment: EmploymentBreakdown,
    /// Total employment in the previous period, when the source provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_total: Option<u64>,
}

impl IndustryEmploymentRecord {
    pub fn by_occupation<I, S>(industry: impl Into<IndustryId>, occupations: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        Self {
            industry: industry.into(),
            employment: EmploymentBreakdown::ByOccupation(
                occupations.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ),
            previous_total: None,
        }
    }

    pub fn total(industry: impl Into<IndustryId>, total: u64) -> Self {
        Self {
            industry: industry.into(),
            employment: EmploymentBreakdown::Total(total),
            previous_total: None,
        }
    }

    pub fn with_previous_total(mut self, previous: u64) -> Self {
        self.previous_total = Some(previous);
        self
    }

    /// Sum of the breakdown, or the reported total.
    /// Total employment; a breakdown whose sum exceeds `u64::MAX` saturates.
    pub fn total_employment(&self) -> u64 {
        self.checked_total_employment().unwrap_or(u64::MAX)
    }

    /// Total employment, or `None` when the breakdown sum overflows.
    pub fn checked_total_employment(&self) -> Option<u64> {
        match &self.employment {
            EmploymentBreakdown::ByOccupation(m) => m.values().try_fold(0u64, |acc, n| acc.checked_add(*n)),
            EmploymentBreakdown::Total(t) => Some(*t),
        }
    }

    pub fn has_breakdown(&self) -> bool {
        matches!(self.employment, EmploymentBreakdown::ByOccupation(_))
    }

    /// Year-over-year growth of total employment, when a previous total exists.
    pub fn growth_rate(&self) -> Option<f64> {
        let previous = self.previous_total.filter(|p| *p > 0)?;
        let current = self.total_employment() as f64;
        Some((current - previous as f64) / previous as f64)
    }
}

/// Employment source snapshot.
///
/// Industry ids are expected to be unique; when a source repeats one, the first
/// record wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentSnapshot {
    pub industries: Vec<IndustryEmploymentRecord>,
}

impl EmploymentSnapshot {
    pub fn new(industries: Vec<IndustryEmploymentRecord>) -> Self {
        Self { industries }
    }

    pub fn get(&self, industry: &IndustryId) -> Option<&IndustryEmploymentRecord> {
        self.industries.iter().find(|r| &r.industry == industry)
    }

    /// Records with duplicate industry ids removed (first occurrence kept).
    pub fn unique(&self) -> Vec<&IndustryEmploymentRecord> {
        let mut seen = BTreeSet::new();
        self.industries
            .iter()
            .filter(|r| seen.insert(r.industry.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
    }
}

/// Job-posting signal counts for the target period.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSignals {
    /// Postings for AI-specific roles.
    pub ai_postings: u64,
    /// Postings for AI-infrastructure roles.
    pub infrastructure_postings: u64,
}

impl PostingSignals {
    pub fn new(ai_postings: u64, infrastructure_postings: u64) -> Self {
        Self {
            ai_postings,
            infrastructure_postings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ai_postings == 0 && self.infrastructure_postings == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_employment_sums_breakdown() {
        let r = IndustryEmploymentRecord::by_occupation("Information", [("15-1252", 100), ("43-3031", 50)]);
        assert_eq!(r.total_employment(), 150);
        assert!(r.has_breakdown());

        let t = IndustryEmploymentRecord::total("Government", 900).with_previous_total(1_000);
        assert_eq!(t.total_employment(), 900);
        assert!(!t.has_breakdown());
        assert!((t.growth_rate().unwrap() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn overflowing_breakdown_saturates() {
        let r = IndustryEmploymentRecord::by_occupation("Manufacturing", [("51-2092", u64::MAX), ("43-3031", 2)]);
        assert_eq!(r.checked_total_employment(), None);
        assert_eq!(r.total_employment(), u64::MAX);
    }

    #[test]
    fn unique_keeps_first_duplicate() {
        let snapshot = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::total("Mining", 10),
            IndustryEmploymentRecord::total("Mining", 20),
            IndustryEmploymentRecord::total("Construction", 30),
        ]);
        let unique = snapshot.unique();
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].total_employment(), 10);
    }

    #[test]
    fn employment_breakdown_json_shape() {
        let json = r#"{"industry":"Information","employment":{"by_occupation":{"151252":10}}}"#;
        let r: IndustryEmploymentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.total_employment(), 10);
        assert_eq!(r.previous_total, None);
    }
}
