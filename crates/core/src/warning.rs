//! Non-fatal data-quality signals.

use serde::{Deserialize, Serialize};

use crate::id::IndustryId;

/// A recoverable problem encountered during a run.
///
/// Warnings are collected on the derived records so downstream consumers can
/// tell a fully measured number from one that leaned on fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// An industry (or an occupation inside it) lacked required input and was excluded.
    MissingData {
        industry: IndustryId,
        detail: String,
    },

    /// A raw occupation code failed normalization; overall fallback rates were used.
    UnrecognizedTaxonomyCode {
        industry: Option<IndustryId>,
        raw: String,
    },

    /// Employment-weighted coverage fell below the configured threshold.
    ///
    /// `industry == None` means the economy-wide weighted coverage.
    InsufficientCoverage {
        industry: Option<IndustryId>,
        coverage: f64,
        threshold: f64,
    },

    /// Employment counts summed past `u64::MAX`; totals were saturated.
    EmploymentOverflow {
        industry: Option<IndustryId>,
    },
}

impl DataWarning {
    pub fn missing_data(industry: IndustryId, detail: impl Into<String>) -> Self {
        Self::MissingData {
            industry,
            detail: detail.into(),
        }
    }

    pub fn unrecognized_code(industry: Option<IndustryId>, raw: impl Into<String>) -> Self {
        Self::UnrecognizedTaxonomyCode {
            industry,
            raw: raw.into(),
        }
    }

    pub fn insufficient_coverage(industry: Option<IndustryId>, coverage: f64, threshold: f64) -> Self {
        Self::InsufficientCoverage {
            industry,
            coverage,
            threshold,
        }
    }

    pub fn employment_overflow(industry: Option<IndustryId>) -> Self {
        Self::EmploymentOverflow { industry }
    }
}

impl core::fmt::Display for DataWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataWarning::MissingData { industry, detail } => {
                write!(f, "{industry}: missing data ({detail})")
            }
            DataWarning::UnrecognizedTaxonomyCode { industry: Some(i), raw } => {
                write!(f, "{i}: unrecognized occupation code {raw:?}")
            }
            DataWarning::UnrecognizedTaxonomyCode { industry: None, raw } => {
                write!(f, "unrecognized occupation code {raw:?}")
            }
            DataWarning::InsufficientCoverage {
                industry,
                coverage,
                threshold,
            } => {
                let scope = industry.as_ref().map(|i| i.as_str()).unwrap_or("economy");
                write!(
                    f,
                    "{scope}: coverage {coverage:.2} below threshold {threshold:.2}"
                )
            }
            DataWarning::EmploymentOverflow { industry } => {
                let scope = industry.as_ref().map(|i| i.as_str()).unwrap_or("economy");
                write!(f, "{scope}: employment total exceeds u64, saturated")
            }
        }
    }
}
