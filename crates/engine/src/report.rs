//! Output record of a run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use laborshift_core::{DataWarning, IndustryId, TargetPeriod};

use crate::calculator::NetImpactResult;
use crate::confidence::ConfidenceReport;
use crate::fingerprint::InputFingerprint;
use crate::mapper::{CoverageSummary, IndustryImpactRecord, MappingOutcome};
use crate::projection::ProjectionResult;
use crate::validation::ValidationReport;

/// Result of an impact run.
///
/// Derived data only: recomputed from the snapshots on every run and never
/// mutated afterwards. Versioned by `period`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactReport {
    pub period: TargetPeriod,
    pub fingerprint: InputFingerprint,

    /// Industry-level rates from the mapper.
    pub rates: BTreeMap<IndustryId, IndustryImpactRecord>,
    pub coverage: CoverageSummary,
    /// Industries excluded for lack of employment.
    pub skipped: Vec<IndustryId>,

    pub impact: NetImpactResult,
    pub validation: ValidationReport,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projections: Option<ProjectionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceReport>,

    /// Optional human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Free-form metadata (engine version, request parameters, timings).
    #[serde(default)]
    pub metadata: JsonValue,
}

impl ImpactReport {
    pub fn new(
        fingerprint: InputFingerprint,
        mapping: MappingOutcome,
        impact: NetImpactResult,
        validation: ValidationReport,
    ) -> Self {
        Self {
            period: impact.period,
            fingerprint,
            rates: mapping.records,
            coverage: mapping.summary,
            skipped: mapping.skipped,
            impact,
            validation,
            projections: None,
            confidence: None,
            explanation: None,
            metadata: JsonValue::Null,
        }
    }

    pub fn with_projections(mut self, projections: ProjectionResult) -> Self {
        self.projections = Some(projections);
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceReport) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }

    /// Non-fatal data warnings collected during the run.
    pub fn warnings(&self) -> &[DataWarning] {
        &self.impact.data_quality.warnings
    }
}
