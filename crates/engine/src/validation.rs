//! Result trustworthiness checks.
//!
//! The calculated result is always checked. Projections and confidence bands
//! are checked when attached: every value finite, central values inside their
//! band, band statistics ordered.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use laborshift_core::{IndustryId, UnitInterval};

use crate::calculator::{IndustryNetImpact, NetImpactResult};
use crate::confidence::{ConfidenceBand, ConfidenceReport};
use crate::config::ModelConfig;
use crate::mapper::{IndustryImpactRecord, MappingOutcome};
use crate::projection::{ImpactDirection, ProjectionResult, ProjectionSeries};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub check: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<IndustryId>,
    pub message: String,
}

impl ValidationIssue {
    fn warning(check: &str, industry: Option<&IndustryId>, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            check: check.to_string(),
            industry: industry.cloned(),
            message,
        }
    }

    fn error(check: &str, industry: Option<&IndustryId>, message: String) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(check, industry, message)
        }
    }
}

/// Component scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    pub coverage: f64,
    pub reasonableness: f64,
    pub confidence: f64,
    pub completeness: f64,
}

impl QualityScores {
    pub fn mean(&self) -> f64 {
        (self.coverage + self.reasonableness + self.confidence + self.completeness) / 4.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No error-level issues.
    pub passed: bool,
    /// Passed and the trust score reached the threshold.
    pub trusted: bool,
    pub trust_score: UnitInterval,
    pub scores: QualityScores,
    /// Rollup employment ÷ the aggregate industry's employment, when one is present.
    pub employment_coverage: Option<f64>,
    pub issues: Vec<ValidationIssue>,
    pub recommendations: Vec<String>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

#[derive(Debug, Clone)]
pub struct ResultValidator<'a> {
    config: &'a ModelConfig,
    projections: Option<&'a ProjectionResult>,
    confidence: Option<&'a ConfidenceReport>,
}

impl<'a> ResultValidator<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            projections: None,
            confidence: None,
        }
    }

    pub fn with_projections(mut self, projections: &'a ProjectionResult) -> Self {
        self.projections = Some(projections);
        self
    }

    pub fn with_confidence(mut self, confidence: &'a ConfidenceReport) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn validate(&self, result: &NetImpactResult, mapping: &MappingOutcome) -> ValidationReport {
        let t = &self.config.validation;
        let mut issues = Vec::new();

        if !result.net_impact.is_finite() {
            issues.push(ValidationIssue::error(
                "non_finite",
                None,
                format!("aggregate net impact is {}", result.net_impact),
            ));
        } else if result.net_impact.abs() > t.max_total_impact {
            issues.push(ValidationIssue::warning(
                "total_impact",
                None,
                format!(
                    "aggregate net impact {:.4} exceeds ±{}",
                    result.net_impact, t.max_total_impact
                ),
            ));
        }

        for industry in result.industries.values() {
            self.check_industry(industry, &mut issues);
        }

        let employment_coverage = self.employment_coverage(result, &mut issues);

        if let Some(projections) = self.projections {
            check_projections(projections, &mut issues);
        }
        if let Some(confidence) = self.confidence {
            check_confidence(confidence, &mut issues);
        }

        let records: Vec<&IndustryImpactRecord> = mapping
            .records
            .values()
            .filter(|r| !self.config.is_aggregate(&r.industry))
            .collect();
        let scores = QualityScores {
            coverage: self.coverage_score(&records),
            reasonableness: self.reasonableness_score(&records),
            confidence: self.confidence_score(&records),
            completeness: result.data_quality.completeness.get(),
        };
        let trust_score = UnitInterval::clamped(scores.mean());

        let passed = !issues.iter().any(|i| i.severity == Severity::Error);
        let trusted = passed && trust_score.get() >= t.trust_threshold;
        let recommendations = recommendations(&scores, trust_score.get(), t.trust_threshold);

        for issue in issues.iter().filter(|i| i.severity == Severity::Error) {
            warn!(check = %issue.check, message = %issue.message, "validation error");
        }
        info!(
            passed,
            trusted,
            trust_score = trust_score.get(),
            issues = issues.len(),
            "validated result"
        );

        ValidationReport {
            passed,
            trusted,
            trust_score,
            scores,
            employment_coverage,
            issues,
            recommendations,
        }
    }

    fn check_industry(&self, industry: &IndustryNetImpact, issues: &mut Vec<ValidationIssue>) {
        let t = &self.config.validation;
        let id = Some(&industry.industry);
        let c = &industry.components;

        let values = [
            industry.net_impact,
            c.displacement,
            c.creation,
            c.demand,
            industry.transformation_rate,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            issues.push(ValidationIssue::error(
                "non_finite",
                id,
                "non-finite impact component".to_string(),
            ));
            return;
        }
        if industry.aggregate {
            return;
        }

        if industry.net_impact.abs() > t.max_industry_impact {
            issues.push(ValidationIssue::warning(
                "industry_impact",
                id,
                format!("net impact {:.4} exceeds ±{}", industry.net_impact, t.max_industry_impact),
            ));
        }
        if c.displacement > t.max_displacement {
            issues.push(ValidationIssue::warning(
                "displacement",
                id,
                format!("displacement {:.4} exceeds {}", c.displacement, t.max_displacement),
            ));
        }
        if c.creation > t.max_creation {
            issues.push(ValidationIssue::warning(
                "creation",
                id,
                format!("creation {:.4} exceeds {}", c.creation, t.max_creation),
            ));
        }
        if c.demand.abs() > t.max_demand {
            issues.push(ValidationIssue::warning(
                "demand",
                id,
                format!("demand {:.4} exceeds ±{}", c.demand, t.max_demand),
            ));
        }
    }

    fn employment_coverage(&self, result: &NetImpactResult, issues: &mut Vec<ValidationIssue>) -> Option<f64> {
        let t = &self.config.validation;
        let aggregate = result
            .industries
            .values()
            .find(|i| i.aggregate && i.employment > 0)?;
        let ratio = result.total_employment as f64 / aggregate.employment as f64;
        if ratio > t.max_employment_coverage {
            issues.push(ValidationIssue::error(
                "employment_coverage",
                Some(&aggregate.industry),
                format!(
                    "industry employment is {:.1}% of {}; double counting suspected",
                    ratio * 100.0,
                    aggregate.industry
                ),
            ));
        } else if ratio < t.min_employment_coverage {
            issues.push(ValidationIssue::warning(
                "employment_coverage",
                Some(&aggregate.industry),
                format!(
                    "industries cover only {:.1}% of {}",
                    ratio * 100.0,
                    aggregate.industry
                ),
            ));
        }
        Some(ratio)
    }

    fn coverage_score(&self, records: &[&IndustryImpactRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let n = records.len() as f64;
        let high = records
            .iter()
            .filter(|r| r.coverage.get() >= self.config.validation.high_coverage)
            .count() as f64;
        let average = records.iter().map(|r| r.coverage.get()).sum::<f64>() / n;
        (high / n * 0.6 + average * 0.4).min(1.0)
    }

    fn reasonableness_score(&self, records: &[&IndustryImpactRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let t = &self.config.validation;
        let within = |v: f64, (lo, hi): (f64, f64)| (lo..=hi).contains(&v);
        let reasonable = records
            .iter()
            .filter(|r| {
                let a = r.automation_rate.get();
                let g = r.augmentation_rate.get();
                within(a, t.automation_range) && within(g, t.augmentation_range) && within(a + g, t.combined_range)
            })
            .count();
        reasonable as f64 / records.len() as f64
    }

    fn confidence_score(&self, records: &[&IndustryImpactRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        let n = records.len() as f64;
        let average = records.iter().map(|r| r.confidence.get()).sum::<f64>() / n;
        let high = records
            .iter()
            .filter(|r| r.confidence.get() >= self.config.validation.high_confidence)
            .count() as f64;
        average * 0.6 + high / n * 0.4
    }
}

fn check_projections(projections: &ProjectionResult, issues: &mut Vec<ValidationIssue>) {
    for scenario in projections.scenarios.values() {
        for (industry, series) in scenario.all_series() {
            if let Some((check, problem)) = series_problem(series) {
                issues.push(ValidationIssue::error(
                    check,
                    industry,
                    format!("{} projection: {problem}", scenario.scenario),
                ));
            }
        }
    }
}

/// First problem found in a series, as `(check, message)`.
fn series_problem(series: &ProjectionSeries) -> Option<(&'static str, String)> {
    for y in &series.years {
        if ![y.adoption, y.central, y.pessimistic, y.optimistic].iter().all(|v| v.is_finite()) {
            return Some(("non_finite", format!("non-finite value in {}", y.year)));
        }
        if !(0.0..=series.ceiling).contains(&y.central) {
            return Some((
                "projection_range",
                format!("central {:.4} in {} outside [0, {}]", y.central, y.year, series.ceiling),
            ));
        }
        let (low, high) = match series.direction {
            ImpactDirection::Loss => (y.optimistic, y.pessimistic),
            ImpactDirection::Gain => (y.pessimistic, y.optimistic),
        };
        if !(low <= y.central && y.central <= high) {
            return Some((
                "projection_band",
                format!("central {:.4} in {} outside band [{low:.4}, {high:.4}]", y.central, y.year),
            ));
        }
    }
    let components_finite = series.components.iter().all(|c| {
        [c.market_maturity, c.displacement, c.creation, c.demand, c.net_impact]
            .iter()
            .all(|v| v.is_finite())
    });
    (!components_finite).then(|| ("non_finite", "non-finite component trajectory".to_string()))
}

fn check_confidence(report: &ConfidenceReport, issues: &mut Vec<ValidationIssue>) {
    let aggregate = std::iter::once(&report.baseline).chain(&report.years).map(|b| (None, b));
    let industries = report.industries.iter().flat_map(|(id, bands)| {
        std::iter::once(&bands.baseline)
            .chain(&bands.years)
            .map(move |b| (Some(id), b))
    });
    for (industry, band) in aggregate.chain(industries) {
        if let Some(problem) = band_problem(band) {
            issues.push(ValidationIssue::error(
                "confidence_band",
                industry,
                format!("{} band: {problem}", band.year),
            ));
        }
    }
}

fn band_problem(b: &ConfidenceBand) -> Option<String> {
    let values = [b.low, b.p25, b.median, b.p75, b.high, b.mean, b.std_dev, b.point_confidence];
    if !values.iter().all(|v| v.is_finite()) {
        return Some("non-finite statistic".to_string());
    }
    if !(b.low <= b.p25 && b.p25 <= b.median && b.median <= b.p75 && b.p75 <= b.high) {
        return Some(format!(
            "percentiles out of order ({:.4}, {:.4}, {:.4}, {:.4}, {:.4})",
            b.low, b.p25, b.median, b.p75, b.high
        ));
    }
    if b.std_dev < 0.0 || !(0.0..=1.0).contains(&b.point_confidence) {
        return Some("spread or point confidence out of range".to_string());
    }
    None
}

fn recommendations(scores: &QualityScores, trust: f64, threshold: f64) -> Vec<String> {
    let mut out = Vec::new();
    if scores.coverage < 0.6 {
        out.push("collect occupation-level employment for industries with low coverage".to_string());
    }
    if scores.reasonableness < 0.8 {
        out.push("review outlier automation/augmentation rates".to_string());
    }
    if scores.confidence < 0.6 {
        out.push("extend occupation rate coverage to raise mapping confidence".to_string());
    }
    if scores.completeness < 0.7 {
        out.push("supply posting signals and occupation breakdowns to raise completeness".to_string());
    }
    if trust < threshold {
        out.push("treat this result as fallback-based until data quality improves".to_string());
    }
    out
}
