//! Occupation → industry rate aggregation.
//!
//! For each industry the occupation-level automation and augmentation rates are
//! weighted by the occupation's share of industry employment. Occupations
//! without a measured rate fall back to the taxonomy-group table; industries
//! that report only a total fall back to the industry table.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use laborshift_core::{
    DataWarning, EmploymentBreakdown, EmploymentSnapshot, IndustryEmploymentRecord, IndustryId,
    Normalized, OccupationCode, OccupationRateSnapshot, OccupationRecord, UnitInterval, normalize,
};

use crate::config::{ModelConfig, RatePair};

/// Where an industry's rates came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Every occupation had a measured rate.
    Measured,
    /// Some occupations were measured, the rest used taxonomy fallbacks.
    Mixed,
    /// No occupation was measured.
    TaxonomyFallback,
    /// No occupation breakdown; industry-level fallback rates.
    IndustryFallback,
}

/// Industry-level rates derived from occupation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryImpactRecord {
    pub industry: IndustryId,
    pub automation_rate: UnitInterval,
    pub augmentation_rate: UnitInterval,
    /// Employment-weighted share backed by measured rates.
    pub coverage: UnitInterval,
    pub confidence: UnitInterval,
    pub total_employment: u64,
    pub occupations_analyzed: usize,
    pub source: RateSource,
}

/// Running employment-weighted sums.
///
/// Employment counts saturate at `u64::MAX`. Accumulators over disjoint occupation sets can be merged, so an industry
/// may be aggregated in any partition and recombined.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RateAccumulator {
    employment: u64,
    measured_employment: u64,
    weighted_automation: f64,
    weighted_augmentation: f64,
    occupations: usize,
    measured_occupations: usize,
}

impl RateAccumulator {
    pub fn add(&mut self, employment: u64, rates: RatePair, measured: bool) {
        let weight = employment as f64;
        self.employment = self.employment.saturating_add(employment);
        self.weighted_automation += rates.automation.get() * weight;
        self.weighted_augmentation += rates.augmentation.get() * weight;
        self.occupations += 1;
        if measured {
            self.measured_employment = self.measured_employment.saturating_add(employment);
            self.measured_occupations += 1;
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            employment: self.employment.saturating_add(other.employment),
            measured_employment: self.measured_employment.saturating_add(other.measured_employment),
            weighted_automation: self.weighted_automation + other.weighted_automation,
            weighted_augmentation: self.weighted_augmentation + other.weighted_augmentation,
            occupations: self.occupations + other.occupations,
            measured_occupations: self.measured_occupations + other.measured_occupations,
        }
    }

    pub fn employment(&self) -> u64 {
        self.employment
    }

    /// Weighted automation rate; `None` when no employment was added.
    pub fn automation(&self) -> Option<f64> {
        (self.employment > 0).then(|| self.weighted_automation / self.employment as f64)
    }

    pub fn augmentation(&self) -> Option<f64> {
        (self.employment > 0).then(|| self.weighted_augmentation / self.employment as f64)
    }

    pub fn coverage(&self) -> Option<f64> {
        (self.employment > 0).then(|| self.measured_employment as f64 / self.employment as f64)
    }

    fn source(&self) -> RateSource {
        if self.measured_occupations == 0 {
            RateSource::TaxonomyFallback
        } else if self.measured_occupations == self.occupations {
            RateSource::Measured
        } else {
            RateSource::Mixed
        }
    }
}

/// Each occupation's share of the breakdown's total employment.
///
/// Empty when the breakdown sums to zero.
pub fn employment_shares(breakdown: &BTreeMap<String, u64>) -> BTreeMap<String, f64> {
    let total = breakdown.values().fold(0u64, |acc, n| acc.saturating_add(*n));
    if total == 0 {
        return BTreeMap::new();
    }
    breakdown
        .iter()
        .map(|(code, n)| (code.clone(), *n as f64 / total as f64))
        .collect()
}

/// Coverage distribution over the mapped industries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub industries: usize,
    pub high_coverage: usize,
    pub medium_coverage: usize,
    pub low_coverage: usize,
    pub average_coverage: f64,
    pub average_confidence: f64,
    pub weighted_coverage: f64,
    pub weighted_confidence: f64,
    pub total_employment: u64,
}

/// Output of one mapping pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingOutcome {
    pub records: BTreeMap<IndustryId, IndustryImpactRecord>,
    /// Industries excluded for lack of employment.
    pub skipped: Vec<IndustryId>,
    pub warnings: Vec<DataWarning>,
    pub summary: CoverageSummary,
}

impl MappingOutcome {
    pub fn get(&self, industry: &IndustryId) -> Option<&IndustryImpactRecord> {
        self.records.get(industry)
    }
}

/// Aggregates occupation rates into industry rates.
#[derive(Debug, Clone)]
pub struct OccupationIndustryMapper<'a> {
    config: &'a ModelConfig,
}

impl<'a> OccupationIndustryMapper<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self { config }
    }

    pub fn map(&self, rates: &OccupationRateSnapshot, employment: &EmploymentSnapshot) -> MappingOutcome {
        let (index, mut warnings) = index_rates(rates);

        let per_industry: Vec<(Option<IndustryImpactRecord>, Vec<DataWarning>)> = employment
            .unique()
            .into_par_iter()
            .map(|record| self.map_industry(record, &index))
            .collect();

        let mut outcome = MappingOutcome::default();
        for (record, industry_warnings) in per_industry {
            warnings.extend(industry_warnings);
            if let Some(r) = record {
                outcome.records.insert(r.industry.clone(), r);
            }
        }
        outcome.skipped = employment
            .unique()
            .into_iter()
            .filter(|r| !outcome.records.contains_key(&r.industry))
            .map(|r| r.industry.clone())
            .collect();
        outcome.summary = self.summarize(&outcome.records);
        let overflowed = outcome
            .records
            .values()
            .try_fold(0u64, |acc, r| acc.checked_add(r.total_employment))
            .is_none();
        if overflowed {
            warn!("economy-wide employment exceeds u64; totals saturated");
            warnings.push(DataWarning::employment_overflow(None));
        }
        outcome.warnings = warnings;

        log_extremes(&outcome.records);
        info!(
            industries = outcome.summary.industries,
            skipped = outcome.skipped.len(),
            weighted_coverage = outcome.summary.weighted_coverage,
            warnings = outcome.warnings.len(),
            "mapped occupation rates to industries"
        );
        outcome
    }

    fn map_industry(
        &self,
        record: &IndustryEmploymentRecord,
        index: &BTreeMap<OccupationCode, &OccupationRecord>,
    ) -> (Option<IndustryImpactRecord>, Vec<DataWarning>) {
        let industry = &record.industry;
        let mut warnings = Vec::new();

        let total = match record.checked_total_employment() {
            Some(total) => total,
            None => {
                warn!(industry = %industry, "employment breakdown exceeds u64; total saturated");
                warnings.push(DataWarning::employment_overflow(Some(industry.clone())));
                u64::MAX
            }
        };
        if total == 0 {
            warn!(industry = %industry, "industry has zero recorded employment; excluded");
            warnings.push(DataWarning::missing_data(
                industry.clone(),
                "zero recorded employment",
            ));
            return (None, warnings);
        }

        let multiplier = self.config.reliability.multiplier_for(industry);

        let mapped = match &record.employment {
            EmploymentBreakdown::Total(_) => {
                let rates = self.config.industry_fallback.rates_for(industry);
                debug!(industry = %industry, "no occupation breakdown; industry fallback rates");
                IndustryImpactRecord {
                    industry: industry.clone(),
                    automation_rate: rates.automation,
                    augmentation_rate: rates.augmentation,
                    coverage: UnitInterval::ZERO,
                    confidence: UnitInterval::ZERO,
                    total_employment: total,
                    occupations_analyzed: 0,
                    source: RateSource::IndustryFallback,
                }
            }
            EmploymentBreakdown::ByOccupation(breakdown) => {
                let mut acc = RateAccumulator::default();
                for (raw, employed) in breakdown {
                    let (rates, measured) = match normalize(raw) {
                        Normalized::Canonical(code) => match index.get(&code) {
                            Some(occ) => (
                                RatePair {
                                    automation: occ.automation_rate,
                                    augmentation: occ.augmentation_rate,
                                },
                                true,
                            ),
                            None => (self.config.taxonomy_fallback.rates_for(code.major_group()), false),
                        },
                        Normalized::Unrecognized { raw } => {
                            warn!(industry = %industry, code = %raw, "unrecognized occupation code; default rates");
                            warnings.push(DataWarning::unrecognized_code(Some(industry.clone()), raw));
                            (self.config.taxonomy_fallback.default, false)
                        }
                    };
                    acc.add(*employed, rates, measured);
                }

                // total > 0 here, so the accumulator has employment.
                let coverage = acc.coverage().unwrap_or(0.0);
                IndustryImpactRecord {
                    industry: industry.clone(),
                    automation_rate: UnitInterval::clamped(acc.automation().unwrap_or(0.0)),
                    augmentation_rate: UnitInterval::clamped(acc.augmentation().unwrap_or(0.0)),
                    coverage: UnitInterval::clamped(coverage),
                    confidence: UnitInterval::clamped((coverage * multiplier).min(1.0)),
                    total_employment: acc.employment(),
                    occupations_analyzed: acc.occupations,
                    source: acc.source(),
                }
            }
        };

        debug!(
            industry = %industry,
            automation = mapped.automation_rate.get(),
            augmentation = mapped.augmentation_rate.get(),
            coverage = mapped.coverage.get(),
            confidence = mapped.confidence.get(),
            "industry rates"
        );
        (Some(mapped), warnings)
    }

    fn summarize(&self, records: &BTreeMap<IndustryId, IndustryImpactRecord>) -> CoverageSummary {
        let thresholds = &self.config.validation;
        let mut summary = CoverageSummary {
            industries: records.len(),
            ..CoverageSummary::default()
        };
        if records.is_empty() {
            return summary;
        }

        let mut weighted_coverage = 0.0;
        let mut weighted_confidence = 0.0;
        for r in records.values() {
            let coverage = r.coverage.get();
            if coverage >= thresholds.high_coverage {
                summary.high_coverage += 1;
            } else if coverage >= thresholds.low_coverage {
                summary.medium_coverage += 1;
            } else {
                summary.low_coverage += 1;
            }
            summary.average_coverage += coverage;
            summary.average_confidence += r.confidence.get();
            summary.total_employment = summary.total_employment.saturating_add(r.total_employment);
            weighted_coverage += coverage * r.total_employment as f64;
            weighted_confidence += r.confidence.get() * r.total_employment as f64;
        }

        let n = records.len() as f64;
        summary.average_coverage /= n;
        summary.average_confidence /= n;
        if summary.total_employment > 0 {
            summary.weighted_coverage = weighted_coverage / summary.total_employment as f64;
            summary.weighted_confidence = weighted_confidence / summary.total_employment as f64;
        }
        summary
    }
}

/// Index measured rates by canonical code. The first record for a code wins.
fn index_rates(rates: &OccupationRateSnapshot) -> (BTreeMap<OccupationCode, &OccupationRecord>, Vec<DataWarning>) {
    let mut index = BTreeMap::new();
    let mut warnings = Vec::new();
    for record in &rates.occupations {
        match normalize(&record.code) {
            Normalized::Canonical(code) => {
                index.entry(code).or_insert(record);
            }
            Normalized::Unrecognized { raw } => {
                warn!(code = %raw, "occupation rate record has unrecognized code; ignored");
                warnings.push(DataWarning::unrecognized_code(None, raw));
            }
        }
    }
    (index, warnings)
}

fn log_extremes(records: &BTreeMap<IndustryId, IndustryImpactRecord>) {
    let by_automation = |a: &&IndustryImpactRecord, b: &&IndustryImpactRecord| {
        a.automation_rate
            .get()
            .total_cmp(&b.automation_rate.get())
    };
    if let (Some(top), Some(bottom)) = (
        records.values().max_by(by_automation),
        records.values().min_by(by_automation),
    ) {
        debug!(
            top = %top.industry,
            top_automation = top.automation_rate.get(),
            bottom = %bottom.industry,
            bottom_automation = bottom.automation_rate.get(),
            "automation extremes"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use laborshift_core::IndustryEmploymentRecord;
    use proptest::prelude::*;

    fn rate(code: &str, automation: f64, augmentation: f64) -> OccupationRecord {
        OccupationRecord::new(
            code,
            UnitInterval::new(automation).unwrap(),
            UnitInterval::new(augmentation).unwrap(),
        )
    }

    #[test]
    fn weighted_automation_matches_hand_computation() {
        let config = ModelConfig::default();
        let rates = OccupationRateSnapshot::new(vec![
            rate("15-1252", 0.25, 0.70),
            rate("43-3031", 0.80, 0.20),
        ]);
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::by_occupation(
            "Information",
            [("15-1252", 100_000), ("433031", 20_000)],
        )]);

        let outcome = OccupationIndustryMapper::new(&config).map(&rates, &employment);
        let r = outcome.get(&IndustryId::new("Information")).unwrap();
        assert!((r.automation_rate.get() - 0.341_666_666).abs() < 1e-6);
        assert_eq!(r.total_employment, 120_000);
        assert_eq!(r.coverage.get(), 1.0);
        assert_eq!(r.source, RateSource::Measured);
        // 1.0 coverage * 1.2 reliability clamps at 1.
        assert_eq!(r.confidence.get(), 1.0);
    }

    #[test]
    fn unmeasured_occupations_use_group_fallback() {
        let config = ModelConfig::default();
        let rates = OccupationRateSnapshot::new(vec![rate("15-1252", 0.25, 0.70)]);
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::by_occupation(
            "Manufacturing",
            [("15-1252", 50), ("51-2092", 50)],
        )]);

        let outcome = OccupationIndustryMapper::new(&config).map(&rates, &employment);
        let r = outcome.get(&IndustryId::new("Manufacturing")).unwrap();
        // 0.5 * 0.25 + 0.5 * 0.75 (production group fallback)
        assert!((r.automation_rate.get() - 0.5).abs() < 1e-12);
        assert!((r.coverage.get() - 0.5).abs() < 1e-12);
        assert_eq!(r.source, RateSource::Mixed);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn unrecognized_codes_warn_and_use_default_rates() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::by_occupation(
            "Other Services",
            [("not-a-code", 10)],
        )]);

        let outcome = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let r = outcome.get(&IndustryId::new("Other Services")).unwrap();
        assert_eq!(r.automation_rate, config.taxonomy_fallback.default.automation);
        assert_eq!(r.source, RateSource::TaxonomyFallback);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [DataWarning::UnrecognizedTaxonomyCode { industry: Some(_), .. }]
        ));
    }

    #[test]
    fn total_only_industries_use_industry_table() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::total("Financial Activities", 9_000)]);
        let outcome = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let r = outcome.get(&IndustryId::new("Financial Activities")).unwrap();
        assert_eq!(r.automation_rate.get(), 0.40);
        assert_eq!(r.coverage, UnitInterval::ZERO);
        assert_eq!(r.source, RateSource::IndustryFallback);
        assert_eq!(outcome.summary.low_coverage, 1);
    }

    #[test]
    fn zero_employment_industry_is_skipped_with_warning() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::total("Mining and Logging", 0),
            IndustryEmploymentRecord::total("Construction", 100),
        ]);
        let outcome = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped, vec![IndustryId::new("Mining and Logging")]);
        assert!(matches!(outcome.warnings[0], DataWarning::MissingData { .. }));
    }

    #[test]
    fn overflowing_employment_saturates_with_warning() {
        let config = ModelConfig::default();
        let half = u64::MAX / 2 + 1;
        let employment = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::by_occupation("Manufacturing", [("51-2092", half), ("43-3031", half)]),
            IndustryEmploymentRecord::total("Construction", 100),
        ]);
        let outcome = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);

        let r = outcome.get(&IndustryId::new("Manufacturing")).unwrap();
        assert_eq!(r.total_employment, u64::MAX);
        assert!((0.0..=1.0).contains(&r.automation_rate.get()));
        assert_eq!(outcome.summary.total_employment, u64::MAX);
        assert!(outcome.warnings.contains(&DataWarning::employment_overflow(Some(IndustryId::new("Manufacturing")))));
        assert!(outcome.warnings.contains(&DataWarning::employment_overflow(None)));
    }

    #[test]
    fn reliability_scales_confidence() {
        let config = ModelConfig::default();
        let rates = OccupationRateSnapshot::new(vec![rate("15-1252", 0.25, 0.70)]);
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::by_occupation(
            "Government",
            [("15-1252", 50), ("43-3031", 50)],
        )]);
        let outcome = OccupationIndustryMapper::new(&config).map(&rates, &employment);
        let r = outcome.get(&IndustryId::new("Government")).unwrap();
        assert!((r.confidence.get() - 0.3).abs() < 1e-12);
    }

    fn breakdown_strategy() -> impl Strategy<Value = Vec<(u64, f64, f64)>> {
        prop::collection::vec((0u64..1_000_000, 0.0f64..=1.0, 0.0f64..=1.0), 1..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn shares_sum_to_one(counts in prop::collection::vec(1u64..5_000_000, 1..60)) {
            let breakdown: BTreeMap<String, u64> = counts
                .iter()
                .enumerate()
                .map(|(i, n)| (format!("occ-{i}"), *n))
                .collect();
            let total: f64 = employment_shares(&breakdown).values().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }

        #[test]
        fn partition_then_recombine_matches(rows in breakdown_strategy(), split in 0usize..40) {
            let split = split.min(rows.len());
            let mut whole = RateAccumulator::default();
            let mut left = RateAccumulator::default();
            let mut right = RateAccumulator::default();
            for (i, (n, a, u)) in rows.iter().enumerate() {
                let pair = RatePair::new(*a, *u);
                whole.add(*n, pair, i % 2 == 0);
                if i < split {
                    left.add(*n, pair, i % 2 == 0);
                } else {
                    right.add(*n, pair, i % 2 == 0);
                }
            }
            let merged = left.merge(right);
            prop_assert_eq!(merged.employment(), whole.employment());
            match (merged.automation(), whole.automation()) {
                (Some(m), Some(w)) => prop_assert!((m - w).abs() < 1e-9),
                (None, None) => {}
                other => prop_assert!(false, "mismatch {:?}", other),
            }
            match (merged.coverage(), whole.coverage()) {
                (Some(m), Some(w)) => prop_assert!((m - w).abs() < 1e-12),
                (None, None) => {}
                other => prop_assert!(false, "mismatch {:?}", other),
            }
        }

        #[test]
        fn mapped_rates_stay_in_unit_interval(rows in breakdown_strategy()) {
            let config = ModelConfig::default();
            let rates = OccupationRateSnapshot::new(
                rows.iter()
                    .enumerate()
                    .map(|(i, (_, a, u))| rate(&format!("15-{:04}", i), *a, *u))
                    .collect(),
            );
            let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::by_occupation(
                "Information",
                rows.iter().enumerate().map(|(i, (n, _, _))| (format!("15{:04}", i), *n)),
            )]);
            let outcome = OccupationIndustryMapper::new(&config).map(&rates, &employment);
            for r in outcome.records.values() {
                prop_assert!((0.0..=1.0).contains(&r.automation_rate.get()));
                prop_assert!((0.0..=1.0).contains(&r.augmentation_rate.get()));
                prop_assert!((0.0..=1.0).contains(&r.confidence.get()));
                let total: u64 = rows.iter().map(|(n, _, _)| n).sum();
                prop_assert_eq!(r.total_employment, total);
            }
        }
    }
}
