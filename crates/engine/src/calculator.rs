//! Net employment impact.
//!
//! ```text
//! net_impact   = −displacement + creation × market_maturity + demand
//! displacement = automation × displacement_factor × implementation_rate
//!              + augmentation × efficiency × adoption_rate × capacity_utilization
//! creation     = direct_share + infrastructure_share
//! demand       = productivity_gain × labor_share × elasticity
//! ```
//!
//! `net_impact` is the fractional change; the employment level after the
//! change is `employment × (1 + net_impact)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use laborshift_core::{
    DataWarning, EmploymentSnapshot, ImpactError, ImpactResult, IndustryId, PostingSignals,
    TargetPeriod, UnitInterval,
};

use crate::config::{EffectFactors, IndustryProfile, ModelConfig};
use crate::mapper::{IndustryImpactRecord, MappingOutcome, RateSource};

/// Everything a calculation reads.
#[derive(Debug, Clone, Copy)]
pub struct CalculationInput<'a> {
    pub employment: &'a EmploymentSnapshot,
    pub mapping: &'a MappingOutcome,
    pub signals: Option<&'a PostingSignals>,
    pub period: TargetPeriod,
}

/// Formula components for one industry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactComponents {
    pub pure_automation: f64,
    pub capacity_augmentation: f64,
    pub capacity_utilization: f64,
    pub displacement: f64,
    pub direct_creation: f64,
    pub infrastructure_creation: f64,
    pub creation: f64,
    pub market_maturity: f64,
    pub elasticity: f64,
    pub demand: f64,
}

impl ImpactComponents {
    /// `−displacement + creation × maturity + demand`.
    pub fn net_impact(&self) -> f64 {
        -self.displacement + self.creation * self.market_maturity + self.demand
    }

    pub fn transformation_rate(&self) -> f64 {
        self.displacement.abs() + self.creation.abs() + self.demand.abs()
    }
}

/// Job-creation shares shared by every industry in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreationShares {
    pub direct: f64,
    pub infrastructure: f64,
    /// `true` when derived from posting signals rather than defaults.
    pub from_signals: bool,
}

/// Displacement, demand and net impact for a single industry.
///
/// Pure function of its arguments; creation and maturity are shared across
/// industries and passed in.
pub fn compute_components(
    record: &IndustryImpactRecord,
    profile: &IndustryProfile,
    effects: &EffectFactors,
    capacity_utilization: f64,
    creation: CreationShares,
    market_maturity: f64,
) -> ImpactComponents {
    let pure_automation =
        record.automation_rate.get() * profile.displacement_factor * effects.implementation_rate;
    let capacity_augmentation = record.augmentation_rate.get()
        * effects.efficiency_factor
        * effects.adoption_rate
        * capacity_utilization;
    let displacement = (pure_automation + capacity_augmentation).clamp(0.0, effects.max_displacement);

    let demand = (effects.productivity_gain * effects.labor_share * profile.elasticity)
        .clamp(effects.min_demand, effects.max_demand);

    let total_creation = (creation.direct + creation.infrastructure).clamp(0.0, effects.max_creation);

    ImpactComponents {
        pure_automation,
        capacity_augmentation,
        capacity_utilization,
        displacement,
        direct_creation: creation.direct,
        infrastructure_creation: creation.infrastructure,
        creation: total_creation,
        market_maturity,
        elasticity: profile.elasticity,
        demand,
    }
}

/// Net impact of one industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryNetImpact {
    pub industry: IndustryId,
    pub employment: u64,
    pub components: ImpactComponents,
    /// Fractional employment change (−0.05 = 5% fewer jobs).
    pub net_impact: f64,
    pub projected_employment: f64,
    pub jobs_affected: f64,
    pub transformation_rate: f64,
    pub source: RateSource,
    /// Aggregate rows (e.g. "Total Nonfarm") are excluded from rollups.
    pub aggregate: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Every usable industry is backed entirely by measured occupation rates.
    FullyMeasured,
    /// Component formula over a mix of measured and fallback rates.
    ComponentBased,
    /// Weighted coverage below the configured threshold.
    FallbackHeavy,
}

/// Which optional inputs were present and how well rates were covered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub has_occupation_rates: bool,
    pub has_employment_breakdown: bool,
    pub has_posting_signals: bool,
    pub has_industry_depth: bool,
    pub weighted_coverage: f64,
    pub weighted_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub method: CalculationMethod,
    pub completeness: UnitInterval,
    pub factors: ConfidenceFactors,
    pub warnings: Vec<DataWarning>,
}

impl DataQuality {
    pub fn is_fully_measured(&self) -> bool {
        self.method == CalculationMethod::FullyMeasured
    }

    pub fn is_fallback_heavy(&self) -> bool {
        self.method == CalculationMethod::FallbackHeavy
    }
}

/// Per-industry and aggregate net impact for one target period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetImpactResult {
    pub period: TargetPeriod,
    pub industries: BTreeMap<IndustryId, IndustryNetImpact>,
    /// Employment-weighted net impact over usable non-aggregate industries.
    pub net_impact: f64,
    pub displacement: f64,
    pub creation: f64,
    pub demand: f64,
    pub market_maturity: f64,
    pub transformation_rate: f64,
    pub total_employment: u64,
    pub projected_employment: f64,
    pub jobs_affected: f64,
    pub creation_shares: CreationShares,
    pub data_quality: DataQuality,
}

impl NetImpactResult {
    /// Industries that take part in the rollup.
    pub fn rollup_industries(&self) -> impl Iterator<Item = &IndustryNetImpact> {
        self.industries.values().filter(|i| !i.aggregate)
    }
}

/// Stateless net impact calculator.
#[derive(Debug, Clone)]
pub struct NetImpactCalculator<'a> {
    config: &'a ModelConfig,
    effects: EffectFactors,
}

impl<'a> NetImpactCalculator<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            effects: config.effects.clone(),
        }
    }

    /// Replace the economy-wide effect factors (used for resampling).
    pub fn with_effects(mut self, effects: EffectFactors) -> Self {
        self.effects = effects;
        self
    }

    pub fn calculate(&self, input: &CalculationInput<'_>) -> ImpactResult<NetImpactResult> {
        let config = self.config;
        let mut warnings = input.mapping.warnings.clone();

        let years = input.period.years_since(config.maturity.adoption_base_year);
        let market_maturity = config.maturity.maturity_for(years);

        // Usable: mapped, present in the employment snapshot, non-zero employment.
        let mut usable: Vec<&IndustryImpactRecord> = Vec::new();
        for record in input.mapping.records.values() {
            if record.total_employment == 0 || input.employment.get(&record.industry).is_none() {
                warn!(industry = %record.industry, "no employment for mapped industry; excluded");
                warnings.push(DataWarning::missing_data(
                    record.industry.clone(),
                    "no employment record for mapped industry",
                ));
                continue;
            }
            usable.push(record);
        }

        let rollup_total: u64 = usable
            .iter()
            .filter(|r| !config.is_aggregate(&r.industry))
            .fold(0u64, |acc, r| acc.saturating_add(r.total_employment));
        if rollup_total == 0 {
            return Err(ImpactError::no_usable_industries(format!(
                "none of {} mapped industries has usable employment",
                input.mapping.records.len()
            )));
        }

        let creation = self.creation_shares(input.signals, rollup_total);

        let mut industries = BTreeMap::new();
        for record in usable {
            let profile = config.profiles.profile_for(&record.industry);
            let capacity = input
                .employment
                .get(&record.industry)
                .and_then(|e| e.growth_rate())
                .map(|g| self.effects.utilization_for_growth(g))
                .unwrap_or(profile.capacity_utilization);

            let components =
                compute_components(record, profile, &self.effects, capacity, creation, market_maturity);
            let net = components.net_impact();
            let employment = record.total_employment as f64;

            debug!(
                industry = %record.industry,
                displacement = components.displacement,
                creation = components.creation,
                demand = components.demand,
                net_impact = net,
                "industry net impact"
            );

            industries.insert(
                record.industry.clone(),
                IndustryNetImpact {
                    industry: record.industry.clone(),
                    employment: record.total_employment,
                    components,
                    net_impact: net,
                    projected_employment: employment * (1.0 + net),
                    jobs_affected: employment * net,
                    transformation_rate: components.transformation_rate(),
                    source: record.source,
                    aggregate: config.is_aggregate(&record.industry),
                },
            );
        }

        let total = rollup_total as f64;
        let weighted = |f: &dyn Fn(&IndustryNetImpact) -> f64| -> f64 {
            industries
                .values()
                .filter(|i| !i.aggregate)
                .map(|i| f(i) * i.employment as f64)
                .sum::<f64>()
                / total
        };
        let net_impact = weighted(&|i| i.net_impact);
        let displacement = weighted(&|i| i.components.displacement);
        let creation_rate = weighted(&|i| i.components.creation);
        let demand = weighted(&|i| i.components.demand);
        let transformation_rate = weighted(&|i| i.transformation_rate);

        let data_quality = self.data_quality(input, &industries, rollup_total, warnings);

        debug!(
            period = %input.period,
            industries = industries.len(),
            net_impact,
            transformation_rate,
            method = ?data_quality.method,
            completeness = data_quality.completeness.get(),
            "calculated net impact"
        );

        Ok(NetImpactResult {
            period: input.period,
            industries,
            net_impact,
            displacement,
            creation: creation_rate,
            demand,
            market_maturity,
            transformation_rate,
            total_employment: rollup_total,
            projected_employment: total * (1.0 + net_impact),
            jobs_affected: total * net_impact,
            creation_shares: creation,
            data_quality,
        })
    }

    fn creation_shares(&self, signals: Option<&PostingSignals>, total_employment: u64) -> CreationShares {
        let c = &self.config.creation;
        match signals.filter(|s| !s.is_empty()) {
            Some(s) => {
                let per_posting = c.annualization * c.hires_per_posting / total_employment as f64;
                CreationShares {
                    direct: s.ai_postings as f64 * per_posting,
                    infrastructure: s.infrastructure_postings as f64 * per_posting,
                    from_signals: true,
                }
            }
            None => CreationShares {
                direct: c.direct_share,
                infrastructure: c.infrastructure_share,
                from_signals: false,
            },
        }
    }

    fn data_quality(
        &self,
        input: &CalculationInput<'_>,
        industries: &BTreeMap<IndustryId, IndustryNetImpact>,
        rollup_total: u64,
        mut warnings: Vec<DataWarning>,
    ) -> DataQuality {
        let config = self.config;
        let total = rollup_total as f64;

        let mut weighted_coverage = 0.0;
        let mut weighted_confidence = 0.0;
        let mut breakdown_employment = 0u64;
        let mut measured_any = false;
        let mut rollup_count = 0usize;
        for i in industries.values().filter(|i| !i.aggregate) {
            rollup_count += 1;
            if let Some(r) = input.mapping.get(&i.industry) {
                weighted_coverage += r.coverage.get() * r.total_employment as f64;
                weighted_confidence += r.confidence.get() * r.total_employment as f64;
                measured_any |= matches!(r.source, RateSource::Measured | RateSource::Mixed);
            }
            if input.employment.get(&i.industry).is_some_and(|e| e.has_breakdown()) {
                breakdown_employment = breakdown_employment.saturating_add(i.employment);
            }
        }
        weighted_coverage /= total;
        weighted_confidence /= total;

        let has_signals = input.signals.is_some_and(|s| !s.is_empty());
        let depth = (rollup_count as f64 / config.industry_depth_target as f64).min(1.0);
        let completeness = 0.4 * (breakdown_employment as f64 / total)
            + if has_signals { 0.3 } else { 0.0 }
            + 0.3 * depth;

        if weighted_coverage < config.coverage_threshold {
            debug!(
                coverage = weighted_coverage,
                threshold = config.coverage_threshold,
                "weighted coverage below threshold"
            );
            warnings.push(DataWarning::insufficient_coverage(
                None,
                weighted_coverage,
                config.coverage_threshold,
            ));
        }

        let method = if weighted_coverage < config.coverage_threshold {
            CalculationMethod::FallbackHeavy
        } else if weighted_coverage >= 1.0 - 1e-9 {
            CalculationMethod::FullyMeasured
        } else {
            CalculationMethod::ComponentBased
        };

        DataQuality {
            method,
            completeness: UnitInterval::clamped(completeness),
            factors: ConfidenceFactors {
                has_occupation_rates: measured_any,
                has_employment_breakdown: breakdown_employment > 0,
                has_posting_signals: has_signals,
                has_industry_depth: rollup_count >= config.industry_depth_target,
                weighted_coverage,
                weighted_confidence,
            },
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::OccupationIndustryMapper;
    use laborshift_core::{IndustryEmploymentRecord, OccupationRateSnapshot};
    use proptest::prelude::*;

    fn period() -> TargetPeriod {
        "2025-05".parse().unwrap()
    }

    fn record(industry: &str, automation: f64, augmentation: f64, employment: u64) -> IndustryImpactRecord {
        IndustryImpactRecord {
            industry: IndustryId::new(industry),
            automation_rate: UnitInterval::new(automation).unwrap(),
            augmentation_rate: UnitInterval::new(augmentation).unwrap(),
            coverage: UnitInterval::ONE,
            confidence: UnitInterval::ONE,
            total_employment: employment,
            occupations_analyzed: 1,
            source: RateSource::Measured,
        }
    }

    fn default_creation() -> CreationShares {
        CreationShares {
            direct: 0.03,
            infrastructure: 0.015,
            from_signals: false,
        }
    }

    #[test]
    fn displacement_is_hand_computable() {
        let config = ModelConfig::default();
        let profile = &config.profiles.default;
        let c = compute_components(
            &record("Unlisted", 0.32, 0.68, 1_000_000),
            profile,
            &config.effects,
            profile.capacity_utilization,
            default_creation(),
            0.5,
        );
        // 0.32 * 0.6 * 0.12 + 0.68 * 0.5 * 0.3 * 0.7
        assert!((c.displacement - 0.094_44).abs() < 1e-12);
        assert!((c.demand - 0.009).abs() < 1e-12);
        assert!((c.net_impact() - (-0.094_44 + 0.045 * 0.5 + 0.009)).abs() < 1e-12);
    }

    #[test]
    fn posting_signals_drive_creation() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::total("Information", 2_400_000)]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let signals = PostingSignals::new(1_000, 500);

        let result = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: Some(&signals),
                period: period(),
            })
            .unwrap();

        // 1000 * 12 * 2 / 2.4M = 0.01
        assert!((result.creation_shares.direct - 0.01).abs() < 1e-12);
        assert!((result.creation_shares.infrastructure - 0.005).abs() < 1e-12);
        assert!(result.creation_shares.from_signals);
        assert!(result.data_quality.factors.has_posting_signals);
    }

    #[test]
    fn growth_sets_capacity_utilization() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::total("Information", 1_100).with_previous_total(1_000),
        ]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let result = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: None,
                period: period(),
            })
            .unwrap();
        let info = &result.industries[&IndustryId::new("Information")];
        assert_eq!(info.components.capacity_utilization, 0.3);
    }

    #[test]
    fn aggregate_industries_are_excluded_from_rollup() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::total("Total Nonfarm", 10_000_000),
            IndustryEmploymentRecord::total("Manufacturing", 1_000),
        ]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let result = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: None,
                period: period(),
            })
            .unwrap();

        assert_eq!(result.total_employment, 1_000);
        assert!(result.industries[&IndustryId::new("Total Nonfarm")].aggregate);
        let mfg = &result.industries[&IndustryId::new("Manufacturing")];
        assert!((result.net_impact - mfg.net_impact).abs() < 1e-12);
    }

    #[test]
    fn rollup_employment_saturates() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![
            IndustryEmploymentRecord::total("Manufacturing", u64::MAX),
            IndustryEmploymentRecord::total("Construction", u64::MAX),
        ]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let result = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: None,
                period: period(),
            })
            .unwrap();

        assert_eq!(result.total_employment, u64::MAX);
        assert!(result.net_impact.is_finite());
        assert!(result.data_quality.warnings.contains(&DataWarning::employment_overflow(None)));
    }

    #[test]
    fn only_aggregates_is_a_hard_failure() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::total("Total Nonfarm", 100)]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let err = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: None,
                period: period(),
            })
            .unwrap_err();
        assert!(matches!(err, ImpactError::NoUsableIndustries(_)));
    }

    #[test]
    fn fallback_only_run_is_tagged_fallback_heavy() {
        let config = ModelConfig::default();
        let employment = EmploymentSnapshot::new(vec![IndustryEmploymentRecord::total("Government", 5_000)]);
        let mapping = OccupationIndustryMapper::new(&config).map(&OccupationRateSnapshot::default(), &employment);
        let result = NetImpactCalculator::new(&config)
            .calculate(&CalculationInput {
                employment: &employment,
                mapping: &mapping,
                signals: None,
                period: period(),
            })
            .unwrap();
        assert!(result.data_quality.is_fallback_heavy());
        assert!(result
            .data_quality
            .warnings
            .iter()
            .any(|w| matches!(w, DataWarning::InsufficientCoverage { industry: None, .. })));
        // No breakdown, no signals, 1 of 8 industries.
        assert!((result.data_quality.completeness.get() - 0.3 / 8.0).abs() < 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn displacement_stays_bounded(
            automation in 0.0f64..=1.0,
            augmentation in 0.0f64..=1.0,
            displacement_factor in 0.0f64..=1.0,
            implementation_rate in 0.0f64..=1.0,
            efficiency in 0.0f64..=1.0,
            adoption in 0.0f64..=1.0,
            capacity in 0.0f64..=1.0,
        ) {
            let config = ModelConfig::default();
            let mut effects = config.effects.clone();
            effects.implementation_rate = implementation_rate;
            effects.efficiency_factor = efficiency;
            effects.adoption_rate = adoption;
            let mut profile = config.profiles.default.clone();
            profile.displacement_factor = displacement_factor;

            let c = compute_components(
                &record("Any", automation, augmentation, 1),
                &profile,
                &effects,
                capacity,
                default_creation(),
                0.5,
            );
            prop_assert!((0.0..=0.8).contains(&c.displacement));
            prop_assert!((effects.min_demand..=effects.max_demand).contains(&c.demand));
            prop_assert!((0.0..=effects.max_creation).contains(&c.creation));
        }
    }
}
