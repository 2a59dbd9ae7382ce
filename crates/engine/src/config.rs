//! Model configuration.
//!
//! Every constant the engine uses lives here as injected configuration: the
//! fallback tables, per-industry profiles, scenario definitions and the
//! validation thresholds. `ModelConfig::default()` carries the documented
//! defaults; a JSON document may override any subset of them.
//!
//! Configuration is validated eagerly. A malformed value is a fatal
//! [`ImpactError::Configuration`], never silently replaced by a default.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use laborshift_core::{ImpactError, ImpactResult, IndustryId, ScenarioName, UnitInterval};

/// Industry ids used by the default tables.
pub mod industries {
    pub const INFORMATION: &str = "Information";
    pub const PROFESSIONAL_BUSINESS: &str = "Professional and Business Services";
    pub const FINANCIAL: &str = "Financial Activities";
    pub const EDUCATION_HEALTH: &str = "Education and Health Services";
    pub const MANUFACTURING: &str = "Manufacturing";
    pub const TRADE_TRANSPORT: &str = "Trade, Transportation, and Utilities";
    pub const LEISURE_HOSPITALITY: &str = "Leisure and Hospitality";
    pub const CONSTRUCTION: &str = "Construction";
    pub const MINING_LOGGING: &str = "Mining and Logging";
    pub const OTHER_SERVICES: &str = "Other Services";
    pub const GOVERNMENT: &str = "Government";
    pub const AGRICULTURE: &str = "Agriculture";
    pub const TOTAL_NONFARM: &str = "Total Nonfarm";
}

use industries::*;

/// An automation/augmentation pair.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePair {
    pub automation: UnitInterval,
    pub augmentation: UnitInterval,
}

impl RatePair {
    /// Build from raw values, clamping into `[0, 1]`.
    pub fn new(automation: f64, augmentation: f64) -> Self {
        Self {
            automation: UnitInterval::clamped(automation),
            augmentation: UnitInterval::clamped(augmentation),
        }
    }
}

/// Fallback rates keyed by occupation major group (`"43"`, `"19"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyFallbackTable {
    pub groups: BTreeMap<String, RatePair>,
    /// Used for unknown groups and for codes that fail normalization.
    pub default: RatePair,
}

impl TaxonomyFallbackTable {
    pub fn rates_for(&self, major_group: &str) -> RatePair {
        self.groups.get(major_group).copied().unwrap_or(self.default)
    }
}

impl Default for TaxonomyFallbackTable {
    fn default() -> Self {
        let groups = [
            ("11", 0.15, 0.60), // management
            ("13", 0.35, 0.70),
            ("15", 0.25, 0.80), // computer and mathematical
            ("17", 0.30, 0.65),
            ("19", 0.20, 0.75), // life, physical and social science
            ("21", 0.40, 0.50),
            ("23", 0.25, 0.60),
            ("25", 0.20, 0.70),
            ("27", 0.15, 0.65),
            ("29", 0.30, 0.70),
            ("31", 0.45, 0.40),
            ("33", 0.50, 0.35),
            ("35", 0.60, 0.25),
            ("37", 0.55, 0.30),
            ("39", 0.50, 0.40),
            ("41", 0.65, 0.30),
            ("43", 0.70, 0.25), // office and administrative support
            ("45", 0.60, 0.20),
            ("47", 0.45, 0.35),
            ("49", 0.50, 0.40),
            ("51", 0.75, 0.20), // production
            ("53", 0.80, 0.15),
            ("55", 0.35, 0.45),
        ]
        .into_iter()
        .map(|(g, a, u)| (g.to_string(), RatePair::new(a, u)))
        .collect();

        Self {
            groups,
            default: RatePair::new(0.45, 0.35),
        }
    }
}

/// Fallback rates for industries that report only a total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryFallbackTable {
    pub industries: BTreeMap<IndustryId, RatePair>,
    pub default: RatePair,
}

impl IndustryFallbackTable {
    pub fn rates_for(&self, industry: &IndustryId) -> RatePair {
        self.industries.get(industry).copied().unwrap_or(self.default)
    }
}

impl Default for IndustryFallbackTable {
    fn default() -> Self {
        let industries = [
            (INFORMATION, 0.25, 0.75),
            (PROFESSIONAL_BUSINESS, 0.35, 0.65),
            (FINANCIAL, 0.40, 0.60),
            (EDUCATION_HEALTH, 0.20, 0.60),
            (MANUFACTURING, 0.50, 0.40),
            (TRADE_TRANSPORT, 0.60, 0.30),
        ]
        .into_iter()
        .map(|(i, a, u)| (IndustryId::new(i), RatePair::new(a, u)))
        .collect();

        Self {
            industries,
            default: RatePair::new(0.40, 0.50),
        }
    }
}

/// Per-industry data reliability multipliers applied to coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityTable {
    pub multipliers: BTreeMap<IndustryId, f64>,
    pub default: f64,
}

impl ReliabilityTable {
    pub fn multiplier_for(&self, industry: &IndustryId) -> f64 {
        self.multipliers.get(industry).copied().unwrap_or(self.default)
    }
}

impl Default for ReliabilityTable {
    fn default() -> Self {
        let multipliers = [
            (INFORMATION, 1.2),
            (PROFESSIONAL_BUSINESS, 1.1),
            (FINANCIAL, 1.1),
            (MANUFACTURING, 1.0),
            (EDUCATION_HEALTH, 0.9),
            (TRADE_TRANSPORT, 0.8),
            (CONSTRUCTION, 0.7),
            (GOVERNMENT, 0.6),
            (AGRICULTURE, 0.5),
        ]
        .into_iter()
        .map(|(i, m)| (IndustryId::new(i), m))
        .collect();

        Self {
            multipliers,
            default: 1.0,
        }
    }
}

/// Capacity utilization selected when employment grew faster than `min_growth`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityBand {
    pub min_growth: f64,
    pub utilization: f64,
}

/// Economy-wide factors of the net impact formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectFactors {
    pub implementation_rate: f64,
    pub efficiency_factor: f64,
    pub adoption_rate: f64,
    pub productivity_gain: f64,
    pub labor_share: f64,
    pub max_displacement: f64,
    pub min_demand: f64,
    pub max_demand: f64,
    pub max_creation: f64,
    /// Growth bands checked in order; the first band whose `min_growth` is
    /// exceeded wins.
    pub capacity_bands: Vec<CapacityBand>,
    /// Utilization when no band matches (contracting industries).
    pub contraction_utilization: f64,
}

impl Default for EffectFactors {
    fn default() -> Self {
        Self {
            implementation_rate: 0.12,
            efficiency_factor: 0.5,
            adoption_rate: 0.3,
            productivity_gain: 0.15,
            labor_share: 0.6,
            max_displacement: 0.8,
            min_demand: -0.2,
            max_demand: 0.3,
            max_creation: 0.5,
            capacity_bands: vec![
                CapacityBand {
                    min_growth: 0.05,
                    utilization: 0.3,
                },
                CapacityBand {
                    min_growth: 0.02,
                    utilization: 0.5,
                },
                CapacityBand {
                    min_growth: -0.02,
                    utilization: 0.7,
                },
            ],
            contraction_utilization: 0.9,
        }
    }
}

impl EffectFactors {
    /// Capacity utilization implied by year-over-year employment growth.
    pub fn utilization_for_growth(&self, growth: f64) -> f64 {
        self.capacity_bands
            .iter()
            .find(|b| growth > b.min_growth)
            .map(|b| b.utilization)
            .unwrap_or(self.contraction_utilization)
    }
}

/// Deterministic post-processing applied to an industry's raw adoption curve.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapingKind {
    /// Raw curve, untouched.
    Smooth,
    /// Periodic swings around the curve (volatile sectors).
    Oscillating { amplitude: f64, period_years: f64 },
    /// Deployment waves every `wave_years`; `drift` of the gap closes in between.
    Stepped { wave_years: u32, drift: f64 },
    /// Growth is damped every `every` years (regulatory lag).
    RegulatoryPlateau { every: u32, damping: f64 },
}

/// Industry-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub displacement_factor: f64,
    /// Used when no previous-period employment is available.
    pub capacity_utilization: f64,
    pub elasticity: f64,
    pub adoption_ceiling: f64,
    pub adoption_speed: f64,
    pub shaping: ShapingKind,
}

impl IndustryProfile {
    fn new(
        displacement_factor: f64,
        capacity_utilization: f64,
        elasticity: f64,
        adoption_ceiling: f64,
        adoption_speed: f64,
        shaping: ShapingKind,
    ) -> Self {
        Self {
            displacement_factor,
            capacity_utilization,
            elasticity,
            adoption_ceiling,
            adoption_speed,
            shaping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndustryProfiles {
    pub industries: BTreeMap<IndustryId, IndustryProfile>,
    pub default: IndustryProfile,
}

impl IndustryProfiles {
    pub fn profile_for(&self, industry: &IndustryId) -> &IndustryProfile {
        self.industries.get(industry).unwrap_or(&self.default)
    }
}

impl Default for IndustryProfiles {
    fn default() -> Self {
        use ShapingKind::*;
        let industries = [
            (
                INFORMATION,
                IndustryProfile::new(0.6, 0.4, 0.1, 0.95, 1.5, Oscillating { amplitude: 0.04, period_years: 3.0 }),
            ),
            (
                PROFESSIONAL_BUSINESS,
                IndustryProfile::new(0.5, 0.5, 0.2, 0.85, 1.2, Oscillating { amplitude: 0.03, period_years: 4.0 }),
            ),
            (
                FINANCIAL,
                IndustryProfile::new(0.6, 0.6, 0.1, 0.85, 1.3, RegulatoryPlateau { every: 3, damping: 0.6 }),
            ),
            (
                EDUCATION_HEALTH,
                IndustryProfile::new(0.3, 0.7, 0.2, 0.75, 0.7, RegulatoryPlateau { every: 2, damping: 0.5 }),
            ),
            (
                MANUFACTURING,
                IndustryProfile::new(0.8, 0.8, -0.3, 0.80, 1.0, Stepped { wave_years: 2, drift: 0.25 }),
            ),
            (
                TRADE_TRANSPORT,
                IndustryProfile::new(0.7, 0.7, -0.1, 0.70, 1.2, Stepped { wave_years: 2, drift: 0.35 }),
            ),
            (
                LEISURE_HOSPITALITY,
                IndustryProfile::new(0.7, 0.8, 0.15, 0.65, 0.8, Oscillating { amplitude: 0.05, period_years: 2.5 }),
            ),
            (
                CONSTRUCTION,
                IndustryProfile::new(0.6, 0.8, -0.2, 0.60, 0.7, Stepped { wave_years: 3, drift: 0.2 }),
            ),
            (
                MINING_LOGGING,
                IndustryProfile::new(0.5, 0.9, -0.4, 0.55, 0.6, Stepped { wave_years: 3, drift: 0.15 }),
            ),
            (OTHER_SERVICES, IndustryProfile::new(0.5, 0.7, 0.1, 0.65, 0.8, Smooth)),
            (
                GOVERNMENT,
                IndustryProfile::new(0.4, 0.8, 0.05, 0.60, 0.5, RegulatoryPlateau { every: 2, damping: 0.75 }),
            ),
            (TOTAL_NONFARM, IndustryProfile::new(0.6, 0.7, 0.1, 0.75, 1.0, Smooth)),
        ]
        .into_iter()
        .map(|(i, p)| (IndustryId::new(i), p))
        .collect();

        Self {
            industries,
            default: IndustryProfile::new(0.6, 0.7, 0.1, 0.80, 1.0, Smooth),
        }
    }
}

/// Job-creation inputs. Shares are fractions of total employment and apply
/// uniformly to every industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreationDefaults {
    pub direct_share: f64,
    pub infrastructure_share: f64,
    /// Months of postings per year.
    pub annualization: f64,
    pub hires_per_posting: f64,
}

impl Default for CreationDefaults {
    fn default() -> Self {
        Self {
            direct_share: 0.03,
            infrastructure_share: 0.015,
            annualization: 12.0,
            hires_per_posting: 2.0,
        }
    }
}

/// Market maturity bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaturityBands {
    pub adoption_base_year: i32,
    pub expected_maturity_years: f64,
    /// `years_since_adoption / expected` at or below this is "early".
    pub early_until_ratio: f64,
    /// ... at or below this is "growth"; anything above is "mature".
    pub growth_until_ratio: f64,
    pub early: f64,
    pub growth: f64,
    pub mature: f64,
}

impl Default for MaturityBands {
    fn default() -> Self {
        Self {
            adoption_base_year: 2020,
            expected_maturity_years: 5.0,
            early_until_ratio: 0.4,
            growth_until_ratio: 1.0,
            early: 0.2,
            growth: 0.5,
            mature: 0.8,
        }
    }
}

impl MaturityBands {
    pub fn maturity_for(&self, years_since_adoption: u32) -> f64 {
        let ratio = f64::from(years_since_adoption) / self.expected_maturity_years;
        if ratio <= self.early_until_ratio {
            self.early
        } else if ratio <= self.growth_until_ratio {
            self.growth
        } else {
            self.mature
        }
    }
}

/// Constants of one projection scenario.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub adoption_growth: f64,
    pub efficiency_improvement: f64,
    pub acceleration: f64,
}

impl ScenarioConfig {
    pub fn new(adoption_growth: f64, efficiency_improvement: f64, acceleration: f64) -> Self {
        Self {
            adoption_growth,
            efficiency_improvement,
            acceleration,
        }
    }
}

pub fn default_scenarios() -> BTreeMap<ScenarioName, ScenarioConfig> {
    [
        ("conservative", ScenarioConfig::new(0.15, 0.05, 0.10)),
        ("moderate", ScenarioConfig::new(0.30, 0.10, 0.20)),
        ("aggressive", ScenarioConfig::new(0.50, 0.15, 0.35)),
    ]
    .into_iter()
    .map(|(n, s)| (ScenarioName::new(n), s))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionSettings {
    /// Cap on adoption ceilings and on projected impact magnitudes.
    pub max_ceiling: f64,
    pub min_start: f64,
    pub max_horizon: u32,
    /// Adoption level at year 0 is `adoption_base + |net_impact|`.
    pub adoption_base: f64,
    /// Exponent applied to the adoption ratio when scaling the impact.
    pub impact_elasticity: f64,
    /// Yearly market maturity increase in the component trajectory.
    pub maturity_step: f64,
    /// Yearly fade of the scenario acceleration applied to displacement.
    pub displacement_decay: f64,
    /// Uncertainty at year `t` is `spread_base * (1 + spread_growth * t)`.
    pub spread_base: f64,
    pub spread_growth: f64,
    pub downside_multiplier: f64,
    pub upside_multiplier: f64,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            max_ceiling: 0.95,
            min_start: 0.01,
            max_horizon: 50,
            adoption_base: 0.3,
            impact_elasticity: 0.7,
            maturity_step: 0.1,
            displacement_decay: 0.1,
            spread_base: 0.15,
            spread_growth: 0.25,
            downside_multiplier: 1.4,
            upside_multiplier: 1.0,
        }
    }
}

/// Relative half-widths of the uniform perturbation applied per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterVariations {
    pub automation: f64,
    pub augmentation: f64,
    pub adoption_rate: f64,
    pub efficiency: f64,
    pub implementation_rate: f64,
    pub productivity_gain: f64,
    pub adoption_speed: f64,
}

impl Default for ParameterVariations {
    fn default() -> Self {
        Self {
            automation: 0.10,
            augmentation: 0.10,
            adoption_rate: 0.10,
            efficiency: 0.05,
            implementation_rate: 0.15,
            productivity_gain: 0.15,
            adoption_speed: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub trials: usize,
    pub low_percentile: f64,
    pub high_percentile: f64,
    pub variations: ParameterVariations,
    pub reference_scenario: ScenarioName,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            trials: 500,
            low_percentile: 10.0,
            high_percentile: 90.0,
            variations: ParameterVariations::default(),
            reference_scenario: ScenarioName::new("moderate"),
        }
    }
}

/// `base * exp(-decay * t) * (1 - volatility * t^2 / volatility_scale) * (1 - availability_decline * t)`,
/// clamped to `[floor, ceiling]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointConfidenceSettings {
    pub base: f64,
    pub decay: f64,
    pub volatility: f64,
    pub volatility_scale: f64,
    pub availability_decline: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for PointConfidenceSettings {
    fn default() -> Self {
        Self {
            base: 0.85,
            decay: 0.15,
            volatility: 0.05,
            volatility_scale: 25.0,
            availability_decline: 0.03,
            floor: 0.3,
            ceiling: 0.95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    pub max_total_impact: f64,
    pub max_industry_impact: f64,
    pub max_displacement: f64,
    pub max_creation: f64,
    pub max_demand: f64,
    pub min_employment_coverage: f64,
    pub max_employment_coverage: f64,
    pub high_coverage: f64,
    pub low_coverage: f64,
    pub high_confidence: f64,
    pub automation_range: (f64, f64),
    pub augmentation_range: (f64, f64),
    pub combined_range: (f64, f64),
    pub trust_threshold: f64,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            max_total_impact: 0.5,
            max_industry_impact: 0.3,
            max_displacement: 0.8,
            max_creation: 0.5,
            max_demand: 0.3,
            min_employment_coverage: 0.8,
            max_employment_coverage: 1.1,
            high_coverage: 0.7,
            low_coverage: 0.3,
            high_confidence: 0.7,
            automation_range: (0.05, 0.85),
            augmentation_range: (0.10, 0.90),
            combined_range: (0.30, 1.20),
            trust_threshold: 0.6,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub taxonomy_fallback: TaxonomyFallbackTable,
    pub industry_fallback: IndustryFallbackTable,
    pub reliability: ReliabilityTable,
    pub effects: EffectFactors,
    pub profiles: IndustryProfiles,
    pub creation: CreationDefaults,
    pub maturity: MaturityBands,
    pub scenarios: BTreeMap<ScenarioName, ScenarioConfig>,
    pub projection: ProjectionSettings,
    pub simulation: SimulationSettings,
    pub point_confidence: PointConfidenceSettings,
    pub validation: ValidationThresholds,
    /// Weighted coverage below this raises an insufficient-coverage warning.
    pub coverage_threshold: f64,
    /// Number of usable industries for full "industry depth" credit.
    pub industry_depth_target: usize,
    /// Industries that are themselves totals; computed but excluded from rollups.
    pub aggregate_industries: BTreeSet<IndustryId>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            taxonomy_fallback: TaxonomyFallbackTable::default(),
            industry_fallback: IndustryFallbackTable::default(),
            reliability: ReliabilityTable::default(),
            effects: EffectFactors::default(),
            profiles: IndustryProfiles::default(),
            creation: CreationDefaults::default(),
            maturity: MaturityBands::default(),
            scenarios: default_scenarios(),
            projection: ProjectionSettings::default(),
            simulation: SimulationSettings::default(),
            point_confidence: PointConfidenceSettings::default(),
            validation: ValidationThresholds::default(),
            coverage_threshold: 0.6,
            industry_depth_target: 8,
            aggregate_industries: BTreeSet::from([IndustryId::new(TOTAL_NONFARM)]),
        }
    }
}

impl ModelConfig {
    /// Parse and validate a JSON document. Missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> ImpactResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ImpactError::configuration(format!("malformed config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_scenarios(mut self, scenarios: BTreeMap<ScenarioName, ScenarioConfig>) -> Self {
        self.scenarios = scenarios;
        self
    }

    /// Keep only the named scenarios.
    pub fn with_only_scenario(mut self, name: impl Into<ScenarioName>) -> Self {
        let name = name.into();
        self.scenarios.retain(|k, _| *k == name);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.simulation.trials = trials;
        self
    }

    pub fn with_reference_scenario(mut self, name: impl Into<ScenarioName>) -> Self {
        self.simulation.reference_scenario = name.into();
        self
    }

    pub fn with_coverage_threshold(mut self, threshold: f64) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    pub fn with_creation(mut self, creation: CreationDefaults) -> Self {
        self.creation = creation;
        self
    }

    pub fn with_profile(mut self, industry: impl Into<IndustryId>, profile: IndustryProfile) -> Self {
        self.profiles.industries.insert(industry.into(), profile);
        self
    }

    pub fn is_aggregate(&self, industry: &IndustryId) -> bool {
        self.aggregate_industries.contains(industry)
    }

    pub fn scenario(&self, name: &ScenarioName) -> ImpactResult<&ScenarioConfig> {
        self.scenarios
            .get(name)
            .ok_or_else(|| ImpactError::configuration(format!("unknown scenario {name:?}")))
    }

    /// Check every section; the first problem found is returned.
    pub fn validate(&self) -> ImpactResult<()> {
        for (industry, m) in &self.reliability.multipliers {
            positive(&format!("reliability.{industry}"), *m)?;
        }
        positive("reliability.default", self.reliability.default)?;

        let e = &self.effects;
        unit("effects.implementation_rate", e.implementation_rate)?;
        unit("effects.efficiency_factor", e.efficiency_factor)?;
        unit("effects.adoption_rate", e.adoption_rate)?;
        unit("effects.productivity_gain", e.productivity_gain)?;
        unit("effects.labor_share", e.labor_share)?;
        unit("effects.max_displacement", e.max_displacement)?;
        unit("effects.max_creation", e.max_creation)?;
        finite("effects.min_demand", e.min_demand)?;
        finite("effects.max_demand", e.max_demand)?;
        if e.min_demand > e.max_demand {
            return Err(ImpactError::configuration(
                "effects.min_demand exceeds effects.max_demand",
            ));
        }
        unit("effects.contraction_utilization", e.contraction_utilization)?;
        for (i, band) in e.capacity_bands.iter().enumerate() {
            finite(&format!("effects.capacity_bands[{i}].min_growth"), band.min_growth)?;
            unit(&format!("effects.capacity_bands[{i}].utilization"), band.utilization)?;
        }
        if e.capacity_bands.windows(2).any(|w| w[0].min_growth <= w[1].min_growth) {
            return Err(ImpactError::configuration(
                "effects.capacity_bands must be ordered by strictly decreasing min_growth",
            ));
        }

        for (industry, p) in &self.profiles.industries {
            validate_profile(&format!("profiles.{industry}"), p)?;
        }
        validate_profile("profiles.default", &self.profiles.default)?;

        let c = &self.creation;
        unit("creation.direct_share", c.direct_share)?;
        unit("creation.infrastructure_share", c.infrastructure_share)?;
        positive("creation.annualization", c.annualization)?;
        positive("creation.hires_per_posting", c.hires_per_posting)?;

        let m = &self.maturity;
        positive("maturity.expected_maturity_years", m.expected_maturity_years)?;
        finite("maturity.early_until_ratio", m.early_until_ratio)?;
        finite("maturity.growth_until_ratio", m.growth_until_ratio)?;
        if m.early_until_ratio > m.growth_until_ratio {
            return Err(ImpactError::configuration(
                "maturity.early_until_ratio exceeds maturity.growth_until_ratio",
            ));
        }
        unit("maturity.early", m.early)?;
        unit("maturity.growth", m.growth)?;
        unit("maturity.mature", m.mature)?;

        if self.scenarios.is_empty() {
            return Err(ImpactError::configuration("no scenarios configured"));
        }
        for (name, s) in &self.scenarios {
            if name.as_str().is_empty() {
                return Err(ImpactError::configuration("scenario with empty name"));
            }
            non_negative(&format!("scenarios.{name}.adoption_growth"), s.adoption_growth)?;
            non_negative(
                &format!("scenarios.{name}.efficiency_improvement"),
                s.efficiency_improvement,
            )?;
            non_negative(&format!("scenarios.{name}.acceleration"), s.acceleration)?;
        }

        let p = &self.projection;
        unit("projection.max_ceiling", p.max_ceiling)?;
        positive("projection.max_ceiling", p.max_ceiling)?;
        positive("projection.min_start", p.min_start)?;
        if p.min_start >= p.max_ceiling {
            return Err(ImpactError::configuration(
                "projection.min_start must be below projection.max_ceiling",
            ));
        }
        if p.max_horizon == 0 {
            return Err(ImpactError::configuration("projection.max_horizon must be >= 1"));
        }
        unit("projection.adoption_base", p.adoption_base)?;
        positive("projection.impact_elasticity", p.impact_elasticity)?;
        non_negative("projection.maturity_step", p.maturity_step)?;
        non_negative("projection.displacement_decay", p.displacement_decay)?;
        non_negative("projection.spread_base", p.spread_base)?;
        non_negative("projection.spread_growth", p.spread_growth)?;
        non_negative("projection.upside_multiplier", p.upside_multiplier)?;
        non_negative("projection.downside_multiplier", p.downside_multiplier)?;
        if p.downside_multiplier < p.upside_multiplier {
            return Err(ImpactError::configuration(
                "projection.downside_multiplier must be >= projection.upside_multiplier",
            ));
        }

        let s = &self.simulation;
        if s.trials == 0 {
            return Err(ImpactError::configuration("simulation.trials must be >= 1"));
        }
        if !(0.0..=100.0).contains(&s.low_percentile)
            || !(0.0..=100.0).contains(&s.high_percentile)
            || s.low_percentile >= s.high_percentile
        {
            return Err(ImpactError::configuration(
                "simulation percentiles must satisfy 0 <= low < high <= 100",
            ));
        }
        let v = &s.variations;
        for (name, value) in [
            ("automation", v.automation),
            ("augmentation", v.augmentation),
            ("adoption_rate", v.adoption_rate),
            ("efficiency", v.efficiency),
            ("implementation_rate", v.implementation_rate),
            ("productivity_gain", v.productivity_gain),
            ("adoption_speed", v.adoption_speed),
        ] {
            if !(value.is_finite() && (0.0..1.0).contains(&value)) {
                return Err(ImpactError::configuration(format!(
                    "simulation.variations.{name} must be in [0, 1), got {value}"
                )));
            }
        }
        if !self.scenarios.contains_key(&s.reference_scenario) {
            return Err(ImpactError::configuration(format!(
                "simulation.reference_scenario {:?} is not a configured scenario",
                s.reference_scenario.as_str()
            )));
        }

        let pc = &self.point_confidence;
        unit("point_confidence.base", pc.base)?;
        non_negative("point_confidence.decay", pc.decay)?;
        non_negative("point_confidence.volatility", pc.volatility)?;
        positive("point_confidence.volatility_scale", pc.volatility_scale)?;
        non_negative("point_confidence.availability_decline", pc.availability_decline)?;
        unit("point_confidence.floor", pc.floor)?;
        unit("point_confidence.ceiling", pc.ceiling)?;
        if pc.floor > pc.ceiling {
            return Err(ImpactError::configuration(
                "point_confidence.floor exceeds point_confidence.ceiling",
            ));
        }

        let t = &self.validation;
        for (name, value) in [
            ("max_total_impact", t.max_total_impact),
            ("max_industry_impact", t.max_industry_impact),
            ("max_displacement", t.max_displacement),
            ("max_creation", t.max_creation),
            ("max_demand", t.max_demand),
            ("min_employment_coverage", t.min_employment_coverage),
            ("max_employment_coverage", t.max_employment_coverage),
        ] {
            positive(&format!("validation.{name}"), value)?;
        }
        for (name, value) in [
            ("high_coverage", t.high_coverage),
            ("low_coverage", t.low_coverage),
            ("high_confidence", t.high_confidence),
            ("trust_threshold", t.trust_threshold),
        ] {
            unit(&format!("validation.{name}"), value)?;
        }
        for (name, (lo, hi)) in [
            ("automation_range", t.automation_range),
            ("augmentation_range", t.augmentation_range),
            ("combined_range", t.combined_range),
        ] {
            finite(&format!("validation.{name}"), lo)?;
            finite(&format!("validation.{name}"), hi)?;
            if lo > hi {
                return Err(ImpactError::configuration(format!(
                    "validation.{name} lower bound exceeds upper bound"
                )));
            }
        }

        unit("coverage_threshold", self.coverage_threshold)?;
        if self.industry_depth_target == 0 {
            return Err(ImpactError::configuration("industry_depth_target must be >= 1"));
        }
        Ok(())
    }
}

fn validate_profile(prefix: &str, p: &IndustryProfile) -> ImpactResult<()> {
    unit(&format!("{prefix}.displacement_factor"), p.displacement_factor)?;
    unit(&format!("{prefix}.capacity_utilization"), p.capacity_utilization)?;
    finite(&format!("{prefix}.elasticity"), p.elasticity)?;
    unit(&format!("{prefix}.adoption_ceiling"), p.adoption_ceiling)?;
    positive(&format!("{prefix}.adoption_ceiling"), p.adoption_ceiling)?;
    positive(&format!("{prefix}.adoption_speed"), p.adoption_speed)?;
    match p.shaping {
        ShapingKind::Smooth => Ok(()),
        ShapingKind::Oscillating {
            amplitude,
            period_years,
        } => {
            if !(amplitude.is_finite() && (0.0..0.5).contains(&amplitude)) {
                return Err(ImpactError::configuration(format!(
                    "{prefix}.shaping.amplitude must be in [0, 0.5)"
                )));
            }
            positive(&format!("{prefix}.shaping.period_years"), period_years)
        }
        ShapingKind::Stepped { wave_years, drift } => {
            if wave_years == 0 {
                return Err(ImpactError::configuration(format!(
                    "{prefix}.shaping.wave_years must be >= 1"
                )));
            }
            unit(&format!("{prefix}.shaping.drift"), drift)
        }
        ShapingKind::RegulatoryPlateau { every, damping } => {
            if every == 0 {
                return Err(ImpactError::configuration(format!(
                    "{prefix}.shaping.every must be >= 1"
                )));
            }
            unit(&format!("{prefix}.shaping.damping"), damping)
        }
    }
}

fn finite(name: &str, value: f64) -> ImpactResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ImpactError::configuration(format!("{name} must be finite, got {value}")))
    }
}

fn unit(name: &str, value: f64) -> ImpactResult<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ImpactError::configuration(format!("{name} must be in [0, 1], got {value}")))
    }
}

fn positive(name: &str, value: f64) -> ImpactResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ImpactError::configuration(format!("{name} must be > 0, got {value}")))
    }
}

fn non_negative(name: &str, value: f64) -> ImpactResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ImpactError::configuration(format!("{name} must be >= 0, got {value}")))
    }
}
