//! Multi-year adoption projection.
//!
//! Adoption and impact are projected separately. For each scenario and
//! industry an adoption level starts at `adoption_base + |net_impact|` and
//! follows a logistic curve toward the scenario ceiling. The impact magnitude
//! then scales with the adoption ratio:
//!
//! ```text
//! magnitude(t) = |net_impact| × (adoption(t) / adoption(0))^impact_elasticity × adjustment
//! ```
//!
//! where `adjustment` is `1 + acceleration` for losses and `1 + adoption_growth`
//! for gains. The shaped magnitude is capped at `max_ceiling`. The sign of the
//! current impact is carried alongside as an [`ImpactDirection`].

pub mod components;
pub mod curve;
pub mod shaping;

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use laborshift_core::{ImpactError, ImpactResult, IndustryId, ScenarioName, TargetPeriod};

use crate::calculator::NetImpactResult;
use crate::config::{IndustryProfile, ModelConfig, ScenarioConfig};

pub use components::{ComponentBaseline, ComponentYear};
pub use curve::AdoptionCurve;
pub use shaping::{Oscillating, RegulatoryPlateau, ShapingStrategy, Smooth, Stepped, strategy_for};

/// Sign of the current net impact.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactDirection {
    Loss,
    Gain,
}

impl ImpactDirection {
    pub fn of(net_impact: f64) -> Self {
        if net_impact < 0.0 { Self::Loss } else { Self::Gain }
    }

    pub fn sign(self) -> f64 {
        match self {
            Self::Loss => -1.0,
            Self::Gain => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedYear {
    pub year: i32,
    pub offset: u32,
    /// Adoption level on the logistic curve.
    pub adoption: f64,
    pub central: f64,
    /// Worse outcome: larger magnitude for losses, smaller for gains.
    pub pessimistic: f64,
    pub optimistic: f64,
}

/// Projected magnitudes for one industry (or the aggregate) in one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSeries {
    pub shaping: String,
    pub direction: ImpactDirection,
    /// Current impact magnitude.
    pub start: f64,
    /// Upper bound on every projected magnitude.
    pub ceiling: f64,
    pub adoption_start: f64,
    pub adoption_ceiling: f64,
    pub years: Vec<ProjectedYear>,
    pub components: Vec<ComponentYear>,
}

impl ProjectionSeries {
    /// Central values with the direction's sign applied.
    pub fn signed_central(&self) -> Vec<f64> {
        let sign = self.direction.sign();
        self.years.iter().map(|y| sign * y.central).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: ScenarioName,
    pub parameters: ScenarioConfig,
    pub aggregate: ProjectionSeries,
    pub industries: BTreeMap<IndustryId, ProjectionSeries>,
}

impl ScenarioProjection {
    /// Aggregate series followed by every industry series.
    pub fn all_series(&self) -> impl Iterator<Item = (Option<&IndustryId>, &ProjectionSeries)> {
        std::iter::once((None, &self.aggregate)).chain(self.industries.iter().map(|(id, s)| (Some(id), s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub horizon: u32,
    pub scenarios: BTreeMap<ScenarioName, ScenarioProjection>,
}

/// Projects a net impact result forward over a horizon.
#[derive(Debug, Clone)]
pub struct AdoptionProjectionEngine<'a> {
    config: &'a ModelConfig,
    speed_scale: f64,
    shaping_overrides: BTreeMap<IndustryId, Arc<dyn ShapingStrategy>>,
}

impl<'a> AdoptionProjectionEngine<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            speed_scale: 1.0,
            shaping_overrides: BTreeMap::new(),
        }
    }

    /// Scale every adoption speed (used for resampling).
    pub fn with_speed_scale(mut self, scale: f64) -> Self {
        self.speed_scale = scale;
        self
    }

    /// Use `strategy` instead of the configured shaping for `industry`.
    pub fn with_shaping(mut self, industry: impl Into<IndustryId>, strategy: Arc<dyn ShapingStrategy>) -> Self {
        self.shaping_overrides.insert(industry.into(), strategy);
        self
    }

    /// Resolve scenario names; an empty list selects every configured scenario.
    pub fn select_scenarios(&self, names: &[ScenarioName]) -> ImpactResult<Vec<(ScenarioName, ScenarioConfig)>> {
        if names.is_empty() {
            return Ok(self
                .config
                .scenarios
                .iter()
                .map(|(n, s)| (n.clone(), *s))
                .collect());
        }
        names
            .iter()
            .map(|n| self.config.scenario(n).map(|s| (n.clone(), *s)))
            .collect()
    }

    pub fn check_horizon(&self, horizon: u32) -> ImpactResult<()> {
        let max = self.config.projection.max_horizon;
        if horizon == 0 || horizon > max {
            return Err(ImpactError::invalid_input(format!(
                "projection horizon must be in 1..={max}, got {horizon}"
            )));
        }
        Ok(())
    }

    pub fn project(
        &self,
        result: &NetImpactResult,
        horizon: u32,
        scenarios: &[ScenarioName],
    ) -> ImpactResult<ProjectionResult> {
        self.check_horizon(horizon)?;
        let selected = self.select_scenarios(scenarios)?;

        let projections: Vec<ScenarioProjection> = selected
            .into_par_iter()
            .map(|(name, scenario)| {
                let aggregate = self.aggregate_series(result, &scenario, horizon);
                let industries = self.industry_series(result, &scenario, horizon);
                debug!(scenario = %name, horizon, "projected scenario");
                ScenarioProjection {
                    scenario: name,
                    parameters: scenario,
                    aggregate,
                    industries,
                }
            })
            .collect();

        info!(
            scenarios = projections.len(),
            horizon,
            industries = result.industries.len(),
            "projected adoption"
        );

        Ok(ProjectionResult {
            horizon,
            scenarios: projections
                .into_iter()
                .map(|p| (p.scenario.clone(), p))
                .collect(),
        })
    }

    /// Aggregate series only, for one scenario.
    pub fn project_aggregate(
        &self,
        result: &NetImpactResult,
        scenario: &ScenarioName,
        horizon: u32,
    ) -> ImpactResult<ProjectionSeries> {
        self.check_horizon(horizon)?;
        let scenario = self.config.scenario(scenario)?;
        Ok(self.aggregate_series(result, scenario, horizon))
    }

    /// One series per computed industry, for one scenario.
    pub fn project_industries(
        &self,
        result: &NetImpactResult,
        scenario: &ScenarioName,
        horizon: u32,
    ) -> ImpactResult<BTreeMap<IndustryId, ProjectionSeries>> {
        self.check_horizon(horizon)?;
        let scenario = self.config.scenario(scenario)?;
        Ok(self.industry_series(result, scenario, horizon))
    }

    fn industry_series(
        &self,
        result: &NetImpactResult,
        scenario: &ScenarioConfig,
        horizon: u32,
    ) -> BTreeMap<IndustryId, ProjectionSeries> {
        result
            .industries
            .values()
            .map(|i| {
                let profile = self.config.profiles.profile_for(&i.industry);
                let shaping = self.shaping_for(&i.industry, profile);
                let series = self.series(
                    i.net_impact,
                    ComponentBaseline::from(&i.components),
                    profile,
                    shaping.as_ref(),
                    scenario,
                    result.period,
                    horizon,
                );
                (i.industry.clone(), series)
            })
            .collect()
    }

    fn aggregate_series(&self, result: &NetImpactResult, scenario: &ScenarioConfig, horizon: u32) -> ProjectionSeries {
        let aggregate_id = self.config.aggregate_industries.iter().next();
        let profile = aggregate_id
            .map(|id| self.config.profiles.profile_for(id))
            .unwrap_or(&self.config.profiles.default);
        let shaping = match aggregate_id {
            Some(id) => self.shaping_for(id, profile),
            None => strategy_for(&profile.shaping),
        };
        self.series(
            result.net_impact,
            ComponentBaseline::from(result),
            profile,
            shaping.as_ref(),
            scenario,
            result.period,
            horizon,
        )
    }

    fn shaping_for(&self, industry: &IndustryId, profile: &IndustryProfile) -> Arc<dyn ShapingStrategy> {
        self.shaping_overrides
            .get(industry)
            .cloned()
            .unwrap_or_else(|| strategy_for(&profile.shaping))
    }

    /// Project one current net impact and its components.
    #[allow(clippy::too_many_arguments)]
    pub fn series(
        &self,
        net_impact: f64,
        baseline: ComponentBaseline,
        profile: &IndustryProfile,
        shaping: &dyn ShapingStrategy,
        scenario: &ScenarioConfig,
        period: TargetPeriod,
        horizon: u32,
    ) -> ProjectionSeries {
        let settings = &self.config.projection;
        let direction = ImpactDirection::of(net_impact);
        let magnitude = net_impact.abs().min(settings.max_ceiling);

        let adoption_ceiling = (profile.adoption_ceiling * (1.0 + scenario.adoption_growth)).min(settings.max_ceiling);
        let speed = profile.adoption_speed * (1.0 + scenario.acceleration) * self.speed_scale;
        let curve = AdoptionCurve::through(
            settings.adoption_base + magnitude,
            adoption_ceiling,
            speed,
            settings.min_start,
        );
        let adoption_start = curve.value_at(0.0);
        let adjustment = match direction {
            ImpactDirection::Loss => 1.0 + scenario.acceleration,
            ImpactDirection::Gain => 1.0 + scenario.adoption_growth,
        };

        let adoption: Vec<f64> = (1..=horizon).map(|t| curve.value_at(f64::from(t))).collect();
        let raw: Vec<f64> = adoption
            .iter()
            .map(|a| magnitude * (a / adoption_start).powf(settings.impact_elasticity) * adjustment)
            .collect();
        let shaped = shaping.shape(magnitude, &raw);

        let ceiling = settings.max_ceiling;
        let years = shaped
            .into_iter()
            .zip(adoption)
            .zip(1..=horizon)
            .map(|((value, adoption), offset)| {
                let central = value.clamp(0.0, ceiling);
                let spread = settings.spread_base * (1.0 + settings.spread_growth * f64::from(offset));
                let wider = spread * settings.downside_multiplier;
                let narrower = spread * settings.upside_multiplier;
                let (pessimistic, optimistic) = match direction {
                    ImpactDirection::Loss => (central * (1.0 + wider), central * (1.0 - narrower)),
                    ImpactDirection::Gain => (central * (1.0 - wider), central * (1.0 + narrower)),
                };
                ProjectedYear {
                    year: period.year_after(offset),
                    offset,
                    adoption,
                    central,
                    pessimistic: pessimistic.clamp(0.0, ceiling),
                    optimistic: optimistic.clamp(0.0, ceiling),
                }
            })
            .collect();

        ProjectionSeries {
            shaping: shaping.name().to_string(),
            direction,
            start: magnitude,
            ceiling,
            adoption_start,
            adoption_ceiling,
            years,
            components: components::evolve(baseline, scenario, settings, &self.config.effects, period, horizon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapingKind;
    use proptest::prelude::*;

    fn period() -> TargetPeriod {
        TargetPeriod::new(2025, 5).unwrap()
    }

    fn baseline() -> ComponentBaseline {
        ComponentBaseline {
            displacement: 0.12,
            creation: 0.045,
            market_maturity: 0.5,
            demand: 0.009,
        }
    }

    /// Largest factor a shaped magnitude can exceed `|net_impact|` by.
    fn growth_bound(config: &ModelConfig, profile: &IndustryProfile, scenario: &ScenarioConfig, magnitude: f64) -> f64 {
        let p = &config.projection;
        let ratio = (p.max_ceiling / (p.adoption_base + magnitude)).powf(p.impact_elasticity);
        let adjustment = 1.0 + scenario.acceleration.max(scenario.adoption_growth);
        let swing = match profile.shaping {
            ShapingKind::Oscillating { amplitude, .. } => 1.0 + amplitude,
            _ => 1.0,
        };
        ratio * adjustment * swing
    }

    #[test]
    fn series_has_one_entry_per_year_within_ceiling() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("moderate")];
        let profile = &config.profiles.default;
        let series = engine.series(-0.06, baseline(), profile, &Smooth, &scenario, period(), 5);

        assert_eq!(series.years.len(), 5);
        assert_eq!(series.components.len(), 5);
        assert_eq!(series.direction, ImpactDirection::Loss);
        assert_eq!(series.years[0].year, 2026);
        assert!((series.adoption_start - 0.36).abs() < 1e-12);
        for y in &series.years {
            assert!((0.0..=series.ceiling).contains(&y.central));
            assert!(y.pessimistic >= y.central);
            assert!(y.optimistic <= y.central);
            assert!(y.adoption > series.adoption_start && y.adoption <= series.adoption_ceiling);
        }
    }

    #[test]
    fn first_year_scales_with_adoption_ratio() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("moderate")];
        let profile = &config.profiles.default;
        let series = engine.series(-0.1, baseline(), profile, &Smooth, &scenario, period(), 1);

        let y = series.years[0];
        let expected = 0.1 * (y.adoption / 0.4).powf(0.7) * 1.2;
        assert!((y.central - expected).abs() < 1e-12);
    }

    #[test]
    fn moderate_loss_does_not_saturate() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let profile = config.profiles.profile_for(&IndustryId::new("Manufacturing"));
        for scenario in config.scenarios.values() {
            let series = engine.series(-0.1168, baseline(), profile, &Smooth, scenario, period(), 5);
            let bound = 0.1168 * growth_bound(&config, profile, scenario, 0.1168);
            let central: Vec<f64> = series.years.iter().map(|y| y.central).collect();
            for (y, c) in series.years.iter().zip(&central) {
                assert!(*c <= bound && *c < 0.5, "{central:?}");
                assert!(y.pessimistic > y.central && y.optimistic < y.central);
            }
            let deltas: Vec<f64> = central.windows(2).map(|w| w[1] - w[0]).collect();
            assert!(deltas.iter().all(|d| *d > 0.0), "{deltas:?}");
        }
    }

    #[test]
    fn adoption_ceiling_is_capped() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("aggressive")];
        let profile = config.profiles.profile_for(&IndustryId::new("Information"));
        let series = engine.series(0.2, baseline(), profile, &Smooth, &scenario, period(), 10);
        assert_eq!(series.adoption_ceiling, 0.95);
        assert_eq!(series.ceiling, 0.95);
        assert!(series.years.iter().all(|y| y.central < 0.95));
    }

    #[test]
    fn downside_spread_is_wider() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("conservative")];
        let series = engine.series(-0.05, baseline(), &config.profiles.default, &Smooth, &scenario, period(), 3);
        let y = series.years[0];
        assert!(y.pessimistic - y.central > y.central - y.optimistic);
    }

    #[test]
    fn bands_widen_with_time() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("moderate")];
        let profile = config.profiles.profile_for(&IndustryId::new("Government"));
        let series = engine.series(-0.05, baseline(), profile, &Smooth, &scenario, period(), 4);
        let rel = |y: &ProjectedYear| (y.pessimistic - y.optimistic) / y.central;
        for w in series.years.windows(2) {
            assert!(rel(&w[1]) > rel(&w[0]));
        }
    }

    #[test]
    fn zero_impact_projects_zero() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let scenario = config.scenarios[&ScenarioName::new("moderate")];
        let series = engine.series(0.0, baseline(), &config.profiles.default, &Smooth, &scenario, period(), 3);
        assert_eq!(series.direction, ImpactDirection::Gain);
        assert!(series.years.iter().all(|y| y.central == 0.0 && y.pessimistic == 0.0));
    }

    #[test]
    fn horizon_is_validated() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        assert!(engine.check_horizon(0).is_err());
        assert!(engine.check_horizon(51).is_err());
        assert!(engine.check_horizon(50).is_ok());
    }

    #[test]
    fn unknown_scenario_is_configuration_error() {
        let config = ModelConfig::default();
        let engine = AdoptionProjectionEngine::new(&config);
        let err = engine.select_scenarios(&[ScenarioName::new("doomsday")]).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(engine.select_scenarios(&[]).unwrap().len(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn every_profile_and_scenario_grows_unevenly_and_bounded(
            magnitude in 0.005f64..0.3,
            loss in any::<bool>(),
        ) {
            let config = ModelConfig::default();
            let engine = AdoptionProjectionEngine::new(&config);
            let net = if loss { -magnitude } else { magnitude };
            let profiles = config
                .profiles
                .industries
                .iter()
                .map(|(id, p)| (id.as_str(), p))
                .chain(std::iter::once(("default", &config.profiles.default)));

            for (industry, profile) in profiles {
                let shaping = strategy_for(&profile.shaping);
                for (name, scenario) in &config.scenarios {
                    let series = engine.series(net, baseline(), profile, shaping.as_ref(), scenario, period(), 3);
                    let central: Vec<f64> = series.years.iter().map(|y| y.central).collect();
                    let deltas: Vec<f64> = central.windows(2).map(|w| w[1] - w[0]).collect();
                    prop_assert!(
                        deltas.windows(2).any(|w| (w[1] - w[0]).abs() > 1e-12),
                        "uniform deltas for {} / {}: {:?}", industry, name, central
                    );

                    let bound = magnitude * growth_bound(&config, profile, scenario, magnitude);
                    for c in &central {
                        prop_assert!(*c >= 0.0 && *c <= bound + 1e-12, "{} / {}: {:?}", industry, name, central);
                        prop_assert!(*c < config.projection.max_ceiling);
                    }
                }
            }
        }
    }
}
