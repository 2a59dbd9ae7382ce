//! Monte Carlo confidence bands.
//!
//! Each trial perturbs the industry rates, the economy-wide effect factors and
//! the adoption speed within configured relative bounds, then re-runs the
//! calculation and the reference-scenario projection. Bands are the empirical
//! percentiles, mean and population standard deviation of the trial outcomes
//! per year, for the aggregate and for every computed industry.
//!
//! Trials are independent: trial `i` draws from its own generator seeded with
//! `(seed, i)`, so results do not depend on scheduling.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use laborshift_core::{ImpactError, ImpactResult, IndustryId, ScenarioName, TargetPeriod, UnitInterval};

use crate::calculator::{CalculationInput, NetImpactCalculator};
use crate::config::{ModelConfig, PointConfidenceSettings, SimulationSettings};
use crate::mapper::MappingOutcome;
use crate::projection::{AdoptionProjectionEngine, ProjectionSeries};

/// Value band for one year offset (offset 0 is the current period).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub year: i32,
    pub offset: u32,
    pub low: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub high: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub point_confidence: f64,
}

/// Bands for one industry: the current period, then each projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryBands {
    pub baseline: ConfidenceBand,
    pub years: Vec<ConfidenceBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceReport {
    pub scenario: ScenarioName,
    pub trials: usize,
    pub seed: u64,
    pub low_percentile: f64,
    pub high_percentile: f64,
    /// Band of the current-period aggregate net impact.
    pub baseline: ConfidenceBand,
    pub years: Vec<ConfidenceBand>,
    pub industries: BTreeMap<IndustryId, IndustryBands>,
}

/// `base × time_decay × volatility × availability`, clamped to `[floor, ceiling]`.
///
/// Each factor is non-increasing in `offset` and floored at zero, so the
/// composite never rises with the horizon.
pub fn point_confidence(settings: &PointConfidenceSettings, offset: u32) -> f64 {
    let t = f64::from(offset);
    let time_decay = (-settings.decay * t).exp();
    let volatility = (1.0 - settings.volatility * t * t / settings.volatility_scale).max(0.0);
    let availability = (1.0 - settings.availability_decline * t).max(0.0);
    (settings.base * time_decay * volatility * availability).clamp(settings.floor, settings.ceiling)
}

/// Linear-interpolated percentile of sorted values; `p` in `[0, 100]`.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Generator seed for trial `trial` of a run seeded with `seed` (SplitMix64).
pub fn trial_seed(seed: u64, trial: usize) -> u64 {
    let mut z = seed.wrapping_add((trial as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Summary statistics of one offset's trial values.
fn band(
    mut values: Vec<f64>,
    period: TargetPeriod,
    offset: u32,
    settings: &SimulationSettings,
    point: &PointConfidenceSettings,
) -> ConfidenceBand {
    values.sort_by(f64::total_cmp);
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    ConfidenceBand {
        year: period.year_after(offset),
        offset,
        low: percentile(&values, settings.low_percentile),
        p25: percentile(&values, 25.0),
        median: percentile(&values, 50.0),
        p75: percentile(&values, 75.0),
        high: percentile(&values, settings.high_percentile),
        mean,
        std_dev: variance.sqrt(),
        point_confidence: point_confidence(point, offset),
    }
}

/// Signed trajectories of one trial: offset 0 is the current net impact.
#[derive(Debug, Clone)]
struct TrialOutcome {
    aggregate: Vec<f64>,
    industries: BTreeMap<IndustryId, Vec<f64>>,
}

fn perturb(rng: &mut StdRng, value: f64, variation: f64) -> f64 {
    if variation == 0.0 {
        return value;
    }
    value * rng.gen_range((1.0 - variation)..=(1.0 + variation))
}

#[derive(Debug, Clone)]
pub struct ConfidenceSimulator<'a> {
    config: &'a ModelConfig,
    trials: usize,
}

impl<'a> ConfidenceSimulator<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self {
            config,
            trials: config.simulation.trials,
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn simulate(
        &self,
        input: &CalculationInput<'_>,
        horizon: u32,
        seed: u64,
    ) -> ImpactResult<ConfidenceReport> {
        if self.trials == 0 {
            return Err(ImpactError::invalid_input("trial count must be >= 1"));
        }
        let settings = &self.config.simulation;
        let scenario = settings.reference_scenario.clone();
        AdoptionProjectionEngine::new(self.config).check_horizon(horizon)?;
        self.config.scenario(&scenario)?;

        let outcomes: Vec<TrialOutcome> = (0..self.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(input, &scenario, horizon, trial_seed(seed, trial)))
            .collect::<ImpactResult<Vec<_>>>()?;

        let period = input.period;
        let point = &self.config.point_confidence;
        let aggregate_band = |offset: u32| {
            let values = outcomes.iter().map(|o| o.aggregate[offset as usize]).collect();
            band(values, period, offset, settings, point)
        };
        let baseline = aggregate_band(0);
        let years: Vec<ConfidenceBand> = (1..=horizon).map(aggregate_band).collect();

        let industry_ids: Vec<IndustryId> = outcomes
            .first()
            .map(|o| o.industries.keys().cloned().collect())
            .unwrap_or_default();
        let industries: BTreeMap<IndustryId, IndustryBands> = industry_ids
            .into_par_iter()
            .map(|id| {
                let industry_band = |offset: u32| {
                    let values = outcomes
                        .iter()
                        .filter_map(|o| o.industries.get(&id).map(|v| v[offset as usize]))
                        .collect();
                    band(values, period, offset, settings, point)
                };
                let bands = IndustryBands {
                    baseline: industry_band(0),
                    years: (1..=horizon).map(industry_band).collect(),
                };
                (id, bands)
            })
            .collect();

        info!(
            scenario = %scenario,
            trials = self.trials,
            seed,
            horizon,
            industries = industries.len(),
            baseline_low = baseline.low,
            baseline_high = baseline.high,
            "simulated confidence bands"
        );

        Ok(ConfidenceReport {
            scenario,
            trials: self.trials,
            seed,
            low_percentile: settings.low_percentile,
            high_percentile: settings.high_percentile,
            baseline,
            years,
            industries,
        })
    }

    /// One trial: net impact at offset 0 and the signed projection for
    /// offsets `1..=horizon`, for the aggregate and every industry.
    fn run_trial(
        &self,
        input: &CalculationInput<'_>,
        scenario: &ScenarioName,
        horizon: u32,
        seed: u64,
    ) -> ImpactResult<TrialOutcome> {
        let v = &self.config.simulation.variations;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut mapping: MappingOutcome = input.mapping.clone();
        for record in mapping.records.values_mut() {
            record.automation_rate =
                UnitInterval::clamped(perturb(&mut rng, record.automation_rate.get(), v.automation));
            record.augmentation_rate =
                UnitInterval::clamped(perturb(&mut rng, record.augmentation_rate.get(), v.augmentation));
        }

        let mut effects = self.config.effects.clone();
        effects.implementation_rate =
            perturb(&mut rng, effects.implementation_rate, v.implementation_rate).clamp(0.0, 1.0);
        effects.efficiency_factor = perturb(&mut rng, effects.efficiency_factor, v.efficiency).clamp(0.0, 1.0);
        effects.adoption_rate = perturb(&mut rng, effects.adoption_rate, v.adoption_rate).clamp(0.0, 1.0);
        effects.productivity_gain =
            perturb(&mut rng, effects.productivity_gain, v.productivity_gain).clamp(0.0, 1.0);
        let speed_scale = perturb(&mut rng, 1.0, v.adoption_speed);

        let trial_input = CalculationInput {
            mapping: &mapping,
            ..*input
        };
        let result = NetImpactCalculator::new(self.config)
            .with_effects(effects)
            .calculate(&trial_input)?;
        let engine = AdoptionProjectionEngine::new(self.config).with_speed_scale(speed_scale);

        let trajectory = |net_impact: f64, series: &ProjectionSeries| {
            let mut values = Vec::with_capacity(horizon as usize + 1);
            values.push(net_impact);
            values.extend(series.signed_central());
            values
        };
        let aggregate = trajectory(result.net_impact, &engine.project_aggregate(&result, scenario, horizon)?);
        let industries = engine
            .project_industries(&result, scenario, horizon)?
            .into_iter()
            .filter_map(|(id, series)| {
                let net = result.industries.get(&id)?.net_impact;
                Some((id, trajectory(net, &series)))
            })
            .collect();

        Ok(TrialOutcome { aggregate, industries })
    }
}
