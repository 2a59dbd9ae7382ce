//! End-to-end run: map → calculate → project → simulate → validate.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

use laborshift_core::{
    EmploymentSnapshot, ImpactResult, OccupationRateSnapshot, PostingSignals, ScenarioName,
    TargetPeriod,
};

use crate::calculator::{CalculationInput, NetImpactCalculator};
use crate::confidence::ConfidenceSimulator;
use crate::config::ModelConfig;
use crate::fingerprint::InputFingerprint;
use crate::mapper::OccupationIndustryMapper;
use crate::projection::AdoptionProjectionEngine;
use crate::report::ImpactReport;
use crate::validation::ResultValidator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    pub horizon: u32,
    /// Empty selects every configured scenario.
    #[serde(default)]
    pub scenarios: Vec<ScenarioName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub horizon: u32,
    pub seed: u64,
    /// Overrides the configured trial count.
    #[serde(default)]
    pub trials: Option<usize>,
}

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactRequest {
    pub period: TargetPeriod,
    pub rates: OccupationRateSnapshot,
    pub employment: EmploymentSnapshot,
    #[serde(default)]
    pub signals: Option<PostingSignals>,
    #[serde(default)]
    pub projection: Option<ProjectionRequest>,
    #[serde(default)]
    pub simulation: Option<SimulationRequest>,
}

impl ImpactRequest {
    pub fn new(period: TargetPeriod, rates: OccupationRateSnapshot, employment: EmploymentSnapshot) -> Self {
        Self {
            period,
            rates,
            employment,
            signals: None,
            projection: None,
            simulation: None,
        }
    }

    pub fn with_signals(mut self, signals: PostingSignals) -> Self {
        self.signals = Some(signals);
        self
    }

    pub fn with_projection(mut self, horizon: u32, scenarios: Vec<ScenarioName>) -> Self {
        self.projection = Some(ProjectionRequest { horizon, scenarios });
        self
    }

    pub fn with_simulation(mut self, horizon: u32, seed: u64) -> Self {
        self.simulation = Some(SimulationRequest {
            horizon,
            seed,
            trials: None,
        });
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        if let Some(sim) = self.simulation.as_mut() {
            sim.trials = Some(trials);
        }
        self
    }
}

/// Runs the full flow against one validated configuration.
#[derive(Debug, Clone)]
pub struct ImpactPipeline {
    config: ModelConfig,
}

impl ImpactPipeline {
    /// Fails with a configuration error if `config` is malformed.
    pub fn new(config: ModelConfig) -> ImpactResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    #[instrument(skip(self, request), fields(period = %request.period), err)]
    pub fn run(&self, request: &ImpactRequest) -> ImpactResult<ImpactReport> {
        let config = &self.config;
        let fingerprint = InputFingerprint::compute(
            &request.rates,
            &request.employment,
            request.signals.as_ref(),
            config,
        )?;

        // Fail fast on bad request parameters before any work is done.
        let projector = AdoptionProjectionEngine::new(config);
        if let Some(p) = &request.projection {
            projector.check_horizon(p.horizon)?;
            projector.select_scenarios(&p.scenarios)?;
        }
        if let Some(s) = &request.simulation {
            projector.check_horizon(s.horizon)?;
        }

        let mapping = OccupationIndustryMapper::new(config).map(&request.rates, &request.employment);
        let input = CalculationInput {
            employment: &request.employment,
            mapping: &mapping,
            signals: request.signals.as_ref(),
            period: request.period,
        };
        let impact = NetImpactCalculator::new(config).calculate(&input)?;

        let projections = request
            .projection
            .as_ref()
            .map(|p| projector.project(&impact, p.horizon, &p.scenarios))
            .transpose()?;

        let confidence = request
            .simulation
            .as_ref()
            .map(|s| {
                let mut simulator = ConfidenceSimulator::new(config);
                if let Some(trials) = s.trials {
                    simulator = simulator.with_trials(trials);
                }
                simulator.simulate(&input, s.horizon, s.seed)
            })
            .transpose()?;

        let mut validator = ResultValidator::new(config);
        if let Some(p) = &projections {
            validator = validator.with_projections(p);
        }
        if let Some(c) = &confidence {
            validator = validator.with_confidence(c);
        }
        let validation = validator.validate(&impact, &mapping);

        for warning in &impact.data_quality.warnings {
            warn!(%warning, "data warning");
        }
        info!(
            fingerprint = %fingerprint,
            industries = impact.industries.len(),
            net_impact = impact.net_impact,
            transformation_rate = impact.transformation_rate,
            method = ?impact.data_quality.method,
            trusted = validation.trusted,
            "impact run complete"
        );

        let explanation = format!(
            "net employment impact {:+.2}% across {} industries ({} employed), transformation rate {:.2}%",
            impact.net_impact * 100.0,
            impact.rollup_industries().count(),
            impact.total_employment,
            impact.transformation_rate * 100.0,
        );
        let metadata = json!({
            "engine": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "projection": request.projection,
            "simulation": request.simulation,
        });

        let mut report = ImpactReport::new(fingerprint, mapping, impact, validation)
            .with_explanation(explanation)
            .with_metadata(metadata);
        if let Some(p) = projections {
            report = report.with_projections(p);
        }
        if let Some(c) = confidence {
            report = report.with_confidence(c);
        }
        Ok(report)
    }
}
