//! `laborshift-engine`
//!
//! **Responsibility:** turn occupation-level AI usage into industry and
//! economy-level employment impact, project it forward and bound it.
//!
//! Data flows:
//! [`mapper`] → [`calculator`] → {[`projection`], [`confidence`]} → [`validation`] → [`report`].
//! [`pipeline`] runs the whole flow for one request.
//!
//! Every component is synchronous and pure over its inputs; per-industry,
//! per-scenario and per-trial work is spread over rayon with results collected
//! in input order. Nothing here performs I/O.

pub mod calculator;
pub mod confidence;
pub mod config;
pub mod fingerprint;
pub mod mapper;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod validation;

pub use calculator::{
    CalculationInput, CalculationMethod, DataQuality, ImpactComponents, IndustryNetImpact,
    NetImpactCalculator, NetImpactResult,
};
pub use confidence::{ConfidenceBand, ConfidenceReport, ConfidenceSimulator, IndustryBands};
pub use config::{ModelConfig, ScenarioConfig, ShapingKind};
pub use fingerprint::InputFingerprint;
pub use mapper::{IndustryImpactRecord, MappingOutcome, OccupationIndustryMapper, RateSource};
pub use pipeline::{ImpactPipeline, ImpactRequest};
pub use projection::{
    AdoptionProjectionEngine, ComponentYear, ProjectionResult, ProjectionSeries, ScenarioProjection, ShapingStrategy,
};
pub use report::ImpactReport;
pub use validation::{ResultValidator, ValidationReport};
