//! `laborshift-core`: domain foundation for the labor-impact engine.
//!
//! This crate contains **pure domain** primitives (no I/O): identifiers, the
//! unit-interval value object, the target period, input snapshots, the
//! occupation taxonomy normalizer, and the error and warning types.

pub mod error;
pub mod id;
pub mod period;
pub mod snapshot;
pub mod taxonomy;
pub mod value_object;
pub mod warning;

pub use error::{ImpactError, ImpactResult};
pub use id::{IndustryId, OccupationCode, ScenarioName};
pub use period::TargetPeriod;
pub use snapshot::{
    EmploymentBreakdown, EmploymentSnapshot, IndustryEmploymentRecord, OccupationRateSnapshot,
    OccupationRecord, PostingSignals,
};
pub use taxonomy::{NormalizationReport, Normalized, normalize, normalize_batch};
pub use value_object::{UnitInterval, ValueObject};
pub use warning::DataWarning;
