//! Engine error model.

use thiserror::Error;

/// Result type used across the engine.
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Fatal engine error.
///
/// Recoverable conditions (an industry without employment, an occupation code
/// that fails normalization, thin coverage) are *not* errors: they are reported
/// as [`crate::DataWarning`] values on the result. An `ImpactError` means the
/// run as a whole cannot produce a trustworthy record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImpactError {
    /// Required input is absent and nothing usable remains after exclusion.
    #[error("missing data: {0}")]
    MissingData(String),

    /// A raw occupation code could not be normalized.
    #[error("unrecognized taxonomy code: {0:?}")]
    UnrecognizedTaxonomyCode(String),

    /// Scenario/threshold configuration is malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Every industry was excluded from the calculation.
    #[error("no usable industries: {0}")]
    NoUsableIndustries(String),

    /// A request parameter or input value is out of range.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ImpactError {
    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    pub fn unrecognized_code(raw: impl Into<String>) -> Self {
        Self::UnrecognizedTaxonomyCode(raw.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn no_usable_industries(msg: impl Into<String>) -> Self {
        Self::NoUsableIndustries(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// `true` for errors caused by configuration rather than data.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
