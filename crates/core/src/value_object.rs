//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{ImpactError, ImpactResult};

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. Rates, scores and
/// periods are value objects; industries and occupations are identified by
/// their ids instead.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// A finite number in `[0, 1]`.
///
/// Every rate and score in the model (automation/augmentation rates, coverage,
/// confidence) is carried as a `UnitInterval` so the bound cannot be lost
/// between components.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct UnitInterval(f64);

impl UnitInterval {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Validate a value; rejects NaN, infinities and anything outside `[0, 1]`.
    pub fn new(value: f64) -> ImpactResult<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ImpactError::invalid_input(format!(
                "value {value} outside [0, 1]"
            )))
        }
    }

    /// Clamp into `[0, 1]`. NaN becomes 0.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl ValueObject for UnitInterval {}

impl TryFrom<f64> for UnitInterval {
    type Error = ImpactError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitInterval> for f64 {
    fn from(value: UnitInterval) -> Self {
        value.0
    }
}

impl core::fmt::Display for UnitInterval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}
