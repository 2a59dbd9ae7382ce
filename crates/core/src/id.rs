//! Strongly-typed identifiers used across the engine.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ImpactError;
use crate::taxonomy::{self, Normalized};

/// Identifier of an industry (e.g. `"Information"`, `"Manufacturing"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndustryId(String);

/// Name of a projection scenario (e.g. `"moderate"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioName(String);

macro_rules! impl_name_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier from any string; surrounding whitespace is trimmed.
            ///
            /// Use `parse()` when the input is untrusted and must be non-empty.
            pub fn new(value: impl Into<String>) -> Self {
                let value = value.into();
                Self(value.trim().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $t {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $t {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl FromStr for $t {
            type Err = ImpactError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ImpactError::invalid_input(format!("{}: empty name", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }
        }
    };
}

impl_name_newtype!(IndustryId, "IndustryId");
impl_name_newtype!(ScenarioName, "ScenarioName");

/// Canonical occupation code (`NN-NNNN`).
///
/// Only obtainable through the taxonomy normalizer, so holding one proves the
/// code was recognized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OccupationCode(String);

impl OccupationCode {
    /// Callers must pass an already-canonical `NN-NNNN` string.
    pub(crate) fn from_canonical(canonical: String) -> Self {
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-digit major group prefix (e.g. `"43"` for `43-3031`).
    pub fn major_group(&self) -> &str {
        &self.0[..2]
    }
}

impl core::fmt::Display for OccupationCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OccupationCode {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match taxonomy::normalize(s) {
            Normalized::Canonical(code) => Ok(code),
            Normalized::Unrecognized { raw } => Err(ImpactError::unrecognized_code(raw)),
        }
    }
}

impl TryFrom<String> for OccupationCode {
    type Error = ImpactError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OccupationCode> for String {
    fn from(value: OccupationCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn industry_id_trims_and_rejects_empty() {
        assert_eq!(IndustryId::new("  Information ").as_str(), "Information");
        assert!("   ".parse::<IndustryId>().is_err());
    }

    #[test]
    fn occupation_code_parses_through_normalizer() {
        let code: OccupationCode = "151252".parse().unwrap();
        assert_eq!(code.as_str(), "15-1252");
        assert_eq!(code.major_group(), "15");

        let err = "not-a-code".parse::<OccupationCode>().unwrap_err();
        assert!(matches!(err, ImpactError::UnrecognizedTaxonomyCode(_)));
    }

    #[test]
    fn occupation_code_deserializes_any_known_shape() {
        let code: OccupationCode = serde_json::from_str("\"43-3031.00\"").unwrap();
        assert_eq!(code.as_str(), "43-3031");
        assert!(serde_json::from_str::<OccupationCode>("\"99-0000\"").is_err());
    }
}
