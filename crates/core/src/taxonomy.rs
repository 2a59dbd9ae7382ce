//! Occupation taxonomy normalizer.
//!
//! Accepts the shapes occupation codes arrive in from different sources and
//! produces the canonical hyphenated `NN-NNNN` form:
//!
//! - contiguous digits: `151252`
//! - hyphenated major-minor: `15-1252`
//! - hyphenated with a fractional suffix: `15-1252.00`
//! - dotted or space separated: `43.3031`, `43 3031`
//!
//! Normalization is total: every input maps to either a canonical code or an
//! explicit [`Normalized::Unrecognized`]. It never panics and never errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::id::OccupationCode;

/// Known major occupation groups (the two-digit prefix).
pub const MAJOR_GROUPS: [&str; 23] = [
    "11", "13", "15", "17", "19", "21", "23", "25", "27", "29", "31", "33", "35", "37", "39", "41",
    "43", "45", "47", "49", "51", "53", "55",
];

/// Outcome of normalizing one raw code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Canonical(OccupationCode),
    Unrecognized { raw: String },
}

impl Normalized {
    pub fn code(&self) -> Option<&OccupationCode> {
        match self {
            Normalized::Canonical(code) => Some(code),
            Normalized::Unrecognized { .. } => None,
        }
    }

    pub fn into_code(self) -> Option<OccupationCode> {
        match self {
            Normalized::Canonical(code) => Some(code),
            Normalized::Unrecognized { .. } => None,
        }
    }
}

/// Normalize a raw occupation code.
pub fn normalize(raw: &str) -> Normalized {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return unrecognized(raw);
    }

    let body = strip_fractional_suffix(trimmed);
    let digits: String = body.chars().filter(|c| !c.is_whitespace() && !is_separator(*c)).collect();

    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return unrecognized(raw);
    }

    let (major, minor) = digits.split_at(2);
    if !MAJOR_GROUPS.contains(&major) {
        return unrecognized(raw);
    }

    Normalized::Canonical(OccupationCode::from_canonical(format!("{major}-{minor}")))
}

/// Normalize an optional code; `None` is unrecognized.
pub fn normalize_opt(raw: Option<&str>) -> Normalized {
    match raw {
        Some(raw) => normalize(raw),
        None => unrecognized(""),
    }
}

/// Batch normalization result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    /// Raw input → canonical code.
    pub canonical: BTreeMap<String, OccupationCode>,
    /// Raw inputs that could not be normalized, in input order.
    pub unrecognized: Vec<String>,
}

impl NormalizationReport {
    pub fn success_ratio(&self) -> f64 {
        let total = self.canonical.len() + self.unrecognized.len();
        if total == 0 {
            return 0.0;
        }
        self.canonical.len() as f64 / total as f64
    }
}

pub fn normalize_batch<'a, I>(codes: I) -> NormalizationReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = NormalizationReport::default();
    for raw in codes {
        match normalize(raw) {
            Normalized::Canonical(code) => {
                report.canonical.insert(raw.to_string(), code);
            }
            Normalized::Unrecognized { raw } => report.unrecognized.push(raw),
        }
    }
    debug!(
        recognized = report.canonical.len(),
        unrecognized = report.unrecognized.len(),
        "normalized occupation code batch"
    );
    report
}

fn unrecognized(raw: &str) -> Normalized {
    Normalized::Unrecognized {
        raw: raw.to_string(),
    }
}

fn is_separator(c: char) -> bool {
    c.is_ascii_punctuation()
}

/// Drop a trailing `.NN` suffix when what precedes it already holds six digits.
fn strip_fractional_suffix(s: &str) -> &str {
    let Some((head, tail)) = s.rsplit_once('.') else {
        return s;
    };
    let tail = tail.trim();
    let head_digits = head.chars().filter(|c| c.is_ascii_digit()).count();
    if tail.len() == 2 && tail.chars().all(|c| c.is_ascii_digit()) && head_digits == 6 {
        head
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn canonical(raw: &str) -> Option<String> {
        normalize(raw).into_code().map(|c| c.as_str().to_string())
    }

    #[test]
    fn accepts_known_shapes() {
        assert_eq!(canonical("15-1252").as_deref(), Some("15-1252"));
        assert_eq!(canonical("151252").as_deref(), Some("15-1252"));
        assert_eq!(canonical("15-1252.00").as_deref(), Some("15-1252"));
        assert_eq!(canonical("43.3031").as_deref(), Some("43-3031"));
        assert_eq!(canonical("43 3031").as_deref(), Some("43-3031"));
        assert_eq!(canonical("  11-1021\n").as_deref(), Some("11-1021"));
    }

    #[test]
    fn rejects_malformed_and_unknown_groups() {
        assert_eq!(canonical(""), None);
        assert_eq!(canonical("   "), None);
        assert_eq!(canonical("invalid"), None);
        assert_eq!(canonical("15-125"), None);
        assert_eq!(canonical("15-12520"), None);
        // 12 is not a major group.
        assert_eq!(canonical("12-3456"), None);
        assert_eq!(normalize_opt(None), Normalized::Unrecognized { raw: String::new() });
    }

    #[test]
    fn unrecognized_keeps_raw_input() {
        assert_eq!(
            normalize(" bogus "),
            Normalized::Unrecognized {
                raw: " bogus ".to_string()
            }
        );
    }

    #[test]
    fn batch_splits_recognized_and_unrecognized() {
        let report = normalize_batch(["15-1252", "151252", "nope", "43 3031"]);
        assert_eq!(report.canonical.len(), 3);
        assert_eq!(report.unrecognized, vec!["nope".to_string()]);
        assert!((report.success_ratio() - 0.75).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn normalize_is_total(raw in ".{0,24}") {
            // Must never panic; canonical results always have the NN-NNNN shape.
            if let Normalized::Canonical(code) = normalize(&raw) {
                let s = code.as_str();
                prop_assert_eq!(s.len(), 7);
                prop_assert_eq!(&s[2..3], "-");
                prop_assert!(MAJOR_GROUPS.contains(&code.major_group()));
            }
        }

        #[test]
        fn all_shapes_agree(group_idx in 0usize..23, minor in 0u32..10_000) {
            let major = MAJOR_GROUPS[group_idx];
            let expected = format!("{major}-{minor:04}");
            prop_assert_eq!(canonical(&format!("{major}{minor:04}")), Some(expected.clone()));
            prop_assert_eq!(canonical(&format!("{major}-{minor:04}.00")), Some(expected.clone()));
            prop_assert_eq!(canonical(&expected), Some(expected.clone()));
        }
    }
}
