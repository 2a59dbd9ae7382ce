//! Stable fingerprint of a run's inputs.
//!
//! Two runs with equal fingerprints read identical snapshots and configuration
//! and therefore produce identical deterministic output, so the key is suitable
//! for caching a report.

use serde::{Deserialize, Serialize};

use laborshift_core::{
    EmploymentSnapshot, ImpactError, ImpactResult, OccupationRateSnapshot, PostingSignals,
};

use crate::config::ModelConfig;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFingerprint {
    pub rates: String,
    pub employment: String,
    pub config: String,
    /// Combined key over all inputs, including posting signals.
    pub key: String,
}

impl InputFingerprint {
    pub fn compute(
        rates: &OccupationRateSnapshot,
        employment: &EmploymentSnapshot,
        signals: Option<&PostingSignals>,
        config: &ModelConfig,
    ) -> ImpactResult<Self> {
        let rates = digest(rates)?;
        let employment = digest(employment)?;
        let signals = digest(&signals)?;
        let config = digest(config)?;

        let mut combined = Vec::with_capacity(64);
        for part in [rates, employment, signals, config] {
            combined.extend_from_slice(&part.to_be_bytes());
        }

        Ok(Self {
            rates: hex(rates),
            employment: hex(employment),
            config: hex(config),
            key: hex(fnv1a64(&combined)),
        })
    }
}

impl core::fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.key)
    }
}

fn digest<T: Serialize + ?Sized>(value: &T) -> ImpactResult<u64> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| ImpactError::invalid_input(format!("unserializable input: {e}")))?;
    Ok(fnv1a64(&bytes))
}

fn hex(value: u64) -> String {
    format!("{value:016x}")
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    let mut hash = OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}
