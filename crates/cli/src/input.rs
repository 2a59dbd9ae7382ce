//! JSON input files.
//!
//! Snapshots are accepted either as their wrapper object
//! (`{"occupations": [...]}`, `{"industries": [...]}`) or as a bare array.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use laborshift_core::{
    EmploymentSnapshot, IndustryEmploymentRecord, OccupationRateSnapshot, OccupationRecord,
    PostingSignals,
};
use laborshift_engine::ModelConfig;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrWrapped<W, T> {
    Wrapped(W),
    Bare(Vec<T>),
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} in {}", path.display()))
}

pub fn occupations(path: &Path) -> Result<OccupationRateSnapshot> {
    Ok(
        match read_json::<OneOrWrapped<OccupationRateSnapshot, OccupationRecord>>(path, "occupation rates")? {
            OneOrWrapped::Wrapped(s) => s,
            OneOrWrapped::Bare(v) => OccupationRateSnapshot::new(v),
        },
    )
}

pub fn employment(path: &Path) -> Result<EmploymentSnapshot> {
    Ok(
        match read_json::<OneOrWrapped<EmploymentSnapshot, IndustryEmploymentRecord>>(path, "employment")? {
            OneOrWrapped::Wrapped(s) => s,
            OneOrWrapped::Bare(v) => EmploymentSnapshot::new(v),
        },
    )
}

pub fn signals(path: &Path) -> Result<PostingSignals> {
    read_json(path, "posting signals")
}

/// Model configuration; defaults when no path is given.
pub fn config(path: Option<&Path>) -> Result<ModelConfig> {
    let Some(path) = path else {
        return Ok(ModelConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config from {}", path.display()))?;
    ModelConfig::from_json_str(&text).with_context(|| format!("loading config {}", path.display()))
}
