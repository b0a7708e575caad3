//! Score normalisation.
//!
//! A score is `reference / mean(timings) * scale`, rounded: a host that is
//! twice as fast as the reference machine scores twice the scale.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SINGLE_CORE_REFERENCE: f64 = 17.156576803752355;
pub const MULTI_CORE_REFERENCE: f64 = 33.75305533409119;
pub const SCORE_SCALE: f64 = 1000.0;

/// Means below this are treated as this, keeping scores finite.
const MIN_MEAN_SECONDS: f64 = 1e-9;

/// Reference statistics the scorer normalises against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Mean single-core seconds of the reference machine.
    pub single_core_reference: f64,
    /// Mean multi-core seconds of the reference machine.
    pub multi_core_reference: f64,
    pub scale: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            single_core_reference: SINGLE_CORE_REFERENCE,
            multi_core_reference: MULTI_CORE_REFERENCE,
            scale: SCORE_SCALE,
        }
    }
}

impl ScoreConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: ScoreConfig = toml::from_str(raw).context("parse score references")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("load score references from {}", path.display()))
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("single_core_reference", self.single_core_reference),
            ("multi_core_reference", self.multi_core_reference),
            ("scale", self.scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be a positive number, got {}", key, value);
            }
        }
        Ok(())
    }
}

/// Timings collected during a run, in registry order.
#[derive(Debug, Clone, Default)]
pub struct ScoreAccumulator {
    single_core: Vec<f64>,
    multi_core: Vec<f64>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_single_core(&mut self, seconds: f64) {
        self.single_core.push(seconds);
    }

    pub fn push_multi_core(&mut self, seconds: f64) {
        self.multi_core.push(seconds);
    }

    pub fn single_core(&self) -> &[f64] {
        &self.single_core
    }

    pub fn multi_core(&self) -> &[f64] {
        &self.multi_core
    }

    /// Final scores. The multi-core score only exists on multi-core hosts
    /// that ran at least one eligible workload.
    pub fn finish(self, config: &ScoreConfig, multicore_host: bool) -> Scores {
        let single_core = normalized_score(config.single_core_reference, &self.single_core, config.scale);
        let multi_core = if multicore_host {
            normalized_score(config.multi_core_reference, &self.multi_core, config.scale)
        } else {
            None
        };
        Scores {
            single_core,
            multi_core,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub single_core: Option<u64>,
    pub multi_core: Option<u64>,
}

/// `None` when there is nothing to average.
pub fn normalized_score(reference: f64, timings: &[f64], scale: f64) -> Option<u64> {
    if timings.is_empty() {
        return None;
    }
    let mean = timings.iter().sum::<f64>() / timings.len() as f64;
    let mean = mean.max(MIN_MEAN_SECONDS);
    Some((reference / mean * scale).round() as u64)
}
