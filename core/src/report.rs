use crate::score::Scores;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    SingleCore,
    MultiCore,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::SingleCore => "single-core",
            Mode::MultiCore => "multi-core",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub workload: String,
    pub mode: Mode,
    pub degree: usize,
    pub seconds: f64,
}

/// Machine-readable summary of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    pub cores: usize,
    pub timings: Vec<TimingRecord>,
    pub single_core_score: Option<u64>,
    pub multi_core_score: Option<u64>,
}

impl RunReport {
    pub fn new(timestamp: DateTime<Utc>, cores: usize, timings: Vec<TimingRecord>, scores: Scores) -> Self {
        Self {
            generated_at: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            cores,
            timings,
            single_core_score: scores.single_core,
            multi_core_score: scores.multi_core,
        }
    }

    pub fn timings_for(&self, mode: Mode) -> impl Iterator<Item = &TimingRecord> {
        self.timings.iter().filter(move |record| record.mode == mode)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize run report")
    }
}
