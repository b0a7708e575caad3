//! Top-level benchmark driver.
//!
//! Workloads run strictly one after another.

use crate::report::{Mode, RunReport, TimingRecord};
use crate::score::{ScoreAccumulator, ScoreConfig};
use crate::timer;
use crate::workload::{WorkloadDescriptor, WorkloadRegistry};
use anyhow::Result;
use chrono::Utc;
use std::io::Write;
use std::num::NonZeroUsize;
use tracing::info;

/// Number of cores the host lets this process use; at least 1.
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs a registry and turns its timings into scores.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScoreConfig,
    cores: usize,
}

impl Scorer {
    pub fn new(config: ScoreConfig, cores: usize) -> Self {
        Self {
            config,
            cores: cores.max(1),
        }
    }

    pub fn cores(&self) -> usize {
        self.cores
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn multicore_host(&self) -> bool {
        self.cores > 1
    }

    /// Time every workload in registry order, writing progress lines and the
    /// final scores to `out`.
    pub fn run<W: Write>(&self, registry: &WorkloadRegistry, out: &mut W) -> Result<RunReport> {
        info!(workloads = registry.len(), cores = self.cores, "benchmark run started");
        let mut accumulator = ScoreAccumulator::new();
        let mut timings = Vec::with_capacity(registry.len() * 2);

        for descriptor in registry.iter() {
            let seconds = self.measure(descriptor, Mode::SingleCore, 1, out)?;
            accumulator.push_single_core(seconds);
            timings.push(record(descriptor, Mode::SingleCore, 1, seconds));

            if descriptor.is_multicore() && self.multicore_host() {
                let seconds = self.measure(descriptor, Mode::MultiCore, self.cores, out)?;
                accumulator.push_multi_core(seconds);
                timings.push(record(descriptor, Mode::MultiCore, self.cores, seconds));
            }
        }

        let scores = accumulator.finish(&self.config, self.multicore_host());
        writeln!(out)?;
        if let Some(score) = scores.single_core {
            writeln!(out, "single core score: {}", score)?;
        }
        if let Some(score) = scores.multi_core {
            writeln!(out, "multi core score: {}", score)?;
        }
        out.flush()?;
        info!(?scores, "benchmark run scored");

        Ok(RunReport::new(Utc::now(), self.cores, timings, scores))
    }

    fn measure<W: Write>(&self, descriptor: &WorkloadDescriptor, mode: Mode, degree: usize, out: &mut W) -> Result<f64> {
        write!(out, "{} ({}): ", descriptor.name(), mode.label())?;
        out.flush()?;
        let seconds = timer::time_workload(descriptor, degree)?;
        writeln!(out, "{} seconds", seconds)?;
        Ok(seconds)
    }
}

fn record(descriptor: &WorkloadDescriptor, mode: Mode, degree: usize, seconds: f64) -> TimingRecord {
    TimingRecord {
        workload: descriptor.name().to_string(),
        mode,
        degree,
        seconds,
    }
}
