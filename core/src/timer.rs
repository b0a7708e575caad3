use crate::fixture::{self, FixtureSet};
use crate::mapper::Mapper;
use crate::workload::{Workload, WorkloadDescriptor};
use anyhow::{Context, Result, bail};
use std::time::Instant;
use tracing::debug;

/// Fetch the descriptor's fixtures, then time one run at `degree` workers.
///
/// Fixture download is not part of the measurement.
pub fn time_workload(descriptor: &WorkloadDescriptor, degree: usize) -> Result<f64> {
    if degree == 0 {
        bail!("parallelism degree must be at least 1 for '{}'", descriptor.name());
    }
    let fixtures = fixture::fetch(descriptor.fixtures())
        .with_context(|| format!("fetch fixtures for '{}'", descriptor.name()))?;
    time_with_fixtures(descriptor.workload(), degree, &fixtures)
        .with_context(|| format!("workload '{}' failed", descriptor.name()))
}

/// Time a single call of `workload` with already materialised fixtures.
///
/// The worker pool (if any) is built before the clock starts and torn down
/// after it stops.
pub fn time_with_fixtures(workload: &dyn Workload, degree: usize, fixtures: &FixtureSet) -> Result<f64> {
    let mapper = Mapper::with_workers(degree)?;
    let tick = Instant::now();
    workload.run(degree, &mapper, fixtures)?;
    let seconds = tick.elapsed().as_secs_f64();
    debug!(degree, seconds, "workload timed");
    Ok(seconds)
}
