pub mod fixture;
pub mod mapper;
pub mod report;
pub mod runner;
pub mod score;
pub mod timer;
pub mod workload;

#[cfg(test)]
mod score_test;

pub use fixture::{FixtureBinding, FixtureSet};
pub use mapper::{Mapper, WorkerPool};
pub use report::{Mode, RunReport, TimingRecord};
pub use runner::{Scorer, available_cores};
pub use score::{ScoreAccumulator, ScoreConfig, Scores};
pub use workload::{Workload, WorkloadDescriptor, WorkloadRegistry};
