use crate::fixture::{FixtureBinding, FixtureSet};
use crate::mapper::Mapper;
use anyhow::{Result, anyhow};

/// A benchmarked unit of computation.
///
/// `degree` is the number of workers the caller wants used and `map` is the
/// primitive to spread work over them; `fixtures` holds everything the
/// descriptor asked for. Only the duration of `run` is of interest, so there
/// is no return value beyond failure.
pub trait Workload: Send + Sync {
    fn run(&self, degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()>;
}

impl<F> Workload for F
where
    F: Fn(usize, &Mapper, &FixtureSet) -> Result<()> + Send + Sync,
{
    fn run(&self, degree: usize, map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        self(degree, map, fixtures)
    }
}

/// Registry entry pairing a workload with its fixture requirements and
/// multi-core eligibility.
pub struct WorkloadDescriptor {
    name: String,
    workload: Box<dyn Workload>,
    fixtures: FixtureBinding,
    multicore: bool,
}

impl WorkloadDescriptor {
    pub fn new(name: &str, workload: impl Workload + 'static) -> Self {
        Self {
            name: name.to_string(),
            workload: Box::new(workload),
            fixtures: FixtureBinding::new(),
            multicore: false,
        }
    }

    pub fn with_fixtures(mut self, fixtures: impl Into<FixtureBinding>) -> Self {
        self.fixtures = fixtures.into();
        self
    }

    pub fn multicore(mut self, eligible: bool) -> Self {
        self.multicore = eligible;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workload(&self) -> &dyn Workload {
        self.workload.as_ref()
    }

    pub fn fixtures(&self) -> &FixtureBinding {
        &self.fixtures
    }

    pub fn is_multicore(&self) -> bool {
        self.multicore
    }
}

impl std::fmt::Debug for WorkloadDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadDescriptor")
            .field("name", &self.name)
            .field("fixtures", &self.fixtures)
            .field("multicore", &self.multicore)
            .finish_non_exhaustive()
    }
}

/// Ordered set of workloads driving a run. Iteration follows registration
/// order.
#[derive(Debug, Default)]
pub struct WorkloadRegistry {
    entries: Vec<WorkloadDescriptor>,
}

impl WorkloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: WorkloadDescriptor) -> Result<()> {
        if self.entries.iter().any(|entry| entry.name == descriptor.name) {
            return Err(anyhow!("Workload '{}' is already registered", descriptor.name));
        }
        self.entries.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&WorkloadDescriptor> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| anyhow!("Workload '{}' not found", name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkloadDescriptor> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn multicore_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.multicore).count()
    }

    /// Keep only the named workloads, preserving registration order. Every
    /// name must exist.
    pub fn retain_named<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        for name in names {
            self.get(name.as_ref())?;
        }
        self.entries
            .retain(|entry| names.iter().any(|name| name.as_ref() == entry.name));
        Ok(())
    }
}
