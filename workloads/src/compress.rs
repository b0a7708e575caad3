use anyhow::{Context, Result};
use skperf_core::{FixtureSet, Mapper, Workload};
use std::io::Write;
use tracing::debug;
use xz2::write::XzEncoder;

pub const FIXTURE: &str = "test_data";
/// Default `xz` compression level.
pub const DEFAULT_PRESET: u32 = 6;

/// Compress `data` into a complete `.xz` container.
pub fn compress_xz(data: &[u8], preset: u32) -> Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(Vec::with_capacity(data.len() / 4), preset);
    encoder.write_all(data).context("xz compression failed")?;
    encoder.finish().context("failed to finish xz stream")
}

#[derive(Debug, Clone, Copy)]
pub struct XzCompress {
    pub preset: u32,
}

impl Default for XzCompress {
    fn default() -> Self {
        Self { preset: DEFAULT_PRESET }
    }
}

impl Workload for XzCompress {
    fn run(&self, _degree: usize, _map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let input = fixtures.bytes(FIXTURE)?;
        let output = compress_xz(input, self.preset)?;
        debug!(input = input.len(), output = output.len(), "xz compression finished");
        Ok(())
    }
}
