use anyhow::Result;
use sha3::{Digest, Sha3_512};
use skperf_core::{FixtureSet, Mapper, Workload};
use tracing::debug;

pub const FIXTURE: &str = "test_data";

/// SHA3-512 digest of `data` (64 bytes).
pub fn sha3_512(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha3_512::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sha3Digest;

impl Workload for Sha3Digest {
    fn run(&self, _degree: usize, _map: &Mapper, fixtures: &FixtureSet) -> Result<()> {
        let input = fixtures.bytes(FIXTURE)?;
        let digest = sha3_512(input);
        debug!(input = input.len(), digest_len = digest.len(), "sha3-512 digest computed");
        Ok(())
    }
}
