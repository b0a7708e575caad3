//! Fixture download and decompression.
//!
//! Workloads declare the remote resources they need as a [`FixtureBinding`];
//! [`fetch`] materialises them into a [`FixtureSet`] right before the timed
//! call. Downloads land in a scratch directory that is removed when `fetch`
//! returns, on success and on failure alike.

use anyhow::{Context, Result, anyhow};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Ordered list of `logical name -> URL` pairs a workload depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureBinding {
    entries: Vec<(String, String)>,
}

impl FixtureBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the URL bound to `name`.
    pub fn with(mut self, name: &str, url: &str) -> Self {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some(entry) => entry.1 = url.to_string(),
            None => self.entries.push((name.to_string(), url.to_string())),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, url)| (name.as_str(), url.as_str()))
    }

    pub fn url(&self, name: &str) -> Option<&str> {
        self.iter().find(|(n, _)| *n == name).map(|(_, url)| url)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FixtureBinding {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .fold(FixtureBinding::new(), |binding, (name, url)| binding.with(name, url))
    }
}

/// Fetched fixture contents keyed by logical name. Lives for one workload
/// invocation only.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    contents: HashMap<String, Vec<u8>>,
}

impl FixtureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.contents.insert(name.into(), bytes.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Raw bytes of fixture `name`.
    pub fn bytes(&self, name: &str) -> Result<&[u8]> {
        self.contents
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("Fixture '{}' was not fetched", name))
    }

    /// Fixture `name` decoded as UTF-8; invalid sequences are replaced.
    pub fn text(&self, name: &str) -> Result<Cow<'_, str>> {
        Ok(String::from_utf8_lossy(self.bytes(name)?))
    }
}

/// Whether a fixture URL names a gzip stream that must be inflated.
pub fn is_gzip_url(url: &str) -> bool {
    url.ends_with(".gz")
}

/// Download every binding and return the contents keyed by logical name.
///
/// `http://` and `https://` URLs go through reqwest; `file://` URLs are
/// copied from the local filesystem. All downloads of one call run
/// concurrently on a private current-thread runtime.
pub fn fetch(binding: &FixtureBinding) -> Result<FixtureSet> {
    if binding.is_empty() {
        return Ok(FixtureSet::new());
    }

    let scratch = tempfile::Builder::new()
        .prefix("skperf-fixtures-")
        .tempdir()
        .context("create fixture scratch directory")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;
    let client = reqwest::Client::builder()
        .user_agent(concat!("skperf/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")?;

    let downloads = binding.iter().enumerate().map(|(idx, (name, url))| {
        info!(fixture = name, url, "fetching fixture");
        download_to(&client, url, scratch.path().join(format!("fixture-{idx}")))
    });
    let paths = runtime.block_on(futures::future::try_join_all(downloads))?;

    let mut set = FixtureSet::new();
    for ((name, url), path) in binding.iter().zip(paths) {
        let bytes = read_fixture(&path, url)?;
        debug!(fixture = name, bytes = bytes.len(), "fixture ready");
        set.insert(name, bytes);
    }
    Ok(set)
}

async fn download_to(client: &reqwest::Client, url: &str, dest: PathBuf) -> Result<PathBuf> {
    if let Some(local) = url.strip_prefix("file://") {
        tokio::fs::copy(local, &dest)
            .await
            .with_context(|| format!("copy fixture {}", url))?;
        return Ok(dest);
    }

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("download {}", url))?
        .error_for_status()
        .with_context(|| format!("download {}", url))?;
    let body = response
        .bytes()
        .await
        .with_context(|| format!("read response body of {}", url))?;
    tokio::fs::write(&dest, &body)
        .await
        .with_context(|| format!("write {}", dest.display()))?;
    Ok(dest)
}

fn read_fixture(path: &Path, url: &str) -> Result<Vec<u8>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut out = Vec::new();
    if is_gzip_url(url) {
        flate2::read::MultiGzDecoder::new(reader)
            .read_to_end(&mut out)
            .with_context(|| format!("decompress {}", url))?;
    } else {
        reader
            .read_to_end(&mut out)
            .with_context(|| format!("read {}", path.display()))?;
    }
    Ok(out)
}
