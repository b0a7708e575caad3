use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;

static PERF_TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "skperf_core=info,skperf_workloads=info,skperf=info";

use clap::{Parser, ValueEnum};
use skperf_core::{ScoreConfig, Scorer, WorkloadRegistry, available_cores};
use tracing::info;

#[cfg(test)]
mod main_test;

#[derive(Debug, Parser)]
#[command(
    name = "skperf",
    author,
    version,
    about = "CPU benchmark scoring single-core and multi-core throughput",
    long_about = None
)]
struct CliArgs {
    /// Override the detected core count
    #[arg(long, value_name = "N", value_parser = parse_core_count)]
    cores: Option<usize>,

    /// Run only the named workload; repeat to select several
    #[arg(long = "only", value_name = "NAME")]
    only: Vec<String>,

    /// Print the workload registry and exit
    #[arg(long)]
    list: bool,

    /// TOML file overriding the reference timings and scale
    #[arg(long, value_name = "FILE")]
    references: Option<PathBuf>,

    /// Output format of the run summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    /// Human-readable lines followed by the run report as JSON
    Json,
}

fn parse_core_count(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("core count must be at least 1".to_string()),
        Ok(count) => Ok(count),
        Err(e) => Err(format!("invalid core count '{}': {}", raw, e)),
    }
}

/// How `SKPERF_TRACE` asks for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TraceSetting {
    Off,
    /// Use `RUST_LOG`, falling back to [`DEFAULT_TRACE_FILTER`].
    Default,
    Filter(String),
}

impl TraceSetting {
    fn parse(raw: &str) -> Self {
        let value = raw.trim();
        let is = |word: &str| value.eq_ignore_ascii_case(word);
        if value.is_empty() || is("0") || is("false") || is("off") {
            TraceSetting::Off
        } else if is("1") || is("true") || is("on") {
            TraceSetting::Default
        } else {
            TraceSetting::Filter(value.to_string())
        }
    }

    fn filter(self) -> Option<tracing_subscriber::EnvFilter> {
        let expr = match self {
            TraceSetting::Off => return None,
            TraceSetting::Default => std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_TRACE_FILTER.to_string()),
            TraceSetting::Filter(expr) => expr,
        };
        tracing_subscriber::EnvFilter::try_new(expr)
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_TRACE_FILTER))
            .ok()
    }
}

fn maybe_init_perf_tracing() {
    let Ok(raw) = std::env::var("SKPERF_TRACE") else {
        return;
    };
    let Some(filter) = TraceSetting::parse(&raw).filter() else {
        return;
    };

    PERF_TRACE_INIT.call_once(|| {
        // stdout carries the benchmark lines
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .try_init();
    });
}

fn build_registry(only: &[String]) -> anyhow::Result<WorkloadRegistry> {
    let mut registry = skperf_workloads::default_registry()?;
    if !only.is_empty() {
        registry.retain_named(only)?;
    }
    Ok(registry)
}

fn write_listing<W: Write>(registry: &WorkloadRegistry, out: &mut W) -> anyhow::Result<()> {
    for descriptor in registry.iter() {
        let fixtures: Vec<&str> = descriptor.fixtures().iter().map(|(name, _)| name).collect();
        writeln!(
            out,
            "{}\tmulticore={}\tfixtures={}",
            descriptor.name(),
            descriptor.is_multicore(),
            if fixtures.is_empty() { "-".to_string() } else { fixtures.join(",") }
        )?;
    }
    Ok(())
}

fn load_score_config(references: Option<&PathBuf>) -> anyhow::Result<ScoreConfig> {
    match references {
        Some(path) => ScoreConfig::load(path),
        None => Ok(ScoreConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    maybe_init_perf_tracing();

    let args = CliArgs::parse();
    let registry = build_registry(&args.only)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.list {
        return write_listing(&registry, &mut out);
    }

    let config = load_score_config(args.references.as_ref())?;
    let cores = args.cores.unwrap_or_else(available_cores);
    info!(cores, workloads = registry.len(), "starting skperf");

    let report = Scorer::new(config, cores).run(&registry, &mut out)?;
    if args.format == OutputFormat::Json {
        writeln!(out, "{}", report.to_json_pretty()?)?;
    }
    Ok(())
}
