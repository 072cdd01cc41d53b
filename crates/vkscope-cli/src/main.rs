//! vkscope — Vulkan capability report tool.
//!
//! Queries the driver stack for physical devices, queue family topology,
//! instance layers, and platform extensions, then prints a report and exits.
//! `--fake` (or `VKSCOPE_FAKE=1`) swaps in a deterministic in-memory driver
//! for offline smoke runs and CI.

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::error;

mod exit;
mod output;

use output::{emit_report, OutputFormat};
use vkscope_probe::ash_driver::AshDriver;
use vkscope_probe::fake::FakeDriver;
use vkscope_probe::{probe, CapabilitySnapshot, LayerPolicy, ProbeError, ProbeOptions};
use vkscope_report::StatusCode;

/// Vulkan capability report: devices, queue families, layers, extensions.
#[derive(Parser)]
#[command(name = "vkscope")]
#[command(about = "Report Vulkan driver capabilities: devices, queue families, layers, extensions")]
#[command(version)]
struct Cli {
    /// Output format (text, json)
    #[arg(long, value_name = "FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Include per-device memory topology and version info in text output
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Use the deterministic fake driver instead of the Vulkan loader
    #[arg(long)]
    fake: bool,

    /// Do not activate any discovered layer at context creation
    #[arg(long, conflicts_with = "layer")]
    no_layers: bool,

    /// Activate exactly this layer (repeatable); the default activates every
    /// discovered layer
    #[arg(long, value_name = "NAME")]
    layer: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(&cli);

    if let Err(err) = run(&cli) {
        error!("capability probe failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            error!("  caused by: {cause}");
            source = cause.source();
        }
        eprintln!("{}", style(format!("error: {err}")).red());
        std::process::exit(exit_code(&err));
    }
    std::process::exit(exit::EXIT_SUCCESS);
}

fn run(cli: &Cli) -> Result<()> {
    let options = ProbeOptions { layer_policy: layer_policy(cli) };
    let snapshot = run_probe(cli, &options)?;
    emit_report(&snapshot.report, cli.format, cli.verbose)?;
    Ok(())
}

/// Probe through the fake driver when requested, otherwise load the real
/// Vulkan loader.
fn run_probe(cli: &Cli, options: &ProbeOptions) -> Result<CapabilitySnapshot, ProbeError> {
    if let Some(fake) = fake_driver(cli) {
        return probe(&fake, options);
    }
    let driver = AshDriver::load()?;
    probe(&driver, options)
}

/// Resolve `--fake` / `VKSCOPE_FAKE` into a canned driver.
///
/// Recognised values: `empty` (nothing reported), `incompatible` (context
/// creation fails), anything else truthy selects the reference scenario.
fn fake_driver(cli: &Cli) -> Option<FakeDriver> {
    if cli.fake {
        return Some(FakeDriver::reference());
    }
    let value = std::env::var("VKSCOPE_FAKE").ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "none" => None,
        "empty" => Some(FakeDriver::empty()),
        "incompatible" => Some(
            FakeDriver::reference().with_context_failure(StatusCode::INCOMPATIBLE_DRIVER),
        ),
        _ => Some(FakeDriver::reference()),
    }
}

fn layer_policy(cli: &Cli) -> LayerPolicy {
    if cli.no_layers {
        LayerPolicy::EnableNone
    } else if !cli.layer.is_empty() {
        LayerPolicy::Explicit(cli.layer.clone())
    } else {
        LayerPolicy::EnableAll
    }
}

fn setup_logging(cli: &Cli) {
    let level = cli.log_level.as_deref().unwrap_or(if cli.verbose { "debug" } else { "warn" });
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ProbeError>() {
        Some(ProbeError::ContextCreation { .. } | ProbeError::Loader(_)) => {
            exit::EXIT_CONTEXT_FAIL
        }
        Some(ProbeError::DriverQuery { .. }) => exit::EXIT_QUERY_FAIL,
        None => exit::EXIT_GENERIC_FAIL,
    }
}
