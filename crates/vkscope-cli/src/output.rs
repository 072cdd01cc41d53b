//! Output selection for the report.
//!
//! `--format json` emits the machine-readable report to stdout; the default
//! text format reproduces the classic enumeration output. `--verbose` adds
//! per-device memory topology to the text form.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use vkscope_report::{render, render_verbose, Report};

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'. Expected one of: text, json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Emit the report to stdout in the selected format.
pub fn emit_report(report: &Report, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report)?;
            writeln!(stdout, "{json}")?;
        }
        OutputFormat::Text => {
            let text = if verbose { render_verbose(report) } else { render(report) };
            write!(stdout, "{text}")?;
        }
    }
    Ok(())
}
