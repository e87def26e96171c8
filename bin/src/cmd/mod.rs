//! CLI subcommand modules.
//!
//! This module contains the implementations for all shiraz CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod compose;
pub(crate) mod labels;
pub(crate) mod partition;
pub(crate) mod premiums;
pub(crate) mod rankers;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use shiraz_eval::SeasonalFilter;
use shiraz_signals::Orientation;

/// Output format of the result-producing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Seasonal filter as a command-line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SeasonalArg {
    /// Every evaluation date
    All,
    /// Dates outside the seasonal month
    Exclude,
    /// Dates inside the seasonal month
    Only,
}

impl From<SeasonalArg> for SeasonalFilter {
    fn from(arg: SeasonalArg) -> Self {
        match arg {
            SeasonalArg::All => Self::All,
            SeasonalArg::Exclude => Self::ExcludeSeasonal,
            SeasonalArg::Only => Self::SeasonalOnly,
        }
    }
}

/// Year-high orientation from the `--low` flag.
pub(crate) const fn orientation(low: bool) -> Orientation {
    if low { Orientation::Low } else { Orientation::High }
}

/// Prints a boxed section title.
pub(crate) fn print_header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Prints `value` as pretty JSON.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| anyhow::anyhow!("JSON serialization error: {e}"))?;
    println!("{json}");
    Ok(())
}
