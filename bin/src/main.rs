//! Shiraz CLI binary.
//!
//! Provides a command-line interface for the shiraz momentum research engine.

mod cmd;
mod input;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{OutputFormat, SeasonalArg};
use input::InputArgs;
use shiraz_traits::SignalKind;
use std::{path::PathBuf, process};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shiraz")]
#[command(about = "Momentum, industry momentum and 52-week high research", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available rankers
    Rankers {
        /// Show detailed information
        #[arg(short, long)]
        detailed: bool,
    },

    /// Show the winner/middle/loser partition at one date
    Partition {
        /// Signal (momentum, industry, high)
        #[arg(short, long, value_parser = parse_signal)]
        signal: SignalKind,

        /// Evaluation date (local calendar, YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Lookback J in periods
        #[arg(short = 'J', long, default_value = "6")]
        lookback: usize,

        /// Use the 52-week low variant of the proximity ranker
        #[arg(long)]
        low: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run one backtest engine
    Backtest {
        /// Signal (momentum, industry, high)
        #[arg(short, long, value_parser = parse_signal)]
        signal: SignalKind,

        /// Lookback J in periods
        #[arg(short = 'J', long, default_value = "6")]
        lookback: usize,

        /// Holding length K in periods
        #[arg(short = 'K', long, default_value = "6")]
        holding: usize,

        /// Which evaluation dates contribute returns
        #[arg(long, value_enum, default_value = "all")]
        seasonal: SeasonalArg,

        /// Use the 52-week low variant of the proximity ranker
        #[arg(long)]
        low: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run one ranker's backtest inside the buckets of another
    Compose {
        /// Outer signal; all nine compositions when omitted
        #[arg(long, value_parser = parse_signal, requires = "inner")]
        outer: Option<SignalKind>,

        /// Inner signal
        #[arg(long, value_parser = parse_signal, requires = "outer")]
        inner: Option<SignalKind>,

        /// Outer lookback J
        #[arg(long, default_value = "6")]
        outer_lookback: usize,

        /// Inner lookback J
        #[arg(long, default_value = "6")]
        inner_lookback: usize,

        /// Inner holding length K
        #[arg(long, default_value = "6")]
        inner_holding: usize,

        /// First outer evaluation index
        #[arg(long, requires = "window_end")]
        window_start: Option<usize>,

        /// One past the last outer evaluation index
        #[arg(long, requires = "window_start")]
        window_end: Option<usize>,

        /// Use the 52-week low variant of the proximity ranker
        #[arg(long)]
        low: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Estimate Fama-MacBeth premiums of the lagged labels
    Premiums {
        /// Lookback J; labels cover lags 2..=J+1
        #[arg(short = 'J', long, default_value = "6")]
        lags: usize,

        /// Extra offset applied to every label row
        #[arg(long, default_value = "0")]
        lag: usize,

        /// Drop the seasonal month before estimating
        #[arg(long)]
        exclude_seasonal: bool,

        /// Use the 52-week low variant for the FH labels
        #[arg(long)]
        low: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write the lagged winner/loser label panel as CSV
    Labels {
        /// Lookback J; labels cover lags 2..=J+1
        #[arg(short = 'J', long, default_value = "6")]
        lags: usize,

        /// Use the 52-week low variant for the FH labels
        #[arg(long)]
        low: bool,

        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_signal(raw: &str) -> std::result::Result<SignalKind, String> {
    raw.parse().map_err(|e: shiraz_traits::ShirazError| e.to_string())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Rankers { detailed } => cmd::rankers::list_rankers(detailed),
        Commands::Partition {
            signal,
            date,
            lookback,
            low,
            input,
            format,
        } => cmd::partition::show_partition(signal, &date, lookback, low, &input, format),
        Commands::Backtest {
            signal,
            lookback,
            holding,
            seasonal,
            low,
            input,
            format,
        } => cmd::backtest::run_backtest(signal, lookback, holding, seasonal, low, &input, format),
        Commands::Compose {
            outer,
            inner,
            outer_lookback,
            inner_lookback,
            inner_holding,
            window_start,
            window_end,
            low,
            input,
            format,
        } => {
            let config = shiraz_eval::ComposeConfig {
                outer_lookback,
                inner_lookback,
                inner_holding,
                window: window_start.zip(window_end),
            };
            let pair = outer.zip(inner);
            cmd::compose::run_compose(pair, &config, low, &input, format)
        }
        Commands::Premiums {
            lags,
            lag,
            exclude_seasonal,
            low,
            input,
            format,
        } => {
            let config = shiraz_eval::PremiumConfig {
                lags,
                lag,
                exclude_seasonal,
                orientation: cmd::orientation(low),
            };
            cmd::premiums::estimate_premiums(&config, &input, format)
        }
        Commands::Labels {
            lags,
            low,
            input,
            output,
        } => cmd::labels::write_labels(lags, low, &input, output.as_deref()),
    }
}
