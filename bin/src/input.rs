//! Input loading shared by the subcommands.

use anyhow::{Context, Result};
use clap::Args;
use shiraz_data::{DateFormat, align_months, load_membership, load_panel};
use shiraz_signals::{LiquidityFilter, Orientation, RankerFactory, trailing_high_ratio};
use shiraz_traits::{
    MarketData, Panel,
    calendar::{compound_to_monthly, monthly_sample},
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Input files and loading options.
#[derive(Debug, Args)]
pub(crate) struct InputArgs {
    /// CSV of instrument returns (first column: date)
    #[arg(long)]
    returns: PathBuf,

    /// CSV of market capitalizations, same layout as the returns
    #[arg(long)]
    caps: PathBuf,

    /// CSV of industry returns, one column per industry
    #[arg(long)]
    industry_returns: Option<PathBuf>,

    /// JSON object mapping each industry to its constituent symbols
    #[arg(long)]
    membership: Option<PathBuf>,

    /// CSV of daily prices, used to build 52-week high proximity
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Dates in the input files are Gregorian
    #[arg(long)]
    gregorian: bool,

    /// Return files hold daily returns; compound them into monthly returns
    #[arg(long)]
    daily: bool,

    /// Liquidity percentile of windowed mean market cap
    #[arg(long, default_value = "0.1")]
    liquidity: f64,
}

impl InputArgs {
    const fn date_format(&self) -> DateFormat {
        if self.gregorian {
            DateFormat::Gregorian
        } else {
            DateFormat::Local
        }
    }

    fn load(&self, path: &Path, what: &str) -> Result<Panel> {
        load_panel(path, self.date_format())
            .with_context(|| format!("loading {what} from {}", path.display()))
    }

    fn monthly_returns(&self, path: &Path, what: &str) -> Result<Panel> {
        let panel = self.load(path, what)?;
        if self.daily {
            Ok(compound_to_monthly(&panel)?)
        } else {
            Ok(panel)
        }
    }
}

/// Loads every panel the arguments name and a matching ranker factory.
pub(crate) fn load_market(
    args: &InputArgs,
    orientation: Orientation,
) -> Result<(MarketData, RankerFactory)> {
    let returns = args.monthly_returns(&args.returns, "returns")?;
    let mut caps = args.load(&args.caps, "market caps")?;
    if args.daily {
        caps = align_months(&monthly_sample(&caps)?, returns.dates())?;
    }
    tracing::info!(
        periods = returns.n_rows(),
        instruments = returns.n_cols(),
        first = %returns.dates().first().map(ToString::to_string).unwrap_or_default(),
        "loaded returns"
    );

    let mut data = MarketData::new(returns, caps)?;

    if let Some(path) = &args.industry_returns {
        let mut industries = args.monthly_returns(path, "industry returns")?;
        if args.daily {
            industries = align_months(&industries, data.dates())?;
        }
        data = data.with_industry_returns(industries)?;
    }

    if let Some(path) = &args.prices {
        let prices = args.load(path, "prices")?;
        let ratios = monthly_sample(&trailing_high_ratio(&prices)?)?;
        let keep: Vec<usize> = (0..ratios.n_rows().saturating_sub(1)).collect();
        let ratios = align_months(&ratios.select_rows(&keep)?, data.dates())?;
        let ratios = ratios.select_columns(data.symbols())?;
        data = data.with_proximity(ratios)?;
    }

    let mut factory = RankerFactory::new()
        .with_orientation(orientation)
        .with_liquidity(LiquidityFilter::new(args.liquidity));
    if let Some(path) = &args.membership {
        let membership = load_membership(path)
            .with_context(|| format!("loading membership from {}", path.display()))?;
        factory = factory.with_membership(Arc::new(membership));
    }

    Ok((data, factory))
}
