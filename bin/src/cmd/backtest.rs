//! Backtest command implementation.

use super::{OutputFormat, SeasonalArg, orientation, print_header, print_json};
use crate::input::{InputArgs, load_market};
use anyhow::Result;
use shiraz_eval::Backtest;
use shiraz_traits::SignalKind;

/// Run one engine and print its winner, loser and spread returns.
pub(crate) fn run_backtest(
    signal: SignalKind,
    lookback: usize,
    holding: usize,
    seasonal: SeasonalArg,
    low: bool,
    input: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let (data, factory) = load_market(input, orientation(low))?;
    let backtest = Backtest::for_ranker(factory.build(signal, lookback)?, holding, seasonal.into());
    let result = backtest.run(&data)?;

    if format == OutputFormat::Json {
        return print_json(&result);
    }

    print_header("Backtesting");
    println!("Strategy: {}", result.strategy);
    println!("Periods:  {}", result.n_periods);
    println!();

    let [winner, loser, spread] = result.display_row();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{:>12} {:>12} {:>24}", "Winner", "Loser", "Winner - Loser");
    println!("{winner:>12} {loser:>12} {spread:>24}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    Ok(())
}
