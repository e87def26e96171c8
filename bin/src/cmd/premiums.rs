//! Premium estimation command implementation.

use super::{OutputFormat, print_header, print_json};
use crate::input::{InputArgs, load_market};
use anyhow::Result;
use shiraz_eval::{FamaMacBeth, PremiumConfig};

/// Estimate and print the Fama-MacBeth premium table.
pub(crate) fn estimate_premiums(
    config: &PremiumConfig,
    input: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let (data, factory) = load_market(input, config.orientation)?;
    let table = FamaMacBeth::new(config.clone()).estimate(&data, &factory)?;

    if format == OutputFormat::Json {
        return print_json(&table);
    }

    print_header("Fama-MacBeth Premiums");
    println!("{}", table.label);
    println!("{}", "-".repeat(48));
    println!("{:12} {:>24} {:>8}", "Regressor", "Premium", "Dates");
    for premium in &table.premiums {
        println!(
            "{:12} {:>24} {:>8}",
            premium.regressor,
            premium.premium.percent_with_stat(),
            premium.n_dates
        );
    }
    println!();

    let diagnostics = &table.diagnostics;
    println!(
        "Instruments fitted: {} (skipped {})",
        diagnostics.instruments_fitted,
        diagnostics.instruments_skipped.len()
    );
    println!(
        "Dates fitted:       {} (skipped {})",
        diagnostics.dates_fitted,
        diagnostics.dates_skipped.len()
    );
    for (symbol, columns) in &diagnostics.rank_deficient {
        println!("  {symbol}: unidentified {}", columns.join(", "));
    }
    println!();

    Ok(())
}
