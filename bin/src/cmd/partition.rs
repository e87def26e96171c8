//! Partition command implementation.

use super::{OutputFormat, orientation, print_header, print_json};
use crate::input::{InputArgs, load_market};
use anyhow::{Context, Result};
use shiraz_traits::{Bucket, LocalDate, SignalKind};

/// Show the bucket partition of one signal at one date.
pub(crate) fn show_partition(
    signal: SignalKind,
    date: &str,
    lookback: usize,
    low: bool,
    input: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let date: LocalDate = date.parse().with_context(|| format!("parsing date '{date}'"))?;
    let (data, factory) = load_market(input, orientation(low))?;
    let t = data
        .dates()
        .binary_search(&date)
        .map_err(|_| anyhow::anyhow!("{date} is not a date of the return panel"))?;

    let ranker = factory.build(signal, lookback)?;
    let partition = ranker.rank(&data, t)?;

    if format == OutputFormat::Json {
        return print_json(&partition);
    }

    print_header("Bucket Partition");
    println!("Ranker:   {} (J={lookback})", ranker.name());
    println!("Date:     {date} (row {t})");
    println!();
    for bucket in Bucket::ALL {
        let members = partition.bucket(bucket);
        println!("{bucket}s ({}):", members.len());
        println!("  {}", members.join(", "));
    }
    println!();

    Ok(())
}
