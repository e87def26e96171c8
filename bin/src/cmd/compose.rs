//! Composition command implementation.

use super::{OutputFormat, orientation, print_header, print_json};
use crate::input::{InputArgs, load_market};
use anyhow::Result;
use shiraz_eval::{ComposeConfig, CompositionGrid, compose_all, compose_signals};
use shiraz_traits::SignalKind;

/// Run one composition, or all nine when `pair` is `None`.
pub(crate) fn run_compose(
    pair: Option<(SignalKind, SignalKind)>,
    config: &ComposeConfig,
    low: bool,
    input: &InputArgs,
    format: OutputFormat,
) -> Result<()> {
    let (data, factory) = load_market(input, orientation(low))?;
    let grids = match pair {
        Some((outer, inner)) => vec![compose_signals(&factory, outer, inner, &data, config)?],
        None => compose_all(&factory, &data, config)?,
    };

    if format == OutputFormat::Json {
        return print_json(&grids);
    }

    print_header("Strategy Composition");
    for grid in &grids {
        print_grid(grid);
    }
    Ok(())
}

fn print_grid(grid: &CompositionGrid) {
    println!("{} (outer {}, inner {})", grid.title(), grid.outer, grid.inner);
    println!("{}", "-".repeat(72));
    println!(
        "{:8} {:16} {:>22} {:>22}",
        "Bucket", "Inner", "Average", "Excl. seasonal month"
    );
    for row in &grid.rows {
        let show = |m: &shiraz_eval::MeanStat| {
            if m.stat.is_nan() { m.percent() } else { m.percent_with_stat() }
        };
        println!(
            "{:8} {:16} {:>22} {:>22}",
            row.outer_bucket.label(),
            row.metric.label(),
            show(&row.all),
            show(&row.excluding_seasonal)
        );
    }
    println!();
}
