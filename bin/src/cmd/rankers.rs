//! Ranker listing command implementation.

use super::print_header;
use anyhow::Result;
use shiraz_signals::registry::{RequiredPanel, available_rankers};

/// List the available rankers.
pub(crate) fn list_rankers(detailed: bool) -> Result<()> {
    print_header("Available Rankers");

    for info in available_rankers() {
        if detailed {
            let requires: Vec<&str> = info
                .requires
                .iter()
                .map(|panel| match panel {
                    RequiredPanel::MarketCap => "market caps",
                    RequiredPanel::IndustryReturns => "industry returns + membership",
                    RequiredPanel::Proximity => "daily prices",
                })
                .collect();
            println!("  {:20} [{}] {}", info.name, info.kind.code(), info.description);
            println!(
                "  {:20} lookback: {}, re-ranks per offset: {}, needs: {}",
                "",
                info.typical_lookback,
                info.reranks_per_offset,
                requires.join(", ")
            );
        } else {
            println!("  {:20} [{}]", info.name, info.kind.code());
        }
    }
    println!();

    if !detailed {
        println!("Use --detailed for descriptions and input requirements.\n");
    }

    println!("Signal aliases:");
    println!("  momentum, mom, jt, j          -> momentum");
    println!("  industry, mg, m               -> industry_momentum");
    println!("  high, year-high, 52w, ft, fh  -> year_high");
    println!();

    Ok(())
}
