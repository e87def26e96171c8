//! Label panel command implementation.

use super::orientation;
use crate::input::{InputArgs, load_market};
use anyhow::Result;
use polars::prelude::*;
use shiraz_eval::{LabelBuilder, LabelSpec};
use std::{fs::File, io, path::Path};

/// Build the label panel for every instrument and row and write it as CSV.
pub(crate) fn write_labels(
    lags: usize,
    low: bool,
    input: &InputArgs,
    output: Option<&Path>,
) -> Result<()> {
    let (data, factory) = load_market(input, orientation(low))?;
    let mut builder = LabelBuilder::new(&data, &factory, LabelSpec::new(lags))?;
    let rows: Vec<usize> = (0..data.n_periods()).collect();
    let panel = builder.panel(data.symbols(), &rows)?;
    tracing::info!(rows = panel.len(), columns = panel.columns().len(), "built labels");

    let mut df = panel.to_dataframe()?;
    match output {
        Some(path) => CsvWriter::new(File::create(path)?).finish(&mut df)?,
        None => CsvWriter::new(io::stdout().lock()).finish(&mut df)?,
    }
    Ok(())
}
