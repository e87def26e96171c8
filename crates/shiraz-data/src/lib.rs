//! Input loading for shiraz.
//!
//! Panels arrive as CSV files whose first column holds the row date and
//! whose remaining columns hold one instrument (or industry) each. Dates are
//! either already in the local solar calendar (`1400-01-15`, `1400/01/15`)
//! or Gregorian and converted on load. Industry membership maps are JSON
//! objects from industry name to constituent symbols.
//!
//! # Usage
//!
//! ```rust,ignore
//! use shiraz_data::{DateFormat, load_membership, load_panel};
//!
//! let returns = load_panel("data/returns.csv", DateFormat::Gregorian)?;
//! let membership = load_membership("data/industries.json")?;
//! ```

mod align;
pub mod calendar;
mod error;
mod loader;
mod membership;

pub use align::align_months;
pub use calendar::{gregorian_to_local, is_leap_year, local_to_gregorian, month_length};
pub use error::DataError;
pub use loader::{DateFormat, load_panel, panel_from_dataframe};
pub use membership::load_membership;

/// Result type for data loading.
pub type Result<T> = std::result::Result<T, DataError>;
