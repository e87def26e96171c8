//! Industry membership files.

use crate::Result;
use shiraz_traits::IndustryMembership;
use std::{fs, path::Path};

/// Loads an industry membership map from a JSON object of
/// `"industry": ["SYMBOL", ...]` entries.
///
/// # Errors
///
/// Fails if the file cannot be read, is not such an object, or names an
/// industry without constituents.
pub fn load_membership(path: impl AsRef<Path>) -> Result<IndustryMembership> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let membership: IndustryMembership = serde_json::from_str(&raw)?;
    tracing::debug!(path = %path.display(), industries = membership.len(), "loaded membership");
    Ok(membership)
}
