//! Industry membership map.

use crate::{Result, ShirazError, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable mapping from industry name to its constituent instruments.
///
/// The map is built once, before any ranking happens, and handed to the
/// industry momentum ranker at construction time. Industries iterate in name
/// order. Every industry must have at least one constituent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Vec<Symbol>>", into = "BTreeMap<String, Vec<Symbol>>")]
pub struct IndustryMembership {
    industries: BTreeMap<String, Vec<Symbol>>,
}

impl IndustryMembership {
    /// Builds a membership map from `(industry, constituents)` pairs.
    ///
    /// Duplicate constituents within an industry are collapsed, keeping the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ShirazError::InvalidData`] for an empty industry name, an
    /// industry without constituents, or an industry listed twice.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Symbol>)>,
        S: Into<String>,
    {
        let mut industries = BTreeMap::new();
        for (name, members) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(ShirazError::InvalidData("empty industry name".to_string()));
            }
            let mut unique: Vec<Symbol> = Vec::with_capacity(members.len());
            for m in members {
                if !unique.contains(&m) {
                    unique.push(m);
                }
            }
            if unique.is_empty() {
                return Err(ShirazError::InvalidData(format!(
                    "industry '{name}' has no constituents"
                )));
            }
            if industries.insert(name.clone(), unique).is_some() {
                return Err(ShirazError::InvalidData(format!(
                    "industry '{name}' listed more than once"
                )));
            }
        }
        Ok(Self { industries })
    }

    /// Constituents of `industry`, if known.
    pub fn constituents(&self, industry: &str) -> Option<&[Symbol]> {
        self.industries.get(industry).map(Vec::as_slice)
    }

    /// Whether `industry` is part of the map.
    pub fn contains(&self, industry: &str) -> bool {
        self.industries.contains_key(industry)
    }

    /// Industry names, in order.
    pub fn industries(&self) -> impl Iterator<Item = &str> {
        self.industries.keys().map(String::as_str)
    }

    /// Number of industries.
    pub fn len(&self) -> usize {
        self.industries.len()
    }

    /// Whether the map holds no industries.
    pub fn is_empty(&self) -> bool {
        self.industries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<Symbol>>> for IndustryMembership {
    type Error = ShirazError;

    fn try_from(map: BTreeMap<String, Vec<Symbol>>) -> Result<Self> {
        Self::new(map)
    }
}

impl From<IndustryMembership> for BTreeMap<String, Vec<Symbol>> {
    fn from(membership: IndustryMembership) -> Self {
        membership.industries
    }
}
