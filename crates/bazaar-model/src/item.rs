// SPDX-License-Identifier: Apache-2.0

use crate::facet::FacetKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

pub const NAME_MAX_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    InvalidId(i64),
    EmptyName,
    NameTooLong(usize),
    EmptyOptionName(FacetKind),
    InconsistentRatings,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "item id must be positive, got {id}"),
            Self::EmptyName => f.write_str("item name must not be empty"),
            Self::NameTooLong(max) => write!(f, "item name exceeds max length {max}"),
            Self::EmptyOptionName(facet) => {
                write!(f, "{} option names must not be empty", facet.as_str())
            }
            Self::InconsistentRatings => {
                f.write_str("avg_rating must be absent when has_ratings is false")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A catalog row. `id` is unique and serves as the final tiebreaker of
/// every sort order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub avg_rating: Option<f64>,
    #[serde(default)]
    pub has_ratings: bool,
    #[serde(default)]
    pub popularity_score: Option<f64>,
}

/// An item together with the option names it links to, per facet.
/// Import unit for stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(flatten)]
    pub item: Item,
    #[serde(default)]
    pub facets: BTreeMap<FacetKind, Vec<String>>,
}

impl ItemRecord {
    #[must_use]
    pub fn new(item: Item) -> Self {
        Self {
            item,
            facets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, facet: FacetKind, names: &[&str]) -> Self {
        self.facets
            .entry(facet)
            .or_default()
            .extend(names.iter().map(|n| (*n).to_string()));
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.item.id <= 0 {
            return Err(ValidationError::InvalidId(self.item.id));
        }
        if self.item.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.item.name.len() > NAME_MAX_LEN {
            return Err(ValidationError::NameTooLong(NAME_MAX_LEN));
        }
        if !self.item.has_ratings && self.item.avg_rating.is_some() {
            return Err(ValidationError::InconsistentRatings);
        }
        for (facet, names) in &self.facets {
            if names.iter().any(|n| n.trim().is_empty()) {
                return Err(ValidationError::EmptyOptionName(*facet));
            }
        }
        Ok(())
    }
}
