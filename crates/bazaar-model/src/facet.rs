// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The fixed set of many-to-many option dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FacetKind {
    #[serde(rename = "genres")]
    Genre,
    #[serde(rename = "categories")]
    Category,
    #[serde(rename = "platforms")]
    Platform,
    #[serde(rename = "publishers")]
    Publisher,
    #[serde(rename = "tags")]
    Tag,
}

impl FacetKind {
    pub const ALL: [Self; 5] = [
        Self::Genre,
        Self::Category,
        Self::Platform,
        Self::Publisher,
        Self::Tag,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Genre => "genres",
            Self::Category => "categories",
            Self::Platform => "platforms",
            Self::Publisher => "publishers",
            Self::Tag => "tags",
        }
    }

    /// Accepts plural or singular names, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "genres" | "genre" => Some(Self::Genre),
            "categories" | "category" => Some(Self::Category),
            "platforms" | "platform" => Some(Self::Platform),
            "publishers" | "publisher" => Some(Self::Publisher),
            "tags" | "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    #[must_use]
    pub const fn option_table(self) -> &'static str {
        self.as_str()
    }

    #[must_use]
    pub const fn link_table(self) -> &'static str {
        match self {
            Self::Genre => "item_genres",
            Self::Category => "item_categories",
            Self::Platform => "item_platforms",
            Self::Publisher => "item_publishers",
            Self::Tag => "item_tags",
        }
    }
}

/// Selected option names per facet. An item matches when it links to every
/// selected name of every facet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSelection {
    selected: BTreeMap<FacetKind, BTreeSet<String>>,
}

impl FilterSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one selected value. Blank values are ignored.
    pub fn select(&mut self, facet: FacetKind, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.selected.entry(facet).or_default().insert(value);
        }
        self
    }

    #[must_use]
    pub fn with(mut self, facet: FacetKind, values: &[&str]) -> Self {
        for value in values {
            self.select(facet, *value);
        }
        self
    }

    #[must_use]
    pub fn values(&self, facet: FacetKind) -> Option<&BTreeSet<String>> {
        self.selected.get(&facet).filter(|set| !set.is_empty())
    }

    #[must_use]
    pub fn has_selection(&self, facet: FacetKind) -> bool {
        self.values(facet).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.values().all(BTreeSet::is_empty)
    }

    #[must_use]
    pub fn without(&self, facet: FacetKind) -> Self {
        let mut out = self.clone();
        out.selected.remove(&facet);
        out
    }

    /// Facets with at least one selected value, in facet order.
    pub fn iter(&self) -> impl Iterator<Item = (FacetKind, &BTreeSet<String>)> {
        self.selected
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(facet, set)| (*facet, set))
    }
}
