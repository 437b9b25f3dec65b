// SPDX-License-Identifier: Apache-2.0

//! Per-facet reachable options given the current selection and search.

use bazaar_model::{FacetKind, FilterSelection, SortSpec};
use bazaar_query::{filter_predicate, Predicate};
use bazaar_store::{CatalogStore, StoreError};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FacetAvailability {
    /// Facet -> reachable option names, sorted ascending.
    pub facets: BTreeMap<FacetKind, Vec<String>>,
    /// Facets whose candidate scan hit the cap; their lists may be incomplete.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub approximate_facets: BTreeSet<FacetKind>,
}

impl FacetAvailability {
    #[must_use]
    pub fn options(&self, facet: FacetKind) -> &[String] {
        self.facets.get(&facet).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn is_approximate(&self) -> bool {
        !self.approximate_facets.is_empty()
    }
}

struct FacetOptions {
    facet: FacetKind,
    names: Vec<String>,
    approximate: bool,
}

/// `search` is the already-built search predicate; `has_search` says whether
/// any search text was supplied.
pub(crate) async fn compute_availability(
    store: &dyn CatalogStore,
    selection: &FilterSelection,
    search: &Predicate,
    has_search: bool,
    scan_cap: usize,
) -> Result<FacetAvailability, StoreError> {
    let per_facet = FacetKind::ALL
        .into_iter()
        .map(|facet| facet_options(store, facet, selection, search, has_search, scan_cap));
    let results = try_join_all(per_facet).await?;

    let mut out = FacetAvailability::default();
    for result in results {
        if result.approximate {
            out.approximate_facets.insert(result.facet);
        }
        out.facets.insert(result.facet, result.names);
    }
    Ok(out)
}

async fn facet_options(
    store: &dyn CatalogStore,
    facet: FacetKind,
    selection: &FilterSelection,
    search: &Predicate,
    has_search: bool,
    scan_cap: usize,
) -> Result<FacetOptions, StoreError> {
    let selected = selection.values(facet);
    if selection.is_empty() && !has_search && selected.is_none() {
        let names = store.facet_option_names(facet, None).await?;
        return Ok(FacetOptions {
            facet,
            names,
            approximate: false,
        });
    }

    // An unselected facet is scoped by the other facets only.
    let scoped = if selected.is_some() {
        selection.clone()
    } else {
        selection.without(facet)
    };
    let candidates = Predicate::and([filter_predicate(&scoped), search.clone()]);
    let mut ids = store
        .find_item_ids(&candidates, &SortSpec::new(Vec::new()), scan_cap.saturating_add(1))
        .await?;
    let approximate = ids.len() > scan_cap;
    if approximate {
        ids.truncate(scan_cap);
        warn!(facet = facet.as_str(), scan_cap, "availability candidate scan hit cap");
    }

    let mut names = store.facet_option_names(facet, Some(ids.as_slice())).await?;
    if let Some(selected) = selected {
        names.retain(|name| !selected.contains(name));
    }
    Ok(FacetOptions {
        facet,
        names,
        approximate,
    })
}
