// SPDX-License-Identifier: Apache-2.0

use bazaar_model::FacetKind;
use bazaar_query::{NameMatch, SearchBoost};
use bazaar_store::{CatalogStore, StoreError};

/// Publisher and tag ids whose names start with `term`, looked up
/// concurrently and bounded by `limit` each.
pub(crate) async fn resolve_boost(
    store: &dyn CatalogStore,
    term: &str,
    limit: usize,
) -> Result<SearchBoost, StoreError> {
    let prefix = NameMatch::Prefix(term.to_string());
    let (publisher_ids, tag_ids) = tokio::try_join!(
        store.find_relation_ids(FacetKind::Publisher, &prefix, limit),
        store.find_relation_ids(FacetKind::Tag, &prefix, limit),
    )?;
    Ok(SearchBoost {
        publisher_ids,
        tag_ids,
    })
}
