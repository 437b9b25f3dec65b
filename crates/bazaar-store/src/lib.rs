// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! The relational-store collaborator the catalog engine reads through.

use async_trait::async_trait;
use bazaar_model::{FacetKind, Item, SortSpec};
use bazaar_query::{NameMatch, Predicate};

mod error;
mod schema;
mod sqlite;

pub use error::{StoreError, StoreErrorCode};
pub use schema::{apply_read_pragmas, apply_schema, insert_records};
pub use sqlite::{SqliteCatalogStore, SqliteStoreConfig};

pub const CRATE_NAME: &str = "bazaar-store";

/// Async catalog reads. Implementations own query execution; callers only
/// hand over predicates and sort specs.
#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    /// Rows matching `predicate`, ordered by `order_by`.
    async fn find(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<Vec<Item>, StoreError>;

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Option ids of `facet` whose name satisfies `name`.
    async fn find_relation_ids(
        &self,
        facet: FacetKind,
        name: &NameMatch,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError>;

    async fn find_item_ids(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError>;

    /// Distinct option names of `facet`, sorted ascending. `None` means
    /// catalog-wide; `Some(ids)` restricts to options linked to those items.
    async fn facet_option_names(
        &self,
        facet: FacetKind,
        item_ids: Option<&[i64]>,
    ) -> Result<Vec<String>, StoreError>;
}
