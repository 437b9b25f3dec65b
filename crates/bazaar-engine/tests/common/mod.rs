// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use async_trait::async_trait;
use bazaar_engine::{CatalogEngine, EngineConfig};
use bazaar_model::{FacetKind, Item, ItemRecord, SortSpec};
use bazaar_query::{NameMatch, Predicate};
use bazaar_store::{CatalogStore, SqliteCatalogStore, StoreError, StoreErrorCode};
use chrono::NaiveDate;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn item(id: i64, name: &str, popularity: f64) -> Item {
    Item {
        id,
        name: name.to_string(),
        published_date: NaiveDate::from_ymd_opt(2020, 1 + (id % 12) as u32, 1),
        avg_rating: Some(1.0 + (id % 4) as f64),
        has_ratings: true,
        popularity_score: Some(popularity),
    }
}

pub async fn store_with(records: Vec<ItemRecord>) -> SqliteCatalogStore {
    let store = SqliteCatalogStore::open_in_memory().expect("store");
    store.import(records).await.expect("import");
    store
}

pub fn engine_over(store: impl CatalogStore, config: EngineConfig) -> CatalogEngine {
    CatalogEngine::new(Arc::new(store), config).expect("engine")
}

/// 11 items tagged Cute + Agriculture, plus items carrying only one of the
/// two tags and one untagged item.
pub fn farming_catalog() -> Vec<ItemRecord> {
    let mut records: Vec<ItemRecord> = (1..=11)
        .map(|id| {
            ItemRecord::new(item(id, &format!("Farm {id:02}"), (id % 3) as f64))
                .with(FacetKind::Tag, &["Cute", "Agriculture"])
                .with(FacetKind::Genre, &["Simulation"])
                .with(FacetKind::Platform, &["PC"])
        })
        .collect();
    records.push(
        ItemRecord::new(item(20, "Kitten Café", 7.0))
            .with(FacetKind::Tag, &["Cute", "Cozy"])
            .with(FacetKind::Genre, &["Casual"])
            .with(FacetKind::Publisher, &["Purrfect Games"]),
    );
    records.push(
        ItemRecord::new(item(21, "Tractor Pro", 4.0))
            .with(FacetKind::Tag, &["Agriculture", "Realistic"])
            .with(FacetKind::Genre, &["Simulation"])
            .with(FacetKind::Platform, &["Console"]),
    );
    records.push(ItemRecord::new(item(22, "Untagged", 1.0)));
    records
}

/// Every call fails with the same SQL error.
pub struct FailingStore;

pub fn store_failure() -> StoreError {
    StoreError::new(StoreErrorCode::Sql, "database is locked")
}

#[async_trait]
impl CatalogStore for FailingStore {
    async fn find(
        &self,
        _predicate: &Predicate,
        _order_by: &SortSpec,
        _limit: usize,
        _offset: Option<usize>,
    ) -> Result<Vec<Item>, StoreError> {
        Err(store_failure())
    }

    async fn count(&self, _predicate: &Predicate) -> Result<u64, StoreError> {
        Err(store_failure())
    }

    async fn find_relation_ids(
        &self,
        _facet: FacetKind,
        _name: &NameMatch,
        _limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        Err(store_failure())
    }

    async fn find_item_ids(
        &self,
        _predicate: &Predicate,
        _order_by: &SortSpec,
        _limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        Err(store_failure())
    }

    async fn facet_option_names(
        &self,
        _facet: FacetKind,
        _item_ids: Option<&[i64]>,
    ) -> Result<Vec<String>, StoreError> {
        Err(store_failure())
    }
}

/// Delegates to an inner store and counts calls.
pub struct CountingStore<S> {
    pub inner: S,
    pub calls: Arc<AtomicUsize>,
    pub relation_lookups: Arc<AtomicUsize>,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
            relation_lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: CatalogStore> CatalogStore for CountingStore<S> {
    fn backend_tag(&self) -> &'static str {
        "counting"
    }

    async fn find(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<Vec<Item>, StoreError> {
        self.hit();
        self.inner.find(predicate, order_by, limit, offset).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        self.hit();
        self.inner.count(predicate).await
    }

    async fn find_relation_ids(
        &self,
        facet: FacetKind,
        name: &NameMatch,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        self.hit();
        self.relation_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_relation_ids(facet, name, limit).await
    }

    async fn find_item_ids(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        self.hit();
        self.inner.find_item_ids(predicate, order_by, limit).await
    }

    async fn facet_option_names(
        &self,
        facet: FacetKind,
        item_ids: Option<&[i64]>,
    ) -> Result<Vec<String>, StoreError> {
        self.hit();
        self.inner.facet_option_names(facet, item_ids).await
    }
}
