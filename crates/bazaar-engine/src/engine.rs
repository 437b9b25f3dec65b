// SPDX-License-Identifier: Apache-2.0

use crate::availability::{compute_availability, FacetAvailability};
use crate::boost::resolve_boost;
use crate::cache::TtlCache;
use crate::config::{validate_engine_config, EngineConfig};
use crate::connection::{assemble_offset_page, assemble_page, Connection, OffsetPage};
use crate::error::EngineError;
use bazaar_core::canonical::cache_key;
use bazaar_model::{sort_plan_for, Direction, FilterSelection, Item, SortSpec};
use bazaar_query::{
    boost_term, bounded_search_text, filter_predicate, search_predicate, CursorCodec, Predicate,
    QueryLimits, SearchBoost,
};
use bazaar_store::CatalogStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument};

/// User-facing browse parameters shared by every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub filter: FilterSelection,
    #[serde(default)]
    pub search: Option<String>,
    /// Symbolic sort key; unknown or missing keys sort by popularity.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl CatalogQuery {
    #[must_use]
    pub fn sort_spec(&self) -> SortSpec {
        sort_plan_for(self.sort.as_deref(), self.direction)
    }
}

#[derive(Serialize)]
struct PredicateKey<'a> {
    filter: &'a FilterSelection,
    search: &'a str,
}

/// Catalog browsing facade. Construct once and share; all caches live here
/// and are dropped with the engine.
pub struct CatalogEngine {
    store: Arc<dyn CatalogStore>,
    config: EngineConfig,
    limits: QueryLimits,
    codec: CursorCodec,
    counts: TtlCache<u64>,
    availability: TtlCache<FacetAvailability>,
    boosts: TtlCache<SearchBoost>,
}

impl std::fmt::Debug for CatalogEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEngine")
            .field("backend", &self.store.backend_tag())
            .field("config", &self.config)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl CatalogEngine {
    pub fn new(store: Arc<dyn CatalogStore>, config: EngineConfig) -> Result<Self, EngineError> {
        validate_engine_config(&config).map_err(EngineError::Config)?;
        let codec = match config.cursor_secret.as_deref() {
            Some(secret) => CursorCodec::signed(secret.as_bytes().to_vec()),
            None => CursorCodec::unsigned(),
        };
        let ttl = config.cache_ttl;
        let capacity = config.cache_capacity;
        Ok(Self {
            store,
            limits: config.limits(),
            codec,
            counts: TtlCache::new(ttl, capacity),
            availability: TtlCache::new(ttl, capacity),
            boosts: TtlCache::new(ttl, capacity),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn limits(&self) -> &QueryLimits {
        &self.limits
    }

    /// One keyset page of at most `first` items (clamped) strictly after
    /// `after`.
    pub async fn page(
        &self,
        query: &CatalogQuery,
        first: Option<usize>,
        after: Option<&str>,
    ) -> Result<Connection<Item>, EngineError> {
        let spec = query.sort_spec();
        let page_size = self.limits.clamp_page_size(first);
        let span = info_span!("catalog_page", backend = self.store.backend_tag(), page_size);
        async {
            let search = self.search_text(query);
            let base = self.base_predicate(&query.filter, &search).await?;
            assemble_page(self.store.as_ref(), &self.codec, base, &spec, after, page_size).await
        }
        .instrument(span)
        .await
    }

    /// [`Self::page`] plus the unpaginated total, fetched concurrently.
    pub async fn page_with_total(
        &self,
        query: &CatalogQuery,
        first: Option<usize>,
        after: Option<&str>,
    ) -> Result<Connection<Item>, EngineError> {
        let (mut connection, total) =
            tokio::try_join!(self.page(query, first, after), self.count(query))?;
        connection.total_count = Some(total);
        Ok(connection)
    }

    /// Matching items ignoring pagination. Memoized per filter and search.
    pub async fn count(&self, query: &CatalogQuery) -> Result<u64, EngineError> {
        let search = self.search_text(query);
        let key = self.key("count", &query.filter, &search)?;
        if let Some(hit) = self.counts.get(&key) {
            debug!(cache = "count", "cache hit");
            return Ok(hit);
        }
        debug!(cache = "count", "cache miss");
        let predicate = self.base_predicate(&query.filter, &search).await?;
        let total = self.store.count(&predicate).await?;
        self.counts.insert(key, total);
        Ok(total)
    }

    /// Zero-based offset paging over the same predicate and order. Negative
    /// pages read as page 0.
    pub async fn offset_page(
        &self,
        query: &CatalogQuery,
        page: i64,
        page_size: Option<usize>,
    ) -> Result<OffsetPage<Item>, EngineError> {
        let spec = query.sort_spec();
        let page_size = self.limits.clamp_page_size(page_size);
        let skip = self.limits.offset_for(page, page_size);
        let search = self.search_text(query);
        let predicate = self.base_predicate(&query.filter, &search).await?;
        assemble_offset_page(self.store.as_ref(), &predicate, &spec, page, page_size, skip).await
    }

    /// Reachable options per facet. Sort fields of `query` are ignored.
    pub async fn availability(&self, query: &CatalogQuery) -> Result<FacetAvailability, EngineError> {
        let search = self.search_text(query);
        let key = self.key("availability", &query.filter, &search)?;
        if let Some(hit) = self.availability.get(&key) {
            debug!(cache = "availability", "cache hit");
            return Ok(hit);
        }
        debug!(cache = "availability", "cache miss");
        let span = info_span!("catalog_availability", backend = self.store.backend_tag());
        let result = async {
            let search_pred = self.search_predicate(&search).await?;
            compute_availability(
                self.store.as_ref(),
                &query.filter,
                &search_pred,
                !search.is_empty(),
                self.limits.availability_scan_cap,
            )
            .await
            .map_err(EngineError::from)
        }
        .instrument(span)
        .await?;
        self.availability.insert(key, result.clone());
        Ok(result)
    }

    /// Drops every memoized entry. The engine stays usable.
    pub fn shutdown(&self) {
        let dropped = self.counts.len() + self.availability.len() + self.boosts.len();
        self.counts.clear();
        self.availability.clear();
        self.boosts.clear();
        info!(dropped, "catalog engine caches cleared");
    }

    fn search_text(&self, query: &CatalogQuery) -> String {
        bounded_search_text(
            query.search.as_deref().unwrap_or_default(),
            self.limits.max_search_chars,
        )
    }

    fn key(&self, namespace: &str, filter: &FilterSelection, search: &str) -> Result<String, EngineError> {
        cache_key(namespace, &PredicateKey { filter, search })
            .map_err(|e| EngineError::Internal(format!("cache key: {e}")))
    }

    async fn base_predicate(
        &self,
        filter: &FilterSelection,
        search: &str,
    ) -> Result<Predicate, EngineError> {
        let search = self.search_predicate(search).await?;
        Ok(Predicate::and([filter_predicate(filter), search]))
    }

    async fn search_predicate(&self, search: &str) -> Result<Predicate, EngineError> {
        let boost = match boost_term(search).filter(|_| self.config.search_boost_enabled) {
            Some(term) => Some(self.boost_for(&term).await?),
            None => None,
        };
        Ok(search_predicate(search, boost.as_ref()))
    }

    async fn boost_for(&self, term: &str) -> Result<SearchBoost, EngineError> {
        let key = cache_key("boost", &term)
            .map_err(|e| EngineError::Internal(format!("cache key: {e}")))?;
        if let Some(hit) = self.boosts.get(&key) {
            return Ok(hit);
        }
        let boost = resolve_boost(self.store.as_ref(), term, self.limits.boost_lookup_limit).await?;
        self.boosts.insert(key, boost.clone());
        Ok(boost)
    }
}
