// SPDX-License-Identifier: Apache-2.0

use crate::error::{StoreError, StoreErrorCode};
use crate::schema::{apply_read_pragmas, apply_schema, insert_records};
use crate::CatalogStore;
use async_trait::async_trait;
use bazaar_model::{FacetKind, Item, ItemRecord, SortSpec};
use bazaar_query::db::{
    count_items_sql, option_names_sql, query_items, relation_ids_sql, select_item_ids_sql,
    select_items_sql, SqlFragment,
};
use bazaar_query::{NameMatch, Predicate};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Item ids bound per statement when resolving option names.
const ID_CHUNK: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteStoreConfig {
    pub cache_kib: i64,
    pub statement_cache_capacity: usize,
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            cache_kib: 16 * 1024,
            statement_cache_capacity: 64,
        }
    }
}

/// One SQLite connection behind a mutex; every call runs on the blocking
/// pool.
#[derive(Clone)]
pub struct SqliteCatalogStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteCatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCatalogStore").finish_non_exhaustive()
    }
}

impl SqliteCatalogStore {
    /// Opens (creating if needed) a catalog file and ensures the schema.
    pub fn open(path: &Path, cfg: &SqliteStoreConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        apply_schema(&conn)?;
        Self::from_connection(conn, cfg)
    }

    pub fn open_readonly(path: &Path, cfg: &SqliteStoreConfig) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::new(
                StoreErrorCode::Io,
                format!("catalog database not found: {}", path.display()),
            ));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Self::from_connection(conn, cfg)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Self::from_connection(conn, &SqliteStoreConfig::default())
    }

    fn from_connection(conn: Connection, cfg: &SqliteStoreConfig) -> Result<Self, StoreError> {
        conn.set_prepared_statement_cache_capacity(cfg.statement_cache_capacity);
        apply_read_pragmas(&conn, cfg.cache_kib)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn import(&self, records: Vec<ItemRecord>) -> Result<usize, StoreError> {
        self.with_conn(move |conn| insert_records(conn, &records)).await
    }

    pub async fn explain(
        &self,
        predicate: Predicate,
        order_by: SortSpec,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.with_conn(move |conn| {
            bazaar_query::db::explain_query_plan(conn, &predicate, &order_by, limit)
                .map_err(|e| StoreError::new(StoreErrorCode::Sql, e))
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::new(StoreErrorCode::Internal, "connection lock poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::new(StoreErrorCode::Internal, e.to_string()))?
    }
}

fn query_i64s(conn: &Connection, fragment: &SqlFragment) -> Result<Vec<i64>, StoreError> {
    let mut stmt = conn.prepare_cached(&fragment.sql)?;
    let rows = stmt
        .query_map(params_from_iter(fragment.params.iter()), |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_strings(conn: &Connection, fragment: &SqlFragment) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare_cached(&fragment.sql)?;
    let rows = stmt
        .query_map(params_from_iter(fragment.params.iter()), |row| {
            row.get::<_, String>(0)
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn find(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
        offset: Option<usize>,
    ) -> Result<Vec<Item>, StoreError> {
        let fragment = select_items_sql(predicate, order_by, limit, offset);
        debug!(sql = %fragment.sql, params = fragment.params.len(), "find items");
        self.with_conn(move |conn| {
            query_items(conn, &fragment).map_err(|e| StoreError::new(StoreErrorCode::Decode, e))
        })
        .await
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let fragment = count_items_sql(predicate);
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(&fragment.sql)?;
            let n = stmt.query_row(params_from_iter(fragment.params.iter()), |row| {
                row.get::<_, i64>(0)
            })?;
            u64::try_from(n).map_err(|e| StoreError::new(StoreErrorCode::Decode, e.to_string()))
        })
        .await
    }

    async fn find_relation_ids(
        &self,
        facet: FacetKind,
        name: &NameMatch,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        let fragment = relation_ids_sql(facet, name, limit);
        self.with_conn(move |conn| query_i64s(conn, &fragment)).await
    }

    async fn find_item_ids(
        &self,
        predicate: &Predicate,
        order_by: &SortSpec,
        limit: usize,
    ) -> Result<Vec<i64>, StoreError> {
        let fragment = select_item_ids_sql(predicate, order_by, limit);
        self.with_conn(move |conn| query_i64s(conn, &fragment)).await
    }

    async fn facet_option_names(
        &self,
        facet: FacetKind,
        item_ids: Option<&[i64]>,
    ) -> Result<Vec<String>, StoreError> {
        let fragments: Vec<SqlFragment> = match item_ids {
            None => vec![option_names_sql(facet, None)],
            Some([]) => return Ok(Vec::new()),
            Some(ids) => ids
                .chunks(ID_CHUNK)
                .map(|chunk| option_names_sql(facet, Some(chunk)))
                .collect(),
        };
        self.with_conn(move |conn| {
            let mut names = BTreeSet::new();
            for fragment in &fragments {
                names.extend(query_strings(conn, fragment)?);
            }
            Ok(names.into_iter().collect())
        })
        .await
    }
}
