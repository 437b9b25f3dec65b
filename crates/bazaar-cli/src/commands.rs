// SPDX-License-Identifier: Apache-2.0

use crate::{Cli, Commands, DirectionArg, QueryArgs};
use bazaar_core::MachineError;
use bazaar_engine::{CatalogEngine, CatalogQuery, EngineConfig, EngineError};
use bazaar_model::{Direction, FacetKind, FilterSelection, ItemRecord};
use bazaar_query::{bounded_search_text, filter_predicate, search_predicate, Predicate};
use bazaar_store::{SqliteCatalogStore, SqliteStoreConfig, StoreError, StoreErrorCode};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(cli: Cli) -> Result<(), MachineError> {
    let pretty = cli.pretty;
    let out = match cli.command {
        Commands::Import { items } => import(&cli.db, &items).await?,
        Commands::Page {
            query,
            first,
            after,
            total,
        } => {
            let engine = open_engine(&cli.db)?;
            let query = catalog_query(&query)?;
            let page = if total {
                engine.page_with_total(&query, first, after.as_deref()).await
            } else {
                engine.page(&query, first, after.as_deref()).await
            };
            to_value(&page.map_err(engine_error)?)?
        }
        Commands::Count { query } => {
            let engine = open_engine(&cli.db)?;
            let total = engine
                .count(&catalog_query(&query)?)
                .await
                .map_err(engine_error)?;
            json!({ "count": total })
        }
        Commands::OffsetPage {
            query,
            page,
            page_size,
        } => {
            let engine = open_engine(&cli.db)?;
            let result = engine
                .offset_page(&catalog_query(&query)?, page, page_size)
                .await
                .map_err(engine_error)?;
            to_value(&result)?
        }
        Commands::Facets { query } => {
            let engine = open_engine(&cli.db)?;
            let result = engine
                .availability(&catalog_query(&query)?)
                .await
                .map_err(engine_error)?;
            to_value(&result)?
        }
        Commands::Explain { query, first } => explain(&cli.db, &query, first).await?,
    };
    print_json(&out, pretty)
}

async fn import(db: &Path, items: &Path) -> Result<serde_json::Value, MachineError> {
    let raw = std::fs::read_to_string(items)
        .map_err(|e| MachineError::usage(format!("read {}: {e}", items.display())))?;
    let records: Vec<ItemRecord> = serde_json::from_str(&raw)
        .map_err(|e| MachineError::validation(format!("parse {}: {e}", items.display())))?;
    let store = SqliteCatalogStore::open(db, &SqliteStoreConfig::default()).map_err(store_error)?;
    let imported = store.import(records).await.map_err(store_error)?;
    info!(imported, db = %db.display(), "catalog import finished");
    Ok(json!({ "imported": imported, "db": db.display().to_string() }))
}

async fn explain(
    db: &Path,
    args: &QueryArgs,
    first: Option<usize>,
) -> Result<serde_json::Value, MachineError> {
    let config = EngineConfig::from_env();
    let limits = config.limits();
    let query = catalog_query(args)?;
    let search = bounded_search_text(query.search.as_deref().unwrap_or_default(), limits.max_search_chars);
    let predicate = Predicate::and([filter_predicate(&query.filter), search_predicate(&search, None)]);
    let store =
        SqliteCatalogStore::open_readonly(db, &SqliteStoreConfig::default()).map_err(store_error)?;
    let lines = store
        .explain(predicate, query.sort_spec(), limits.clamp_page_size(first).saturating_add(1))
        .await
        .map_err(store_error)?;
    Ok(json!({ "plan": lines }))
}

fn open_engine(db: &Path) -> Result<CatalogEngine, MachineError> {
    let store =
        SqliteCatalogStore::open_readonly(db, &SqliteStoreConfig::default()).map_err(store_error)?;
    CatalogEngine::new(Arc::new(store), EngineConfig::from_env()).map_err(engine_error)
}

fn catalog_query(args: &QueryArgs) -> Result<CatalogQuery, MachineError> {
    let mut filter = FilterSelection::new();
    for raw in &args.filters {
        let (facet, value) = raw
            .split_once('=')
            .ok_or_else(|| MachineError::usage(format!("filter must be facet=value: {raw}")))?;
        let facet = FacetKind::parse(facet)
            .ok_or_else(|| MachineError::usage(format!("unknown facet: {facet}")))?;
        filter.select(facet, value.trim());
    }
    Ok(CatalogQuery {
        filter,
        search: args.search.clone(),
        sort: args.sort.clone(),
        direction: args.direction.map(|d| match d {
            DirectionArg::Asc => Direction::Asc,
            DirectionArg::Desc => Direction::Desc,
        }),
    })
}

fn store_error(err: StoreError) -> MachineError {
    match err.code {
        StoreErrorCode::Validation => MachineError::validation(err.message),
        StoreErrorCode::Io => MachineError::usage(err.message),
        code => MachineError::store(err.message).with_detail("store_code", code.as_str()),
    }
}

fn engine_error(err: EngineError) -> MachineError {
    match err {
        EngineError::Store(store) => store_error(store),
        EngineError::Config(msg) => MachineError::validation(msg),
        other => MachineError::internal(other.to_string()),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, MachineError> {
    serde_json::to_value(value).map_err(|e| MachineError::internal(e.to_string()))
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), MachineError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| MachineError::internal(e.to_string()))?;
    println!("{text}");
    Ok(())
}
