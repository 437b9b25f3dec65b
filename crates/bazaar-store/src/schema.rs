// SPDX-License-Identifier: Apache-2.0

use crate::error::{StoreError, StoreErrorCode};
use bazaar_model::{FacetKind, FieldValue, ItemRecord};
use bazaar_query::db::sql_value;
use rusqlite::{params, Connection, OptionalExtension};

const ITEMS_DDL: &str = "
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    published_date TEXT,
    avg_rating REAL,
    has_ratings INTEGER NOT NULL DEFAULT 0,
    popularity_score REAL
);
CREATE INDEX IF NOT EXISTS idx_items_name ON items(name, id);
CREATE INDEX IF NOT EXISTS idx_items_published ON items(published_date, id);
CREATE INDEX IF NOT EXISTS idx_items_rating ON items(has_ratings, avg_rating, name, id);
CREATE INDEX IF NOT EXISTS idx_items_popularity ON items(popularity_score, name, id);
";

/// Creates every table and index. Idempotent.
pub fn apply_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(ITEMS_DDL)?;
    for facet in FacetKind::ALL {
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {opt} (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );
            CREATE TABLE IF NOT EXISTS {link} (
                item_id INTEGER NOT NULL REFERENCES items(id) ON DELETE CASCADE,
                option_id INTEGER NOT NULL REFERENCES {opt}(id) ON DELETE CASCADE,
                PRIMARY KEY (item_id, option_id)
            ) WITHOUT ROWID;
            CREATE INDEX IF NOT EXISTS idx_{link}_option ON {link}(option_id, item_id);",
            opt = facet.option_table(),
            link = facet.link_table(),
        ))?;
    }
    Ok(())
}

/// Upserts records in one transaction, creating option rows on demand.
/// Facet links of a re-imported item are replaced, not merged.
pub fn insert_records(conn: &mut Connection, records: &[ItemRecord]) -> Result<usize, StoreError> {
    for record in records {
        record.validate().map_err(|e| {
            StoreError::new(
                StoreErrorCode::Validation,
                format!("item {}: {e}", record.item.id),
            )
        })?;
    }
    let tx = conn.transaction()?;
    for record in records {
        let item = &record.item;
        tx.execute(
            "INSERT INTO items(id, name, published_date, avg_rating, has_ratings, popularity_score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                published_date = excluded.published_date,
                avg_rating = excluded.avg_rating,
                has_ratings = excluded.has_ratings,
                popularity_score = excluded.popularity_score",
            params![
                item.id,
                item.name,
                sql_value(&FieldValue::Date(item.published_date)),
                item.avg_rating,
                item.has_ratings,
                item.popularity_score,
            ],
        )?;
        for facet in FacetKind::ALL {
            tx.execute(
                &format!("DELETE FROM {} WHERE item_id = ?1", facet.link_table()),
                params![item.id],
            )?;
        }
        for (facet, names) in &record.facets {
            for name in names {
                let option_id = ensure_option(&tx, *facet, name)?;
                tx.execute(
                    &format!(
                        "INSERT OR IGNORE INTO {}(item_id, option_id) VALUES (?1, ?2)",
                        facet.link_table()
                    ),
                    params![item.id, option_id],
                )?;
            }
        }
    }
    tx.commit()?;
    Ok(records.len())
}

fn ensure_option(conn: &Connection, facet: FacetKind, name: &str) -> Result<i64, StoreError> {
    let table = facet.option_table();
    let existing = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE name = ?1"),
            params![name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute(&format!("INSERT INTO {table}(name) VALUES (?1)"), params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Read-side tuning for file-backed catalogs.
pub fn apply_read_pragmas(conn: &Connection, cache_kib: i64) -> Result<(), StoreError> {
    conn.execute_batch(&format!(
        "PRAGMA temp_store=MEMORY; PRAGMA cache_size=-{cache_kib}; PRAGMA foreign_keys=ON;"
    ))?;
    Ok(())
}
