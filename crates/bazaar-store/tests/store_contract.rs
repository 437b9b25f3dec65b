// SPDX-License-Identifier: Apache-2.0

use bazaar_model::{sort_plan, FacetKind, Item, ItemRecord, SortKey};
use bazaar_query::{NameMatch, Predicate};
use bazaar_store::{CatalogStore, SqliteCatalogStore, SqliteStoreConfig, StoreErrorCode};
use chrono::NaiveDate;
use std::sync::Arc;
use tempfile::tempdir;

fn record(id: i64, name: &str, popularity: f64) -> ItemRecord {
    ItemRecord::new(Item {
        id,
        name: name.to_string(),
        published_date: NaiveDate::from_ymd_opt(2020, 1, id as u32),
        avg_rating: None,
        has_ratings: false,
        popularity_score: Some(popularity),
    })
}

async fn seeded() -> SqliteCatalogStore {
    let store = SqliteCatalogStore::open_in_memory().expect("store");
    store
        .import(vec![
            record(1, "Stardew Valley", 10.0)
                .with(FacetKind::Tag, &["Cute", "Farming"])
                .with(FacetKind::Publisher, &["ConcernedApe"]),
            record(2, "Factorio", 9.0).with(FacetKind::Tag, &["Automation"]),
            record(3, "Farm Together", 3.0)
                .with(FacetKind::Tag, &["Cute", "Farming"])
                .with(FacetKind::Publisher, &["Milkstone"]),
        ])
        .await
        .expect("import");
    store
}

#[tokio::test]
async fn find_respects_order_limit_and_offset() {
    let store = seeded().await;
    let spec = sort_plan(SortKey::Popularity, None);
    let rows = store.find(&Predicate::True, &spec, 2, None).await.expect("find");
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    let rest = store.find(&Predicate::True, &spec, 2, Some(2)).await.expect("find");
    assert_eq!(rest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3]);
    assert_eq!(rows[0].published_date, NaiveDate::from_ymd_opt(2020, 1, 1));
}

#[tokio::test]
async fn count_and_item_ids_share_the_predicate() {
    let store = seeded().await;
    let cute = Predicate::Linked {
        facet: FacetKind::Tag,
        name: NameMatch::Equals("Cute".to_string()),
    };
    assert_eq!(store.count(&cute).await.expect("count"), 2);
    let spec = sort_plan(SortKey::Alphabetical, None);
    let ids = store.find_item_ids(&cute, &spec, 10).await.expect("ids");
    assert_eq!(ids, vec![3, 1]);
    assert_eq!(store.count(&Predicate::False).await.expect("count"), 0);
}

#[tokio::test]
async fn relation_prefix_lookup_is_bounded() {
    let store = seeded().await;
    let ids = store
        .find_relation_ids(FacetKind::Tag, &NameMatch::Prefix("c".to_string()), 10)
        .await
        .expect("relation ids");
    assert_eq!(ids.len(), 1, "LIKE prefix is case-insensitive for ASCII");
    let none = store
        .find_relation_ids(FacetKind::Publisher, &NameMatch::Prefix("zzz".to_string()), 10)
        .await
        .expect("relation ids");
    assert!(none.is_empty());
}

#[tokio::test]
async fn option_names_are_distinct_and_sorted() {
    let store = seeded().await;
    let all = store
        .facet_option_names(FacetKind::Tag, None)
        .await
        .expect("names");
    assert_eq!(all, vec!["Automation", "Cute", "Farming"]);
    let linked = store
        .facet_option_names(FacetKind::Tag, Some(&[1_i64, 3][..]))
        .await
        .expect("names");
    assert_eq!(linked, vec!["Cute", "Farming"]);
    let empty = store
        .facet_option_names(FacetKind::Tag, Some(&[][..]))
        .await
        .expect("names");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn option_names_span_id_chunks() {
    let store = SqliteCatalogStore::open_in_memory().expect("store");
    let records: Vec<ItemRecord> = (1..=1_200)
        .map(|id| {
            let tag = format!("t{:04}", id % 700);
            ItemRecord::new(Item {
                id,
                name: format!("item {id}"),
                published_date: None,
                avg_rating: None,
                has_ratings: false,
                popularity_score: None,
            })
            .with(FacetKind::Tag, &[tag.as_str()])
        })
        .collect();
    store.import(records).await.expect("import");
    let ids: Vec<i64> = (1..=1_200).collect();
    let names = store
        .facet_option_names(FacetKind::Tag, Some(ids.as_slice()))
        .await
        .expect("names");
    assert_eq!(names.len(), 700);
    assert!(names.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn file_catalog_reopens_read_only() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("catalog.sqlite");
    let cfg = SqliteStoreConfig::default();
    {
        let store = SqliteCatalogStore::open(&path, &cfg).expect("open");
        store.import(vec![record(1, "Solo", 1.0)]).await.expect("import");
    }
    let reader: Arc<dyn CatalogStore> =
        Arc::new(SqliteCatalogStore::open_readonly(&path, &cfg).expect("reopen"));
    assert_eq!(reader.backend_tag(), "sqlite");
    assert_eq!(reader.count(&Predicate::True).await.expect("count"), 1);

    let missing = SqliteCatalogStore::open_readonly(&dir.path().join("nope.sqlite"), &cfg)
        .expect_err("missing");
    assert_eq!(missing.code, StoreErrorCode::Io);
}

#[tokio::test]
async fn malformed_stored_dates_surface_as_decode_errors() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("catalog.sqlite");
    let cfg = SqliteStoreConfig::default();
    let store = SqliteCatalogStore::open(&path, &cfg).expect("open");
    store.import(vec![record(1, "Solo", 1.0)]).await.expect("import");
    let raw = rusqlite::Connection::open(&path).expect("raw");
    raw.execute("UPDATE items SET published_date = 'soon'", [])
        .expect("corrupt");
    let err = store
        .find(&Predicate::True, &sort_plan(SortKey::Popularity, None), 10, None)
        .await
        .expect_err("decode");
    assert_eq!(err.code, StoreErrorCode::Decode);
}
