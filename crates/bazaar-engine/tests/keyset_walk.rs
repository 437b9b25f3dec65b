// SPDX-License-Identifier: Apache-2.0

mod common;

use bazaar_engine::{CatalogQuery, EngineConfig};
use bazaar_model::{sort_plan, Direction, Item, ItemRecord, SortKey};
use chrono::NaiveDate;
use common::{engine_over, store_with};
use proptest::prelude::*;

/// Small alphabets so popularity, rating, date and name ties are common.
/// Every sort field is present; null boundaries are covered in the query
/// crate's keyset contract.
fn catalog() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec((0_u8..4, "[A-C]{1,2}", 0_u8..3, 1_u32..4), 1..25).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (popularity, name, rating, month))| Item {
                id: i as i64 + 1,
                name,
                published_date: NaiveDate::from_ymd_opt(2021, month, 1),
                avg_rating: Some(f64::from(rating)),
                has_ratings: true,
                popularity_score: Some(f64::from(popularity)),
            })
            .collect()
    })
}

fn sort_choice() -> impl Strategy<Value = (SortKey, Option<Direction>)> {
    (
        prop_oneof![
            Just(SortKey::Alphabetical),
            Just(SortKey::ReleaseDate),
            Just(SortKey::Rating),
            Just(SortKey::Popularity),
        ],
        prop_oneof![Just(None), Just(Some(Direction::Asc)), Just(Some(Direction::Desc))],
    )
}

/// Follows `end_cursor` until `has_next_page` is false. `None` if the walk
/// takes more pages than there are items.
fn walk(items: &[Item], query: &CatalogQuery, first: usize) -> Option<Vec<i64>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    runtime.block_on(async {
        let records = items.iter().cloned().map(ItemRecord::new).collect();
        let engine = engine_over(store_with(records).await, EngineConfig::default());
        let mut ids = Vec::new();
        let mut after: Option<String> = None;
        for _ in 0..=items.len() {
            let page = engine
                .page(query, Some(first), after.as_deref())
                .await
                .expect("page");
            assert_eq!(page.page_info.has_previous_page, after.is_some());
            ids.extend(page.nodes().map(|n| n.id));
            if !page.page_info.has_next_page {
                return Some(ids);
            }
            after = page.page_info.end_cursor.clone();
        }
        None
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn keyset_walk_visits_every_item_once_in_sort_order(
        items in catalog(),
        choice in sort_choice(),
        first in 1_usize..6,
    ) {
        let (key, direction) = choice;
        let query = CatalogQuery {
            sort: Some(key.as_str().to_string()),
            direction,
            ..CatalogQuery::default()
        };
        let spec = sort_plan(key, direction);
        let mut expected = items.clone();
        expected.sort_by(|a, b| spec.compare(a, b));
        let expected: Vec<i64> = expected.iter().map(|i| i.id).collect();

        prop_assert_eq!(walk(&items, &query, first), Some(expected));
    }
}
