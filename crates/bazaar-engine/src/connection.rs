// SPDX-License-Identifier: Apache-2.0

//! Relay-style page assembly over keyset cursors.

use crate::error::EngineError;
use bazaar_model::{Item, SortSpec};
use bazaar_query::{after_cursor, CursorCodec, CursorTuple, Predicate};
use bazaar_store::CatalogStore;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge<T> {
    /// Opaque; resume with it as `after` to continue strictly past `node`.
    pub cursor: String,
    pub node: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetPage<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: usize,
    pub has_next_page: bool,
}

/// Malformed, forged or stale tokens read as "no cursor".
pub(crate) fn decode_after(codec: &CursorCodec, after: Option<&str>) -> Option<CursorTuple> {
    let token = after.map(str::trim).filter(|t| !t.is_empty())?;
    match codec.try_decode(token) {
        Ok(tuple) => Some(tuple),
        Err(err) => {
            debug!(code = err.code.as_str(), "cursor rejected, serving first page");
            None
        }
    }
}

/// Fetches one page of `page_size` rows (at least 1) strictly after `after`.
pub(crate) async fn assemble_page(
    store: &dyn CatalogStore,
    codec: &CursorCodec,
    base: Predicate,
    spec: &SortSpec,
    after: Option<&str>,
    page_size: usize,
) -> Result<Connection<Item>, EngineError> {
    let decoded = decode_after(codec, after);
    let has_previous_page = decoded.is_some();
    let predicate = match &decoded {
        Some(tuple) => Predicate::and([base, after_cursor(spec, &tuple.align_to(spec))]),
        None => base,
    };

    let mut rows = store
        .find(&predicate, spec, page_size.saturating_add(1), None)
        .await?;
    let has_next_page = rows.len() > page_size;
    rows.truncate(page_size);

    let edges = rows
        .into_iter()
        .map(|node| -> Result<Edge<Item>, EngineError> {
            let cursor = codec.encode(&CursorTuple::from_item(spec, &node))?;
            Ok(Edge { cursor, node })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let page_info = PageInfo {
        has_next_page,
        has_previous_page,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };
    Ok(Connection {
        edges,
        page_info,
        total_count: None,
    })
}

pub(crate) async fn assemble_offset_page(
    store: &dyn CatalogStore,
    predicate: &Predicate,
    spec: &SortSpec,
    page: i64,
    page_size: usize,
    skip: usize,
) -> Result<OffsetPage<Item>, EngineError> {
    let mut items = store
        .find(predicate, spec, page_size.saturating_add(1), Some(skip))
        .await?;
    let has_next_page = items.len() > page_size;
    items.truncate(page_size);
    Ok(OffsetPage {
        items,
        page: page.max(0),
        page_size,
        has_next_page,
    })
}
