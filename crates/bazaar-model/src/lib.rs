// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Catalog model SSOT: items, facets, sortable field kinds and sort plans.

mod facet;
mod field;
mod item;
mod sort;

pub use facet::{FacetKind, FilterSelection};
pub use field::{parse_field, serialize_field, FieldKind, FieldValue, DATE_FORMAT};
pub use item::{Item, ItemRecord, ValidationError, NAME_MAX_LEN};
pub use sort::{
    sort_plan, sort_plan_for, Direction, SortField, SortKey, SortSpec, SortTerm, IDENTITY_TERM,
};

pub const CRATE_NAME: &str = "bazaar-model";
