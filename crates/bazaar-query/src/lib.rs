// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod cursor;
pub mod db;
mod filters;
mod limits;
mod predicate;
mod row_decode;
mod search;
mod tuple;

pub use cursor::{CursorCodec, CursorEntry, CursorError, CursorErrorCode, CursorTuple};
pub use filters::filter_predicate;
pub use limits::QueryLimits;
pub use predicate::{CompareOp, NameMatch, Predicate};
pub use row_decode::RawItemRow;
pub use search::{boost_term, bounded_search_text, normalize_search, search_predicate, SearchBoost};
pub use tuple::after_cursor;

pub const CRATE_NAME: &str = "bazaar-query";
