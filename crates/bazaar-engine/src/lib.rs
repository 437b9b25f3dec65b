// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! Keyset pagination, faceted availability and the shared memo cache,
//! composed behind [`CatalogEngine`].

mod availability;
mod boost;
pub mod cache;
pub mod config;
mod connection;
mod engine;
mod error;

pub use availability::FacetAvailability;
pub use cache::TtlCache;
pub use config::{validate_engine_config, EngineConfig};
pub use connection::{Connection, Edge, OffsetPage, PageInfo};
pub use engine::{CatalogEngine, CatalogQuery};
pub use error::EngineError;

pub const CRATE_NAME: &str = "bazaar-engine";
