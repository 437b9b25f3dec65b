// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod canonical;
mod error;

pub use canonical::{cache_key, sha256_hex};
pub use error::{ErrorClass, ExitCode, MachineError};

pub const CRATE_NAME: &str = "bazaar-core";

pub const ENV_BAZAAR_LOG_JSON: &str = "BAZAAR_LOG_JSON";
pub const ENV_BAZAAR_DB: &str = "BAZAAR_DB";
