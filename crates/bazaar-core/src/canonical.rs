// SPDX-License-Identifier: Apache-2.0

//! Key-order independent JSON encoding and hashing.
//!
//! Cache keys for catalog requests are derived from these bytes, so two
//! requests that differ only in map insertion order share one entry.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// JSON bytes with every object's keys sorted, recursively.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sorted(serde_json::to_value(value)?))
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Namespaced cache key: `<namespace>:<sha256 of canonical json>`.
pub fn cache_key<T: Serialize>(namespace: &str, value: &T) -> Result<String, serde_json::Error> {
    let bytes = canonical_json(value)?;
    Ok(format!("{namespace}:{}", sha256_hex(&bytes)))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        scalar => scalar,
    }
}
