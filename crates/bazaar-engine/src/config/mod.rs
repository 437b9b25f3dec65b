// SPDX-License-Identifier: Apache-2.0

use bazaar_query::QueryLimits;
use serde::Serialize;
use std::time::Duration;

pub const ENV_CACHE_TTL_MS: &str = "BAZAAR_CACHE_TTL_MS";
pub const ENV_CACHE_CAPACITY: &str = "BAZAAR_CACHE_CAPACITY";
pub const ENV_MAX_PAGE_SIZE: &str = "BAZAAR_MAX_PAGE_SIZE";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "BAZAAR_DEFAULT_PAGE_SIZE";
pub const ENV_AVAILABILITY_SCAN_CAP: &str = "BAZAAR_AVAILABILITY_SCAN_CAP";
pub const ENV_SEARCH_BOOST: &str = "BAZAAR_SEARCH_BOOST";
pub const ENV_BOOST_LOOKUP_LIMIT: &str = "BAZAAR_BOOST_LOOKUP_LIMIT";
pub const ENV_MAX_SEARCH_CHARS: &str = "BAZAAR_MAX_SEARCH_CHARS";
pub const ENV_CURSOR_SECRET: &str = "BAZAAR_CURSOR_SECRET";

#[derive(Clone, Serialize)]
pub struct EngineConfig {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub max_page_size: usize,
    pub default_page_size: usize,
    pub availability_scan_cap: usize,
    pub search_boost_enabled: bool,
    pub boost_lookup_limit: usize,
    pub max_search_chars: usize,
    #[serde(skip_serializing)]
    pub cursor_secret: Option<String>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_capacity", &self.cache_capacity)
            .field("max_page_size", &self.max_page_size)
            .field("default_page_size", &self.default_page_size)
            .field("availability_scan_cap", &self.availability_scan_cap)
            .field("search_boost_enabled", &self.search_boost_enabled)
            .field("boost_lookup_limit", &self.boost_lookup_limit)
            .field("max_search_chars", &self.max_search_chars)
            .field("cursor_secret", &self.cursor_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let limits = QueryLimits::default();
        Self {
            cache_ttl: Duration::from_secs(60),
            cache_capacity: 512,
            max_page_size: limits.max_page_size,
            default_page_size: limits.default_page_size,
            availability_scan_cap: limits.availability_scan_cap,
            search_boost_enabled: false,
            boost_lookup_limit: limits.boost_lookup_limit,
            max_search_chars: limits.max_search_chars,
            cursor_secret: None,
        }
    }
}

impl EngineConfig {
    /// Reads `BAZAAR_*` variables; unset or unparseable values keep defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let default_ttl_ms = u64::try_from(d.cache_ttl.as_millis()).unwrap_or(u64::MAX);
        Self {
            cache_ttl: env_duration_ms(&lookup, ENV_CACHE_TTL_MS, default_ttl_ms),
            cache_capacity: env_usize(&lookup, ENV_CACHE_CAPACITY, d.cache_capacity),
            max_page_size: env_usize(&lookup, ENV_MAX_PAGE_SIZE, d.max_page_size),
            default_page_size: env_usize(&lookup, ENV_DEFAULT_PAGE_SIZE, d.default_page_size),
            availability_scan_cap: env_usize(
                &lookup,
                ENV_AVAILABILITY_SCAN_CAP,
                d.availability_scan_cap,
            ),
            search_boost_enabled: env_bool(&lookup, ENV_SEARCH_BOOST, d.search_boost_enabled),
            boost_lookup_limit: env_usize(&lookup, ENV_BOOST_LOOKUP_LIMIT, d.boost_lookup_limit),
            max_search_chars: env_usize(&lookup, ENV_MAX_SEARCH_CHARS, d.max_search_chars),
            cursor_secret: lookup(ENV_CURSOR_SECRET),
        }
    }

    #[must_use]
    pub fn limits(&self) -> QueryLimits {
        QueryLimits {
            max_page_size: self.max_page_size,
            default_page_size: self.default_page_size,
            max_search_chars: self.max_search_chars,
            availability_scan_cap: self.availability_scan_cap,
            boost_lookup_limit: self.boost_lookup_limit,
        }
    }
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    lookup(name)
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u64) -> u64 {
    lookup(name)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: usize) -> usize {
    lookup(name)
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(lookup: &impl Fn(&str) -> Option<String>, name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(lookup, name, default_ms))
}

pub fn validate_engine_config(cfg: &EngineConfig) -> Result<(), String> {
    if cfg.cache_ttl.is_zero() {
        return Err("cache ttl must be > 0".to_string());
    }
    if cfg.cache_capacity == 0 {
        return Err("cache capacity must be > 0".to_string());
    }
    if cfg.max_page_size == 0 || cfg.default_page_size == 0 {
        return Err("page sizes must be > 0".to_string());
    }
    if cfg.default_page_size > cfg.max_page_size {
        return Err("default page size must not exceed max page size".to_string());
    }
    if cfg.availability_scan_cap == 0 {
        return Err("availability scan cap must be > 0".to_string());
    }
    if cfg.max_search_chars == 0 {
        return Err("max search chars must be > 0".to_string());
    }
    if cfg.search_boost_enabled && cfg.boost_lookup_limit == 0 {
        return Err("search boost requires boost lookup limit > 0".to_string());
    }
    if cfg.cursor_secret.as_deref().is_some_and(str::is_empty) {
        return Err("cursor secret must not be empty when set".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_pass_validation() {
        validate_engine_config(&EngineConfig::default()).expect("defaults valid");
    }

    #[test]
    fn env_overrides_apply_and_garbage_keeps_defaults() {
        let cfg = EngineConfig::from_lookup(lookup_from(&[
            (ENV_CACHE_TTL_MS, "1500"),
            (ENV_MAX_PAGE_SIZE, "50"),
            (ENV_SEARCH_BOOST, "yes"),
            (ENV_CACHE_CAPACITY, "lots"),
            (ENV_CURSOR_SECRET, "s3cret"),
        ]));
        assert_eq!(cfg.cache_ttl, Duration::from_millis(1500));
        assert_eq!(cfg.max_page_size, 50);
        assert!(cfg.search_boost_enabled);
        assert_eq!(cfg.cache_capacity, EngineConfig::default().cache_capacity);
        assert_eq!(cfg.cursor_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn validation_rejects_zero_capacities_and_empty_secret() {
        let zero_cache = EngineConfig {
            cache_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(validate_engine_config(&zero_cache).is_err());
        let inverted = EngineConfig {
            default_page_size: 200,
            ..EngineConfig::default()
        };
        let err = validate_engine_config(&inverted).expect_err("default > max");
        assert!(err.contains("default page size"));
        let blank_secret = EngineConfig {
            cursor_secret: Some(String::new()),
            ..EngineConfig::default()
        };
        assert!(validate_engine_config(&blank_secret).is_err());
    }

    #[test]
    fn serialized_config_never_leaks_the_secret() {
        let cfg = EngineConfig {
            cursor_secret: Some("hunter2".to_string()),
            ..EngineConfig::default()
        };
        let json = serde_json::to_string(&cfg).expect("json");
        assert!(!json.contains("hunter2"));
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
