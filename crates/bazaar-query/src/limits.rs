// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_page_size: usize,
    pub default_page_size: usize,
    pub max_search_chars: usize,
    pub availability_scan_cap: usize,
    pub boost_lookup_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            default_page_size: 20,
            max_search_chars: 128,
            availability_scan_cap: 5_000,
            boost_lookup_limit: 50,
        }
    }
}

impl QueryLimits {
    /// `None` or zero selects the default; anything above the max is cut
    /// down to it.
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<usize>) -> usize {
        let max = self.max_page_size.max(1);
        match requested {
            None | Some(0) => self.default_page_size.clamp(1, max),
            Some(size) => size.min(max),
        }
    }

    /// Row offset for zero-based `page`. Negative pages read as the first.
    #[must_use]
    pub fn offset_for(&self, page: i64, page_size: usize) -> usize {
        let page = usize::try_from(page.max(0)).unwrap_or(usize::MAX);
        page.saturating_mul(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_clamped_to_the_hard_maximum() {
        let limits = QueryLimits::default();
        assert_eq!(limits.clamp_page_size(Some(10_000)), 100);
        assert_eq!(limits.clamp_page_size(Some(9)), 9);
        assert_eq!(limits.clamp_page_size(None), 20);
        assert_eq!(limits.clamp_page_size(Some(0)), 20);
    }

    #[test]
    fn negative_pages_start_at_zero() {
        let limits = QueryLimits::default();
        assert_eq!(limits.offset_for(-3, 10), 0);
        assert_eq!(limits.offset_for(2, 10), 20);
        assert_eq!(limits.offset_for(i64::MAX, 10), usize::MAX);
    }
}
