// SPDX-License-Identifier: Apache-2.0

use bazaar_query::CursorError;
use bazaar_store::StoreError;
use std::fmt::{Display, Formatter};

/// Failures surfaced by engine operations. Store errors pass through
/// unchanged; malformed inbound cursors never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    Store(StoreError),
    /// Encoding an outbound cursor failed.
    Cursor(CursorError),
    Config(String),
    Internal(String),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(e) => write!(f, "store failure: {e}"),
            Self::Cursor(e) => write!(f, "cursor encoding failed: {e}"),
            Self::Config(msg) => write!(f, "invalid engine config: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Cursor(e) => Some(e),
            Self::Config(_) | Self::Internal(_) => None,
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<CursorError> for EngineError {
    fn from(err: CursorError) -> Self {
        Self::Cursor(err)
    }
}
