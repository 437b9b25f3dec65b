// SPDX-License-Identifier: Apache-2.0

//! Opaque keyset cursors. A token carries the serialized sort values of the
//! last row a client saw, so paging resumes by value rather than by offset.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bazaar_model::{serialize_field, Item, SortSpec, NAME_MAX_LEN};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const TOKEN_VERSION: &str = "v1";
const MAX_SIGNATURE_LEN: usize = 128;

// Worst-case payload of a valid item, so every encoded token decodes.
/// The rating plan has four terms; one spare.
const MAX_PLAN_TERMS: usize = 5;
/// `{"f":"","v":""},`
const ENTRY_JSON_OVERHEAD: usize = 16;
/// `popularity_score`
const MAX_FIELD_NAME_LEN: usize = 16;
/// Every name byte a control character escaped as `\u00XX`.
const MAX_NAME_JSON_LEN: usize = NAME_MAX_LEN * 6;
/// f64 `Display`: sign, `0.`, up to 323 leading zeros, 17 significant digits.
const MAX_DECIMAL_TEXT_LEN: usize = 1 + 2 + 323 + 17;
const MAX_PAYLOAD_JSON_LEN: usize = 2
    + MAX_PLAN_TERMS * (ENTRY_JSON_OVERHEAD + MAX_FIELD_NAME_LEN)
    + MAX_NAME_JSON_LEN
    + (MAX_PLAN_TERMS - 1) * MAX_DECIMAL_TEXT_LEN;
/// Longest sort plan is four terms; anything far beyond that is not ours.
const MAX_ENTRIES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CursorErrorCode {
    /// Wrong shape, oversized, or not base64.
    Malformed,
    UnknownVersion,
    /// Signature present but does not match the payload.
    Forged,
    /// The codec is signed and the token is not.
    Unsigned,
    /// Payload is not a non-empty list of sort values.
    BadPayload,
}

impl CursorErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::UnknownVersion => "unknown_version",
            Self::Forged => "forged",
            Self::Unsigned => "unsigned",
            Self::BadPayload => "bad_payload",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorError {
    pub code: CursorErrorCode,
    pub message: String,
}

impl CursorError {
    #[must_use]
    pub fn new(code: CursorErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    fn malformed(message: impl Into<String>) -> Self {
        Self::new(CursorErrorCode::Malformed, message)
    }

    fn bad_payload(message: impl Into<String>) -> Self {
        Self::new(CursorErrorCode::BadPayload, message)
    }
}

impl std::fmt::Display for CursorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cursor {}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for CursorError {}

/// One sort field and its canonical string value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorEntry {
    #[serde(rename = "f")]
    pub field: String,
    #[serde(rename = "v")]
    pub value: String,
}

/// The serialized sort values of one row, in sort order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorTuple {
    entries: Vec<CursorEntry>,
}

impl CursorTuple {
    #[must_use]
    pub fn new(entries: Vec<CursorEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn from_item(spec: &SortSpec, item: &Item) -> Self {
        Self {
            entries: spec
                .fields()
                .map(|field| CursorEntry {
                    field: field.as_str().to_string(),
                    value: serialize_field(&field.extract(item)),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[CursorEntry] {
        &self.entries
    }

    /// Values in `spec` field order. Fields the payload lacks become `""`;
    /// fields `spec` does not name are ignored.
    #[must_use]
    pub fn align_to(&self, spec: &SortSpec) -> Vec<String> {
        spec.fields()
            .map(|field| {
                self.entries
                    .iter()
                    .find(|e| e.field == field.as_str())
                    .map(|e| e.value.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Opaque, URL-safe cursor tokens: `v1.<payload>` or, with a secret,
/// `v1.<payload>.<hmac>`.
#[derive(Clone, Default)]
pub struct CursorCodec {
    secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for CursorCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCodec")
            .field("signed", &self.secret.is_some())
            .finish()
    }
}

impl CursorCodec {
    /// Longest token `encode` produces and `try_decode` accepts.
    pub const MAX_TOKEN_LEN: usize = TOKEN_VERSION.len()
        + 1
        + (MAX_PAYLOAD_JSON_LEN * 4).div_ceil(3)
        + 1
        + MAX_SIGNATURE_LEN;

    #[must_use]
    pub fn unsigned() -> Self {
        Self { secret: None }
    }

    #[must_use]
    pub fn signed(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    pub fn encode(&self, tuple: &CursorTuple) -> Result<String, CursorError> {
        let json = serde_json::to_vec(tuple).map_err(|e| CursorError::bad_payload(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let token = match &self.secret {
            None => format!("{TOKEN_VERSION}.{payload}"),
            Some(secret) => {
                let signature = mac_over(secret, &payload)?.finalize().into_bytes();
                format!("{TOKEN_VERSION}.{payload}.{}", URL_SAFE_NO_PAD.encode(signature))
            }
        };
        if token.len() > Self::MAX_TOKEN_LEN {
            return Err(CursorError::bad_payload(format!(
                "encoded cursor is {} bytes, max {}",
                token.len(),
                Self::MAX_TOKEN_LEN
            )));
        }
        Ok(token)
    }

    /// Decoding never fails outward: any malformed, stale or forged token
    /// reads as "no cursor".
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<CursorTuple> {
        self.try_decode(token).ok()
    }

    pub fn try_decode(&self, token: &str) -> Result<CursorTuple, CursorError> {
        if token.len() > Self::MAX_TOKEN_LEN {
            return Err(CursorError::malformed("cursor exceeds max length"));
        }
        let parts = TokenParts::split(token)?;
        match (&self.secret, parts.signature) {
            (Some(secret), Some(signature)) => verify(secret, parts.payload, signature)?,
            (Some(_), None) => {
                return Err(CursorError::new(
                    CursorErrorCode::Unsigned,
                    "signed codec got an unsigned cursor",
                ))
            }
            (None, Some(_)) => {
                return Err(CursorError::malformed(
                    "signed cursor without a configured secret",
                ))
            }
            (None, None) => {}
        }

        let json = URL_SAFE_NO_PAD
            .decode(parts.payload)
            .map_err(|e| CursorError::malformed(e.to_string()))?;
        let tuple: CursorTuple =
            serde_json::from_slice(&json).map_err(|e| CursorError::bad_payload(e.to_string()))?;
        if !(1..=MAX_ENTRIES).contains(&tuple.entries.len()) {
            return Err(CursorError::bad_payload("cursor entry count out of range"));
        }
        Ok(tuple)
    }
}

struct TokenParts<'a> {
    payload: &'a str,
    signature: Option<&'a str>,
}

impl<'a> TokenParts<'a> {
    fn split(token: &'a str) -> Result<Self, CursorError> {
        let (version, rest) = token
            .split_once('.')
            .ok_or_else(|| CursorError::malformed("cursor has no version prefix"))?;
        if version != TOKEN_VERSION {
            if version.is_empty() || rest.split('.').count() > 2 {
                return Err(CursorError::malformed("invalid cursor format"));
            }
            return Err(CursorError::new(
                CursorErrorCode::UnknownVersion,
                format!("unsupported cursor version: {version}"),
            ));
        }
        let (payload, signature) = match rest.split_once('.') {
            None => (rest, None),
            Some((_, sig)) if sig.contains('.') => {
                return Err(CursorError::malformed("too many cursor segments"))
            }
            Some((_, sig)) if sig.len() > MAX_SIGNATURE_LEN => {
                return Err(CursorError::malformed("cursor signature exceeds max length"))
            }
            Some((payload, sig)) => (payload, Some(sig)),
        };
        if payload.is_empty() {
            return Err(CursorError::malformed("empty cursor payload"));
        }
        Ok(Self { payload, signature })
    }
}

fn mac_over(secret: &[u8], payload: &str) -> Result<Hmac<Sha256>, CursorError> {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(secret)
        .map_err(|e| CursorError::bad_payload(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

fn verify(secret: &[u8], payload: &str, signature: &str) -> Result<(), CursorError> {
    let claimed = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|e| CursorError::malformed(e.to_string()))?;
    mac_over(secret, payload)?
        .verify_slice(&claimed)
        .map_err(|_| CursorError::new(CursorErrorCode::Forged, "cursor signature mismatch"))
}
