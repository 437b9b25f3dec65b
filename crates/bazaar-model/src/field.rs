// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ISO-8601 calendar date. Fixed width, so text order is chronological.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Identity,
    Text,
    Date,
    Decimal,
    Flag,
}

/// A typed sortable value. `Date` and `Decimal` are nullable; SQL orders
/// their nulls below every present value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Identity(i64),
    Text(String),
    Date(Option<NaiveDate>),
    Decimal(Option<f64>),
    Flag(bool),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Identity(_) => FieldKind::Identity,
            Self::Text(_) => FieldKind::Text,
            Self::Date(_) => FieldKind::Date,
            Self::Decimal(_) => FieldKind::Decimal,
            Self::Flag(_) => FieldKind::Flag,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Date(None) | Self::Decimal(None))
    }
}

/// Canonical cursor text for a value. Absent values become `""`.
#[must_use]
pub fn serialize_field(value: &FieldValue) -> String {
    match value {
        FieldValue::Identity(id) => id.to_string(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Date(date) => date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default(),
        // `Display` for f64 is the shortest text that parses back to the same bits.
        FieldValue::Decimal(number) => number.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::Flag(flag) => (if *flag { "1" } else { "0" }).to_string(),
    }
}

/// Inverse of [`serialize_field`]. Never fails: unparseable text decodes to
/// the kind's empty value (`0`, null or `false`) because cursor text is
/// client-supplied.
#[must_use]
pub fn parse_field(raw: &str, kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Identity => FieldValue::Identity(raw.trim().parse::<i64>().unwrap_or(0)),
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::Date => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                FieldValue::Date(None)
            } else {
                FieldValue::Date(NaiveDate::parse_from_str(trimmed, DATE_FORMAT).ok())
            }
        }
        FieldKind::Decimal => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                FieldValue::Decimal(None)
            } else {
                FieldValue::Decimal(trimmed.parse::<f64>().ok())
            }
        }
        FieldKind::Flag => FieldValue::Flag(matches!(raw.trim(), "1" | "true")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_serialize_to_empty_text() {
        assert_eq!(serialize_field(&FieldValue::Date(None)), "");
        assert_eq!(serialize_field(&FieldValue::Decimal(None)), "");
        assert_eq!(serialize_field(&FieldValue::Text(String::new())), "");
    }

    #[test]
    fn flags_use_one_and_zero() {
        assert_eq!(serialize_field(&FieldValue::Flag(true)), "1");
        assert_eq!(serialize_field(&FieldValue::Flag(false)), "0");
        assert_eq!(parse_field("1", FieldKind::Flag), FieldValue::Flag(true));
        assert_eq!(parse_field("0", FieldKind::Flag), FieldValue::Flag(false));
        assert_eq!(parse_field("", FieldKind::Flag), FieldValue::Flag(false));
    }

    #[test]
    fn empty_identity_parses_to_zero() {
        assert_eq!(parse_field("", FieldKind::Identity), FieldValue::Identity(0));
        assert_eq!(parse_field("x9", FieldKind::Identity), FieldValue::Identity(0));
    }

    #[test]
    fn empty_or_garbage_nullable_kinds_parse_to_null() {
        assert_eq!(parse_field("", FieldKind::Decimal), FieldValue::Decimal(None));
        assert_eq!(parse_field("", FieldKind::Date), FieldValue::Date(None));
        assert_eq!(parse_field("2020-13-40", FieldKind::Date), FieldValue::Date(None));
        assert_eq!(parse_field("four", FieldKind::Decimal), FieldValue::Decimal(None));
    }

    #[test]
    fn dates_render_as_iso_calendar_dates() {
        let date = NaiveDate::from_ymd_opt(2019, 3, 7).expect("valid date");
        assert_eq!(serialize_field(&FieldValue::Date(Some(date))), "2019-03-07");
    }

    #[test]
    fn whole_decimals_render_without_fraction() {
        assert_eq!(serialize_field(&FieldValue::Decimal(Some(10.0))), "10");
        assert_eq!(
            parse_field("10", FieldKind::Decimal),
            FieldValue::Decimal(Some(10.0))
        );
    }
}
