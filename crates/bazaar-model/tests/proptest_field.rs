// SPDX-License-Identifier: Apache-2.0

use bazaar_model::{parse_field, serialize_field, FieldValue};
use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::test_runner::Config;

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn identity_roundtrips(id in any::<i64>()) {
        let value = FieldValue::Identity(id);
        prop_assert_eq!(parse_field(&serialize_field(&value), value.kind()), value);
    }

    #[test]
    fn text_roundtrips(text in ".*") {
        let value = FieldValue::Text(text);
        prop_assert_eq!(parse_field(&serialize_field(&value), value.kind()), value);
    }

    #[test]
    fn decimal_roundtrips(number in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let value = FieldValue::Decimal(Some(number));
        prop_assert_eq!(parse_field(&serialize_field(&value), value.kind()), value);
    }

    #[test]
    fn date_roundtrips(days in 0_i64..3_000_000) {
        let date = NaiveDate::from_ymd_opt(1, 1, 1)
            .and_then(|d| d.checked_add_signed(chrono::Duration::days(days)))
            .expect("date in range");
        let value = FieldValue::Date(Some(date));
        prop_assert_eq!(parse_field(&serialize_field(&value), value.kind()), value);
    }

    #[test]
    fn flag_roundtrips(flag in any::<bool>()) {
        let value = FieldValue::Flag(flag);
        prop_assert_eq!(parse_field(&serialize_field(&value), value.kind()), value);
    }
}
