// SPDX-License-Identifier: Apache-2.0

use bazaar_model::{FacetKind, FieldValue, SortField};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    Equals(String),
    Contains(String),
    Prefix(String),
}

impl NameMatch {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Equals(t) | Self::Contains(t) | Self::Prefix(t) => t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Gt,
    Lt,
}

impl CompareOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

/// Store-agnostic boolean expression over catalog items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    True,
    False,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Compare {
        field: SortField,
        op: CompareOp,
        value: FieldValue,
    },
    IsNull(SortField),
    Name(NameMatch),
    Linked {
        facet: FacetKind,
        name: NameMatch,
    },
    LinkedIdIn {
        facet: FacetKind,
        ids: Vec<i64>,
    },
}

impl Predicate {
    /// Conjunction with constant folding: `True` parts vanish, any `False`
    /// part wins, and an empty conjunction is `True`.
    #[must_use]
    pub fn and(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut out = Vec::new();
        for part in parts {
            match part {
                Self::True => {}
                Self::False => return Self::False,
                Self::And(inner) => out.extend(inner),
                other => out.push(other),
            }
        }
        match out.len() {
            0 => Self::True,
            1 => out.remove(0),
            _ => Self::And(out),
        }
    }

    /// Disjunction with constant folding: `False` parts vanish, any `True`
    /// part wins, and an empty disjunction is `False`.
    #[must_use]
    pub fn or(parts: impl IntoIterator<Item = Predicate>) -> Self {
        let mut out: Vec<Predicate> = Vec::new();
        for part in parts {
            match part {
                Self::False => {}
                Self::True => return Self::True,
                Self::Or(inner) => {
                    for p in inner {
                        if !out.contains(&p) {
                            out.push(p);
                        }
                    }
                }
                other => {
                    if !out.contains(&other) {
                        out.push(other);
                    }
                }
            }
        }
        match out.len() {
            0 => Self::False,
            1 => out.remove(0),
            _ => Self::Or(out),
        }
    }

    #[must_use]
    pub fn linked_id_in(facet: FacetKind, ids: Vec<i64>) -> Self {
        if ids.is_empty() {
            Self::False
        } else {
            Self::LinkedIdIn { facet, ids }
        }
    }

    #[must_use]
    pub fn compare(field: SortField, op: CompareOp, value: FieldValue) -> Self {
        Self::Compare { field, op, value }
    }
}
