// SPDX-License-Identifier: Apache-2.0

use crate::field::{FieldKind, FieldValue};
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    #[must_use]
    pub const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Name,
    PublishedDate,
    AvgRating,
    PopularityScore,
    HasRatings,
}

impl SortField {
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::PublishedDate,
        Self::AvgRating,
        Self::PopularityScore,
        Self::HasRatings,
    ];

    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Id => FieldKind::Identity,
            Self::Name => FieldKind::Text,
            Self::PublishedDate => FieldKind::Date,
            Self::AvgRating | Self::PopularityScore => FieldKind::Decimal,
            Self::HasRatings => FieldKind::Flag,
        }
    }

    /// Column name, also the field name carried in cursor payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::PublishedDate => "published_date",
            Self::AvgRating => "avg_rating",
            Self::PopularityScore => "popularity_score",
            Self::HasRatings => "has_ratings",
        }
    }

    #[must_use]
    pub fn from_name(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }

    #[must_use]
    pub fn extract(self, item: &Item) -> FieldValue {
        match self {
            Self::Id => FieldValue::Identity(item.id),
            Self::Name => FieldValue::Text(item.name.clone()),
            Self::PublishedDate => FieldValue::Date(item.published_date),
            Self::AvgRating => FieldValue::Decimal(item.avg_rating),
            Self::PopularityScore => FieldValue::Decimal(item.popularity_score),
            Self::HasRatings => FieldValue::Flag(item.has_ratings),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortTerm {
    pub field: SortField,
    pub direction: Direction,
}

impl SortTerm {
    #[must_use]
    pub const fn new(field: SortField, direction: Direction) -> Self {
        Self { field, direction }
    }
}

pub const IDENTITY_TERM: SortTerm = SortTerm::new(SortField::Id, Direction::Desc);

/// Ordered sort terms that always end in [`IDENTITY_TERM`], so no two
/// distinct items ever compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec {
    terms: Vec<SortTerm>,
}

impl SortSpec {
    /// Any identity terms in `terms` are dropped and the identity
    /// tiebreaker is appended.
    #[must_use]
    pub fn new(terms: Vec<SortTerm>) -> Self {
        let mut terms: Vec<SortTerm> = terms
            .into_iter()
            .filter(|t| t.field != SortField::Id)
            .collect();
        terms.push(IDENTITY_TERM);
        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &[SortTerm] {
        &self.terms
    }

    pub fn fields(&self) -> impl Iterator<Item = SortField> + '_ {
        self.terms.iter().map(|t| t.field)
    }

    /// In-process ordering matching the SQL `ORDER BY` this spec compiles to.
    #[must_use]
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        for term in &self.terms {
            let ord = term
                .direction
                .apply(compare_values(&term.field.extract(a), &term.field.extract(b)));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

// Nulls order lowest, as in SQLite.
fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Identity(x), FieldValue::Identity(y)) => x.cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        (FieldValue::Decimal(x), FieldValue::Decimal(y)) => match (x, y) {
            (Some(x), Some(y)) => x.total_cmp(y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
        (FieldValue::Flag(x), FieldValue::Flag(y)) => x.cmp(y),
        _ => a.kind().cmp_rank().cmp(&b.kind().cmp_rank()),
    }
}

impl FieldKind {
    const fn cmp_rank(self) -> u8 {
        match self {
            Self::Identity => 0,
            Self::Text => 1,
            Self::Date => 2,
            Self::Decimal => 3,
            Self::Flag => 4,
        }
    }
}

/// Symbolic sort keys exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Alphabetical,
    ReleaseDate,
    Rating,
    #[default]
    Popularity,
}

impl SortKey {
    /// Unknown or missing keys fall back to [`SortKey::Popularity`].
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("alphabetical") => Self::Alphabetical,
            Some("release-date") => Self::ReleaseDate,
            Some("rating") => Self::Rating,
            _ => Self::Popularity,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alphabetical => "alphabetical",
            Self::ReleaseDate => "release-date",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
        }
    }
}

#[must_use]
pub fn sort_plan(key: SortKey, direction: Option<Direction>) -> SortSpec {
    use SortField::{AvgRating, HasRatings, Name, PopularityScore, PublishedDate};
    let terms = match key {
        SortKey::Alphabetical => vec![SortTerm::new(Name, direction.unwrap_or(Direction::Asc))],
        SortKey::ReleaseDate => vec![SortTerm::new(
            PublishedDate,
            direction.unwrap_or(Direction::Desc),
        )],
        // Unrated items sink below rated ones whatever the requested direction.
        SortKey::Rating => vec![
            SortTerm::new(HasRatings, Direction::Desc),
            SortTerm::new(AvgRating, direction.unwrap_or(Direction::Desc)),
            SortTerm::new(Name, Direction::Asc),
        ],
        SortKey::Popularity => vec![
            SortTerm::new(PopularityScore, direction.unwrap_or(Direction::Desc)),
            SortTerm::new(Name, Direction::Asc),
        ],
    };
    SortSpec::new(terms)
}

#[must_use]
pub fn sort_plan_for(key: Option<&str>, direction: Option<Direction>) -> SortSpec {
    sort_plan(SortKey::parse(key), direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, popularity: f64) -> Item {
        Item {
            id,
            name: name.to_string(),
            published_date: None,
            avg_rating: None,
            has_ratings: false,
            popularity_score: Some(popularity),
        }
    }

    #[test]
    fn every_plan_ends_with_identity_descending() {
        for key in [
            SortKey::Alphabetical,
            SortKey::ReleaseDate,
            SortKey::Rating,
            SortKey::Popularity,
        ] {
            for direction in [None, Some(Direction::Asc), Some(Direction::Desc)] {
                let spec = sort_plan(key, direction);
                assert_eq!(spec.terms().last(), Some(&IDENTITY_TERM), "{key:?}");
                assert_eq!(spec.fields().filter(|f| *f == SortField::Id).count(), 1);
            }
        }
    }

    #[test]
    fn unknown_and_missing_keys_use_popularity_plan() {
        let popularity = sort_plan(SortKey::Popularity, None);
        assert_eq!(sort_plan_for(None, None), popularity);
        assert_eq!(sort_plan_for(Some("shuffle"), None), popularity);
        assert_eq!(
            popularity.terms(),
            &[
                SortTerm::new(SortField::PopularityScore, Direction::Desc),
                SortTerm::new(SortField::Name, Direction::Asc),
                IDENTITY_TERM,
            ]
        );
    }

    #[test]
    fn rating_plan_pins_has_ratings_descending() {
        let spec = sort_plan(SortKey::Rating, Some(Direction::Asc));
        assert_eq!(
            spec.terms()[0],
            SortTerm::new(SortField::HasRatings, Direction::Desc)
        );
        assert_eq!(spec.terms()[1].direction, Direction::Asc);
    }

    #[test]
    fn popularity_then_name_orders_ties_alphabetically() {
        let spec = sort_plan(SortKey::Popularity, None);
        let mut rows = vec![item(1, "B", 10.0), item(2, "A", 10.0), item(3, "C", 5.0)];
        rows.sort_by(|a, b| spec.compare(a, b));
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn spec_constructor_moves_identity_to_the_end() {
        let spec = SortSpec::new(vec![
            SortTerm::new(SortField::Id, Direction::Asc),
            SortTerm::new(SortField::Name, Direction::Asc),
        ]);
        assert_eq!(
            spec.terms(),
            &[SortTerm::new(SortField::Name, Direction::Asc), IDENTITY_TERM]
        );
    }
}
