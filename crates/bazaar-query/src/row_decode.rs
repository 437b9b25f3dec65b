// SPDX-License-Identifier: Apache-2.0

use bazaar_model::{Item, DATE_FORMAT};
use chrono::NaiveDate;

/// One `items` row as stored, before date parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItemRow {
    pub id: i64,
    pub name: String,
    pub published_date: Option<String>,
    pub avg_rating: Option<f64>,
    pub has_ratings: i64,
    pub popularity_score: Option<f64>,
}

impl RawItemRow {
    /// Expects the column order of [`crate::db::ITEM_COLUMNS`].
    pub fn from_sql_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get::<_, i64>(0)?,
            name: row.get::<_, String>(1)?,
            published_date: row.get::<_, Option<String>>(2)?,
            avg_rating: row.get::<_, Option<f64>>(3)?,
            has_ratings: row.get::<_, i64>(4)?,
            popularity_score: row.get::<_, Option<f64>>(5)?,
        })
    }

    /// Stored dates must be exact `YYYY-MM-DD`; anything else is corruption.
    pub fn into_item(self) -> Result<Item, String> {
        let published_date = match self.published_date.as_deref() {
            None => None,
            Some(raw) => Some(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                format!("item {} has malformed published_date {raw:?}: {e}", self.id)
            })?),
        };
        Ok(Item {
            id: self.id,
            name: self.name,
            published_date,
            avg_rating: self.avg_rating,
            has_ratings: self.has_ratings != 0,
            popularity_score: self.popularity_score,
        })
    }
}
