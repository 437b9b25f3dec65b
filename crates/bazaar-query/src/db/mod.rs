// SPDX-License-Identifier: Apache-2.0

//! SQLite rendering of [`Predicate`] and [`SortSpec`].
//!
//! Items are aliased `i`; facet subqueries use `l` for the link table and
//! `o` for the option table.

use crate::predicate::{CompareOp, NameMatch, Predicate};
use crate::row_decode::RawItemRow;
use bazaar_model::{FacetKind, FieldValue, Item, SortField, SortSpec, DATE_FORMAT};
use rusqlite::{params_from_iter, types::Value, Connection};

pub const ITEM_COLUMNS: &str =
    "i.id, i.name, i.published_date, i.avg_rating, i.has_ratings, i.popularity_score";

/// A `WHERE`-ready SQL fragment and its positional parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SqlFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

#[must_use]
pub fn compile_where(predicate: &Predicate) -> SqlFragment {
    let mut params = Vec::new();
    let sql = compile_into(predicate, &mut params);
    SqlFragment { sql, params }
}

fn compile_into(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::True => "1".to_string(),
        Predicate::False => "0".to_string(),
        Predicate::And(parts) => join_parts(parts, " AND ", "1", params),
        Predicate::Or(parts) => join_parts(parts, " OR ", "0", params),
        Predicate::Compare { field, op, value } => compile_compare(*field, *op, value, params),
        Predicate::IsNull(field) => format!("i.{} IS NULL", field.as_str()),
        Predicate::Name(name) => compile_name_match("i.name", name, params),
        Predicate::Linked { facet, name } => {
            let matcher = compile_name_match("o.name", name, params);
            format!(
                "EXISTS (SELECT 1 FROM {link} l JOIN {opt} o ON o.id = l.option_id WHERE l.item_id = i.id AND {matcher})",
                link = facet.link_table(),
                opt = facet.option_table(),
            )
        }
        Predicate::LinkedIdIn { facet, ids } => {
            if ids.is_empty() {
                return "0".to_string();
            }
            params.extend(ids.iter().map(|id| Value::Integer(*id)));
            format!(
                "EXISTS (SELECT 1 FROM {link} l WHERE l.item_id = i.id AND l.option_id IN ({marks}))",
                link = facet.link_table(),
                marks = placeholders(ids.len()),
            )
        }
    }
}

fn join_parts(parts: &[Predicate], sep: &str, empty: &str, params: &mut Vec<Value>) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|p| compile_into(p, params)).collect();
    format!("({})", rendered.join(sep))
}

fn compile_compare(
    field: SortField,
    op: CompareOp,
    value: &FieldValue,
    params: &mut Vec<Value>,
) -> String {
    let column = format!("i.{}", field.as_str());
    match sql_value(value) {
        Value::Null => match op {
            CompareOp::Eq => format!("{column} IS NULL"),
            // Nothing is strictly ordered against an absent value.
            CompareOp::Gt | CompareOp::Lt => "0".to_string(),
        },
        bound => {
            params.push(bound);
            format!("{column} {} ?", op.as_sql())
        }
    }
}

fn compile_name_match(column: &str, name: &NameMatch, params: &mut Vec<Value>) -> String {
    match name {
        NameMatch::Equals(text) => {
            params.push(Value::Text(text.clone()));
            format!("{column} = ?")
        }
        NameMatch::Contains(text) => {
            params.push(Value::Text(format!("%{}%", escape_like(text))));
            format!("{column} LIKE ? ESCAPE '!'")
        }
        NameMatch::Prefix(text) => {
            params.push(Value::Text(format!("{}%", escape_like(text))));
            format!("{column} LIKE ? ESCAPE '!'")
        }
    }
}

/// Storage encoding: dates as ISO text, flags as 0/1 integers.
#[must_use]
pub fn sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Identity(id) => Value::Integer(*id),
        FieldValue::Text(text) => Value::Text(text.clone()),
        FieldValue::Date(date) => date.map_or(Value::Null, |d| {
            Value::Text(d.format(DATE_FORMAT).to_string())
        }),
        FieldValue::Decimal(number) => number.map_or(Value::Null, Value::Real),
        FieldValue::Flag(flag) => Value::Integer(i64::from(*flag)),
    }
}

#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[must_use]
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[must_use]
pub fn compile_order_by(spec: &SortSpec) -> String {
    spec.terms()
        .iter()
        .map(|t| format!("i.{} {}", t.field.as_str(), t.direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `LIMIT ? OFFSET ?` are appended as the last two parameters.
#[must_use]
pub fn select_items_sql(
    predicate: &Predicate,
    order_by: &SortSpec,
    limit: usize,
    offset: Option<usize>,
) -> SqlFragment {
    let mut fragment = compile_where(predicate);
    fragment.sql = format!(
        "SELECT {ITEM_COLUMNS} FROM items i WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
        fragment.sql,
        compile_order_by(order_by)
    );
    fragment.params.push(sql_count(limit));
    fragment.params.push(sql_count(offset.unwrap_or(0)));
    fragment
}

#[must_use]
pub fn select_item_ids_sql(predicate: &Predicate, order_by: &SortSpec, limit: usize) -> SqlFragment {
    let mut fragment = compile_where(predicate);
    fragment.sql = format!(
        "SELECT i.id FROM items i WHERE {} ORDER BY {} LIMIT ?",
        fragment.sql,
        compile_order_by(order_by)
    );
    fragment.params.push(sql_count(limit));
    fragment
}

#[must_use]
pub fn count_items_sql(predicate: &Predicate) -> SqlFragment {
    let mut fragment = compile_where(predicate);
    fragment.sql = format!("SELECT COUNT(*) FROM items i WHERE {}", fragment.sql);
    fragment
}

#[must_use]
pub fn relation_ids_sql(facet: FacetKind, name: &NameMatch, limit: usize) -> SqlFragment {
    let mut params = Vec::new();
    let matcher = compile_name_match("o.name", name, &mut params);
    params.push(sql_count(limit));
    SqlFragment {
        sql: format!(
            "SELECT o.id FROM {} o WHERE {matcher} ORDER BY o.name ASC, o.id ASC LIMIT ?",
            facet.option_table()
        ),
        params,
    }
}

/// Distinct option names, catalog-wide or restricted to `item_ids`.
#[must_use]
pub fn option_names_sql(facet: FacetKind, item_ids: Option<&[i64]>) -> SqlFragment {
    match item_ids {
        None => SqlFragment {
            sql: format!(
                "SELECT DISTINCT o.name FROM {} o ORDER BY o.name ASC",
                facet.option_table()
            ),
            params: Vec::new(),
        },
        Some(ids) => SqlFragment {
            sql: format!(
                "SELECT DISTINCT o.name FROM {opt} o JOIN {link} l ON l.option_id = o.id WHERE l.item_id IN ({marks}) ORDER BY o.name ASC",
                opt = facet.option_table(),
                link = facet.link_table(),
                marks = placeholders(ids.len()),
            ),
            params: ids.iter().map(|id| Value::Integer(*id)).collect(),
        },
    }
}

fn sql_count(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

pub fn query_items(conn: &Connection, fragment: &SqlFragment) -> Result<Vec<Item>, String> {
    let mut stmt = conn.prepare_cached(&fragment.sql).map_err(|e| e.to_string())?;
    let raws = stmt
        .query_map(params_from_iter(fragment.params.iter()), RawItemRow::from_sql_row)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    raws.into_iter().map(RawItemRow::into_item).collect()
}

pub fn explain_query_plan(
    conn: &Connection,
    predicate: &Predicate,
    order_by: &SortSpec,
    limit: usize,
) -> Result<Vec<String>, String> {
    let fragment = select_items_sql(predicate, order_by, limit, None);
    let explain_sql = format!("EXPLAIN QUERY PLAN {}", fragment.sql);
    let mut stmt = conn.prepare_cached(&explain_sql).map_err(|e| e.to_string())?;
    let lines = stmt
        .query_map(params_from_iter(fragment.params.iter()), |row| {
            row.get::<_, String>(3)
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(lines)
}
