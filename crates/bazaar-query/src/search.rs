// SPDX-License-Identifier: Apache-2.0

use crate::predicate::{NameMatch, Predicate};
use bazaar_model::FacetKind;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

const TRADEMARK_GLYPHS: [char; 4] = ['\u{2122}', '\u{00AE}', '\u{00A9}', '\u{2120}'];

/// Facets whose linked option names a single search token may match.
const SEARCH_LINKED_FACETS: [FacetKind; 2] = [FacetKind::Publisher, FacetKind::Tag];

/// Canonical search text: trademark glyphs dropped, NFKC + lowercase,
/// non-word runs folded to single spaces.
#[must_use]
pub fn normalize_search(input: &str) -> String {
    // Strip before NFKC, which would otherwise expand `™` to `TM`.
    let stripped: String = input
        .chars()
        .filter(|c| !TRADEMARK_GLYPHS.contains(c))
        .collect();
    let folded: String = stripped
        .nfkc()
        .collect::<String>()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed and cut to at most `max_chars` characters.
#[must_use]
pub fn bounded_search_text(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect::<String>().trim_end().to_string()
}

/// Text used for the boost prefix lookups, if the query has any word content.
#[must_use]
pub fn boost_term(text: &str) -> Option<String> {
    let normalized = normalize_search(text);
    (!normalized.is_empty()).then_some(normalized)
}

/// Publisher and tag ids pre-resolved by prefix lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchBoost {
    pub publisher_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
}

impl SearchBoost {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.publisher_ids.is_empty() && self.tag_ids.is_empty()
    }

    /// Id-membership branch; `False` when nothing resolved.
    #[must_use]
    pub fn predicate(&self) -> Predicate {
        Predicate::or([
            Predicate::linked_id_in(FacetKind::Publisher, self.publisher_ids.clone()),
            Predicate::linked_id_in(FacetKind::Tag, self.tag_ids.clone()),
        ])
    }
}

/// Free-text predicate. The raw and normalized spellings are unioned so
/// names carrying punctuation stay reachable either way. Blank text matches
/// everything.
#[must_use]
pub fn search_predicate(text: &str, boost: Option<&SearchBoost>) -> Predicate {
    let raw = text.trim();
    if raw.is_empty() {
        return Predicate::True;
    }
    let normalized = normalize_search(raw);
    let mut branches = vec![token_predicate(raw)];
    if normalized != raw {
        branches.push(token_predicate(&normalized));
    }
    if let Some(boost) = boost {
        branches.push(boost.predicate());
    }
    Predicate::or(branches)
}

fn token_predicate(text: &str) -> Predicate {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Predicate::False,
        [token] => {
            let mut branches = vec![
                Predicate::Name(NameMatch::Contains((*token).to_string())),
                Predicate::Name(NameMatch::Prefix((*token).to_string())),
            ];
            for facet in SEARCH_LINKED_FACETS {
                branches.push(Predicate::Linked {
                    facet,
                    name: NameMatch::Contains((*token).to_string()),
                });
                branches.push(Predicate::Linked {
                    facet,
                    name: NameMatch::Prefix((*token).to_string()),
                });
            }
            Predicate::or(branches)
        }
        _ => Predicate::and(
            tokens
                .iter()
                .map(|t| Predicate::Name(NameMatch::Contains((*t).to_string()))),
        ),
    }
}
