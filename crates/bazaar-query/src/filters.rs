// SPDX-License-Identifier: Apache-2.0

use crate::predicate::{NameMatch, Predicate};
use bazaar_model::FilterSelection;

/// One "links to option named V" term per selected value, all conjoined.
/// An empty selection matches everything.
#[must_use]
pub fn filter_predicate(selection: &FilterSelection) -> Predicate {
    Predicate::and(selection.iter().flat_map(|(facet, values)| {
        values.iter().map(move |value| Predicate::Linked {
            facet,
            name: NameMatch::Equals(value.clone()),
        })
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_model::FacetKind;

    #[test]
    fn empty_selection_is_unfiltered() {
        assert_eq!(filter_predicate(&FilterSelection::new()), Predicate::True);
    }

    #[test]
    fn values_conjoin_within_and_across_facets() {
        let selection = FilterSelection::new()
            .with(FacetKind::Tag, &["Cute", "Agriculture"])
            .with(FacetKind::Genre, &["Sim"]);
        let Predicate::And(parts) = filter_predicate(&selection) else {
            panic!("expected conjunction");
        };
        assert_eq!(parts.len(), 3);
        assert!(parts.contains(&Predicate::Linked {
            facet: FacetKind::Tag,
            name: NameMatch::Equals("Agriculture".to_string()),
        }));
    }
}
