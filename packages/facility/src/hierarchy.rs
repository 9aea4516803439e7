//! Police hierarchy resolution (koban → keisatsusho → honbu).
//!
//! Parent links are ids resolved through [`Catalog::by_id`]. A link only
//! counts when it lands on the tier directly above.

use std::collections::BTreeSet;

use anshin_navi_facility_models::{PoliceBase, PoliceType};

use crate::Catalog;

/// Longest possible chain: koban, keisatsusho, honbu.
pub const MAX_HIERARCHY_DEPTH: usize = PoliceType::all().len();

/// Resolves the facility one tier above `station`.
///
/// Honbu has no parent, whatever its stored `parent` says. A parent id
/// that is missing from the catalog or points at the wrong tier resolves
/// to `None`.
#[must_use]
pub fn parent_of<'a>(
    catalog: &'a Catalog<PoliceBase>,
    station: &PoliceBase,
) -> Option<&'a PoliceBase> {
    let expected = station.police_type.parent_type()?;
    let parent_id = station.parent.as_deref()?;
    catalog
        .by_id(parent_id)
        .filter(|parent| parent.police_type == expected)
}

/// Returns `station` followed by each resolved ancestor, leaf first.
///
/// Stops at the first unresolvable link, at a repeated id, or after
/// [`MAX_HIERARCHY_DEPTH`] entries.
#[must_use]
pub fn hierarchy_chain<'a>(
    catalog: &'a Catalog<PoliceBase>,
    station: &'a PoliceBase,
) -> Vec<&'a PoliceBase> {
    let mut chain = vec![station];
    let mut visited = BTreeSet::from([station.id.as_str()]);
    let mut current = station;

    while chain.len() < MAX_HIERARCHY_DEPTH {
        let Some(parent) = parent_of(catalog, current) else {
            break;
        };
        if !visited.insert(parent.id.as_str()) {
            log::warn!(
                "Police hierarchy cycle at {} while resolving {}",
                parent.id,
                station.id
            );
            break;
        }
        chain.push(parent);
        current = parent;
    }

    chain
}
