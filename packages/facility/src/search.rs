//! Keyword and region lookups over already-selected facilities.
//!
//! Matching is a case-insensitive substring test on the trimmed
//! keyword. An empty keyword keeps every input.

use anshin_navi_facility_models::{PoliceBase, Shelter};

use crate::Catalog;

fn normalize(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Shelters whose name contains `keyword`.
pub fn search_shelters<'a>(
    shelters: impl IntoIterator<Item = &'a Shelter>,
    keyword: &str,
) -> Vec<&'a Shelter> {
    let needle = normalize(keyword);
    shelters
        .into_iter()
        .filter(|s| needle.is_empty() || contains(&s.name, &needle))
        .collect()
}

/// Police facilities whose name or prefecture contains `keyword`.
pub fn search_police<'a>(
    stations: impl IntoIterator<Item = &'a PoliceBase>,
    keyword: &str,
) -> Vec<&'a PoliceBase> {
    let needle = normalize(keyword);
    stations
        .into_iter()
        .filter(|p| {
            needle.is_empty() || contains(&p.name, &needle) || contains(&p.prefecture, &needle)
        })
        .collect()
}

/// Shelters registered under a municipality code, in catalog order.
#[must_use]
pub fn shelters_in_region<'a>(catalog: &'a Catalog<Shelter>, region_code: &str) -> Vec<&'a Shelter> {
    catalog
        .iter()
        .filter(|s| s.region_code == region_code)
        .collect()
}
