//! Filter → sort → truncate.
//!
//! All functions borrow from the catalog and return new `Vec`s of
//! references. Ordering is deterministic: sorts are stable and ties keep
//! catalog order.

use anshin_navi_facility_models::{Coordinate, Facility, FacilityPredicate, Region};
use anshin_navi_spatial::{LinearScan, RadiusSearch, distance_to};

/// Keeps the candidates accepted by every predicate.
///
/// An empty predicate list keeps everything.
pub fn filter_by_all<'a, F, P>(
    candidates: impl IntoIterator<Item = &'a F>,
    predicates: &[P],
) -> Vec<&'a F>
where
    F: 'a,
    P: FacilityPredicate<F>,
{
    candidates
        .into_iter()
        .filter(|candidate| predicates.iter().all(|p| p.matches(*candidate)))
        .collect()
}

/// Sorts candidates by ascending distance from `reference`.
///
/// The sort is stable: equally distant candidates keep their input order.
pub fn sort_by_distance<'a, F: Facility + 'a>(
    candidates: impl IntoIterator<Item = &'a F>,
    reference: Coordinate,
) -> Vec<&'a F> {
    let mut keyed: Vec<(f64, &'a F)> = candidates
        .into_iter()
        .map(|candidate| (distance_to(candidate, reference), candidate))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, candidate)| candidate).collect()
}

/// Keeps at most `max_count` leading elements.
#[must_use]
pub fn truncate<T>(mut list: Vec<T>, max_count: usize) -> Vec<T> {
    list.truncate(max_count);
    list
}

/// The nearest candidate accepted by every predicate.
///
/// A linear scan; on equal distances the earliest candidate wins.
pub fn closest_matching<'a, F, P>(
    candidates: impl IntoIterator<Item = &'a F>,
    reference: Coordinate,
    predicates: &[P],
) -> Option<&'a F>
where
    F: Facility + 'a,
    P: FacilityPredicate<F>,
{
    let mut best: Option<(f64, &'a F)> = None;

    for candidate in candidates {
        if !predicates.iter().all(|p| p.matches(candidate)) {
            continue;
        }
        let d = distance_to(candidate, reference);
        match best {
            Some((best_distance, _)) if d.total_cmp(&best_distance).is_ge() => {}
            _ => best = Some((d, candidate)),
        }
    }

    best.map(|(_, candidate)| candidate)
}

/// Result of a viewport query.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleQueryResult<'a, F> {
    /// Every facility in the viewport, sorted from the region center and
    /// capped.
    pub unfiltered_sorted: Vec<&'a F>,
    /// Facilities in the viewport passing all predicates, sorted from the
    /// region center and capped.
    pub visible_sorted: Vec<&'a F>,
    /// Number of facilities passing all predicates before capping.
    pub visible_count: usize,
}

impl<F> VisibleQueryResult<'_, F> {
    /// Whether the capped list holds fewer entries than matched.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.visible_sorted.len() < self.visible_count
    }
}

impl<F> Default for VisibleQueryResult<'_, F> {
    fn default() -> Self {
        Self {
            unfiltered_sorted: Vec::new(),
            visible_sorted: Vec::new(),
            visible_count: 0,
        }
    }
}

/// [`query_visible_with`] using a full linear scan.
pub fn query_visible<'a, F, P>(
    records: &'a [F],
    region: &Region,
    predicates: &[P],
    max_count: usize,
) -> VisibleQueryResult<'a, F>
where
    F: Facility,
    P: FacilityPredicate<F>,
{
    query_visible_with(&LinearScan, records, region, predicates, max_count)
}

/// Finds, filters, sorts, and caps the facilities inside a viewport.
///
/// 1. Candidates are the records within the viewport radius.
/// 2. With predicates, the visible set is the candidates passing all of
///    them; without, it is the candidates.
/// 3. Both sets are sorted by distance from the region center.
/// 4. `visible_count` is taken before capping.
/// 5. Both lists are capped at `max_count`.
pub fn query_visible_with<'a, F, P, S>(
    search: &S,
    records: &'a [F],
    region: &Region,
    predicates: &[P],
    max_count: usize,
) -> VisibleQueryResult<'a, F>
where
    F: Facility,
    P: FacilityPredicate<F>,
    S: RadiusSearch<F> + ?Sized,
{
    let unfiltered = search.within_viewport(records, region);
    let visible = if predicates.is_empty() {
        unfiltered.clone()
    } else {
        filter_by_all(unfiltered.iter().copied(), predicates)
    };

    let unfiltered_sorted = sort_by_distance(unfiltered, region.center);
    let visible_sorted = sort_by_distance(visible, region.center);
    let visible_count = visible_sorted.len();

    VisibleQueryResult {
        unfiltered_sorted: truncate(unfiltered_sorted, max_count),
        visible_sorted: truncate(visible_sorted, max_count),
        visible_count,
    }
}

/// Result of a "near this point" query.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<'a, F> {
    /// Matching facilities sorted by distance and capped.
    pub sorted: Vec<&'a F>,
    /// Number of matches before capping.
    pub total_count: usize,
}

/// Facilities within `radius_meters` of `center` passing all predicates,
/// nearest first.
pub fn nearby<'a, F, P, S>(
    search: &S,
    records: &'a [F],
    center: Coordinate,
    radius_meters: f64,
    predicates: &[P],
    max_count: usize,
) -> RankedResult<'a, F>
where
    F: Facility,
    P: FacilityPredicate<F>,
    S: RadiusSearch<F> + ?Sized,
{
    let candidates = search.within_radius(records, center, radius_meters);
    let sorted = sort_by_distance(filter_by_all(candidates, predicates), center);
    let total_count = sorted.len();
    RankedResult {
        sorted: truncate(sorted, max_count),
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use anshin_navi_facility::{Catalog, load_or_empty};
    use anshin_navi_facility_models::{
        PoliceBase, PoliceType, PoliceTypeSet, PredicateFn, Shelter, ShelterDataset,
        ShelterFilterType,
    };
    use anshin_navi_spatial::{SpatialIndex, distance, within_radius};

    use super::*;

    fn shelter(id: &str, lat: f64, lon: f64, earthquake: bool) -> Shelter {
        let mut s = Shelter::new(id, format!("Shelter {id}"), Coordinate::new(lat, lon));
        s.earthquake = earthquake;
        s
    }

    fn ids<F: Facility>(list: &[&F]) -> Vec<String> {
        list.iter().map(|f| f.id().to_string()).collect()
    }

    /// Three shelters north of (35.00, 139.00); the third is ~11 km out.
    fn scenario() -> Vec<Shelter> {
        vec![
            shelter("1", 35.00, 139.00, true),
            shelter("2", 35.01, 139.00, false),
            shelter("3", 35.10, 139.00, true),
        ]
    }

    #[test]
    fn end_to_end_scenario() {
        let shelters = scenario();
        let center = Coordinate::new(35.00, 139.00);

        let in_range = within_radius(&shelters, center, 2_000.0);
        assert_eq!(ids(&in_range), ["1", "2"]);

        let filtered = filter_by_all(in_range, &[ShelterFilterType::Earthquake]);
        assert_eq!(ids(&filtered), ["1"]);

        let closest = closest_matching(&shelters, center, &[ShelterFilterType::Earthquake]);
        let closest = closest.unwrap();
        assert_eq!(closest.id, "1");
        assert!(distance(closest.coordinate(), center).abs() < 1e-9);
    }

    #[test]
    fn empty_predicates_are_a_no_op() {
        let shelters = scenario();
        let none: &[ShelterFilterType] = &[];
        assert_eq!(filter_by_all(&shelters, none).len(), shelters.len());
    }

    #[test]
    fn single_predicate_equals_plain_filter() {
        let shelters = scenario();
        let expected: Vec<&Shelter> = shelters.iter().filter(|s| s.earthquake).collect();
        assert_eq!(
            filter_by_all(&shelters, &[ShelterFilterType::Earthquake]),
            expected
        );
    }

    #[test]
    fn predicates_combine_with_and_in_any_order() {
        let mut shelters = scenario();
        shelters[0].tsunami = true;
        shelters[1].tsunami = true;

        let a = filter_by_all(
            &shelters,
            &[ShelterFilterType::Earthquake, ShelterFilterType::Tsunami],
        );
        let b = filter_by_all(
            &shelters,
            &[ShelterFilterType::Tsunami, ShelterFilterType::Earthquake],
        );
        let chained = filter_by_all(
            filter_by_all(&shelters, &[ShelterFilterType::Earthquake]),
            &[ShelterFilterType::Tsunami],
        );
        assert_eq!(ids(&a), ["1"]);
        assert_eq!(a, b);
        assert_eq!(a, chained);
    }

    #[test]
    fn mixed_predicates_through_trait_objects() {
        let shelters = scenario();
        let named = PredicateFn(|s: &Shelter| s.id != "1");
        let predicates: [&dyn FacilityPredicate<Shelter>; 2] =
            [&ShelterFilterType::Earthquake, &named];
        assert_eq!(ids(&filter_by_all(&shelters, &predicates)), ["3"]);
    }

    #[test]
    fn police_filter_is_set_membership() {
        let stations = vec![
            PoliceBase::new("k", PoliceType::Koban, "K", Coordinate::new(35.0, 139.0)),
            PoliceBase::new("s", PoliceType::Keisatsusho, "S", Coordinate::new(35.0, 139.0)),
            PoliceBase::new("h", PoliceType::Honbu, "H", Coordinate::new(35.0, 139.0)),
        ];
        let set: PoliceTypeSet = [PoliceType::Keisatsusho, PoliceType::Honbu]
            .into_iter()
            .collect();
        assert_eq!(ids(&filter_by_all(&stations, &[set])), ["s", "h"]);
    }

    #[test]
    fn sort_is_non_decreasing() {
        let shelters: Vec<Shelter> = (0..30)
            .map(|i| {
                let t = f64::from(i);
                shelter(
                    &format!("s{i}"),
                    (t * 0.618).fract().mul_add(0.1, 35.0),
                    (t * 0.414).fract().mul_add(0.1, 139.0),
                    false,
                )
            })
            .collect();
        let reference = Coordinate::new(35.05, 139.05);

        let sorted = sort_by_distance(&shelters, reference);
        assert_eq!(sorted.len(), shelters.len());
        for pair in sorted.windows(2) {
            assert!(distance_to(pair[0], reference) <= distance_to(pair[1], reference));
        }
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let shelters = vec![
            shelter("far", 35.02, 139.0, false),
            shelter("tie-a", 35.01, 139.0, false),
            shelter("tie-b", 35.01, 139.0, false),
            shelter("near", 35.0, 139.0, false),
            shelter("tie-c", 35.01, 139.0, false),
        ];
        let reference = Coordinate::new(35.0, 139.0);
        let first = sort_by_distance(&shelters, reference);
        assert_eq!(ids(&first), ["near", "tie-a", "tie-b", "tie-c", "far"]);
        assert_eq!(sort_by_distance(first.iter().copied(), reference), first);
    }

    #[test]
    fn truncate_caps_but_never_pads() {
        assert_eq!(truncate(vec![1, 2, 3], 2), [1, 2]);
        assert_eq!(truncate(vec![1, 2, 3], 10), [1, 2, 3]);
        assert!(truncate(vec![1, 2, 3], 0).is_empty());
    }

    #[test]
    fn closest_tie_goes_to_first_in_catalog() {
        let reference = Coordinate::new(35.0, 139.0);
        let tied = vec![
            shelter("far", 35.05, 139.0, true),
            shelter("a", 35.01, 139.0, true),
            shelter("b", 35.01, 139.0, true),
        ];
        let none: &[ShelterFilterType] = &[];
        assert_eq!(
            closest_matching(&tied, reference, none).map(|s| s.id.as_str()),
            Some("a")
        );

        let mut reversed = tied;
        reversed.reverse();
        assert_eq!(
            closest_matching(&reversed, reference, none).map(|s| s.id.as_str()),
            Some("b")
        );
    }

    #[test]
    fn closest_matching_absent_cases() {
        let reference = Coordinate::new(35.0, 139.0);
        let empty: Vec<Shelter> = Vec::new();
        assert!(closest_matching(&empty, reference, &[ShelterFilterType::Fire]).is_none());
        assert!(closest_matching(&scenario(), reference, &[ShelterFilterType::Volcano]).is_none());
    }

    #[test]
    fn closest_ignores_viewport() {
        let shelters = scenario();
        let from_far = Coordinate::new(36.0, 139.0);
        let closest = closest_matching(&shelters, from_far, &[ShelterFilterType::Earthquake]);
        assert_eq!(closest.map(|s| s.id.as_str()), Some("3"));
    }

    fn grid(count: u32) -> Vec<Shelter> {
        (0..count)
            .map(|i| {
                let row = f64::from(i / 25);
                let col = f64::from(i % 25);
                shelter(
                    &format!("s{i}"),
                    row.mul_add(0.000_5, 35.0),
                    col.mul_add(0.000_5, 139.0),
                    i % 5 != 0,
                )
            })
            .collect()
    }

    #[test]
    fn count_is_taken_before_truncation() {
        let shelters = grid(250);
        let region = Region::new(Coordinate::new(35.0025, 139.006), 0.1, 0.1);

        let none: &[ShelterFilterType] = &[];
        let result = query_visible(&shelters, &region, none, 200);
        assert_eq!(result.visible_count, 250);
        assert_eq!(result.visible_sorted.len(), 200);
        assert_eq!(result.unfiltered_sorted.len(), 200);
        assert!(result.is_truncated());

        let filtered = query_visible(&shelters, &region, &[ShelterFilterType::Earthquake], 100);
        assert_eq!(filtered.visible_count, 200);
        assert_eq!(filtered.visible_sorted.len(), 100);
        assert_eq!(filtered.unfiltered_sorted.len(), 100);
        assert!(filtered.visible_sorted.iter().all(|s| s.earthquake));
    }

    #[test]
    fn visible_lists_sorted_from_region_center() {
        let shelters = scenario();
        let region = Region::new(Coordinate::new(35.01, 139.0), 0.05, 0.05);
        let result = query_visible(&shelters, &region, &[ShelterFilterType::Earthquake], 200);

        assert_eq!(ids(&result.unfiltered_sorted), ["2", "1"]);
        assert_eq!(ids(&result.visible_sorted), ["1"]);
        assert_eq!(result.visible_count, 1);
    }

    #[test]
    fn without_predicates_visible_equals_unfiltered() {
        let shelters = grid(60);
        let region = Region::new(Coordinate::new(35.0, 139.0), 0.01, 0.01);
        let none: &[ShelterFilterType] = &[];
        let result = query_visible(&shelters, &region, none, 200);
        assert_eq!(result.visible_sorted, result.unfiltered_sorted);
        assert_eq!(result.visible_count, result.unfiltered_sorted.len());
    }

    #[test]
    fn indexed_and_scanned_queries_agree() {
        let shelters = grid(250);
        let index = SpatialIndex::build(&shelters);
        let region = Region::new(Coordinate::new(35.003, 139.004), 0.004, 0.006);
        let predicates = [ShelterFilterType::Earthquake];

        let scanned = query_visible(&shelters, &region, &predicates, 50);
        let indexed = query_visible_with(&index, &shelters, &region, &predicates, 50);
        assert_eq!(scanned, indexed);
    }

    #[test]
    fn missing_dataset_yields_empty_results() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, err) = load_or_empty::<ShelterDataset>(&dir.path().join("shelters.json"));
        assert!(err.is_some());

        let region = Region::new(Coordinate::new(35.0, 139.0), 1.0, 1.0);
        for predicates in [vec![], vec![ShelterFilterType::Tsunami]] {
            let result = query_visible(catalog.records(), &region, &predicates[..], 200);
            assert_eq!(result, VisibleQueryResult::default());
        }
        assert!(
            closest_matching(&catalog, region.center, &[ShelterFilterType::Tsunami]).is_none()
        );
    }

    #[test]
    fn nearby_filters_sorts_and_counts() {
        let catalog = Catalog::new(scenario());
        let center = Coordinate::new(35.0, 139.0);
        let none: &[ShelterFilterType] = &[];

        let result = nearby(&LinearScan, catalog.records(), center, 2_000.0, none, 1);
        assert_eq!(result.total_count, 2);
        assert_eq!(ids(&result.sorted), ["1"]);

        let quake = nearby(
            &LinearScan,
            catalog.records(),
            center,
            20_000.0,
            &[ShelterFilterType::Earthquake],
            10,
        );
        assert_eq!(ids(&quake.sorted), ["1", "3"]);
    }
}
