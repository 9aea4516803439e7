#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Distance math and radius queries over facility catalogs.
//!
//! Distances are great-circle distances on a spherical Earth (haversine).
//! [`within_radius`] is a full linear scan and serves as the reference
//! result; [`SpatialIndex`] answers the same question through an R-tree
//! and returns an identical, catalog-ordered set.

pub mod format;
pub mod index;

use anshin_navi_facility_models::{Coordinate, Facility, Region};

pub use index::SpatialIndex;

/// Mean Earth radius used for all distance calculations, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Flat conversion from degrees of span to meters used for viewports.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Great-circle distance between two points in meters.
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let sin_half_phi = (delta_phi / 2.0).sin();
    let sin_half_lambda = (delta_lambda / 2.0).sin();

    // Clamped so rounding near antipodes cannot push 1 - h negative.
    let h = sin_half_phi
        .mul_add(
            sin_half_phi,
            phi1.cos() * phi2.cos() * sin_half_lambda * sin_half_lambda,
        )
        .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Distance from `reference` to a facility.
#[must_use]
pub fn distance_to<F: Facility + ?Sized>(facility: &F, reference: Coordinate) -> f64 {
    distance(facility.coordinate(), reference)
}

/// Radius, in meters, that covers a viewport.
///
/// Half of the larger span, converted at a flat 111 km per degree. No
/// cosine-of-latitude correction is applied, so east-west extents are
/// overestimated away from the equator.
#[must_use]
pub fn radius_for_viewport(region: &Region) -> f64 {
    let lat = region.span.latitude_delta * METERS_PER_DEGREE / 2.0;
    let lon = region.span.longitude_delta * METERS_PER_DEGREE / 2.0;
    lat.max(lon)
}

/// Facilities within `radius_meters` of `center`, in input order.
///
/// A facility exactly `radius_meters` away is included.
pub fn within_radius<'a, F: Facility + 'a>(
    facilities: impl IntoIterator<Item = &'a F>,
    center: Coordinate,
    radius_meters: f64,
) -> Vec<&'a F> {
    facilities
        .into_iter()
        .filter(|f| distance_to(*f, center) <= radius_meters)
        .collect()
}

/// Facilities inside a viewport: [`within_radius`] around its center
/// with [`radius_for_viewport`].
pub fn within_viewport<'a, F: Facility + 'a>(
    facilities: impl IntoIterator<Item = &'a F>,
    region: &Region,
) -> Vec<&'a F> {
    within_radius(facilities, region.center, radius_for_viewport(region))
}

/// A strategy for answering radius queries over a record slice.
pub trait RadiusSearch<F> {
    /// Records within `radius_meters` of `center`, in slice order.
    fn within_radius<'a>(
        &self,
        records: &'a [F],
        center: Coordinate,
        radius_meters: f64,
    ) -> Vec<&'a F>;

    /// Records inside `region`, in slice order.
    fn within_viewport<'a>(&self, records: &'a [F], region: &Region) -> Vec<&'a F> {
        self.within_radius(records, region.center, radius_for_viewport(region))
    }
}

/// Full scan of every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearScan;

impl<F: Facility> RadiusSearch<F> for LinearScan {
    fn within_radius<'a>(
        &self,
        records: &'a [F],
        center: Coordinate,
        radius_meters: f64,
    ) -> Vec<&'a F> {
        within_radius(records, center, radius_meters)
    }
}

#[cfg(test)]
mod tests {
    use anshin_navi_facility_models::Shelter;

    use super::*;

    const EPSILON: f64 = 1e-6;

    fn points() -> Vec<Coordinate> {
        vec![
            Coordinate::new(35.6812, 139.7671),
            Coordinate::new(34.7025, 135.4959),
            Coordinate::new(43.0687, 141.3508),
            Coordinate::new(26.2124, 127.6792),
            Coordinate::new(-33.8688, 151.2093),
            Coordinate::new(51.5074, -0.1278),
            Coordinate::new(0.0, 179.9),
            Coordinate::new(0.0, -179.9),
        ]
    }

    #[test]
    fn zero_for_identical_points() {
        for p in points() {
            assert!(distance(p, p).abs() < EPSILON);
        }
    }

    #[test]
    fn symmetric() {
        for a in points() {
            for b in points() {
                assert!(
                    (distance(a, b) - distance(b, a)).abs() < EPSILON,
                    "asymmetric for {a:?} / {b:?}"
                );
            }
        }
    }

    #[test]
    fn triangle_inequality() {
        let pts = points();
        for a in &pts {
            for b in &pts {
                for c in &pts {
                    let direct = distance(*a, *c);
                    let via = distance(*a, *b) + distance(*b, *c);
                    assert!(direct <= via + 1e-3, "{a:?} -> {b:?} -> {c:?}");
                }
            }
        }
    }

    #[test]
    fn positive_for_distinct_points() {
        let a = Coordinate::new(35.0, 139.0);
        let b = Coordinate::new(35.000_001, 139.0);
        assert!(distance(a, b) > 0.0);
    }

    #[test]
    fn hundredth_of_a_degree_of_latitude() {
        let d = distance(Coordinate::new(35.0, 139.0), Coordinate::new(35.01, 139.0));
        let expected = EARTH_RADIUS_METERS * 0.01_f64.to_radians();
        assert!((d - expected).abs() < 0.01, "got {d}");
    }

    #[test]
    fn antimeridian_is_short() {
        let d = distance(Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9));
        assert!(d < 25_000.0, "got {d}");
    }

    #[test]
    fn viewport_radius_uses_larger_span() {
        let center = Coordinate::new(35.0, 139.0);
        assert!((radius_for_viewport(&Region::new(center, 0.02, 0.01)) - 1110.0).abs() < EPSILON);
        assert!((radius_for_viewport(&Region::new(center, 0.01, 0.04)) - 2220.0).abs() < EPSILON);
    }

    #[test]
    fn viewport_radius_has_no_latitude_correction() {
        let equator = Region::new(Coordinate::new(0.0, 139.0), 0.1, 0.1);
        let north = Region::new(Coordinate::new(70.0, 139.0), 0.1, 0.1);
        assert!((radius_for_viewport(&equator) - radius_for_viewport(&north)).abs() < EPSILON);
    }

    fn meridian_line() -> Vec<Shelter> {
        (0..20)
            .map(|i| {
                let lat = f64::from(i).mul_add(0.005, 35.0);
                Shelter::new(format!("s{i}"), format!("Shelter {i}"), Coordinate::new(lat, 139.0))
            })
            .collect()
    }

    #[test]
    fn radius_is_inclusive() {
        let shelters = meridian_line();
        let center = Coordinate::new(35.0, 139.0);
        let edge = distance_to(&shelters[3], center);
        let found = within_radius(&shelters, center, edge);
        assert_eq!(found.len(), 4);
        assert_eq!(found.last().map(|s| s.id.as_str()), Some("s3"));
    }

    #[test]
    fn radius_monotonicity() {
        let shelters = meridian_line();
        let center = Coordinate::new(35.02, 139.001);
        let radii = [0.0, 100.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 20_000.0];
        for pair in radii.windows(2) {
            let small = within_radius(&shelters, center, pair[0]);
            let large = within_radius(&shelters, center, pair[1]);
            assert!(small.iter().all(|s| large.iter().any(|l| l.id == s.id)));
            assert!(small.len() <= large.len());
        }
    }

    #[test]
    fn scan_keeps_input_order() {
        let mut shelters = meridian_line();
        shelters.reverse();
        let found = within_radius(&shelters, Coordinate::new(35.0, 139.0), 1_200.0);
        let ids: Vec<&str> = found.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s2", "s1", "s0"]);
    }

    #[test]
    fn viewport_delegates_to_radius() {
        let shelters = meridian_line();
        let region = Region::new(Coordinate::new(35.0, 139.0), 0.04, 0.02);
        let by_viewport = within_viewport(&shelters, &region);
        let by_radius = within_radius(&shelters, region.center, 2_220.0);
        assert_eq!(by_viewport, by_radius);
        assert_eq!(LinearScan.within_viewport(&shelters, &region), by_radius);
    }

    #[test]
    fn empty_input() {
        let shelters: Vec<Shelter> = Vec::new();
        assert!(within_radius(&shelters, Coordinate::new(35.0, 139.0), 1e9).is_empty());
    }
}
