//! R-tree accelerated radius queries.
//!
//! The tree narrows candidates to a conservative latitude/longitude
//! envelope around the query circle; every candidate is then checked
//! with the exact haversine [`distance`](crate::distance). Results are
//! returned in slice order so they match [`within_radius`] exactly.

use anshin_navi_facility_models::{Coordinate, Facility};
use rstar::{AABB, RTree, RTreeObject};

use crate::{EARTH_RADIUS_METERS, RadiusSearch, distance_to, within_radius};

/// Slack added to every envelope edge, in degrees.
const ENVELOPE_PADDING_DEGREES: f64 = 1e-6;

/// One record position stored in the R-tree.
struct IndexedPoint {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over the positions of one record slice.
///
/// Built once per catalog and queried with that same slice.
pub struct SpatialIndex {
    tree: RTree<IndexedPoint>,
    /// Records whose stored coordinates are out of range; always checked
    /// by exact distance.
    unindexed: Vec<usize>,
    len: usize,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("indexed", &self.tree.size())
            .field("unindexed", &self.unindexed.len())
            .finish()
    }
}

impl SpatialIndex {
    /// Bulk-loads an index over `records`.
    #[must_use]
    pub fn build<F: Facility>(records: &[F]) -> Self {
        let mut points = Vec::with_capacity(records.len());
        let mut unindexed = Vec::new();

        for (position, record) in records.iter().enumerate() {
            let c = record.coordinate();
            if c.is_valid() {
                points.push(IndexedPoint {
                    position,
                    envelope: AABB::from_point([c.longitude, c.latitude]),
                });
            } else {
                unindexed.push(position);
            }
        }

        if !unindexed.is_empty() {
            log::warn!(
                "{} records have out-of-range coordinates and bypass the spatial index",
                unindexed.len()
            );
        }

        Self {
            tree: RTree::bulk_load(points),
            unindexed,
            len: records.len(),
        }
    }

    /// Number of records the index was built over.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the index was built over an empty slice.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<F: Facility> RadiusSearch<F> for SpatialIndex {
    fn within_radius<'a>(
        &self,
        records: &'a [F],
        center: Coordinate,
        radius_meters: f64,
    ) -> Vec<&'a F> {
        if records.len() != self.len {
            log::warn!(
                "Spatial index built over {} records queried with {}; scanning",
                self.len,
                records.len()
            );
            return within_radius(records, center, radius_meters);
        }

        let Some(envelope) = query_envelope(center, radius_meters) else {
            log::debug!("Query circle around {center:?} has no flat envelope; scanning");
            return within_radius(records, center, radius_meters);
        };

        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|point| point.position)
            .chain(self.unindexed.iter().copied())
            .filter(|&position| distance_to(&records[position], center) <= radius_meters)
            .collect();
        positions.sort_unstable();

        positions.into_iter().map(|position| &records[position]).collect()
    }
}

/// Lon/lat box containing every point within `radius_meters` of `center`.
///
/// Returns `None` when no such box exists without wrapping: the circle
/// reaches a pole or crosses the antimeridian, or the inputs are not
/// usable.
fn query_envelope(center: Coordinate, radius_meters: f64) -> Option<AABB<[f64; 2]>> {
    if !center.is_valid() || !radius_meters.is_finite() || radius_meters < 0.0 {
        return None;
    }

    let angular = radius_meters / EARTH_RADIUS_METERS;
    let lat = center.latitude.to_radians();
    let half_pi = std::f64::consts::FRAC_PI_2;
    if lat + angular >= half_pi || lat - angular <= -half_pi {
        return None;
    }

    let lat_delta = angular.to_degrees() + ENVELOPE_PADDING_DEGREES;
    let lon_delta = (angular.sin() / lat.cos()).asin().to_degrees() + ENVELOPE_PADDING_DEGREES;

    let west = center.longitude - lon_delta;
    let east = center.longitude + lon_delta;
    if west < -180.0 || east > 180.0 {
        return None;
    }

    Some(AABB::from_corners(
        [west, center.latitude - lat_delta],
        [east, center.latitude + lat_delta],
    ))
}
