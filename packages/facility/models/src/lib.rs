#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shelter and police facility types shared by the proximity index.
//!
//! These are the records loaded from the bundled datasets: designated
//! emergency evacuation shelters and the three tiers of police
//! facilities. Both variants expose their location through the
//! [`Facility`] capability so that distance queries, filters, and ranking
//! are written once and reused for either catalog.

pub mod police;
pub mod shelter;

use serde::{Deserialize, Serialize};

pub use police::{PoliceBase, PoliceDataset, PoliceType, PoliceTypeSet};
pub use shelter::{Shelter, ShelterDataset, ShelterFilterType};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without range checking.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a coordinate, rejecting values outside the WGS84 range.
    ///
    /// # Errors
    ///
    /// Returns an error if either component is non-finite, the latitude is
    /// outside `[-90, 90]`, or the longitude is outside `[-180, 180]`.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        let coordinate = Self::new(latitude, longitude);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(InvalidCoordinateError {
                latitude,
                longitude,
            })
        }
    }

    /// Whether both components are finite and within the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Error returned when a coordinate falls outside the WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidCoordinateError {
    /// The rejected latitude.
    pub latitude: f64,
    /// The rejected longitude.
    pub longitude: f64,
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid coordinate ({}, {}): expected latitude in [-90, 90] and longitude in [-180, 180]",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Latitude/longitude extent of a viewport, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// North-south extent in degrees.
    pub latitude_delta: f64,
    /// East-west extent in degrees.
    pub longitude_delta: f64,
}

/// The visible rectangular map region: a center plus its span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center of the viewport.
    pub center: Coordinate,
    /// Extent of the viewport.
    pub span: Span,
}

impl Region {
    /// Creates a region from a center and a latitude/longitude span.
    #[must_use]
    pub const fn new(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            center,
            span: Span {
                latitude_delta,
                longitude_delta,
            },
        }
    }
}

/// A point-located entity in a catalog.
pub trait Facility {
    /// Stable identifier, unique within the variant's catalog.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Location of the facility.
    fn coordinate(&self) -> Coordinate;
}

/// A category filter over one facility variant.
///
/// Multiple predicates combine with AND semantics in the ranking
/// pipeline.
pub trait FacilityPredicate<F: ?Sized> {
    /// Whether `facility` is accepted by this predicate.
    fn matches(&self, facility: &F) -> bool;
}

impl<F: ?Sized, P: FacilityPredicate<F> + ?Sized> FacilityPredicate<F> for &P {
    fn matches(&self, facility: &F) -> bool {
        (**self).matches(facility)
    }
}

/// Adapts a closure into a [`FacilityPredicate`].
#[derive(Debug, Clone, Copy)]
pub struct PredicateFn<G>(pub G);

impl<F: ?Sized, G: Fn(&F) -> bool> FacilityPredicate<F> for PredicateFn<G> {
    fn matches(&self, facility: &F) -> bool {
        (self.0)(facility)
    }
}

/// A record collection as it is wrapped on disk, e.g. `{ "shelters": [...] }`.
pub trait Dataset: serde::de::DeserializeOwned {
    /// The record type held by the dataset.
    type Record: Facility;

    /// Short label used in log messages (e.g. `"shelter"`).
    const KIND: &'static str;

    /// Unwraps the dataset into its records, in file order.
    fn into_records(self) -> Vec<Self::Record>;
}
