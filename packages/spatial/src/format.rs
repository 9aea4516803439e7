//! Distance, travel-time, and share-link formatting.
//!
//! Unit labels here are fixed ASCII; localized wording belongs to the
//! presentation layer.

use std::fmt;

use anshin_navi_facility_models::Coordinate;

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Formats a distance as `"NNN m"` below one kilometer and `"N.N km"`
/// otherwise.
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if meters >= 1_000.0 {
        format!("{:.1} km", meters / 1_000.0)
    } else {
        format!("{meters:.0} m")
    }
}

/// A travel duration rounded up to its largest sensible unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelTime {
    /// Under one hour.
    Minutes(u64),
    /// Under one day.
    Hours(u64),
    /// One day or more.
    Days(u64),
}

impl TravelTime {
    /// Buckets an expected travel time given in seconds.
    ///
    /// Negative or non-finite inputs are treated as zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_seconds(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        let ceil = |unit: f64| (seconds / unit).ceil() as u64;

        if seconds < SECONDS_PER_HOUR {
            Self::Minutes(ceil(SECONDS_PER_MINUTE))
        } else if seconds < SECONDS_PER_DAY {
            Self::Hours(ceil(SECONDS_PER_HOUR))
        } else {
            Self::Days(ceil(SECONDS_PER_DAY))
        }
    }
}

impl fmt::Display for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(n) => write!(f, "{n} min"),
            Self::Hours(n) => write!(f, "{n} h"),
            Self::Days(n) => write!(f, "{n} d"),
        }
    }
}

/// Google Maps search link for a coordinate.
#[must_use]
pub fn google_maps_url(coordinate: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={:.6},{:.6}",
        coordinate.latitude, coordinate.longitude
    )
}

/// Apple Maps link for a coordinate.
#[must_use]
pub fn apple_maps_url(coordinate: Coordinate) -> String {
    format!(
        "http://maps.apple.com/?q={:.6},{:.6}",
        coordinate.latitude, coordinate.longitude
    )
}
