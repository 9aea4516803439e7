//! Designated emergency evacuation shelters.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{Coordinate, Dataset, Facility, FacilityPredicate};

/// A designated emergency evacuation location.
///
/// Each hazard flag records whether the site is rated safe against that
/// hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelter {
    /// Unique identifier.
    pub id: String,
    /// Municipality code (e.g. `"13101"`).
    #[serde(default)]
    pub region_code: String,
    /// Prefecture and municipality name.
    #[serde(default)]
    pub region_name: String,
    /// Municipal registration number.
    #[serde(default)]
    pub number: String,
    /// Facility or site name.
    pub name: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Rated for river flooding.
    #[serde(default)]
    pub general_flooding: bool,
    /// Rated for cliff collapse, debris flow, and landslides.
    #[serde(default)]
    pub landslide: bool,
    /// Rated for storm surge.
    #[serde(default)]
    pub high_tide: bool,
    /// Rated for earthquakes.
    #[serde(default)]
    pub earthquake: bool,
    /// Rated for tsunami.
    #[serde(default)]
    pub tsunami: bool,
    /// Rated for large-scale fire.
    #[serde(default)]
    pub fire: bool,
    /// Rated for inland (drainage) flooding.
    #[serde(default)]
    pub internal_flooding: bool,
    /// Rated for volcanic phenomena.
    #[serde(default)]
    pub volcano: bool,
    /// Also registered at the same address as a designated long-term
    /// evacuation center.
    #[serde(default)]
    pub is_same_as_evacuation_center: bool,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Free-text remarks.
    #[serde(default)]
    pub additional_info: String,
}

impl Shelter {
    /// Creates a shelter with no hazard ratings and empty text fields.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            region_code: String::new(),
            region_name: String::new(),
            number: String::new(),
            name: name.into(),
            address: String::new(),
            general_flooding: false,
            landslide: false,
            high_tide: false,
            earthquake: false,
            tsunami: false,
            fire: false,
            internal_flooding: false,
            volcano: false,
            is_same_as_evacuation_center: false,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            additional_info: String::new(),
        }
    }

    /// Returns the hazard filters this shelter satisfies, in
    /// [`ShelterFilterType::all`] order.
    #[must_use]
    pub fn supported_filters(&self) -> Vec<ShelterFilterType> {
        ShelterFilterType::all()
            .iter()
            .copied()
            .filter(|filter| filter.matches(self))
            .collect()
    }
}

impl Facility for Shelter {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// One selectable shelter filter: a hazard rating or the
/// evacuation-center dual registration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShelterFilterType {
    /// [`Shelter::general_flooding`]
    GeneralFlooding,
    /// [`Shelter::landslide`]
    Landslide,
    /// [`Shelter::high_tide`]
    HighTide,
    /// [`Shelter::earthquake`]
    Earthquake,
    /// [`Shelter::tsunami`]
    Tsunami,
    /// [`Shelter::fire`]
    Fire,
    /// [`Shelter::internal_flooding`]
    InternalFlooding,
    /// [`Shelter::volcano`]
    Volcano,
    /// [`Shelter::is_same_as_evacuation_center`]
    IsSameAsEvacuationCenter,
}

impl ShelterFilterType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::GeneralFlooding,
            Self::Landslide,
            Self::HighTide,
            Self::Earthquake,
            Self::Tsunami,
            Self::Fire,
            Self::InternalFlooding,
            Self::Volcano,
            Self::IsSameAsEvacuationCenter,
        ]
    }

    /// Reads the flag this filter corresponds to.
    #[must_use]
    pub const fn matches(self, shelter: &Shelter) -> bool {
        match self {
            Self::GeneralFlooding => shelter.general_flooding,
            Self::Landslide => shelter.landslide,
            Self::HighTide => shelter.high_tide,
            Self::Earthquake => shelter.earthquake,
            Self::Tsunami => shelter.tsunami,
            Self::Fire => shelter.fire,
            Self::InternalFlooding => shelter.internal_flooding,
            Self::Volcano => shelter.volcano,
            Self::IsSameAsEvacuationCenter => shelter.is_same_as_evacuation_center,
        }
    }
}

impl FacilityPredicate<Shelter> for ShelterFilterType {
    fn matches(&self, facility: &Shelter) -> bool {
        Self::matches(*self, facility)
    }
}

/// On-disk wrapper: `{ "shelters": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelterDataset {
    /// All shelter records, in file order.
    pub shelters: Vec<Shelter>,
}

impl Dataset for ShelterDataset {
    type Record = Shelter;

    const KIND: &'static str = "shelter";

    fn into_records(self) -> Vec<Shelter> {
        self.shelters
    }
}
