//! Police facilities and their three-tier hierarchy.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::{Coordinate, Dataset, Facility, FacilityPredicate};

/// Tier of a police facility, lowest first.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PoliceType {
    /// Police box or residential post (交番・駐在所).
    Koban,
    /// Police station (警察署).
    Keisatsusho,
    /// Prefectural headquarters (本部).
    Honbu,
}

impl PoliceType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Koban, Self::Keisatsusho, Self::Honbu]
    }

    /// The tier a facility of this type reports to, if any.
    #[must_use]
    pub const fn parent_type(self) -> Option<Self> {
        match self {
            Self::Koban => Some(Self::Keisatsusho),
            Self::Keisatsusho => Some(Self::Honbu),
            Self::Honbu => None,
        }
    }
}

impl FacilityPredicate<PoliceBase> for PoliceType {
    fn matches(&self, facility: &PoliceBase) -> bool {
        facility.police_type == *self
    }
}

/// A set of selected police tiers. Filtering is plain set membership.
///
/// An empty set accepts every facility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliceTypeSet(BTreeSet<PoliceType>);

impl PoliceTypeSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Adds a tier to the set.
    pub fn insert(&mut self, police_type: PoliceType) -> bool {
        self.0.insert(police_type)
    }

    /// Whether `police_type` is selected.
    #[must_use]
    pub fn contains(&self, police_type: PoliceType) -> bool {
        self.0.contains(&police_type)
    }

    /// Whether no tier is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of selected tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates selected tiers in hierarchy order.
    pub fn iter(&self) -> impl Iterator<Item = PoliceType> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<PoliceType> for PoliceTypeSet {
    fn from_iter<I: IntoIterator<Item = PoliceType>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FacilityPredicate<PoliceBase> for PoliceTypeSet {
    fn matches(&self, facility: &PoliceBase) -> bool {
        self.is_empty() || self.contains(facility.police_type)
    }
}

/// A police facility (koban, keisatsusho, or honbu).
///
/// Two records are equal when their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoliceBase {
    /// Unique identifier.
    pub id: String,
    /// Tier of this facility.
    pub police_type: PoliceType,
    /// Facility name.
    pub name: String,
    /// Contact phone number.
    #[serde(default)]
    pub phone_number: String,
    /// Reading of the name in katakana.
    #[serde(default)]
    pub furigana: String,
    /// Postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Prefecture name.
    #[serde(default)]
    pub prefecture: String,
    /// City, town, or village.
    #[serde(default)]
    pub city_town_village: String,
    /// National local government code.
    #[serde(default)]
    pub national_local_government_code: String,
    /// Full address notation.
    #[serde(default)]
    pub full_notation: String,
    /// Address from the town or district onwards.
    #[serde(default)]
    pub town_or_village_onwards: String,
    /// Free-text remarks.
    #[serde(default)]
    pub remarks: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Whether the coordinates were matched precisely rather than
    /// approximated from the address.
    #[serde(default)]
    pub is_coordinates_trustful: bool,
    /// Id of the next tier up. `None` for honbu.
    ///
    /// This is a lookup key resolved through the catalog, never an
    /// owning reference.
    #[serde(default)]
    pub parent: Option<String>,
}

impl PoliceBase {
    /// Creates a facility with empty contact and address fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        police_type: PoliceType,
        name: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            police_type,
            name: name.into(),
            phone_number: String::new(),
            furigana: String::new(),
            postal_code: String::new(),
            prefecture: String::new(),
            city_town_village: String::new(),
            national_local_government_code: String::new(),
            full_notation: String::new(),
            town_or_village_onwards: String::new(),
            remarks: String::new(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            is_coordinates_trustful: true,
            parent: None,
        }
    }

    /// Sets the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

impl PartialEq for PoliceBase {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PoliceBase {}

impl Facility for PoliceBase {
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

/// On-disk wrapper: `{ "polices": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoliceDataset {
    /// All police records, in file order.
    pub polices: Vec<PoliceBase>,
}

impl Dataset for PoliceDataset {
    type Record = PoliceBase;

    const KIND: &'static str = "police";

    fn into_records(self) -> Vec<PoliceBase> {
        self.polices
    }
}
