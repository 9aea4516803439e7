//! Immutable catalog of one facility variant.

use std::collections::{BTreeMap, BTreeSet};

use anshin_navi_facility_models::{Facility, PoliceBase, Shelter};

/// The full, read-only collection of one facility variant.
///
/// Records keep their dataset order, which is the iteration order every
/// query and tie-break relies on.
#[derive(Debug, Clone)]
pub struct Catalog<F> {
    records: Vec<F>,
    /// id -> position in `records`
    index: BTreeMap<String, usize>,
}

impl<F> Default for Catalog<F> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<F> Catalog<F> {
    /// A catalog with no records.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in dataset order.
    #[must_use]
    pub fn records(&self) -> &[F] {
        &self.records
    }

    /// Iterates records in dataset order.
    pub fn iter(&self) -> std::slice::Iter<'_, F> {
        self.records.iter()
    }

    /// Groups records by a derived key. Keys are sorted; members keep
    /// catalog order.
    pub fn grouped_by<K: Ord>(&self, key_fn: impl Fn(&F) -> K) -> BTreeMap<K, Vec<&F>> {
        let mut groups: BTreeMap<K, Vec<&F>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(key_fn(record)).or_default().push(record);
        }
        groups
    }

    /// The sorted set of distinct derived keys.
    pub fn distinct_keys<K: Ord>(&self, key_fn: impl Fn(&F) -> K) -> BTreeSet<K> {
        self.records.iter().map(key_fn).collect()
    }
}

impl<F: Facility> Catalog<F> {
    /// Builds a catalog and its id index.
    ///
    /// When two records share an id, the first keeps the index entry.
    #[must_use]
    pub fn new(records: Vec<F>) -> Self {
        let mut index = BTreeMap::new();
        for (position, record) in records.iter().enumerate() {
            if index.contains_key(record.id()) {
                log::warn!(
                    "Duplicate facility id {} at position {position}; keeping the first",
                    record.id()
                );
                continue;
            }
            index.insert(record.id().to_string(), position);
        }
        Self { records, index }
    }

    /// Looks up a record by id.
    #[must_use]
    pub fn by_id(&self, id: &str) -> Option<&F> {
        self.index.get(id).map(|&position| &self.records[position])
    }
}

impl<'a, F> IntoIterator for &'a Catalog<F> {
    type Item = &'a F;
    type IntoIter = std::slice::Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Catalog<Shelter> {
    /// Shelters grouped by municipality code.
    #[must_use]
    pub fn by_region(&self) -> BTreeMap<String, Vec<&Shelter>> {
        self.grouped_by(|s| s.region_code.clone())
    }

    /// Sorted distinct municipality codes.
    #[must_use]
    pub fn available_regions(&self) -> Vec<String> {
        self.distinct_keys(|s| s.region_code.clone())
            .into_iter()
            .collect()
    }
}

impl Catalog<PoliceBase> {
    /// Police facilities grouped by prefecture.
    #[must_use]
    pub fn by_prefecture(&self) -> BTreeMap<String, Vec<&PoliceBase>> {
        self.grouped_by(|p| p.prefecture.clone())
    }

    /// Sorted distinct prefecture names.
    #[must_use]
    pub fn available_prefectures(&self) -> Vec<String> {
        self.distinct_keys(|p| p.prefecture.clone())
            .into_iter()
            .collect()
    }
}
