//! Dataset decoding.
//!
//! Every entry point either returns a fully-built [`Catalog`] or an
//! error. [`load_or_empty`] is the startup path: it recovers a failure
//! into an empty catalog and still hands the error back.

use std::io::Read;
use std::path::Path;

use anshin_navi_facility_models::{Dataset, PoliceBase, PoliceDataset, Shelter, ShelterDataset};

use crate::{Catalog, LoadError};

/// Sample shelter dataset shipped with the crate.
pub const BUNDLED_SHELTERS_JSON: &str = include_str!("../data/shelters.json");

/// Sample police dataset shipped with the crate.
pub const BUNDLED_POLICE_JSON: &str = include_str!("../data/police.json");

/// Loads a dataset file into a catalog.
///
/// # Errors
///
/// * [`LoadError::NotFound`] if `path` does not exist
/// * [`LoadError::Malformed`] if the JSON cannot be decoded
/// * [`LoadError::Io`] if the file cannot be read
pub fn load_path<D: Dataset>(path: &Path) -> Result<Catalog<D::Record>, LoadError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let catalog = load_reader::<D>(std::io::BufReader::new(file))?;
    log::info!(
        "Loaded {} {} records from {}",
        catalog.len(),
        D::KIND,
        path.display()
    );
    Ok(catalog)
}

/// Decodes a dataset from any reader.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if the JSON cannot be decoded.
pub fn load_reader<D: Dataset>(reader: impl Read) -> Result<Catalog<D::Record>, LoadError> {
    let dataset: D = serde_json::from_reader(reader)?;
    Ok(Catalog::new(dataset.into_records()))
}

/// Decodes a dataset from a JSON string.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if the JSON cannot be decoded.
pub fn load_str<D: Dataset>(json: &str) -> Result<Catalog<D::Record>, LoadError> {
    let dataset: D = serde_json::from_str(json)?;
    Ok(Catalog::new(dataset.into_records()))
}

/// Loads a dataset, falling back to an empty catalog on failure.
///
/// The error is logged and returned alongside the empty catalog so the
/// caller can decide how to surface it. No retry is attempted.
#[must_use]
pub fn load_or_empty<D: Dataset>(path: &Path) -> (Catalog<D::Record>, Option<LoadError>) {
    match load_path::<D>(path) {
        Ok(catalog) => (catalog, None),
        Err(e) => {
            log::error!("Failed to load {} dataset: {e}", D::KIND);
            (Catalog::empty(), Some(e))
        }
    }
}

/// Decodes the bundled sample shelters.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if the embedded file is invalid.
pub fn bundled_shelters() -> Result<Catalog<Shelter>, LoadError> {
    load_str::<ShelterDataset>(BUNDLED_SHELTERS_JSON)
}

/// Decodes the bundled sample police facilities.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if the embedded file is invalid.
pub fn bundled_police() -> Result<Catalog<PoliceBase>, LoadError> {
    load_str::<PoliceDataset>(BUNDLED_POLICE_JSON)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    const SHELTERS: &str = r#"{"shelters": [
        {"id": "s1", "name": "North Park", "latitude": 35.0, "longitude": 139.0, "earthquake": true},
        {"id": "s2", "name": "South School", "latitude": 35.01, "longitude": 139.0}
    ]}"#;

    #[test]
    fn loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHELTERS.as_bytes()).unwrap();

        let catalog = load_path::<ShelterDataset>(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.by_id("s1").is_some_and(|s| s.earthquake));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelters.json");

        let err = load_path::<ShelterDataset>(&path).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { path: p } if p == path));
    }

    #[test]
    fn malformed_keeps_decoder_message() {
        let err = load_str::<ShelterDataset>(r#"{"shelters": [{"id": 5}]}"#).unwrap_err();
        let LoadError::Malformed(detail) = err else {
            panic!("expected Malformed, got {err:?}");
        };
        assert!(!detail.is_empty());
        assert!(detail.contains("line"), "detail lacks position: {detail}");
    }

    #[test]
    fn wrong_wrapper_is_malformed() {
        let err = load_str::<PoliceDataset>(SHELTERS).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn one_bad_record_rejects_the_whole_dataset() {
        let json = r#"{"shelters": [
            {"id": "s1", "name": "ok", "latitude": 35.0, "longitude": 139.0},
            {"id": "s2", "name": "bad", "latitude": "north", "longitude": 139.0}
        ]}"#;
        assert!(load_str::<ShelterDataset>(json).is_err());
    }

    #[test]
    fn load_or_empty_recovers_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, err) = load_or_empty::<PoliceDataset>(&dir.path().join("polices.json"));
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(LoadError::NotFound { .. })));
    }

    #[test]
    fn load_or_empty_recovers_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"shelters\": [").unwrap();

        let (catalog, err) = load_or_empty::<ShelterDataset>(file.path());
        assert!(catalog.is_empty());
        assert!(matches!(err, Some(LoadError::Malformed(_))));
    }

    #[test]
    fn bundled_datasets_decode() {
        let shelters = bundled_shelters().unwrap();
        assert_eq!(shelters.len(), 4);
        assert!(shelters.by_id("13102-0001").is_some_and(|s| s.tsunami));

        let police = bundled_police().unwrap();
        assert_eq!(police.len(), 3);
        assert_eq!(
            police
                .by_id("13-marunouchi-yurakucho")
                .and_then(|p| p.parent.as_deref()),
            Some("13-marunouchi")
        );
    }
}
