#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory facility catalogs.
//!
//! Shelter and police datasets are decoded once from their bundled JSON
//! files into read-only [`Catalog`]s. A failed load is recovered into an
//! empty catalog plus the reported [`LoadError`]; it never leaves a
//! partially-populated catalog behind. [`CatalogHandle`] lets a fresh
//! catalog be swapped in atomically while queries are in flight.

pub mod catalog;
pub mod handle;
pub mod hierarchy;
pub mod loader;
pub mod search;

use std::path::PathBuf;

use thiserror::Error;

pub use catalog::Catalog;
pub use handle::CatalogHandle;
pub use loader::{
    bundled_police, bundled_shelters, load_or_empty, load_path, load_reader, load_str,
};

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The dataset file does not exist.
    #[error("Dataset not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The dataset could not be decoded.
    #[error("Malformed dataset: {0}")]
    Malformed(String),

    /// Reading the dataset failed for another reason.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}
