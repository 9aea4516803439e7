//! Shared, atomically replaceable catalog reference.

use std::path::Path;
use std::sync::Arc;

use anshin_navi_facility_models::Dataset;
use arc_swap::ArcSwap;

use crate::{Catalog, LoadError, loader};

/// Holds the current catalog of one facility variant.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep working on it
/// even if a reload swaps in a new catalog meanwhile; they see either the
/// old catalog or the new one in full.
pub struct CatalogHandle<F> {
    current: ArcSwap<Catalog<F>>,
}

impl<F> CatalogHandle<F> {
    /// Wraps an already-built catalog.
    #[must_use]
    pub fn new(catalog: Catalog<F>) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
        }
    }

    /// The catalog currently in place.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog<F>> {
        self.current.load_full()
    }

    /// Swaps in a fully-built catalog.
    pub fn replace(&self, catalog: Catalog<F>) {
        self.current.store(Arc::new(catalog));
    }
}

impl<F> Default for CatalogHandle<F> {
    fn default() -> Self {
        Self::new(Catalog::empty())
    }
}

impl<F> std::fmt::Debug for CatalogHandle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogHandle")
            .field("len", &self.current.load().len())
            .finish()
    }
}

impl<F: anshin_navi_facility_models::Facility> CatalogHandle<F> {
    /// Loads a dataset and swaps it in. Returns the new record count.
    ///
    /// On failure the previous catalog stays in place.
    ///
    /// # Errors
    ///
    /// Returns the [`LoadError`] from [`loader::load_path`].
    pub fn reload_from<D: Dataset<Record = F>>(&self, path: &Path) -> Result<usize, LoadError> {
        let catalog = loader::load_path::<D>(path).inspect_err(|e| {
            log::warn!("Reload of {} dataset failed, keeping current catalog: {e}", D::KIND);
        })?;
        let len = catalog.len();
        self.replace(catalog);
        Ok(len)
    }
}
