//! Catalog-backed query service.
//!
//! [`QueryService`] reads the current catalog snapshot on every call, so
//! an atomic reload through the shared [`CatalogHandle`] is picked up by
//! the next query while in-flight ones finish on the old snapshot. The
//! spatial index is rebuilt lazily whenever the snapshot changes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anshin_navi_facility::{Catalog, CatalogHandle};
use anshin_navi_facility_models::{Coordinate, Facility, FacilityPredicate, Region};
use anshin_navi_spatial::{LinearScan, RadiusSearch, SpatialIndex};

use crate::pipeline::{closest_matching, nearby, query_visible_with};
use crate::{QueryError, QuerySettings};

/// Parameters of one viewport query.
#[derive(Debug, Clone)]
pub struct VisibleQueryRequest<P> {
    /// The visible map region.
    pub region: Region,
    /// Category filters, combined with AND.
    pub predicates: Vec<P>,
    /// Overrides the service's current maximum for this call.
    pub max_results: Option<usize>,
    /// Opaque caller token echoed back in the response, used to discard
    /// results for viewports that are no longer current.
    pub sequence: Option<u64>,
}

impl<P> VisibleQueryRequest<P> {
    /// A request for `region` with no filters.
    #[must_use]
    pub const fn new(region: Region) -> Self {
        Self {
            region,
            predicates: Vec::new(),
            max_results: None,
            sequence: None,
        }
    }

    /// Adds filters.
    #[must_use]
    pub fn with_predicates(mut self, predicates: Vec<P>) -> Self {
        self.predicates = predicates;
        self
    }

    /// Tags the request with a caller sequence number.
    #[must_use]
    pub const fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Checks that the region center is a valid coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCoordinate`] if it is not.
    pub fn validate(&self) -> Result<(), QueryError> {
        validate(self.region.center)
    }
}

/// Owned result of a viewport query.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleQueryResponse<F> {
    /// Sequence number from the request, if any.
    pub sequence: Option<u64>,
    /// Every facility in the viewport, sorted from the region center and
    /// capped.
    pub unfiltered_sorted: Vec<F>,
    /// Facilities passing all filters, sorted and capped.
    pub visible_sorted: Vec<F>,
    /// Number of facilities passing all filters before capping.
    pub visible_count: usize,
}

/// A catalog snapshot paired with the index built over it.
struct Indexed<F> {
    catalog: Arc<Catalog<F>>,
    index: Option<Arc<SpatialIndex>>,
}

/// Runs proximity queries against the current catalog of one variant.
pub struct QueryService<F> {
    catalog: Arc<CatalogHandle<F>>,
    settings: QuerySettings,
    max_results: AtomicUsize,
    indexed: Mutex<Option<Indexed<F>>>,
}

impl<F> std::fmt::Debug for QueryService<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("catalog", &self.catalog)
            .field("max_results", &self.max_results.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<F: Facility + Clone> QueryService<F> {
    /// Creates a service over a shared catalog handle.
    #[must_use]
    pub fn new(catalog: Arc<CatalogHandle<F>>, settings: QuerySettings) -> Self {
        Self {
            catalog,
            max_results: AtomicUsize::new(settings.max_results),
            settings,
            indexed: Mutex::new(None),
        }
    }

    /// The catalog handle this service reads from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogHandle<F>> {
        &self.catalog
    }

    /// Current maximum result count.
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.max_results.load(Ordering::Relaxed)
    }

    /// Changes the maximum result count for subsequent queries.
    pub fn set_max_results(&self, max_results: usize) {
        log::debug!("Max results set to {max_results}");
        self.max_results.store(max_results, Ordering::Relaxed);
    }

    /// Runs a viewport query on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCoordinate`] if the region center is
    /// out of range.
    pub fn query_visible<P: FacilityPredicate<F>>(
        &self,
        request: &VisibleQueryRequest<P>,
    ) -> Result<VisibleQueryResponse<F>, QueryError> {
        request.validate()?;
        let max_count = request.max_results.unwrap_or_else(|| self.max_results());
        let (catalog, index) = self.current();

        let result = match &index {
            Some(index) => query_visible_with(
                index.as_ref(),
                catalog.records(),
                &request.region,
                &request.predicates,
                max_count,
            ),
            None => query_visible_with(
                &LinearScan,
                catalog.records(),
                &request.region,
                &request.predicates,
                max_count,
            ),
        };

        Ok(VisibleQueryResponse {
            sequence: request.sequence,
            unfiltered_sorted: result.unfiltered_sorted.into_iter().cloned().collect(),
            visible_sorted: result.visible_sorted.into_iter().cloned().collect(),
            visible_count: result.visible_count,
        })
    }

    /// Nearest facility passing all predicates, anywhere in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCoordinate`] if `reference` is out of
    /// range.
    pub fn closest_matching<P: FacilityPredicate<F>>(
        &self,
        reference: Coordinate,
        predicates: &[P],
    ) -> Result<Option<F>, QueryError> {
        validate(reference)?;
        let catalog = self.catalog.snapshot();
        Ok(closest_matching(catalog.iter(), reference, predicates).cloned())
    }

    /// Facilities near `center` passing all predicates, nearest first.
    ///
    /// Uses the configured default radius when `radius_meters` is `None`.
    /// Returns the capped list and the uncapped match count.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCoordinate`] if `center` is out of
    /// range.
    pub fn nearby<P: FacilityPredicate<F>>(
        &self,
        center: Coordinate,
        radius_meters: Option<f64>,
        predicates: &[P],
    ) -> Result<(Vec<F>, usize), QueryError> {
        validate(center)?;
        let radius = radius_meters.unwrap_or(self.settings.default_radius_meters);
        let (catalog, index) = self.current();
        let search: &dyn RadiusSearch<F> = match &index {
            Some(index) => index.as_ref(),
            None => &LinearScan,
        };

        let result = nearby(
            search,
            catalog.records(),
            center,
            radius,
            predicates,
            self.max_results(),
        );
        Ok((
            result.sorted.into_iter().cloned().collect(),
            result.total_count,
        ))
    }

    /// The current snapshot and, if enabled for its size, its index.
    fn current(&self) -> (Arc<Catalog<F>>, Option<Arc<SpatialIndex>>) {
        let snapshot = self.catalog.snapshot();
        let mut cached = self.indexed.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(indexed) = cached.as_ref() {
            if Arc::ptr_eq(&indexed.catalog, &snapshot) {
                return (snapshot, indexed.index.clone());
            }
        }

        let index = (self.settings.use_spatial_index
            && snapshot.len() >= self.settings.spatial_index_min_records)
            .then(|| {
                log::info!("Building spatial index over {} records", snapshot.len());
                Arc::new(SpatialIndex::build(snapshot.records()))
            });
        *cached = Some(Indexed {
            catalog: Arc::clone(&snapshot),
            index: index.clone(),
        });

        (snapshot, index)
    }
}

impl<F> QueryService<F>
where
    F: Facility + Clone + Send + Sync + 'static,
{
    /// Runs a viewport query on a blocking worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidCoordinate`] for an out-of-range
    /// region center, or [`QueryError::Join`] if the worker fails.
    pub async fn query_visible_async<P>(
        self: &Arc<Self>,
        request: VisibleQueryRequest<P>,
    ) -> Result<VisibleQueryResponse<F>, QueryError>
    where
        P: FacilityPredicate<F> + Send + 'static,
    {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.query_visible(&request)).await?
    }
}

fn validate(coordinate: Coordinate) -> Result<(), QueryError> {
    Coordinate::validated(coordinate.latitude, coordinate.longitude)?;
    Ok(())
}
