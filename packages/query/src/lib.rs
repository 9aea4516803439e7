#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter and rank pipeline for facility proximity queries.
//!
//! The [`pipeline`] functions are pure: they take an already-loaded
//! record slice plus query parameters and return freshly allocated,
//! caller-owned result lists. [`QueryService`] wraps them around a
//! swappable catalog with runtime-adjustable limits, and can run a query
//! on a blocking worker so callers never compute on their UI thread.

pub mod pipeline;
pub mod service;
pub mod settings;

use anshin_navi_facility_models::InvalidCoordinateError;
use thiserror::Error;

pub use pipeline::{
    RankedResult, VisibleQueryResult, closest_matching, filter_by_all, nearby, query_visible,
    query_visible_with, sort_by_distance, truncate,
};
pub use service::{QueryService, VisibleQueryRequest, VisibleQueryResponse};
pub use settings::{QuerySettings, SettingsError};

/// Errors returned by [`QueryService`].
#[derive(Debug, Error)]
pub enum QueryError {
    /// A query coordinate is outside the WGS84 range.
    #[error("Invalid query coordinate: {0}")]
    InvalidCoordinate(#[from] InvalidCoordinateError),

    /// The blocking worker running the query failed.
    #[error("Query worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
