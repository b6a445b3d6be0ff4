//! Error type for `census-service`.

use std::time::Duration;

use census_core::{enrich::Lookup, store::StoreError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid request")]
  Validation(#[from] census_core::Error),

  #[error("person not found: {0}")]
  NotFound(Uuid),

  #[error("{lookup} lookup failed")]
  Enrichment {
    lookup: Lookup,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to persist person")]
  Persistence(#[source] StoreError),

  #[error("person already exists: {0}")]
  Conflict(Uuid),

  #[error("storage error")]
  Storage(#[source] StoreError),
}

impl Error {
  pub(crate) fn enrichment(
    lookup: Lookup,
    source: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Enrichment { lookup, source: Box::new(source) }
  }

  /// Map a read/update/delete failure, keeping `NotFound` distinct.
  pub(crate) fn from_store(e: StoreError) -> Self {
    match e {
      StoreError::NotFound(id) => Self::NotFound(id),
      other => Self::Storage(other),
    }
  }

  /// Map an insert failure.
  pub(crate) fn from_insert(e: StoreError) -> Self {
    match e {
      StoreError::Conflict(id) => Self::Conflict(id),
      other => Self::Persistence(other),
    }
  }
}

/// A lookup that did not answer within the configured bound.
#[derive(Debug, Error)]
#[error("no response within {0:?}")]
pub struct LookupTimeout(pub Duration);

pub type Result<T, E = Error> = std::result::Result<T, E>;
