//! The `PersonStore` trait and its error taxonomy.
//!
//! The trait is implemented by storage backends (`census-store-postgres`,
//! `census-store-sqlite`). Higher layers (`census-service`, `census-api`)
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::{
  filter::{FilterSet, Page},
  person::{Person, UpdatePersonRequest},
};

/// Failures every backend reports in the same shape, so callers can tell a
/// missing row from a broken database without knowing the backend.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("person not found: {0}")]
  NotFound(Uuid),

  #[error("person already exists: {0}")]
  Conflict(Uuid),

  #[error("storage backend error")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(e))
  }
}

/// Abstraction over a person store backend.
///
/// Every write is a single backend-atomic statement. All methods return
/// `Send` futures so the trait can be used from multi-threaded runtimes.
pub trait PersonStore: Send + Sync {
  /// Persist a fully populated person as a new row.
  ///
  /// Fails with [`StoreError::Conflict`] if the id is already taken.
  fn insert(
    &self,
    person: Person,
  ) -> impl Future<Output = Result<Person, StoreError>> + Send + '_;

  /// Apply the present fields of `update` to the row with `id` and refresh
  /// `updated_at`.
  ///
  /// An empty update writes nothing and leaves `updated_at` untouched, but
  /// still reports [`StoreError::NotFound`] for a missing row.
  fn update_fields<'a>(
    &'a self,
    id: Uuid,
    update: &'a UpdatePersonRequest,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + 'a;

  /// Remove the row with `id`; [`StoreError::NotFound`] if none matched.
  fn delete_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), StoreError>> + Send + '_;

  /// Fetch one person; [`StoreError::NotFound`] if absent.
  fn get_by_id(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Person, StoreError>> + Send + '_;

  /// Return the page of persons matching every filter in `filters`, most
  /// recently created first (ties broken by id, descending).
  fn list<'a>(
    &'a self,
    page: Page,
    filters: &'a FilterSet,
  ) -> impl Future<Output = Result<Vec<Person>, StoreError>> + Send + 'a;
}
