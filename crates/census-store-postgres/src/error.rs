//! Error type for `census-store-postgres`.

use census_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error")]
  Database(#[from] sqlx::Error),

  #[error("migration error")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("unsupported sslmode {0:?}")]
  SslMode(String),

  #[error("age {0} does not fit the age column")]
  AgeOutOfRange(i64),

  #[error("person not found: {0}")]
  NotFound(uuid::Uuid),

  #[error("person already exists: {0}")]
  Conflict(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for StoreError {
  fn from(e: Error) -> Self {
    match e {
      Error::NotFound(id) => StoreError::NotFound(id),
      Error::Conflict(id) => StoreError::Conflict(id),
      other => StoreError::backend(other),
    }
  }
}
