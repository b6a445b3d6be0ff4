//! Error type for `census-store-sqlite`.

use census_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("stored age {0} is out of range")]
  AgeOutOfRange(i64),

  #[error("database schema version {db_version} is newer than supported version {latest_supported}")]
  UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

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
