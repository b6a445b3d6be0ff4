//! Error types for `census-core`.

use thiserror::Error;

/// Input that fails validation before reaching any collaborator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("{0} must not be blank")]
  BlankField(&'static str),

  #[error("unknown filter key: {0:?}")]
  UnknownFilterKey(String),

  #[error("filter {key} expects an integer, got {value:?}")]
  InvalidFilterValue { key: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
