//! Error type for `census-enrich`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client")]
  Client(#[source] reqwest::Error),

  #[error("request to {endpoint} failed")]
  Transport {
    endpoint: String,
    #[source]
    source:   reqwest::Error,
  },

  #[error("{endpoint} responded with {status}")]
  Status { endpoint: String, status: StatusCode },

  #[error("malformed response from {endpoint}")]
  Decode {
    endpoint: String,
    #[source]
    source:   reqwest::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
