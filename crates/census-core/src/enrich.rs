//! The `Enricher` trait: demographic facts derived from a first name.
//!
//! Implemented by `census-enrich` over the public prediction APIs; tests
//! substitute in-process stubs.

use std::{fmt, future::Future};

/// Nationality reported when the lookup has no candidates.
pub const UNKNOWN_NATIONALITY: &str = "unknown";

/// Which of the three independent lookups an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
  Age,
  Gender,
  Nationality,
}

impl fmt::Display for Lookup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Age => "age",
      Self::Gender => "gender",
      Self::Nationality => "nationality",
    })
  }
}

/// The complete result of enriching one name. Never partially populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
  pub age:         u32,
  pub gender:      String,
  pub nationality: String,
}

/// Abstraction over the external prediction services.
///
/// Each method is an independent, side-effect-free read. Implementations
/// do not retry or cache.
pub trait Enricher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Predicted age; `0` when the service has no prediction.
  fn fetch_age<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  /// Predicted gender; empty when the service has no prediction.
  fn fetch_gender<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Country code of the top-ranked candidate, or [`UNKNOWN_NATIONALITY`].
  fn fetch_nationality<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;
}
