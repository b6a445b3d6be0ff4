//! HTTP enrichment gateway for Census.
//!
//! Implements [`census_core::enrich::Enricher`] over the public agify,
//! genderize and nationalize prediction APIs. Each lookup is a single
//! unauthenticated `GET ?name=<name>`; there is no retry and no caching.

mod client;
mod error;

pub use client::{EnrichmentConfig, HttpEnricher};
pub use error::{Error, Result};
