//! Person orchestration for Census.
//!
//! [`PersonService`] ties an [`Enricher`](census_core::enrich::Enricher) to a
//! [`PersonStore`](census_core::store::PersonStore): creation validates the
//! request, runs the three lookups concurrently and persists the assembled
//! record only when all of them succeeded. Every other operation is a thin
//! pass-through with uniform error mapping.

mod error;
mod service;

pub use error::{Error, LookupTimeout, Result};
pub use service::{PersonService, ServiceConfig};
