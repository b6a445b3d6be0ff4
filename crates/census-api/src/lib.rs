//! JSON REST API for Census.
//!
//! Exposes an axum [`Router`] backed by a [`census_service::PersonService`]
//! over any [`PersonStore`] and [`Enricher`], plus the OpenAPI document and
//! Swagger UI. Tracing, timeouts and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = census_api::api_router(Arc::new(service)).layer(TraceLayer::new_for_http());
//! ```

pub mod error;
pub mod openapi;
pub mod persons;

use std::sync::Arc;

use axum::{Router, routing::get};
use census_core::{enrich::Enricher, store::PersonStore};
use census_service::PersonService;

pub use error::{ApiError, ErrorBody};
pub use openapi::ApiDoc;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, E>(service: Arc<PersonService<S, E>>) -> Router<()>
where
  S: PersonStore + 'static,
  E: Enricher + 'static,
{
  Router::new()
    .route("/persons", get(persons::list::<S, E>).post(persons::create::<S, E>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S, E>)
        .put(persons::update::<S, E>)
        .delete(persons::delete::<S, E>),
    )
    .with_state(service)
    .merge(openapi::swagger_ui())
}
