//! HTTP server wiring for Census.
//!
//! Builds the layered axum application and owns runtime configuration and
//! log setup. The binary in `main.rs` picks a storage backend and drives the
//! listener.

pub mod settings;

use std::{sync::Arc, time::Duration};

use axum::Router;
use census_core::{enrich::Enricher, store::PersonStore};
use census_service::PersonService;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

pub use settings::Settings;
use settings::{LogFormat, LogSettings, ServerSettings};

/// The API router with request tracing and a per-request timeout.
pub fn app<S, E>(service: Arc<PersonService<S, E>>, server: &ServerSettings) -> Router
where
  S: PersonStore + 'static,
  E: Enricher + 'static,
{
  census_api::api_router(service)
    .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
    .layer(TraceLayer::new_for_http())
}

/// Install the global subscriber. `RUST_LOG` overrides `log.level`.
pub fn init_tracing(log: &LogSettings) {
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  match log.format {
    LogFormat::Text => builder.init(),
    LogFormat::Json => builder.json().init(),
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use census_enrich::{EnrichmentConfig, HttpEnricher};
  use census_service::ServiceConfig;
  use census_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn test_app() -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let enricher = HttpEnricher::new(EnrichmentConfig::default()).unwrap();
    let service = PersonService::new(store, enricher, ServiceConfig::default());
    app(Arc::new(service), &ServerSettings::default())
  }

  #[tokio::test]
  async fn layered_app_serves_the_person_routes() {
    let req = Request::builder().uri("/persons").body(Body::empty()).unwrap();
    let resp = test_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn unknown_routes_are_404() {
    let req = Request::builder().uri("/people").body(Body::empty()).unwrap();
    let resp = test_app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
