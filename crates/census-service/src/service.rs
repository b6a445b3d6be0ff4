//! [`PersonService`]: validation, concurrent enrichment, persistence.

use std::{future::Future, time::Duration};

use census_core::{
  enrich::{Enricher, Enrichment, Lookup},
  filter::{FilterSet, Page},
  person::{CreatePersonRequest, Person, UpdatePersonRequest},
  store::PersonStore,
};
use uuid::Uuid;

use crate::{Error, LookupTimeout, Result};

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
  /// Upper bound on each individual lookup.
  pub lookup_timeout: Duration,
}

impl Default for ServiceConfig {
  fn default() -> Self { Self { lookup_timeout: Duration::from_secs(10) } }
}

// ─── Service ──────────────────────────────────────────────────────────────────

pub struct PersonService<S, E> {
  store:    S,
  enricher: E,
  config:   ServiceConfig,
}

impl<S, E> PersonService<S, E>
where
  S: PersonStore,
  E: Enricher,
{
  pub fn new(store: S, enricher: E, config: ServiceConfig) -> Self {
    Self { store, enricher, config }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn enricher(&self) -> &E { &self.enricher }

  /// Validate, enrich and persist a new person.
  ///
  /// Nothing is written unless all three lookups succeed.
  pub async fn create(&self, request: CreatePersonRequest) -> Result<Person> {
    let request = request.validate()?;
    let enrichment = self.enrich(&request.name).await?;
    let person = Person::assemble(request, enrichment);
    self.store.insert(person).await.map_err(Error::from_insert)
  }

  pub async fn update(&self, id: Uuid, request: &UpdatePersonRequest) -> Result<()> {
    request.validate()?;
    self.store.update_fields(id, request).await.map_err(Error::from_store)
  }

  pub async fn delete(&self, id: Uuid) -> Result<()> {
    self.store.delete_by_id(id).await.map_err(Error::from_store)
  }

  pub async fn get_by_id(&self, id: Uuid) -> Result<Person> {
    self.store.get_by_id(id).await.map_err(Error::from_store)
  }

  pub async fn list(&self, page: Page, filters: &FilterSet) -> Result<Vec<Person>> {
    self.store.list(page, filters).await.map_err(Error::from_store)
  }

  /// Run the three lookups concurrently. The first failure drops the
  /// others.
  async fn enrich(&self, name: &str) -> Result<Enrichment> {
    let (age, gender, nationality) = tokio::try_join!(
      self.bounded(Lookup::Age, self.enricher.fetch_age(name)),
      self.bounded(Lookup::Gender, self.enricher.fetch_gender(name)),
      self.bounded(Lookup::Nationality, self.enricher.fetch_nationality(name)),
    )?;

    tracing::debug!(name, age, %gender, %nationality, "enriched");
    Ok(Enrichment { age, gender, nationality })
  }

  async fn bounded<T, F, Err>(&self, lookup: Lookup, fut: F) -> Result<T>
  where
    F: Future<Output = Result<T, Err>>,
    Err: std::error::Error + Send + Sync + 'static,
  {
    let limit = self.config.lookup_timeout;
    match tokio::time::timeout(limit, fut).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => {
        tracing::warn!(%lookup, error = ?e, "lookup failed");
        Err(Error::enrichment(lookup, e))
      }
      Err(_) => {
        tracing::warn!(%lookup, ?limit, "lookup timed out");
        Err(Error::enrichment(lookup, LookupTimeout(limit)))
      }
    }
  }
}
