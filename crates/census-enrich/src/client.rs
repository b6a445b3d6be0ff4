//! reqwest implementation of [`Enricher`].

use std::time::Duration;

use census_core::enrich::{Enricher, UNKNOWN_NATIONALITY};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, Result};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Endpoint locations and the per-request timeout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
  pub agify_url:       String,
  pub genderize_url:   String,
  pub nationalize_url: String,
  pub timeout_secs:    u64,
}

impl Default for EnrichmentConfig {
  fn default() -> Self {
    Self {
      agify_url:       "https://api.agify.io".to_string(),
      genderize_url:   "https://api.genderize.io".to_string(),
      nationalize_url: "https://api.nationalize.io".to_string(),
      timeout_secs:    10,
    }
  }
}

// ─── Response shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AgeResponse {
  #[serde(default)]
  age: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenderResponse {
  #[serde(default)]
  gender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NationalityResponse {
  #[serde(default)]
  country: Vec<CountryCandidate>,
}

#[derive(Debug, Deserialize)]
struct CountryCandidate {
  country_id:  String,
  #[serde(default)]
  probability: Option<f64>,
}

/// The highest-probability candidate; the earliest one wins ties.
fn top_country(candidates: Vec<CountryCandidate>) -> Option<String> {
  let rank = |c: &CountryCandidate| c.probability.unwrap_or(f64::MIN);
  candidates
    .into_iter()
    .reduce(|best, c| if rank(&c) > rank(&best) { c } else { best })
    .map(|c| c.country_id)
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Enricher backed by the public prediction APIs.
#[derive(Clone)]
pub struct HttpEnricher {
  client: Client,
  config: EnrichmentConfig,
}

impl HttpEnricher {
  pub fn new(config: EnrichmentConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  /// `GET <endpoint>?name=<name>` and decode the JSON body.
  async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, name: &str) -> Result<T> {
    let resp = self
      .client
      .get(endpoint)
      .query(&[("name", name)])
      .send()
      .await
      .map_err(|source| Error::Transport { endpoint: endpoint.to_owned(), source })?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { endpoint: endpoint.to_owned(), status });
    }

    resp
      .json()
      .await
      .map_err(|source| Error::Decode { endpoint: endpoint.to_owned(), source })
  }
}

impl Enricher for HttpEnricher {
  type Error = Error;

  async fn fetch_age(&self, name: &str) -> Result<u32> {
    let body: AgeResponse = self.get_json(&self.config.agify_url, name).await?;
    tracing::debug!(name, age = ?body.age, "age lookup");
    Ok(body.age.unwrap_or(0))
  }

  async fn fetch_gender(&self, name: &str) -> Result<String> {
    let body: GenderResponse = self.get_json(&self.config.genderize_url, name).await?;
    tracing::debug!(name, gender = ?body.gender, "gender lookup");
    Ok(body.gender.unwrap_or_default())
  }

  async fn fetch_nationality(&self, name: &str) -> Result<String> {
    let body: NationalityResponse = self.get_json(&self.config.nationalize_url, name).await?;
    let nationality = top_country(body.country);
    tracing::debug!(name, nationality = ?nationality, "nationality lookup");
    Ok(nationality.unwrap_or_else(|| UNKNOWN_NATIONALITY.to_string()))
  }
}
