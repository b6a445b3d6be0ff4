//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/persons` | Body: `{"name":..,"surname":..,"patronymic"?:..}`; enriched on create |
//! | `GET`    | `/persons` | `?limit&offset` plus any of `name`, `surname`, `gender`, `nationality`, `age`, `age_gt`, `age_lt` |
//! | `GET`    | `/persons/{id}` | 404 if not found |
//! | `PUT`    | `/persons/{id}` | Sparse name update; `"patronymic": null` clears it |
//! | `DELETE` | `/persons/{id}` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use census_core::{
  enrich::Enricher,
  filter::{FilterKey, FilterSet, Page},
  person::{CreatePersonRequest, Person, UpdatePersonRequest},
  store::PersonStore,
};
use census_service::PersonService;
use uuid::Uuid;

use crate::error::{ApiError, ErrorBody};

type Service<S, E> = State<Arc<PersonService<S, E>>>;

fn person_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
  path
    .map(|Path(id)| id)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// Split raw query pairs into a [`Page`] and a [`FilterSet`].
///
/// Unparseable `limit`/`offset` fall back to their defaults and unknown keys
/// are ignored; a non-integer age filter is an error.
pub fn list_params(pairs: &[(String, String)]) -> Result<(Page, FilterSet), ApiError> {
  let mut limit = None;
  let mut offset = None;
  let mut filters = Vec::with_capacity(pairs.len());

  for (key, value) in pairs {
    match key.as_str() {
      "limit" => limit = value.trim().parse().ok(),
      "offset" => offset = value.trim().parse().ok(),
      other if other.parse::<FilterKey>().is_ok() => filters.push((other, value.as_str())),
      other => tracing::debug!(key = other, "ignoring unknown query parameter"),
    }
  }

  Ok((Page::new(limit, offset), FilterSet::from_pairs(filters)?))
}

/// `GET /persons`
#[utoipa::path(
  get,
  path = "/persons",
  tag = "persons",
  params(
    ("limit" = Option<i64>, Query, description = "Page size, default 10"),
    ("offset" = Option<i64>, Query, description = "Rows to skip, default 0"),
    ("name" = Option<String>, Query, description = "Case-insensitive substring of the name"),
    ("surname" = Option<String>, Query, description = "Case-insensitive substring of the surname"),
    ("gender" = Option<String>, Query, description = "Exact gender"),
    ("nationality" = Option<String>, Query, description = "Exact country code"),
    ("age" = Option<i64>, Query, description = "Exact age"),
    ("age_gt" = Option<i64>, Query, description = "Age strictly greater than"),
    ("age_lt" = Option<i64>, Query, description = "Age strictly less than"),
  ),
  responses(
    (status = 200, description = "Matching persons, newest first", body = [Person]),
    (status = 400, description = "Malformed age filter", body = ErrorBody),
    (status = 500, description = "Storage failure", body = ErrorBody),
  )
)]
pub async fn list<S, E>(
  State(service): Service<S, E>,
  query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let Query(pairs) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let (page, filters) = list_params(&pairs)?;
  let persons = service.list(page, &filters).await?;
  Ok(Json(persons))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons`
#[utoipa::path(
  post,
  path = "/persons",
  tag = "persons",
  request_body = CreatePersonRequest,
  responses(
    (status = 201, description = "Person enriched and stored", body = Person),
    (status = 400, description = "Malformed or blank input", body = ErrorBody),
    (status = 500, description = "Enrichment or storage failure", body = ErrorBody),
  )
)]
pub async fn create<S, E>(
  State(service): Service<S, E>,
  body: Result<Json<CreatePersonRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let person = service.create(request).await?;
  tracing::info!(id = %person.id, "person created");
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/{id}`
#[utoipa::path(
  get,
  path = "/persons/{id}",
  tag = "persons",
  params(("id" = Uuid, Path, description = "Person id")),
  responses(
    (status = 200, description = "The person", body = Person),
    (status = 400, description = "Malformed id", body = ErrorBody),
    (status = 404, description = "No such person", body = ErrorBody),
  )
)]
pub async fn get_one<S, E>(
  State(service): Service<S, E>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let id = person_id(path)?;
  Ok(Json(service.get_by_id(id).await?))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /persons/{id}`
#[utoipa::path(
  put,
  path = "/persons/{id}",
  tag = "persons",
  params(("id" = Uuid, Path, description = "Person id")),
  request_body = UpdatePersonRequest,
  responses(
    (status = 204, description = "Updated"),
    (status = 400, description = "Malformed id or blank field", body = ErrorBody),
    (status = 404, description = "No such person", body = ErrorBody),
  )
)]
pub async fn update<S, E>(
  State(service): Service<S, E>,
  path: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let id = person_id(path)?;
  let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  service.update(id, &request).await?;
  tracing::info!(%id, "person updated");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/{id}`
#[utoipa::path(
  delete,
  path = "/persons/{id}",
  tag = "persons",
  params(("id" = Uuid, Path, description = "Person id")),
  responses(
    (status = 204, description = "Deleted"),
    (status = 400, description = "Malformed id", body = ErrorBody),
    (status = 404, description = "No such person", body = ErrorBody),
  )
)]
pub async fn delete<S, E>(
  State(service): Service<S, E>,
  path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: PersonStore,
  E: Enricher,
{
  let id = person_id(path)?;
  service.delete(id).await?;
  tracing::info!(%id, "person deleted");
  Ok(StatusCode::NO_CONTENT)
}
