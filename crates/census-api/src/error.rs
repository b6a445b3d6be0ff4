//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use census_service::Error as ServiceError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
  /// Human-readable description, including underlying causes.
  pub error: String,
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Service(#[from] ServiceError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Service(e) => match e {
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Enrichment { .. }
        | ServiceError::Persistence(_)
        | ServiceError::Conflict(_)
        | ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }
}

impl From<census_core::Error> for ApiError {
  fn from(e: census_core::Error) -> Self { ApiError::Service(ServiceError::Validation(e)) }
}

impl ApiError {
  /// This error followed by each of its sources, joined with `": "`.
  pub fn message(&self) -> String {
    let mut message = self.to_string();
    let mut source = std::error::Error::source(self);
    while let Some(e) = source {
      message.push_str(": ");
      message.push_str(&e.to_string());
      source = e.source();
    }
    message
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.message();
    if status.is_server_error() {
      tracing::error!(error = %message, "request failed");
    }
    (status, Json(ErrorBody { error: message })).into_response()
  }
}
