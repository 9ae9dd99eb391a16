//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use gallon_core::{DistributionError, Ineligibility, service::ServiceError};
use serde_json::json;
use thiserror::Error;

/// Shown to the operator for any persistence failure; the scan may be
/// retried as-is.
pub const OPERATION_FAILED: &str = "Operation failed. Please try again.";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The request was well-formed but the quota rules refused it.
  #[error("refused: {message}")]
  Refused {
    message:   String,
    remaining: Option<u32>,
  },

  /// A compare-and-swap kept losing; the operator may retry.
  #[error("busy: {0}")]
  Busy(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, json!({ "error": m })),
      ApiError::Refused { message, remaining } => (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "error": message, "remaining": remaining }),
      ),
      ApiError::Busy(m) => (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": m })),
      ApiError::Store(e) => {
        // Internal detail goes to the log, never to the client.
        tracing::error!(error = %e, "store operation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": OPERATION_FAILED }))
      }
    };
    (status, Json(body)).into_response()
  }
}

impl From<DistributionError> for ApiError {
  fn from(e: DistributionError) -> Self {
    match e {
      DistributionError::InvalidQuantity { .. } | DistributionError::ZeroQuantity => {
        ApiError::BadRequest(e.to_string())
      }
      DistributionError::NotEligible(Ineligibility::Inactive) => ApiError::Refused {
        message:   "Employee is inactive.".to_owned(),
        remaining: None,
      },
      DistributionError::NotEligible(Ineligibility::NoQuotaRemaining) => ApiError::Refused {
        message:   "Employee has no remaining quota for this month.".to_owned(),
        remaining: Some(0),
      },
      DistributionError::InsufficientQuota { remaining } => ApiError::Refused {
        message: format!("Employee only has {remaining} gallon(s) remaining in quota."),
        remaining: Some(remaining),
      },
    }
  }
}

impl<E> From<ServiceError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: ServiceError<E>) -> Self {
    match e {
      ServiceError::NotFoundOrInactive => {
        ApiError::NotFound("Employee not found or inactive.".to_owned())
      }
      ServiceError::EmployeeNotFound(id) => ApiError::NotFound(format!("employee {id} not found")),
      ServiceError::DuplicateIdentifier(_) => ApiError::Conflict(e.to_string()),
      ServiceError::Invalid(inner) => ApiError::BadRequest(inner.to_string()),
      ServiceError::Distribution(inner) => inner.into(),
      ServiceError::Contended { .. } => {
        tracing::warn!(error = %e, "giving up on contended write");
        ApiError::Busy(OPERATION_FAILED.to_owned())
      }
      ServiceError::Store(inner) => ApiError::Store(Box::new(inner)),
    }
  }
}
