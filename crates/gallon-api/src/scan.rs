//! Handler for `POST /scan`, the scanner entry point.
//!
//! Body: `{"employee_id":"EMP1001","gallons":2,"notes":"..."}`; `gallons`
//! defaults to one. Exactly one outcome is reported: not found or inactive
//! (404), no quota / insufficient quota (422, with `remaining`), an
//! out-of-range quantity (400), or success (200).

use axum::{Json, extract::State};
use chrono::Utc;
use gallon_core::{
  distribution::DistributionRecord, employee::Employee, store::QuotaStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  /// The business identifier read from the badge.
  pub employee_id: String,
  pub gallons:     Option<u32>,
  pub notes:       Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
  pub message:  String,
  pub gallons:  u32,
  pub employee: Employee,
  pub record:   DistributionRecord,
}

/// `POST /scan`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<ScanBody>,
) -> Result<Json<ScanResponse>, ApiError>
where
  S: QuotaStore + 'static,
{
  if body.employee_id.trim().is_empty() {
    return Err(ApiError::BadRequest("employee_id is required".to_owned()));
  }

  let outcome = state
    .service
    .scan(&body.employee_id, body.gallons, body.notes, Utc::now())
    .await
    .inspect_err(|e| tracing::debug!(employee_id = %body.employee_id, error = %e, "scan refused"))?;

  let gallons = outcome.record.gallons_taken;
  Ok(Json(ScanResponse {
    message: format!(
      "Successfully distributed {gallons} gallon(s) to {}.",
      outcome.employee.name
    ),
    gallons,
    employee: outcome.employee,
    record: outcome.record,
  }))
}
