//! Read-only ledger views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/distributions/recent` | Optional `?limit`; newest first, joined with employee |
//! | `GET`  | `/employees/:id/distributions` | Optional `?limit`; 404 for unknown employee |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use gallon_core::{
  distribution::{DistributionEntry, DistributionRecord},
  store::QuotaStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, MAX_LIST_LIMIT, clamp_limit, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct LimitParams {
  pub limit: Option<usize>,
}

/// `GET /distributions/recent[?limit=N]`
pub async fn recent<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<DistributionEntry>>, ApiError>
where
  S: QuotaStore + 'static,
{
  let limit = clamp_limit(params.limit, state.recent_limit);
  let entries = state.service.recent_distributions(limit).await?;
  Ok(Json(entries))
}

/// `GET /employees/:id/distributions[?limit=N]`
pub async fn for_employee<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<LimitParams>,
) -> Result<Json<Vec<DistributionRecord>>, ApiError>
where
  S: QuotaStore + 'static,
{
  let limit = params.limit.map(|l| clamp_limit(Some(l), MAX_LIST_LIMIT));
  let records = state.service.employee_distributions(id, limit).await?;
  Ok(Json(records))
}
