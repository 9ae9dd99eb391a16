//! Handler for `GET /summary`: dashboard totals plus the latest ledger
//! activity.

use axum::{Json, extract::State};
use gallon_core::{
  distribution::DistributionEntry,
  store::{QuotaStore, QuotaSummary},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

/// Ledger entries shown on the dashboard.
pub const DASHBOARD_RECENT: usize = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
  #[serde(flatten)]
  pub totals: QuotaSummary,
  pub recent: Vec<DistributionEntry>,
}

/// `GET /summary`
pub async fn handler<S>(State(state): State<ApiState<S>>) -> Result<Json<SummaryResponse>, ApiError>
where
  S: QuotaStore + 'static,
{
  let totals = state.service.summary().await?;
  let recent = state.service.recent_distributions(DASHBOARD_RECENT).await?;
  Ok(Json(SummaryResponse { totals, recent }))
}
