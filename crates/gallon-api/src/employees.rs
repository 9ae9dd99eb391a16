//! Handlers for `/employees` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/employees` | Optional `search`, `department`, `active`, `limit`, `offset` |
//! | `POST`   | `/employees` | Body: [`NewEmployee`]; 201, or 409 on duplicate identifier |
//! | `GET`    | `/employees/:id` | Applies any pending monthly reset before returning |
//! | `PUT`    | `/employees/:id` | Body: [`EmployeeUpdate`] |
//! | `DELETE` | `/employees/:id` | 204; the ledger goes with it |
//! | `POST`   | `/employees/:id/reset` | Reset-if-new-month |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use gallon_core::{
  employee::{Employee, EmployeeUpdate, NewEmployee},
  store::{EmployeeQuery, QuotaStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, MAX_LIST_LIMIT, clamp_limit, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub search:     Option<String>,
  pub department: Option<String>,
  pub active:     Option<bool>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

/// `GET /employees[?search=...][&department=...][&active=true][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Employee>>, ApiError>
where
  S: QuotaStore + 'static,
{
  let query = EmployeeQuery {
    search:     params.search,
    department: params.department,
    active:     params.active,
    limit:      Some(clamp_limit(params.limit, MAX_LIST_LIMIT)),
    offset:     params.offset,
  };
  let employees = state.service.list_employees(&query).await?;
  Ok(Json(employees))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /employees`: returns 201 + the stored employee.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewEmployee>,
) -> Result<impl IntoResponse, ApiError>
where
  S: QuotaStore + 'static,
{
  let employee = state.service.create_employee(body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(employee)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /employees/:id`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError>
where
  S: QuotaStore + 'static,
{
  let employee = state.service.reset_if_new_month(id, Utc::now()).await?;
  Ok(Json(employee))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /employees/:id`. Body: any subset of `name`, `department`,
/// `monthly_quota`, `is_active`.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, ApiError>
where
  S: QuotaStore + 'static,
{
  let employee = state.service.update_employee(id, body, Utc::now()).await?;
  Ok(Json(employee))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /employees/:id`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: QuotaStore + 'static,
{
  state.service.delete_employee(id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Reset ────────────────────────────────────────────────────────────────────

/// `POST /employees/:id/reset`. A no-op within the month of the last reset.
pub async fn reset<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Employee>, ApiError>
where
  S: QuotaStore + 'static,
{
  let employee = state.service.reset_if_new_month(id, Utc::now()).await?;
  Ok(Json(employee))
}
