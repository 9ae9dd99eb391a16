//! Router tests against an in-memory SQLite store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use gallon_core::service::QuotaService;
use gallon_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt as _;

use crate::{ApiState, api_router, error::OPERATION_FAILED};

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(ApiState::new(QuotaService::new(Arc::new(store))))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn json_body(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

async fn create(app: &Router, body: Value) -> Value {
  let resp = send(app, "POST", "/employees", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  json_body(resp).await
}

// ── Employees ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_employee_starts_with_full_quota() {
  let app = app().await;
  let e = create(
    &app,
    json!({
      "identifier": "TEST123",
      "name": "John Doe",
      "department": "Information Technology",
      "monthly_quota": 15
    }),
  )
  .await;

  assert_eq!(e["identifier"], "TEST123");
  assert_eq!(e["monthly_quota"], 15);
  assert_eq!(e["current_quota"], 15);
  assert_eq!(e["is_active"], true);
  assert!(e["quota_reset_date"].as_str().unwrap().ends_with("-01"));
}

#[tokio::test]
async fn create_duplicate_identifier_returns_409() {
  let app = app().await;
  let body = json!({ "identifier": "DUP1", "name": "A", "department": "Ops" });
  create(&app, body.clone()).await;

  let resp = send(&app, "POST", "/employees", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_with_blank_name_returns_400() {
  let app = app().await;
  let resp = send(
    &app,
    "POST",
    "/employees",
    Some(json!({ "identifier": "X1", "name": "  ", "department": "Ops" })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_update_delete_employee() {
  let app = app().await;
  let e = create(&app, json!({ "identifier": "EMP1", "name": "Ada", "department": "Ops" })).await;
  let id = e["id"].as_str().unwrap().to_owned();

  let resp = send(&app, "GET", &format!("/employees/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(json_body(resp).await["name"], "Ada");

  let resp = send(
    &app,
    "PUT",
    &format!("/employees/{id}"),
    Some(json!({ "name": "Updated Name", "monthly_quota": 20 })),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated = json_body(resp).await;
  assert_eq!(updated["name"], "Updated Name");
  assert_eq!(updated["monthly_quota"], 20);
  assert_eq!(updated["identifier"], "EMP1");

  let resp = send(&app, "DELETE", &format!("/employees/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);

  let resp = send(&app, "GET", &format!("/employees/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_employees_filters_by_active() {
  let app = app().await;
  create(&app, json!({ "identifier": "A1", "name": "Ada", "department": "Ops" })).await;
  create(&app, json!({ "identifier": "B1", "name": "Bob", "department": "Ops", "is_active": false }))
    .await;
  create(&app, json!({ "identifier": "C1", "name": "Cy", "department": "Sales" })).await;

  let resp = send(&app, "GET", "/employees?active=true", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let list = json_body(resp).await;
  assert_eq!(list.as_array().unwrap().len(), 2);

  let resp = send(&app, "GET", "/employees?department=Ops", None).await;
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);
}

// ── Scan ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scan_distributes_and_reports_employee_name() {
  let app = app().await;
  create(
    &app,
    json!({ "identifier": "SCANNER001", "name": "John Doe", "department": "IT", "monthly_quota": 5 }),
  )
  .await;

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "SCANNER001", "gallons": 2 }))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["message"], "Successfully distributed 2 gallon(s) to John Doe.");
  assert_eq!(body["gallons"], 2);
  assert_eq!(body["employee"]["current_quota"], 3);
  assert_eq!(body["record"]["gallons_taken"], 2);
}

#[tokio::test]
async fn scan_unknown_employee_returns_404() {
  let app = app().await;
  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "NONEXISTENT" }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  assert_eq!(json_body(resp).await["error"], "Employee not found or inactive.");
}

#[tokio::test]
async fn scan_inactive_employee_returns_404() {
  let app = app().await;
  create(
    &app,
    json!({ "identifier": "TEST002", "name": "Idle", "department": "Ops", "is_active": false }),
  )
  .await;

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "TEST002", "gallons": 1 }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scan_exceeding_quota_reports_remaining() {
  let app = app().await;
  let e = create(
    &app,
    json!({ "identifier": "TEST003", "name": "Low", "department": "Ops", "monthly_quota": 1 }),
  )
  .await;

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "TEST003", "gallons": 2 }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  let body = json_body(resp).await;
  assert_eq!(body["error"], "Employee only has 1 gallon(s) remaining in quota.");
  assert_eq!(body["remaining"], 1);

  let id = e["id"].as_str().unwrap();
  let resp = send(&app, "GET", &format!("/employees/{id}"), None).await;
  assert_eq!(json_body(resp).await["current_quota"], 1);
}

#[tokio::test]
async fn scan_with_exhausted_quota_reports_no_quota() {
  let app = app().await;
  create(
    &app,
    json!({ "identifier": "ONE", "name": "One", "department": "Ops", "monthly_quota": 1 }),
  )
  .await;

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "ONE" }))).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "ONE" }))).await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(
    json_body(resp).await["error"],
    "Employee has no remaining quota for this month."
  );
}

#[tokio::test]
async fn scan_quantity_out_of_range_returns_400() {
  let app = app().await;
  create(&app, json!({ "identifier": "EMP1", "name": "Ada", "department": "Ops" })).await;

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "EMP1", "gallons": 6 }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "EMP1", "gallons": 0 }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scan_blank_identifier_returns_400() {
  let app = app().await;
  let resp = send(&app, "POST", "/scan", Some(json!({ "employee_id": "   " }))).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert_ne!(json_body(resp).await["error"], OPERATION_FAILED);
}

// ── Ledger views ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn recent_distributions_newest_first() {
  let app = app().await;
  let e = create(&app, json!({ "identifier": "EMP1", "name": "Ada", "department": "Ops" })).await;
  for notes in ["first", "second", "third"] {
    let resp = send(
      &app,
      "POST",
      "/scan",
      Some(json!({ "employee_id": "EMP1", "notes": notes })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  let resp = send(&app, "GET", "/distributions/recent?limit=2", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let recent = json_body(resp).await;
  let recent = recent.as_array().unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0]["notes"], "third");
  assert_eq!(recent[0]["employee"]["name"], "Ada");
  assert_eq!(recent[1]["notes"], "second");

  let id = e["id"].as_str().unwrap();
  let resp = send(&app, "GET", &format!("/employees/{id}/distributions"), None).await;
  assert_eq!(json_body(resp).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn summary_reports_totals() {
  let app = app().await;
  create(&app, json!({ "identifier": "A1", "name": "Ada", "department": "Ops" })).await;
  create(
    &app,
    json!({ "identifier": "B1", "name": "Bob", "department": "Ops", "monthly_quota": 4, "is_active": false }),
  )
  .await;
  send(&app, "POST", "/scan", Some(json!({ "employee_id": "A1", "gallons": 3 }))).await;

  let resp = send(&app, "GET", "/summary", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body = json_body(resp).await;
  assert_eq!(body["total_employees"], 2);
  assert_eq!(body["active_employees"], 1);
  assert_eq!(body["total_monthly_quota"], 14);
  assert_eq!(body["total_remaining_quota"], 11);
  assert_eq!(body["recent"].as_array().unwrap().len(), 1);
}
