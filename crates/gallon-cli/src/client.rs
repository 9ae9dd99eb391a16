//! Async HTTP client wrapping the gallon JSON API.

use anyhow::{Context, Result, anyhow};
use gallon_core::{
  distribution::{DistributionEntry, DistributionRecord},
  employee::{Employee, NewEmployee},
  store::{EmployeeQuery, QuotaSummary},
};
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::time::Duration;

/// Connection settings for the gallon API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// What the server reports back for a successful scan.
#[derive(Debug, Deserialize)]
pub struct ScanReceipt {
  pub message:  String,
  pub gallons:  u32,
  pub employee: Employee,
  pub record:   DistributionRecord,
}

/// Dashboard totals plus the latest ledger entries.
#[derive(Debug, Deserialize)]
pub struct Dashboard {
  #[serde(flatten)]
  pub totals: QuotaSummary,
  pub recent: Vec<DistributionEntry>,
}

/// Async HTTP client for the gallon JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  // ── Scanner ───────────────────────────────────────────────────────────────

  /// `POST /api/scan`
  pub async fn scan(
    &self,
    identifier: &str,
    gallons: Option<u32>,
    notes: Option<String>,
  ) -> Result<ScanReceipt> {
    let resp = self
      .client
      .post(self.url("/scan"))
      .json(&json!({ "employee_id": identifier, "gallons": gallons, "notes": notes }))
      .send()
      .await
      .context("POST /scan failed")?;
    decode(resp, "POST /scan").await
  }

  /// `GET /api/distributions/recent[?limit=N]`
  pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<DistributionEntry>> {
    let mut req = self.client.get(self.url("/distributions/recent"));
    if let Some(limit) = limit {
      req = req.query(&[("limit", limit)]);
    }
    let resp = req.send().await.context("GET /distributions/recent failed")?;
    decode(resp, "GET /distributions/recent").await
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  /// `GET /api/employees`
  pub async fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>> {
    let resp = self
      .client
      .get(self.url("/employees"))
      .query(query)
      .send()
      .await
      .context("GET /employees failed")?;
    decode(resp, "GET /employees").await
  }

  /// `POST /api/employees`
  pub async fn create_employee(&self, input: &NewEmployee) -> Result<Employee> {
    let resp = self
      .client
      .post(self.url("/employees"))
      .json(input)
      .send()
      .await
      .context("POST /employees failed")?;
    decode(resp, "POST /employees").await
  }

  // ── Dashboard ─────────────────────────────────────────────────────────────

  /// `GET /api/summary`
  pub async fn summary(&self) -> Result<Dashboard> {
    let resp = self
      .client
      .get(self.url("/summary"))
      .send()
      .await
      .context("GET /summary failed")?;
    decode(resp, "GET /summary").await
  }
}

/// Deserialise a success body, or surface the server's `error` message.
async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
  let status = resp.status();
  if status.is_success() {
    return resp.json().await.with_context(|| format!("deserialising {what} response"));
  }

  let body: Option<Value> = resp.json().await.ok();
  tracing::debug!(%status, ?body, "{what} rejected");
  let message = body
    .as_ref()
    .and_then(|b| b.get("error"))
    .and_then(Value::as_str)
    .map(str::to_owned);
  match message {
    Some(m) => Err(anyhow!("{m} ({status})")),
    None => Err(anyhow!("{what} → {status}")),
  }
}
