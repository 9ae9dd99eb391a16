//! HTTP host for the Gallon quota engine.
//!
//! Mounts the JSON API under `/api` next to a `/health-check` probe and wraps
//! everything in a request trace layer.

use std::{path::PathBuf, sync::Arc};

use axum::{Json, Router, routing::get};
use chrono::Utc;
use gallon_api::{ApiState, DEFAULT_RECENT_LIMIT, api_router};
use gallon_core::{
  quota::QuantityPolicy,
  service::{DEFAULT_MAX_ATTEMPTS, QuotaService},
  store::QuotaStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GALLON_*` environment variables. Every key is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  pub min_gallons:  u32,
  pub max_gallons:  u32,
  pub max_attempts: u32,
  pub recent_limit: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let policy = QuantityPolicy::default();
    Self {
      host:         "127.0.0.1".to_string(),
      port:         8080,
      store_path:   PathBuf::from("gallon.db"),
      min_gallons:  policy.min(),
      max_gallons:  policy.max(),
      max_attempts: DEFAULT_MAX_ATTEMPTS,
      recent_limit: DEFAULT_RECENT_LIMIT,
    }
  }
}

impl ServerConfig {
  /// The per-request quantity range, rejecting an empty or zero-based one.
  pub fn policy(&self) -> gallon_core::Result<QuantityPolicy> {
    QuantityPolicy::new(self.min_gallons, self.max_gallons)
  }

  /// Wire a store into API state according to this configuration.
  pub fn state<S: QuotaStore>(&self, store: S) -> gallon_core::Result<ApiState<S>> {
    let service = QuotaService::new(Arc::new(store))
      .with_policy(self.policy()?)
      .with_max_attempts(self.max_attempts);
    Ok(ApiState::new(service).with_recent_limit(self.recent_limit))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn app<S>(state: ApiState<S>) -> Router
where
  S: QuotaStore + 'static,
{
  Router::new()
    .route("/health-check", get(health_check))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health_check() -> Json<Value> {
  Json(json!({
    "status":    "ok",
    "timestamp": Utc::now().to_rfc3339(),
  }))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
