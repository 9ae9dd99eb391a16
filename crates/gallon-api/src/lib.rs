//! JSON REST API for the Gallon quota engine.
//!
//! Exposes an axum [`Router`] backed by a [`QuotaService`] over any
//! [`QuotaStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gallon_api::api_router(state))
//! ```

pub mod distributions;
pub mod employees;
pub mod error;
pub mod scan;
pub mod summary;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use gallon_core::{service::QuotaService, store::QuotaStore};

pub use error::ApiError;

/// Default number of entries returned by `GET /distributions/recent`.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Hard cap on any caller-supplied list limit.
pub const MAX_LIST_LIMIT: usize = 100;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub service:      Arc<QuotaService<S>>,
  pub recent_limit: usize,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      service:      Arc::clone(&self.service),
      recent_limit: self.recent_limit,
    }
  }
}

impl<S: QuotaStore> ApiState<S> {
  pub fn new(service: QuotaService<S>) -> Self {
    Self {
      service:      Arc::new(service),
      recent_limit: DEFAULT_RECENT_LIMIT,
    }
  }

  pub fn with_recent_limit(mut self, limit: usize) -> Self {
    self.recent_limit = limit.clamp(1, MAX_LIST_LIMIT);
    self
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: QuotaStore + 'static,
{
  Router::new()
    // Scanner
    .route("/scan", post(scan::handler::<S>))
    .route("/distributions/recent", get(distributions::recent::<S>))
    // Dashboard
    .route("/summary", get(summary::handler::<S>))
    // Employees
    .route("/employees", get(employees::list::<S>).post(employees::create::<S>))
    .route(
      "/employees/{id}",
      get(employees::get_one::<S>)
        .put(employees::update::<S>)
        .delete(employees::delete_one::<S>),
    )
    .route("/employees/{id}/distributions", get(distributions::for_employee::<S>))
    .route("/employees/{id}/reset", post(employees::reset::<S>))
    .with_state(state)
}

/// Clamp a caller-supplied limit into `1..=MAX_LIST_LIMIT`.
pub(crate) fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
  limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

#[cfg(test)]
mod tests;
