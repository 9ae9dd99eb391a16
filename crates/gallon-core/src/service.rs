//! [`QuotaService`]: the operation sequence around a [`QuotaStore`].
//!
//! Every entry point that reads quota state applies the monthly reset lazily
//! before looking at it. Writes are optimistic: the service reads an
//! employee, computes the new state in memory, and asks the store to commit
//! it only if nothing changed in between. A lost race re-reads and re-checks.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound as _, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  DistributionError,
  distribution::{Distribution, DistributionEntry, DistributionRecord},
  employee::{Employee, EmployeeUpdate, NewEmployee},
  quota::{DEFAULT_GALLONS, QuantityPolicy},
  store::{CommitOutcome, EmployeeQuery, QuotaStore, QuotaSummary},
};

/// Attempts made for an optimistic write before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Sub-second digits kept on every timestamp the service writes, so what it
/// returns is exactly what a store reads back.
pub const TIMESTAMP_PRECISION: u16 = 6;

/// Everything a service call can fail with.
///
/// `E` is the backend's error type. Only [`ServiceError::Store`] and
/// [`ServiceError::Contended`] are operational failures; the rest are
/// expected outcomes to show to the operator.
#[derive(Debug, Error)]
pub enum ServiceError<E> {
  /// The scan lookup found no active employee with that identifier.
  #[error("employee not found or inactive")]
  NotFoundOrInactive,

  #[error("employee not found: {0}")]
  EmployeeNotFound(Uuid),

  #[error("identifier {0:?} is already in use")]
  DuplicateIdentifier(String),

  #[error("invalid input: {0}")]
  Invalid(#[from] crate::Error),

  #[error(transparent)]
  Distribution(#[from] DistributionError),

  /// Every attempt lost a compare-and-swap race. Safe to retry.
  #[error("employee was modified concurrently; gave up after {attempts} attempts")]
  Contended { attempts: u32 },

  #[error("store error: {0}")]
  Store(#[source] E),
}

pub type ServiceResult<T, S> = Result<T, ServiceError<<S as QuotaStore>::Error>>;

/// The quota engine.
pub struct QuotaService<S> {
  store:        Arc<S>,
  policy:       QuantityPolicy,
  max_attempts: u32,
}

impl<S> Clone for QuotaService<S> {
  fn clone(&self) -> Self {
    Self {
      store:        Arc::clone(&self.store),
      policy:       self.policy,
      max_attempts: self.max_attempts,
    }
  }
}

impl<S: QuotaStore> QuotaService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      policy: QuantityPolicy::default(),
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }

  pub fn with_policy(mut self, policy: QuantityPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn with_max_attempts(mut self, attempts: u32) -> Self {
    self.max_attempts = attempts.max(1);
    self
  }

  pub fn policy(&self) -> QuantityPolicy { self.policy }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Administration ────────────────────────────────────────────────────

  /// Create an employee with a full quota for the month of `now`.
  pub async fn create_employee(
    &self,
    input: NewEmployee,
    now: DateTime<Utc>,
  ) -> ServiceResult<Employee, S> {
    let now = now.trunc_subsecs(TIMESTAMP_PRECISION);
    let employee = Employee::create(input, now)?;
    let inserted = self
      .store
      .insert_employee(employee.clone())
      .await
      .map_err(ServiceError::Store)?;

    if !inserted {
      return Err(ServiceError::DuplicateIdentifier(employee.identifier));
    }
    tracing::info!(id = %employee.id, identifier = %employee.identifier, "employee created");
    Ok(employee)
  }

  pub async fn list_employees(&self, query: &EmployeeQuery) -> ServiceResult<Vec<Employee>, S> {
    self
      .store
      .list_employees(query)
      .await
      .map_err(ServiceError::Store)
  }

  /// Apply an administrative edit, retrying if a distribution lands first.
  pub async fn update_employee(
    &self,
    id: Uuid,
    update: EmployeeUpdate,
    now: DateTime<Utc>,
  ) -> ServiceResult<Employee, S> {
    let now = now.trunc_subsecs(TIMESTAMP_PRECISION);
    for attempt in 1..=self.max_attempts {
      let mut employee = self.load(id).await?;
      let expected = employee.snapshot();

      employee.reset_if_new_month(now);
      employee.apply_update(update.clone(), now)?;

      match self.swap(expected, employee.clone()).await? {
        CommitOutcome::Committed => {
          tracing::info!(%id, "employee updated");
          return Ok(employee);
        }
        CommitOutcome::Conflict => {
          tracing::warn!(%id, attempt, "update lost a race, retrying");
        }
      }
    }
    Err(ServiceError::Contended { attempts: self.max_attempts })
  }

  pub async fn delete_employee(&self, id: Uuid) -> ServiceResult<(), S> {
    let deleted = self
      .store
      .delete_employee(id)
      .await
      .map_err(ServiceError::Store)?;
    if !deleted {
      return Err(ServiceError::EmployeeNotFound(id));
    }
    tracing::info!(%id, "employee deleted with its ledger");
    Ok(())
  }

  // ── Reset and eligibility ─────────────────────────────────────────────

  /// Load an employee with any pending monthly reset applied and persisted.
  pub async fn reset_if_new_month(&self, id: Uuid, now: DateTime<Utc>) -> ServiceResult<Employee, S> {
    let now = now.trunc_subsecs(TIMESTAMP_PRECISION);
    for attempt in 1..=self.max_attempts {
      let mut employee = self.load(id).await?;
      let expected = employee.snapshot();

      if !employee.reset_if_new_month(now) {
        return Ok(employee);
      }

      match self.swap(expected, employee.clone()).await? {
        CommitOutcome::Committed => {
          tracing::info!(
            %id,
            quota = employee.current_quota,
            reset_date = %employee.quota_reset_date,
            "monthly quota reset"
          );
          return Ok(employee);
        }
        CommitOutcome::Conflict => {
          tracing::warn!(%id, attempt, "reset lost a race, retrying");
        }
      }
    }
    Err(ServiceError::Contended { attempts: self.max_attempts })
  }

  /// Reset if needed, then report whether the employee may take gallons.
  pub async fn can_distribute(&self, id: Uuid, now: DateTime<Utc>) -> ServiceResult<bool, S> {
    let employee = self.reset_if_new_month(id, now).await?;
    Ok(employee.ineligibility().is_none())
  }

  // ── Distribution ──────────────────────────────────────────────────────

  /// Hand `quantity` gallons to the employee with surrogate id `id`.
  ///
  /// Checks run in order, first failure wins: quantity policy, eligibility
  /// (after the lazy reset), sufficiency. The decrement and the ledger
  /// append are committed together or not at all.
  pub async fn distribute(
    &self,
    id: Uuid,
    quantity: u32,
    notes: Option<String>,
    now: DateTime<Utc>,
  ) -> ServiceResult<Distribution, S> {
    let quantity = self.policy.validate(quantity)?;
    let now = now.trunc_subsecs(TIMESTAMP_PRECISION);

    for attempt in 1..=self.max_attempts {
      let mut employee = self.load(id).await?;
      let expected = employee.snapshot();

      if let Err(refusal) = employee.take(quantity, now) {
        // A lazy reset may have happened on the way to the refusal; keep it.
        if employee.snapshot() != expected
          && self.swap(expected, employee.clone()).await? == CommitOutcome::Conflict
        {
          tracing::warn!(%id, attempt, "reset lost a race, retrying");
          continue;
        }
        tracing::debug!(%id, quantity, %refusal, "distribution refused");
        return Err(refusal.into());
      }

      let record = DistributionRecord::new(employee.id, quantity, notes.clone(), now);
      let outcome = self
        .store
        .commit_distribution(expected, employee.clone(), record.clone())
        .await
        .map_err(ServiceError::Store)?;

      match outcome {
        CommitOutcome::Committed => {
          tracing::info!(
            %id,
            identifier = %employee.identifier,
            gallons = quantity,
            remaining = employee.current_quota,
            "gallons distributed"
          );
          return Ok(Distribution { employee, record });
        }
        CommitOutcome::Conflict => {
          tracing::warn!(%id, attempt, "distribution lost a race, retrying");
        }
      }
    }
    Err(ServiceError::Contended { attempts: self.max_attempts })
  }

  /// The scanner entry point: active-only lookup by business identifier,
  /// then [`distribute`](Self::distribute). `gallons` defaults to one.
  pub async fn scan(
    &self,
    identifier: &str,
    gallons: Option<u32>,
    notes: Option<String>,
    now: DateTime<Utc>,
  ) -> ServiceResult<Distribution, S> {
    let quantity = self.policy.validate(gallons.unwrap_or(DEFAULT_GALLONS))?;

    let employee = self
      .store
      .find_active_by_identifier(identifier.trim())
      .await
      .map_err(ServiceError::Store)?
      .ok_or(ServiceError::NotFoundOrInactive)?;

    match self.distribute(employee.id, quantity, notes, now).await {
      // Deleted between lookup and distribution.
      Err(ServiceError::EmployeeNotFound(_)) => Err(ServiceError::NotFoundOrInactive),
      other => other,
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn recent_distributions(&self, limit: usize) -> ServiceResult<Vec<DistributionEntry>, S> {
    self
      .store
      .recent_distributions(limit)
      .await
      .map_err(ServiceError::Store)
  }

  /// An employee's ledger, most recent first. Fails if the employee is
  /// unknown rather than returning an empty list.
  pub async fn employee_distributions(
    &self,
    id: Uuid,
    limit: Option<usize>,
  ) -> ServiceResult<Vec<DistributionRecord>, S> {
    self.load(id).await?;
    self
      .store
      .employee_distributions(id, limit)
      .await
      .map_err(ServiceError::Store)
  }

  pub async fn summary(&self) -> ServiceResult<QuotaSummary, S> {
    self.store.summary().await.map_err(ServiceError::Store)
  }

  // ── Helpers ───────────────────────────────────────────────────────────

  async fn load(&self, id: Uuid) -> ServiceResult<Employee, S> {
    self
      .store
      .get_employee(id)
      .await
      .map_err(ServiceError::Store)?
      .ok_or(ServiceError::EmployeeNotFound(id))
  }

  async fn swap(
    &self,
    expected: crate::quota::QuotaSnapshot,
    employee: Employee,
  ) -> ServiceResult<CommitOutcome, S> {
    self
      .store
      .swap_employee(expected, employee)
      .await
      .map_err(ServiceError::Store)
  }
}
