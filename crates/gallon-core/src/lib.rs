//! Core types, quota rules and the service layer for the Gallon quota engine.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement [`store::QuotaStore`]; the request layer drives
//! [`service::QuotaService`].

pub mod distribution;
pub mod employee;
pub mod error;
pub mod quota;
pub mod service;
pub mod store;

pub use error::{DistributionError, Error, Ineligibility, Result};
