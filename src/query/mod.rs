//! Comparison-query orchestration.
//!
//! This module provides:
//! - Keyword-based detection of period-over-period comparison intent
//! - Orchestration of date resolution, isolated per-period execution,
//!   and result reconciliation

pub mod classifier;
pub mod executor;
pub mod types;

pub use classifier::*;
pub use executor::*;
pub use types::*;
