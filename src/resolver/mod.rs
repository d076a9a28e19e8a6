//! Natural-language time-range resolution.
//!
//! This module turns free-form date expressions into concrete calendar
//! date ranges. Resolution is pure and deterministic against an injected
//! reference date, with no I/O.

mod temporal;
mod types;

pub use temporal::{TimeExpressionResolver, YEAR_MAX, YEAR_MIN};
pub use types::TimeRange;

pub(crate) use temporal::{month_number, MONTH_ALTERNATION};
