//! # adscope
//!
//! Natural-language time-range resolution and period-over-period
//! comparison for ad performance queries.
//!
//! The pipeline: a keyword classifier decides whether a query compares
//! two periods; deterministic strategies resolve explicit date
//! expressions; an evidence-validated LLM extraction covers the phrasings
//! the strategies cannot; both periods execute independently and their
//! metrics are reconciled into one payload.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use adscope::config::Config;
//! use adscope::llm::ApiLlmProvider;
//! use adscope::query::ComparisonOrchestrator;
//! # use adscope::query::QueryExecution;
//! # fn execution() -> Arc<dyn QueryExecution> { unimplemented!() }
//!
//! # async fn run() -> adscope::Result<()> {
//! let config = Config::load()?;
//! let llm = Arc::new(ApiLlmProvider::from_config(&config.llm)?);
//! let orchestrator = ComparisonOrchestrator::new(&config, llm, execution());
//! let outcome = orchestrator
//!     .handle("Compare October 2025 vs October 2024")
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&outcome)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod extraction;
pub mod llm;
pub mod query;
pub mod reconcile;
pub mod resolver;

pub use error::{AdscopeError, Result};
pub use query::{ComparisonOrchestrator, QueryExecution, QueryOutcome};
pub use resolver::{TimeExpressionResolver, TimeRange};
