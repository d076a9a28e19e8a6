//! Configuration for adscope.

mod settings;

pub use settings::{Config, LlmConfig, ReconcileConfig, RoundingMode};
