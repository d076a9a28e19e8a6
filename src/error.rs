//! Error types for adscope.

use thiserror::Error;

/// Accepted date phrasings, quoted back to the user when resolution fails.
pub const ACCEPTED_FORMATS: &str =
    "\"today\", \"last 7 days\", \"January 2025\", \"Q1 2025\", \"2025-01-01 to 2025-01-31\"";

/// Main error type for adscope operations.
#[derive(Error, Debug)]
pub enum AdscopeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Date resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Date-resolution errors surfaced to the caller.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// No strategy, deterministic or AI, produced the required number of
    /// valid ranges anchored in the source text.
    #[error(
        "Could not resolve {needed} date range(s) from \"{query}\". \
         Accepted formats include {ACCEPTED_FORMATS}."
    )]
    UnresolvableDateRange { query: String, needed: usize },
}

/// AI-extraction errors. Recovered internally while any fallback remains.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The LLM response did not parse as the expected JSON shape.
    #[error("Malformed AI response: {0}")]
    Malformed(String),

    /// Fewer than two candidates survived evidence validation.
    #[error("Only {validated} of {proposed} AI date candidates were anchored in the query text")]
    Insufficient { validated: usize, proposed: usize },

    /// The LLM call itself failed.
    #[error("LLM invocation failed: {0}")]
    Provider(String),
}

/// Downstream query-execution errors, isolated per period.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Query execution failed: {0}")]
    Failed(String),
}

/// Result type alias for adscope operations.
pub type Result<T> = std::result::Result<T, AdscopeError>;
