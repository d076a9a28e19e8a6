//! AI-assisted date extraction with evidence validation.
//!
//! The LLM is the fallback for phrasing the deterministic resolver cannot
//! handle. Its output is never trusted as-is: every candidate must be
//! anchored in the literal text of the source query before it is accepted.

mod validator;

pub use validator::{ExtractionValidator, ValidatedExtraction};
