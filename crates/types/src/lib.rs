//! Shared types for the confload workspace
//!
//! This crate contains the error kinds, output format selection and secrecy
//! marking used by the adapters, the renderers and the pipeline.

pub mod error;
pub mod format;
pub mod secret;

// Re-export commonly used types
pub use error::{Error, RegisterError, RenderError, Result, ValidationError, ValidationIssue};
pub use format::{output_format, set_output_format, OutputFormat};
pub use secret::{Secret, SENSITIVE_DATA_MASK};
