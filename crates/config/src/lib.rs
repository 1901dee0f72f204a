//! Configuration sources and validation
//!
//! This crate populates settings objects from environment variables and
//! YAML files, and validates populated objects against their declared rules.

mod document;
pub mod loader;
pub mod validation;

pub use loader::{parse_env, parse_yaml, parse_yaml_str, EnvLoader};
pub use validation::{validate_struct, ConfigValidator, ValidationReport};
