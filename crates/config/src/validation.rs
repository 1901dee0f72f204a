//! Configuration validation utilities
//!
//! Rule evaluation is delegated to the `validator` crate. This module turns
//! its nested error map into a flat, ordered list of issues so that every
//! failing field and rule is reported at once.
//!
//! Paths name struct fields as declared in Rust (`database.port`), not their
//! serde renames.

use std::collections::HashMap;
use tracing::debug;
use types::{ValidationError, ValidationIssue};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate every rule declared on `config`.
///
/// Nested records marked `#[validate(nested)]` are validated even when they
/// hold only default values.
pub fn validate_struct<T: Validate>(config: &T) -> Result<(), ValidationError> {
    let report = ConfigValidator::validate(config);
    debug!("{}", report.summary());
    report.into_result()
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate<T: Validate>(config: &T) -> ValidationReport {
        let mut report = ValidationReport::new();

        if let Err(errors) = config.validate() {
            Self::collect("", &errors, &mut report);
        }

        report.sort();
        report
    }

    fn collect(prefix: &str, errors: &ValidationErrors, report: &mut ValidationReport) {
        for (field, kind) in errors.errors() {
            let path = join_path(prefix, field);

            match kind {
                ValidationErrorsKind::Field(field_errors) => {
                    for error in field_errors {
                        report.add_error(&path, &error.code, &describe(error));
                    }
                }
                ValidationErrorsKind::Struct(nested) => {
                    Self::collect(&path, nested, report);
                }
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        Self::collect(&format!("{}[{}]", path, index), nested, report);
                    }
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

fn describe(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    let mut params: Vec<(String, String)> = error
        .params
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    params.sort();

    if params.is_empty() {
        format!("'{}' rule not satisfied", error.code)
    } else {
        let rendered: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        format!("'{}' rule not satisfied ({})", error.code, rendered.join(", "))
    }
}

/// Validation report containing every violated rule
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, field: &str, rule: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Number of failing rules per field
    pub fn counts_by_field(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for issue in &self.errors {
            *counts.entry(issue.field.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} errors across {} fields",
            self.errors.len(),
            self.counts_by_field().len()
        )
    }

    /// `validator` reports fields in hash order; sort for stable output.
    fn sort(&mut self) {
        self.errors
            .sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.rule.cmp(&b.rule)));
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationError::new(self.errors))
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
