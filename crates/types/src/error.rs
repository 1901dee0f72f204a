//! Error types for the configuration pipeline

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type returned by the pipeline and by configuration objects
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration source could not be parsed
    #[error(transparent)]
    Register(#[from] RegisterError),

    /// One or more declared constraints were violated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The populated configuration could not be printed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Failure reported by a caller-defined configuration object
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap an arbitrary error or message raised by caller code
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Error::Other(err.into())
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while populating a settings object from its source
#[derive(Error, Debug)]
pub enum RegisterError {
    /// Environment values could not be coerced into the settings type
    #[error("failed to parse environment{}: {source}", prefix_note(.prefix))]
    Parse {
        prefix: Option<String>,
        #[source]
        source: Box<figment::Error>,
    },

    /// The YAML file could not be read
    #[error("failed to read YAML file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The YAML file is not a well-formed document
    #[error("failed to unmarshal YAML data from {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML document does not fit the settings type
    #[error("failed to unmarshal YAML data from {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn prefix_note(prefix: &Option<String>) -> String {
    match prefix {
        Some(prefix) => format!(" (prefix {prefix})"),
        None => String::new(),
    }
}

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Qualified field path, e.g. `database.port` or `servers[1].host`
    pub field: String,
    /// Rule that failed, e.g. `range`, `url`, `length`
    pub rule: String,
    /// Human readable description
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Field validation for '{}' failed on the '{}' rule: {}",
            self.field, self.rule, self.message
        )
    }
}

/// Every violation found while validating one settings object
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("configuration validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Issues reported for one qualified field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.field == field)
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures while turning a snapshot into console output
#[derive(Error, Debug)]
pub enum RenderError {
    /// The printed value is not struct-like
    #[error("printed configuration must be a struct or string-keyed map, found {found}")]
    NotARecord { found: &'static str },

    /// The value's `Serialize` impl reported an error
    #[error("failed to walk configuration fields: {0}")]
    Walk(String),

    /// JSON serialization failed
    #[error("failed to marshal config to JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the output sink failed
    #[error("failed to write configuration output: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            ValidationIssue {
                field: "name".to_string(),
                rule: "length".to_string(),
                message: "must not be empty".to_string(),
            },
            ValidationIssue {
                field: "port".to_string(),
                rule: "range".to_string(),
                message: "out of range".to_string(),
            },
        ]);

        let text = err.to_string();
        assert!(text.contains("'name' failed on the 'length' rule"));
        assert!(text.contains("'port' failed on the 'range' rule"));
        assert_eq!(err.for_field("port").count(), 1);
    }

    #[test]
    fn test_read_error_names_file() {
        let err = RegisterError::Read {
            path: PathBuf::from("/nonexistent/config.yaml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let text = err.to_string();
        assert!(text.contains("failed to read YAML file"));
        assert!(text.contains("/nonexistent/config.yaml"));
    }

    #[test]
    fn test_other_keeps_message() {
        let err = Error::other("registration failed");
        assert_eq!(err.to_string(), "registration failed");
    }
}
