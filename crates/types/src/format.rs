//! Output format selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

/// Format used when printing a populated configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Two column `Config | Value` table
    #[default]
    Table,
    /// Indented JSON object
    Json,
}

impl OutputFormat {
    fn as_u8(self) -> u8 {
        match self {
            OutputFormat::Table => 0,
            OutputFormat::Json => 1,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => f.write_str("table"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format '{}'. Valid formats: table, json", other)),
        }
    }
}

static CURRENT_FORMAT: AtomicU8 = AtomicU8::new(0);

/// Set the process-wide default used by pipelines that do not pick a format.
///
/// Meant to be called once at startup, before any pipeline runs. Pipelines
/// read the value when they are constructed.
pub fn set_output_format(format: OutputFormat) {
    CURRENT_FORMAT.store(format.as_u8(), Ordering::Relaxed);
}

/// Current process-wide default format
pub fn output_format() -> OutputFormat {
    OutputFormat::from_u8(CURRENT_FORMAT.load(Ordering::Relaxed))
}
