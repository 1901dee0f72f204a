//! Table output
//!
//! Renders the flattened field view as a two column `Config | Value` table
//! using comfy-table.

use crate::walker::{FieldRecord, Snapshot};
use crate::Render;
use comfy_table::{presets, ContentArrangement, Table};
use std::io::Write;
use tracing::debug;
use types::{OutputFormat, RenderError};

/// Table formatter for configuration output
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl TableRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Format rows as a table string, without a trailing newline
    pub fn format_records(&self, records: &[FieldRecord]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec!["Config", "Value"]);

        for record in records {
            table.add_row(vec![record.name.as_str(), record.value.as_str()]);
        }

        table.to_string()
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::ASCII_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Disabled);
        table
    }
}

impl Render for TableRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Table
    }

    fn render(&self, snapshot: &Snapshot<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        let records = snapshot.records()?;
        debug!(rows = records.len(), "Rendering configuration table");

        writeln!(out, "{}", self.format_records(&records))?;
        Ok(())
    }
}
