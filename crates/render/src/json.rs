//! JSON output

use crate::walker::Snapshot;
use crate::Render;
use std::io::Write;
use tracing::debug;
use types::{OutputFormat, RenderError};

/// Pretty-printed JSON renderer (2-space indent, newline terminated)
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Render for JsonRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn render(&self, snapshot: &Snapshot<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
        let value = snapshot.to_json()?;
        debug!("Rendering configuration as JSON");

        let mut buffer = serde_json::to_vec_pretty(&value)?;
        buffer.push(b'\n');
        out.write_all(&buffer)?;
        Ok(())
    }
}
