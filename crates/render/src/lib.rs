//! Configuration printing
//!
//! This crate walks populated settings values into masked field views and
//! renders them as a console table or as indented JSON.

pub mod json;
pub mod table;
pub mod walker;

pub use json::JsonRenderer;
pub use table::TableRenderer;
pub use walker::{walk, walk_json, FieldRecord, FieldValue, Snapshot};

use std::io::Write;
use types::{OutputFormat, RenderError};

/// Output backend for a printed configuration
pub trait Render {
    /// Format produced by this renderer
    fn format(&self) -> OutputFormat;

    /// Write `snapshot` to `out`
    fn render(&self, snapshot: &Snapshot<'_>, out: &mut dyn Write) -> Result<(), RenderError>;
}

/// Renderer for `format`
pub fn renderer_for(format: OutputFormat) -> Box<dyn Render> {
    match format {
        OutputFormat::Table => Box::new(TableRenderer::new()),
        OutputFormat::Json => Box::new(JsonRenderer::new()),
    }
}

/// Render `snapshot` in `format` to `out`
pub fn render(format: OutputFormat, snapshot: &Snapshot<'_>, out: &mut dyn Write) -> Result<(), RenderError> {
    renderer_for(format).render(snapshot, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_dispatch() {
        for format in [OutputFormat::Table, OutputFormat::Json] {
            assert_eq!(renderer_for(format).format(), format);
        }
    }
}
