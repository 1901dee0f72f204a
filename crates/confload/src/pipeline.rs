//! Register, validate and print configuration objects

use crate::traits::Configer;
use render::{renderer_for, Render};
use std::fmt;
use std::io::{self, Stdout, Write};
use tracing::{debug, debug_span};
use types::{output_format, OutputFormat, RenderError, Result};

/// Lifecycle of one configuration object inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unregistered,
    Registered,
    Validated,
    Printed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Unregistered => "unregistered",
            Phase::Registered => "registered",
            Phase::Validated => "validated",
            Phase::Printed => "printed",
        };
        f.write_str(name)
    }
}

/// Drives configuration objects through register, validate and print.
///
/// Objects are processed strictly in order. The first error aborts the
/// batch and is returned unchanged; later objects are never touched.
pub struct Pipeline<W: Write = Stdout> {
    format: OutputFormat,
    out: W,
}

impl Pipeline<Stdout> {
    /// Pipeline printing to stdout in the process-wide output format
    pub fn new() -> Self {
        Self::with_writer(output_format(), io::stdout())
    }
}

impl Default for Pipeline<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Pipeline<W> {
    /// Pipeline printing to `out` in `format`
    pub fn with_writer(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Override the output format for this pipeline only
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// Process every configuration object in order
    pub fn run(&mut self, configs: &mut [&mut dyn Configer]) -> Result<()> {
        let renderer = renderer_for(self.format);
        debug!(count = configs.len(), format = %self.format, "Loading configurations");

        for (index, config) in configs.iter_mut().enumerate() {
            self.process(index, &mut **config, renderer.as_ref())?;
        }

        Ok(())
    }

    /// Process a single configuration object, returning the last phase reached
    pub fn process(
        &mut self,
        index: usize,
        config: &mut dyn Configer,
        renderer: &dyn Render,
    ) -> Result<Phase> {
        let span = debug_span!("config", index);
        let _entered = span.enter();

        let mut phase = Phase::Unregistered;
        debug!(%phase, "Registering configuration");

        config.register()?;
        phase = Phase::Registered;

        if let Some(validater) = config.as_validater() {
            validater.validate()?;
            phase = Phase::Validated;
        }

        if let Some(printer) = config.as_printer() {
            let snapshot = printer.print();
            renderer.render(&snapshot, &mut self.out)?;
            self.out.flush().map_err(RenderError::from)?;
            phase = Phase::Printed;
        }

        debug!(%phase, "Configuration loaded");
        Ok(phase)
    }
}

/// Register, validate and print `configs` to stdout using the
/// process-wide output format.
pub fn load(configs: &mut [&mut dyn Configer]) -> Result<()> {
    Pipeline::new().run(configs)
}
