//! Capabilities a configuration object can offer to the pipeline

use render::Snapshot;
use types::Result;

/// Populates a settings object from its source. Every configuration object
/// passed to the pipeline implements this.
///
/// The optional capabilities are discovered through the `as_*` queries; the
/// defaults report them as unsupported.
pub trait Configer {
    /// Populate the settings object
    fn register(&mut self) -> Result<()>;

    /// Validation capability, if any
    fn as_validater(&self) -> Option<&dyn Validater> {
        None
    }

    /// Print capability, if any
    fn as_printer(&self) -> Option<&dyn Printer> {
        None
    }
}

/// Checks a populated settings object against its declared rules
pub trait Validater {
    fn validate(&self) -> Result<()>;
}

/// Exposes a populated settings object for rendering
pub trait Printer {
    /// Read-only view of the value to print
    fn print(&self) -> Snapshot<'_>;
}

impl<C: Configer + ?Sized> Configer for Box<C> {
    fn register(&mut self) -> Result<()> {
        (**self).register()
    }

    fn as_validater(&self) -> Option<&dyn Validater> {
        (**self).as_validater()
    }

    fn as_printer(&self) -> Option<&dyn Printer> {
        (**self).as_printer()
    }
}
