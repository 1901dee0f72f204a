//! Ready-made configuration object backed by the environment or a YAML file

use crate::traits::{Configer, Printer, Validater};
use config::{parse_yaml, validate_struct, EnvLoader};
use render::Snapshot;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use types::Result;
use validator::Validate;

/// Where a [`Settings`] value is registered from
#[derive(Debug, Clone)]
pub enum Source {
    Env(EnvLoader),
    Yaml(PathBuf),
}

/// Settings value plus the source it is loaded from.
///
/// Offers every pipeline capability: registration from its source,
/// validation through its `validator` rules and printing of the value.
/// Validation and printing can be switched off per instance.
#[derive(Debug, Clone)]
pub struct Settings<T> {
    value: T,
    source: Source,
    validate: bool,
    print: bool,
}

impl<T: Default> Settings<T> {
    /// Load from the process environment with the default loader
    pub fn from_env() -> Self {
        Self::from_env_with(EnvLoader::new())
    }

    pub fn from_env_with(loader: EnvLoader) -> Self {
        Self::with_source(Source::Env(loader))
    }

    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Self {
        Self::with_source(Source::Yaml(path.as_ref().to_path_buf()))
    }

    fn with_source(source: Source) -> Self {
        Self {
            value: T::default(),
            source,
            validate: true,
            print: true,
        }
    }
}

impl<T> Settings<T> {
    /// Start registration from `value` instead of `T::default()`
    pub fn with_initial(mut self, value: T) -> Self {
        self.value = value;
        self
    }

    /// Skip the validate phase
    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Skip the print phase
    pub fn quiet(mut self) -> Self {
        self.print = false;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Configer for Settings<T>
where
    T: Serialize + DeserializeOwned + Validate,
{
    fn register(&mut self) -> Result<()> {
        match &self.source {
            Source::Env(loader) => loader.load_into(&mut self.value)?,
            Source::Yaml(path) => parse_yaml(&mut self.value, path)?,
        }
        Ok(())
    }

    fn as_validater(&self) -> Option<&dyn Validater> {
        self.validate.then_some(self as &dyn Validater)
    }

    fn as_printer(&self) -> Option<&dyn Printer> {
        self.print.then_some(self as &dyn Printer)
    }
}

impl<T: Validate> Validater for Settings<T> {
    fn validate(&self) -> Result<()> {
        validate_struct(&self.value)?;
        Ok(())
    }
}

impl<T: Serialize> Printer for Settings<T> {
    fn print(&self) -> Snapshot<'_> {
        Snapshot::of(&self.value)
    }
}
