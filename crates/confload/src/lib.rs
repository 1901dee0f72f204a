//! Configuration loading for applications
//!
//! Populates settings structs from environment variables or YAML files,
//! validates them against their declared rules and prints the result as a
//! table or JSON with secret fields masked.
//!
//! ```ignore
//! #[derive(Default, Serialize, Deserialize, Validate)]
//! struct Conf {
//!     #[serde(rename = "PORT")]
//!     #[validate(range(min = 8080, max = 9000))]
//!     port: u16,
//!     #[serde(rename = "PASSWORD", with = "confload::secret")]
//!     password: String,
//! }
//!
//! let mut conf = Settings::<Conf>::from_env();
//! confload::load(&mut [&mut conf])?;
//! ```

pub mod pipeline;
pub mod settings;
pub mod traits;

pub use pipeline::{load, Phase, Pipeline};
pub use settings::{Settings, Source};
pub use traits::{Configer, Printer, Validater};

// Re-export the building blocks
pub use config::{parse_env, parse_yaml, parse_yaml_str, validate_struct, EnvLoader};
pub use render::{walk, walk_json, FieldRecord, Snapshot};
pub use types::secret;
pub use types::{
    output_format, set_output_format, Error, OutputFormat, RegisterError, RenderError, Result,
    Secret, ValidationError, ValidationIssue, SENSITIVE_DATA_MASK,
};
pub use validator::Validate;
