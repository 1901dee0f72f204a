//! Settings types used by the demo binary

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Configuration read from `MY_NAME`, `EXAMPLE_HOST`, `EXAMPLE_PORT` and
/// `MY_PASSWORD`
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct EnvConf {
    #[serde(rename = "MY_NAME")]
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(rename = "EXAMPLE_HOST")]
    #[validate(url)]
    pub example_host: String,

    #[serde(rename = "EXAMPLE_PORT")]
    #[validate(range(min = 8080, max = 9000))]
    pub port: u16,

    #[serde(rename = "MY_PASSWORD", with = "confload::secret")]
    pub password: String,
}

/// Configuration read from a YAML file
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct YamlConf {
    #[validate(length(min = 1))]
    pub app_name: String,

    #[validate(range(min = 1024, max = 65535))]
    pub port: u32,

    pub debug: bool,

    #[validate(nested)]
    pub database: DatabaseConf,

    #[validate(nested)]
    pub redis: RedisConf,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct DatabaseConf {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1024, max = 65535))]
    pub port: u32,
    #[validate(length(min = 1))]
    pub database: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(with = "confload::secret")]
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct RedisConf {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1024, max = 65535))]
    pub port: u32,
    #[serde(with = "confload::secret")]
    pub password: String,
}
