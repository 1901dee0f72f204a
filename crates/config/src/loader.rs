//! Environment and YAML loaders
//!
//! Both loaders merge their source onto the value the settings object
//! already holds, so keys missing from the source keep their current
//! (usually `Default`) value. Fields marked `#[serde(skip)]` are invisible
//! to serde and come back as their `Default` after every load.

use crate::document;
use figment::{
    providers::{Env, Serialized},
    value::{Dict, Map},
    Figment, Metadata, Profile, Provider,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;
use types::RegisterError;

/// Separator used to address nested records from the environment
pub const DEFAULT_NESTED_SEPARATOR: &str = "__";

/// Populates settings objects from process environment variables.
///
/// Variable names are matched case-sensitively against serde field names
/// (after `rename`/`alias`). `DATABASE__HOST` addresses `host` inside the
/// `DATABASE` record. Values are coerced by the type of the field they land
/// in, so `PASSWORD=12345` fills a `String` field and `PORT=8090` a `u16`.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: Option<String>,
    separator: String,
    only: Vec<String>,
}

impl EnvLoader {
    /// Loader reading every variable without a prefix
    pub fn new() -> Self {
        Self {
            prefix: None,
            separator: DEFAULT_NESTED_SEPARATOR.to_string(),
            only: Vec::new(),
        }
    }

    /// Loader reading only variables starting with `prefix`; the prefix is
    /// stripped before matching field names.
    pub fn prefixed(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            ..Self::new()
        }
    }

    /// Use `separator` instead of `__` for nested keys
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    /// Restrict the loader to the listed keys (after prefix stripping)
    pub fn only(mut self, keys: &[&str]) -> Self {
        self.only = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    fn provider(&self) -> TextEnv {
        let mut env = match &self.prefix {
            Some(prefix) => Env::prefixed(prefix),
            None => Env::raw(),
        }
        .split(self.separator.as_str());

        if !self.only.is_empty() {
            let only: Vec<&str> = self.only.iter().map(String::as_str).collect();
            env = env.only(&only);
        }

        // Every chained filter resets the case flag, so it goes last
        TextEnv(env.lowercase(false))
    }

    /// Merge matching environment variables into `config`
    pub fn load_into<T>(&self, config: &mut T) -> Result<(), RegisterError>
    where
        T: Serialize + DeserializeOwned,
    {
        debug!(prefix = ?self.prefix, separator = %self.separator, "Parsing environment");

        let loaded: T = Figment::from(Serialized::defaults(&*config))
            .merge(self.provider())
            .extract_lossy()
            .map_err(|source| RegisterError::Parse {
                prefix: self.prefix.clone(),
                source: Box::new(source),
            })?;

        *config = loaded;
        Ok(())
    }

    /// Build a fresh value from `T::default()` and the environment
    pub fn load<T>(&self) -> Result<T, RegisterError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let mut config = T::default();
        self.load_into(&mut config)?;
        Ok(config)
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment provider emitting every value as text.
///
/// figment's `Env` guesses a type per value, which a `String` field then
/// rejects for `12345` or `true`. Text values are coerced by
/// `extract_lossy` only where the target field is numeric or boolean.
struct TextEnv(Env);

impl Provider for TextEnv {
    fn metadata(&self) -> Metadata {
        self.0.metadata()
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        self.0
            .iter()
            .fold(Figment::new(), |figment, (key, value)| {
                figment.merge(Serialized::default(key.as_str(), value))
            })
            .data()
    }
}

/// Populate `config` from the environment with the default loader
pub fn parse_env<T>(config: &mut T) -> Result<(), RegisterError>
where
    T: Serialize + DeserializeOwned,
{
    EnvLoader::new().load_into(config)
}

/// Read a YAML file and merge it into `config`.
///
/// An empty file leaves `config` untouched.
pub fn parse_yaml<T, P>(config: &mut T, path: P) -> Result<(), RegisterError>
where
    T: Serialize + DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!(path = %path.display(), "Parsing YAML file");

    let contents = fs::read_to_string(path).map_err(|source| RegisterError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    merge_yaml(config, &contents, path)
}

/// Merge an in-memory YAML document into `config`
pub fn parse_yaml_str<T>(config: &mut T, yaml_content: &str) -> Result<(), RegisterError>
where
    T: Serialize + DeserializeOwned,
{
    merge_yaml(config, yaml_content, Path::new("<string>"))
}

fn merge_yaml<T>(config: &mut T, contents: &str, path: &Path) -> Result<(), RegisterError>
where
    T: Serialize + DeserializeOwned,
{
    if contents.trim().is_empty() {
        debug!(path = %path.display(), "YAML document is empty, keeping current values");
        return Ok(());
    }

    let extract_error = |source| RegisterError::Extract {
        path: path.to_path_buf(),
        source,
    };

    let current = serde_yaml::to_value(&*config).map_err(extract_error)?;
    let document =
        document::decode(contents, &current).map_err(|source| RegisterError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    if document.is_null() {
        debug!(path = %path.display(), "YAML document is null, keeping current values");
        return Ok(());
    }

    let merged = document::overlay(current, document);
    *config = serde_yaml::from_value(merged).map_err(extract_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct EnvConf {
        #[serde(rename = "CFL_TEST_NAME")]
        name: String,
        #[serde(rename = "CFL_TEST_AGE")]
        age: i32,
        #[serde(rename = "CFL_TEST_TEAM")]
        team: String,
        #[serde(skip)]
        untagged: String,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Database {
        host: String,
        port: u16,
        username: String,
        password: String,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct YamlConf {
        name: String,
        port: u16,
        debug: bool,
        database: Database,
    }

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_env_populates_tagged_fields() {
        temp_env::with_vars(
            [
                ("CFL_TEST_NAME", Some("coderx")),
                ("CFL_TEST_AGE", Some("99")),
                ("CFL_TEST_TEAM", Some("backend")),
            ],
            || {
                let mut conf = EnvConf::default();
                parse_env(&mut conf).unwrap();

                assert_eq!(conf.name, "coderx");
                assert_eq!(conf.age, 99);
                assert_eq!(conf.team, "backend");
                assert_eq!(conf.untagged, "");
            },
        );
    }

    #[test]
    fn test_parse_env_keeps_defaults_for_absent_vars() {
        temp_env::with_vars(
            [
                ("CFL_TEST_NAME", Some("coderx")),
                ("CFL_TEST_AGE", None),
                ("CFL_TEST_TEAM", None),
            ],
            || {
                let mut conf = EnvConf {
                    team: "platform".to_string(),
                    ..EnvConf::default()
                };
                parse_env(&mut conf).unwrap();

                assert_eq!(conf.name, "coderx");
                assert_eq!(conf.age, 0);
                assert_eq!(conf.team, "platform");
            },
        );
    }

    #[test]
    fn test_parse_env_rebuilds_skipped_fields_from_default() {
        temp_env::with_vars([("CFL_TEST_NAME", Some("coderx"))], || {
            let mut conf = EnvConf {
                untagged: "kept".to_string(),
                ..EnvConf::default()
            };
            parse_env(&mut conf).unwrap();

            assert_eq!(conf.name, "coderx");
            assert_eq!(conf.untagged, "");
        });
    }

    #[test]
    fn test_parse_env_matches_names_case_sensitively() {
        temp_env::with_vars(
            [("CFL_TEST_NAME", None), ("cfl_test_name", Some("lower"))],
            || {
                let mut conf = EnvConf::default();
                parse_env(&mut conf).unwrap();
                assert_eq!(conf.name, "");
            },
        );
    }

    #[test]
    fn test_parse_env_keeps_text_for_string_fields() {
        temp_env::with_vars(
            [
                ("CFL_TEST_NAME", Some("true")),
                ("CFL_TEST_TEAM", Some("12345")),
                ("CFL_TEST_AGE", Some("7")),
            ],
            || {
                let mut conf = EnvConf::default();
                parse_env(&mut conf).unwrap();

                assert_eq!(conf.name, "true");
                assert_eq!(conf.team, "12345");
                assert_eq!(conf.age, 7);
            },
        );
    }

    #[test]
    fn test_parse_env_coerces_by_field_type() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Typed {
            #[serde(rename = "CFLTYPED_FLAG")]
            flag: bool,
            #[serde(rename = "CFLTYPED_RATIO")]
            ratio: f64,
            #[serde(rename = "CFLTYPED_OFFSET")]
            offset: i64,
            #[serde(rename = "CFLTYPED_LIMIT")]
            limit: Option<u32>,
        }

        temp_env::with_vars(
            [
                ("CFLTYPED_FLAG", Some("true")),
                ("CFLTYPED_RATIO", Some("0.5")),
                ("CFLTYPED_OFFSET", Some("-12")),
                ("CFLTYPED_LIMIT", Some("300")),
            ],
            || {
                let typed: Typed = EnvLoader::new().load().unwrap();
                assert!(typed.flag);
                assert_eq!(typed.ratio, 0.5);
                assert_eq!(typed.offset, -12);
                assert_eq!(typed.limit, Some(300));
            },
        );
    }

    #[test]
    fn test_parse_env_rejects_uncoercible_value() {
        temp_env::with_vars([("CFL_TEST_AGE", Some("ninety-nine"))], || {
            let mut conf = EnvConf::default();
            let err = parse_env(&mut conf).unwrap_err();
            assert!(matches!(err, RegisterError::Parse { .. }));
            assert!(err.to_string().contains("failed to parse environment"));
        });
    }

    #[test]
    fn test_prefixed_env_with_nested_records() {
        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Nested {
            #[serde(rename = "HOST")]
            host: String,
            #[serde(rename = "PORT")]
            port: u16,
        }

        #[derive(Debug, Default, Serialize, Deserialize)]
        struct Outer {
            #[serde(rename = "NAME")]
            name: String,
            #[serde(rename = "DB")]
            db: Nested,
        }

        temp_env::with_vars(
            [
                ("CFLNEST_NAME", Some("svc")),
                ("CFLNEST_DB__HOST", Some("localhost")),
                ("CFLNEST_DB__PORT", Some("5432")),
            ],
            || {
                let outer: Outer = EnvLoader::prefixed("CFLNEST_").load().unwrap();
                assert_eq!(outer.name, "svc");
                assert_eq!(outer.db.host, "localhost");
                assert_eq!(outer.db.port, 5432);
            },
        );
    }

    #[test]
    fn test_only_restricts_keys() {
        temp_env::with_vars(
            [
                ("CFL_TEST_NAME", Some("coderx")),
                ("CFL_TEST_AGE", Some("42")),
            ],
            || {
                let conf: EnvConf = EnvLoader::new().only(&["CFL_TEST_NAME"]).load().unwrap();
                assert_eq!(conf.name, "coderx");
                assert_eq!(conf.age, 0);
            },
        );
    }

    #[test]
    fn test_parse_yaml_full_document() {
        let file = write_yaml(
            r#"name: TestApp
port: 8080
debug: true
database:
  host: localhost
  port: 5432
  username: testuser
  password: testpass
"#,
        );

        let mut conf = YamlConf::default();
        parse_yaml(&mut conf, file.path()).unwrap();

        assert_eq!(conf.name, "TestApp");
        assert_eq!(conf.port, 8080);
        assert!(conf.debug);
        assert_eq!(conf.database.host, "localhost");
        assert_eq!(conf.database.port, 5432);
        assert_eq!(conf.database.password, "testpass");
    }

    #[test]
    fn test_parse_yaml_partial_document_keeps_defaults() {
        let file = write_yaml("name: PartialApp\n");

        let mut conf = YamlConf::default();
        parse_yaml(&mut conf, file.path()).unwrap();

        assert_eq!(conf.name, "PartialApp");
        assert_eq!(conf.port, 0);
        assert!(!conf.debug);
        assert_eq!(conf.database, Database::default());
    }

    #[test]
    fn test_parse_yaml_empty_file() {
        let file = write_yaml("");

        let mut conf = YamlConf::default();
        parse_yaml(&mut conf, file.path()).unwrap();
        assert_eq!(conf, YamlConf::default());
    }

    #[test]
    fn test_parse_yaml_file_not_found() {
        let mut conf = YamlConf::default();
        let err = parse_yaml(&mut conf, "/nonexistent/path/config.yaml").unwrap_err();

        assert!(matches!(err, RegisterError::Read { .. }));
        assert!(err.to_string().contains("failed to read YAML file"));
    }

    #[test]
    fn test_parse_yaml_invalid_document() {
        let file = write_yaml("name: TestApp\nport: [invalid\n  structure\n");

        let mut conf = YamlConf::default();
        let err = parse_yaml(&mut conf, file.path()).unwrap_err();

        assert!(matches!(err, RegisterError::Decode { .. }));
        assert!(err.to_string().contains("failed to unmarshal YAML data"));
    }

    #[test]
    fn test_parse_yaml_plain_scalars_into_string_fields() {
        let mut conf = YamlConf::default();
        parse_yaml_str(
            &mut conf,
            "name: 12345\nport: 8080\ndatabase:\n  host: true\n  password: 1.10\n",
        )
        .unwrap();

        assert_eq!(conf.name, "12345");
        assert_eq!(conf.port, 8080);
        assert_eq!(conf.database.host, "true");
        assert_eq!(conf.database.password, "1.10");
    }

    #[test]
    fn test_parse_yaml_keeps_current_nested_values() {
        let mut conf = YamlConf {
            database: Database {
                host: "db.internal".to_string(),
                port: 5432,
                ..Database::default()
            },
            ..YamlConf::default()
        };
        parse_yaml_str(&mut conf, "database:\n  port: 6543\n").unwrap();

        assert_eq!(conf.database.host, "db.internal");
        assert_eq!(conf.database.port, 6543);
    }

    #[test]
    fn test_parse_yaml_type_mismatch() {
        let mut conf = YamlConf::default();
        let err = parse_yaml_str(&mut conf, "port: not-a-number\n").unwrap_err();
        assert!(matches!(err, RegisterError::Extract { .. }));
        assert!(err.to_string().contains("failed to unmarshal YAML data"));
    }
}
