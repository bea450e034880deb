//! `apicheck.toml` loading and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::prelude::*;

use apicheck_core::{CheckSettings, DEFAULT_REFERENCE_MARKER};

/// File names looked up, in order, by [`discover_config_path`].
pub const CONFIG_FILE_NAMES: [&str; 2] = ["apicheck.toml", ".apicheck.toml"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiCheckConfig {
    /// Class directories and jars searched for both candidate and reference classes.
    #[serde(default = "ApiCheckConfig::default_classpath")]
    pub classpath: Vec<PathBuf>,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub checks: ChecksConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ApiCheckConfig {
    fn default_classpath() -> Vec<PathBuf> {
        vec![PathBuf::from(".")]
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: ApiCheckConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot work. Run again after applying
    /// overrides that bypass [`load_from_str`](Self::load_from_str).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.naming.reference_marker.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "naming.reference_marker must not be empty".to_owned(),
            ));
        }
        if self.naming.reference_marker.contains(['.', '$', '/']) {
            return Err(ConfigError::Invalid(
                "naming.reference_marker must be part of a simple class name".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn to_settings(&self) -> CheckSettings {
        CheckSettings {
            reference_marker: self.naming.reference_marker.clone(),
            ignored_candidate_methods: self.checks.ignored_candidate_methods.clone(),
        }
    }
}

impl Default for ApiCheckConfig {
    fn default() -> Self {
        Self {
            classpath: Self::default_classpath(),
            naming: NamingConfig::default(),
            checks: ChecksConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Prefix that turns a candidate's simple name into its reference's.
    #[serde(default = "NamingConfig::default_reference_marker")]
    pub reference_marker: String,
}

impl NamingConfig {
    fn default_reference_marker() -> String {
        DEFAULT_REFERENCE_MARKER.to_owned()
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            reference_marker: Self::default_reference_marker(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChecksConfig {
    /// Candidate method signatures, in canonical form, dropped before methods are compared.
    #[serde(default = "ChecksConfig::default_ignored_candidate_methods")]
    pub ignored_candidate_methods: Vec<String>,
}

impl ChecksConfig {
    fn default_ignored_candidate_methods() -> Vec<String> {
        CheckSettings::default().ignored_candidate_methods
    }
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            ignored_candidate_methods: Self::default_ignored_candidate_methods(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`warn`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs as JSON lines.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled no log output is produced at all.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        // The report owns stdout; keep stderr quiet unless asked.
        "warn".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        })
    }

    /// The effective filter: the configured level, with `RUST_LOG` merged in when set.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let config_directives = Self::normalize_level_directives(&self.level);

        match env_directives {
            Some(env_directives) => {
                let combined = format!("{config_directives},{env_directives}");
                tracing_subscriber::EnvFilter::try_new(combined)
                    .or_else(|_| tracing_subscriber::EnvFilter::try_new(env_directives))
                    .unwrap_or_else(|_| self.config_env_filter())
            }
            None => self.config_env_filter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // `Display` for `toml::de::Error` quotes the offending source line; keep the message only.
        ConfigError::Toml(err.message().to_owned())
    }
}

/// First of [`CONFIG_FILE_NAMES`] that exists in `dir`.
pub fn discover_config_path(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .into_iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Loads the config found in `dir`, or the defaults when there is none.
pub fn load_for_dir(dir: &Path) -> Result<(ApiCheckConfig, Option<PathBuf>), ConfigError> {
    match discover_config_path(dir) {
        Some(path) => {
            let config = ApiCheckConfig::load_from_path(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((ApiCheckConfig::default(), None)),
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber. Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();
        let json_layer = (config.stderr && config.json).then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        });
        let plain_layer = (config.stderr && !config.json).then(|| {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
        });

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(plain_layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(target: "apicheck.config", "tracing initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ApiCheckConfig::load_from_str("").unwrap();
        assert_eq!(config, ApiCheckConfig::default());
        assert_eq!(config.classpath, vec![PathBuf::from(".")]);
        assert_eq!(config.to_settings(), CheckSettings::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = ApiCheckConfig::load_from_str(
            r#"
classpath = ["build/classes", "lib/reference.jar"]

[naming]
reference_marker = "Ref"

[checks]
ignored_candidate_methods = []

[logging]
level = "debug"
json = true
"#,
        )
        .unwrap();
        assert_eq!(
            config.classpath,
            vec![
                PathBuf::from("build/classes"),
                PathBuf::from("lib/reference.jar")
            ]
        );
        let settings = config.to_settings();
        assert_eq!(settings.reference_marker, "Ref");
        assert!(settings.ignored_candidate_methods.is_empty());
        assert!(config.logging.json);
        assert!(config.logging.stderr);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ApiCheckConfig::load_from_str("[naming]\nprefix = \"X\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)), "{err}");
    }

    #[test]
    fn toml_errors_do_not_echo_the_input() {
        let err = ApiCheckConfig::load_from_str("[logging]\njson = \"hunter2-not-a-bool\"\n")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("failed to parse toml config"), "{message}");
        assert!(!message.contains("json = "), "{message}");
    }

    #[test]
    fn marker_must_be_a_name_fragment() {
        for bad in ["", "  ", "a.b", "X$"] {
            let text = format!("[naming]\nreference_marker = {bad:?}\n");
            let err = ApiCheckConfig::load_from_str(&text).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{bad:?}: {err}");
        }
    }

    #[test]
    fn level_synonyms_normalize() {
        assert_eq!(LoggingConfig::normalize_level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::normalize_level_directives(""), "warn");
        assert_eq!(
            LoggingConfig::normalize_level_directives("apicheck.core=debug"),
            "apicheck.core=debug"
        );
    }

    #[test]
    fn discovery_prefers_the_visible_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(discover_config_path(dir.path()), None);
        let (config, path) = load_for_dir(dir.path()).unwrap();
        assert_eq!(config, ApiCheckConfig::default());
        assert_eq!(path, None);

        std::fs::write(dir.path().join(".apicheck.toml"), "").unwrap();
        std::fs::write(dir.path().join("apicheck.toml"), "classpath = [\"out\"]\n").unwrap();
        let (config, path) = load_for_dir(dir.path()).unwrap();
        assert_eq!(path, Some(dir.path().join("apicheck.toml")));
        assert_eq!(config.classpath, vec![PathBuf::from("out")]);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = ApiCheckConfig::load_from_path("/definitely/not/here/apicheck.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref path, .. } if path.ends_with("apicheck.toml")));
    }
}
