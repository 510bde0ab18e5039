//! Tool configuration and on-disk layout of engine runs.
//!
//! - `ToolConfig`: serializable settings (engine, timeout, limits, output).
//! - `WorkLayout`: computed per-unit output directories.

mod layout;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ktest::MAX_SUPPORTED_VERSION;
use crate::model::SuiteMetadata;

pub use layout::WorkLayout;

/// Environment variable that overrides the engine executable.
pub const ENGINE_ENV_VAR: &str = "KLEE_BIN";

/// File the test suite is written to unless configured otherwise.
pub const DEFAULT_OUTPUT_FILE: &str = "test_suite_generated.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Settings for one generation run.
///
/// Every field has a default, so a config file only needs the values it
/// changes. Loaded from JSON or YAML depending on the file extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Engine executable: a bare name resolved on `PATH`, or a path.
    pub engine: PathBuf,
    /// Arguments passed before the output-dir flag and the input unit.
    pub engine_args: Vec<String>,
    /// Wall-clock bound for one engine invocation, in seconds.
    pub timeout_secs: f64,
    /// Highest KTest format version accepted by the decoder.
    pub max_version: i32,
    /// Where the test-suite document is written.
    pub output: PathBuf,
    /// Required suffix of input units (without the dot).
    pub ir_extension: String,
    /// Suffix of record files produced by the engine (without the dot).
    pub record_extension: String,
    /// Name prefix of per-unit output directories.
    pub output_dir_prefix: String,
    pub suite: SuiteMetadata,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            engine: PathBuf::from("klee"),
            engine_args: vec!["-optimize".to_string()],
            timeout_secs: 1000.0,
            max_version: MAX_SUPPORTED_VERSION,
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            ir_extension: "ll".to_string(),
            record_extension: "ktest".to_string(),
            output_dir_prefix: "klee-out".to_string(),
            suite: SuiteMetadata::default(),
        }
    }
}

impl ToolConfig {
    /// Load a config file; `.yaml`/`.yml` are parsed as YAML, anything else as JSON.
    ///
    /// The loaded values are checked with [`ToolConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let parse_err = |message: String| ConfigError::Parse { path: path.to_path_buf(), message };
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&body).map_err(|e| parse_err(e.to_string()))?
            }
            _ => serde_json::from_str(&body).map_err(|e| parse_err(e.to_string()))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run can succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: format!("must be a positive number of seconds, got {}", self.timeout_secs),
            });
        }
        Ok(())
    }

    /// Apply the `KLEE_BIN` override, if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(engine) = std::env::var_os(ENGINE_ENV_VAR).filter(|v| !v.is_empty()) {
            self.engine = PathBuf::from(engine);
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tool() {
        let cfg = ToolConfig::default();
        assert_eq!(cfg.engine, PathBuf::from("klee"));
        assert_eq!(cfg.engine_args, vec!["-optimize".to_string()]);
        assert_eq!(cfg.timeout(), Duration::from_secs(1000));
        assert_eq!(cfg.max_version, 3);
        assert_eq!(cfg.output, PathBuf::from("test_suite_generated.json"));
    }

    #[test]
    fn loads_partial_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("cfg.json");
        fs::write(&json, r#"{"timeout_secs": 2.5, "suite": {"func_name": "sum"}}"#).unwrap();
        let cfg = ToolConfig::load(&json).unwrap();
        assert_eq!(cfg.timeout(), Duration::from_millis(2500));
        assert_eq!(cfg.suite.func_name, "sum");
        assert_eq!(cfg.suite.src_file, "./test.c");
        assert_eq!(cfg.engine, PathBuf::from("klee"));

        let yaml = dir.path().join("cfg.yaml");
        fs::write(&yaml, "engine: /opt/klee/bin/klee\nmax_version: 2\n").unwrap();
        let cfg = ToolConfig::load(&yaml).unwrap();
        assert_eq!(cfg.engine, PathBuf::from("/opt/klee/bin/klee"));
        assert_eq!(cfg.max_version, 2);
    }

    #[test]
    fn reports_parse_and_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(ToolConfig::load(&bad), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            ToolConfig::load(&dir.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let zero = dir.path().join("zero.json");
        fs::write(&zero, r#"{"timeout_secs": 0}"#).unwrap();
        let err = ToolConfig::load(&zero).unwrap_err();
        assert!(
            matches!(err, ConfigError::Invalid { field: "timeout_secs", .. }),
            "got {err:?}"
        );

        let negative = dir.path().join("negative.yaml");
        fs::write(&negative, "timeout_secs: -5\n").unwrap();
        assert!(matches!(ToolConfig::load(&negative), Err(ConfigError::Invalid { .. })));

        let cfg = ToolConfig { timeout_secs: f64::NAN, ..ToolConfig::default() };
        assert!(cfg.validate().is_err());
        assert!(ToolConfig::default().validate().is_ok());
    }
}
