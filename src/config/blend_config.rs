//! Blend Configuration - solver, projection, analysis, and server settings
//!
//! Each struct implements `Default`, so a missing file or a partial file
//! behaves exactly like the built-in values for every absent key.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "COAL_BLEND_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "blend_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `BlendConfig::load()` which searches:
/// 1. `$COAL_BLEND_CONFIG` env var
/// 2. `./blend_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlendConfig {
    /// LP solver settings
    #[serde(default)]
    pub solver: SolverConfig,

    /// Composition display settings
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Downstream analysis settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl BlendConfig {
    /// Load configuration using the standard search order:
    /// 1. `$COAL_BLEND_CONFIG` environment variable
    /// 2. `./blend_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded blend config from {CONFIG_ENV_VAR}");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {CONFIG_ENV_VAR}, falling back");
                    }
                }
            } else {
                warn!(path = %path, "{CONFIG_ENV_VAR} points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded blend config from ./{LOCAL_CONFIG_FILE}");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{LOCAL_CONFIG_FILE}, using defaults");
                }
            }
        }

        info!("No {LOCAL_CONFIG_FILE} found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys only produce warnings; range violations are errors.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Solver
// ============================================================================

/// Passed explicitly into every optimizer call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Values this close to a quantity bound snap onto it (relative for upper bounds).
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    1e-6
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

// ============================================================================
// Projection
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Composition entries below this share of the total (%) are hidden.
    #[serde(default = "default_display_threshold")]
    pub display_threshold_percent: f64,
}

fn default_display_threshold() -> f64 {
    0.1
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            display_threshold_percent: default_display_threshold(),
        }
    }
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Currency label attached to cost figures
    #[serde(default = "default_currency")]
    pub currency: String,

    /// A source counts as "active" in insights above this share (%).
    #[serde(default = "default_active_source_percent")]
    pub active_source_percent: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}
fn default_active_source_percent() -> f64 {
    5.0
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            active_source_percent: default_active_source_percent(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by the `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Wall-clock limit for one pipeline run behind the HTTP layer.
    #[serde(default = "default_solve_timeout")]
    pub solve_timeout_secs: u64,
}

fn default_server_addr() -> String {
    "0.0.0.0:8080".to_string()
}
fn default_solve_timeout() -> u64 {
    30
}

impl ServerConfig {
    pub fn solve_timeout(&self) -> Duration {
        Duration::from_secs(self.solve_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            solve_timeout_secs: default_solve_timeout(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert!(BlendConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = BlendConfig::from_toml_str(
            r#"
[solver]
tolerance = 1e-8
"#,
        )
        .unwrap();
        assert_eq!(config.solver.tolerance, 1e-8);
        assert_eq!(config.projection.display_threshold_percent, 0.1);
        assert_eq!(config.server.solve_timeout_secs, 30);
    }

    #[test]
    fn toml_round_trip_preserves_values() {
        let mut config = BlendConfig::default();
        config.analysis.currency = "INR".to_string();
        let text = config.to_toml().unwrap();
        let back = BlendConfig::from_toml_str(&text).unwrap();
        assert_eq!(back.analysis.currency, "INR");
    }

    #[test]
    fn load_from_file_reports_path_on_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[solver\ntolerance = ").unwrap();
        let err = BlendConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == file.path()));
    }

    #[test]
    fn invalid_tolerance_rejected() {
        let err = BlendConfig::from_toml_str("[solver]\ntolerance = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
