//! Layered configuration loading for linestats.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/linestats/config.toml` (system)
//! 2. `~/.config/linestats/config.toml` (user)
//! 3. `./linestats.toml` (local override), or the `--config` path
//! 4. Environment variables (`LINESTATS_*`, `RUST_LOG`)
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! annotations = "~/jingju/annotations/line-annotations.csv"
//! scores_dir = "~/jingju/JMSD-xml"
//! plot_dir = "/tmp/plots"
//!
//! [annotations]
//! has_header = false
//!
//! [filter]
//! role_types = ["dan", "laosheng"]
//! modes = ["erhuang", "xipi"]
//! tempo_categories = ["manban", "yuanban", "kuaiban"]
//! line_types = ["o1", "o2", "o", "c"]
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use sections::{AnnotationsConfig, FilterConfig, PathsConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value {value:?} for {var}, expected {expected}")]
    InvalidEnv {
        var: String,
        value: String,
        expected: &'static str,
    },
}

/// Complete linestats configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinestatsConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub annotations: AnnotationsConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl LinestatsConfig {
    /// Load configuration from all default sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(None)?;
        Ok(config)
    }

    /// Load configuration, letting `config_path` replace `./linestats.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    /// Load configuration and report which files and env vars applied.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = LinestatsConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            let overlay = loader::load_from_file(&path)?;
            overlay.apply_to(&mut config);
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources, |key| std::env::var(key).ok())?;

        Ok((config, sources))
    }

    /// Serialize config to a TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# linestats configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!("annotations = {}\n", toml_path(&self.paths.annotations)));
        output.push_str(&format!("scores_dir = {}\n", toml_path(&self.paths.scores_dir)));
        output.push_str(&format!("plot_dir = {}\n", toml_path(&self.paths.plot_dir)));

        output.push_str("\n[annotations]\n");
        output.push_str(&format!("has_header = {}\n", self.annotations.has_header));

        output.push_str("\n[filter]\n");
        output.push_str(&format!("role_types = {}\n", toml_list(&self.filter.role_types)));
        output.push_str(&format!("modes = {}\n", toml_list(&self.filter.modes)));
        output.push_str(&format!(
            "tempo_categories = {}\n",
            toml_list(&self.filter.tempo_categories)
        ));
        output.push_str(&format!("line_types = {}\n", toml_list(&self.filter.line_types)));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = {}\n",
            toml_str(&self.telemetry.log_level)
        ));

        output
    }
}

/// Quoted and escaped TOML string.
fn toml_str(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn toml_path(path: &Path) -> String {
    toml_str(&path.to_string_lossy())
}

fn toml_list(values: &[String]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| toml_str(v)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinestatsConfig::default();
        assert_eq!(config.filter.role_types, vec!["dan", "laosheng"]);
        assert_eq!(config.filter.line_types.len(), 4);
        assert!(!config.annotations.has_header);
        assert_eq!(config.telemetry.log_level, "warn");
    }

    #[test]
    fn test_to_toml_round_trips() {
        let mut config = LinestatsConfig::default();
        config.paths.scores_dir = PathBuf::from("/data/JMSD-xml");
        config.filter.modes = vec!["xipi".to_string()];
        config.annotations.has_header = true;

        let text = config.to_toml();
        assert!(text.contains("[paths]"));
        assert!(text.contains("modes = [\"xipi\"]"));

        let parsed: LinestatsConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_to_toml_escapes_quotes_and_backslashes() {
        let mut config = LinestatsConfig::default();
        config.paths.scores_dir = PathBuf::from(r#"C:\corpus\"jingju" scores"#);
        config.filter.line_types = vec![r#"o"1"#.to_string(), r"c\".to_string()];

        let parsed: LinestatsConfig = toml::from_str(&config.to_toml()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[filter]\nrole_types = [\"laosheng\"]\n\n[annotations]\nhas_header = true\n",
        )
        .unwrap();

        let (config, sources) = LinestatsConfig::load_with_sources_from(Some(&path)).unwrap();
        assert_eq!(config.filter.role_types, vec!["laosheng"]);
        assert!(config.annotations.has_header);
        // Untouched dimensions keep their defaults
        assert_eq!(config.filter.modes, FilterConfig::default_modes());
        assert!(sources.files.contains(&path));
    }
}
