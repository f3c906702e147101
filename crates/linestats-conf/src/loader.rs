//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, LinestatsConfig};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/linestats/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("linestats/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // An explicit path is pushed even when missing so loading reports it
    if let Some(path) = cli_path {
        files.push(path.to_path_buf());
        return files;
    }

    let local = PathBuf::from("linestats.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// One config file's worth of settings; absent keys leave the base alone.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    #[serde(default)]
    paths: PathsOverlay,
    #[serde(default)]
    annotations: AnnotationsOverlay,
    #[serde(default)]
    filter: FilterOverlay,
    #[serde(default)]
    telemetry: TelemetryOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PathsOverlay {
    annotations: Option<String>,
    scores_dir: Option<String>,
    plot_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnotationsOverlay {
    has_header: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FilterOverlay {
    role_types: Option<Vec<String>>,
    modes: Option<Vec<String>>,
    tempo_categories: Option<Vec<String>>,
    line_types: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TelemetryOverlay {
    log_level: Option<String>,
}

impl ConfigOverlay {
    /// Copy every key present in this file onto `config`.
    pub fn apply_to(self, config: &mut LinestatsConfig) {
        if let Some(v) = self.paths.annotations {
            config.paths.annotations = expand_path(&v);
        }
        if let Some(v) = self.paths.scores_dir {
            config.paths.scores_dir = expand_path(&v);
        }
        if let Some(v) = self.paths.plot_dir {
            config.paths.plot_dir = expand_path(&v);
        }

        if let Some(v) = self.annotations.has_header {
            config.annotations.has_header = v;
        }

        if let Some(v) = self.filter.role_types {
            config.filter.role_types = v;
        }
        if let Some(v) = self.filter.modes {
            config.filter.modes = v;
        }
        if let Some(v) = self.filter.tempo_categories {
            config.filter.tempo_categories = v;
        }
        if let Some(v) = self.filter.line_types {
            config.filter.line_types = v;
        }

        if let Some(v) = self.telemetry.log_level {
            config.telemetry.log_level = v;
        }
    }
}

/// Load one config file.
pub fn load_from_file(path: &Path) -> Result<ConfigOverlay, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

fn parse_toml(contents: &str, path: &Path) -> Result<ConfigOverlay, ConfigError> {
    toml::from_str(contents).map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Apply environment variable overrides to config.
///
/// `lookup` is the environment; production passes `std::env::var`.
/// A value that cannot be parsed for its setting is an error.
pub fn apply_env_overrides<F>(
    config: &mut LinestatsConfig,
    sources: &mut ConfigSources,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("LINESTATS_ANNOTATIONS") {
        config.paths.annotations = expand_path(&v);
        sources.env_overrides.push("LINESTATS_ANNOTATIONS".to_string());
    }
    if let Some(v) = lookup("LINESTATS_SCORES_DIR") {
        config.paths.scores_dir = expand_path(&v);
        sources.env_overrides.push("LINESTATS_SCORES_DIR".to_string());
    }
    if let Some(v) = lookup("LINESTATS_PLOT_DIR") {
        config.paths.plot_dir = expand_path(&v);
        sources.env_overrides.push("LINESTATS_PLOT_DIR".to_string());
    }
    if let Some(v) = lookup("LINESTATS_HAS_HEADER") {
        config.annotations.has_header = v.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            var: "LINESTATS_HAS_HEADER".to_string(),
            value: v.clone(),
            expected: "true or false",
        })?;
        sources.env_overrides.push("LINESTATS_HAS_HEADER".to_string());
    }

    if let Some(v) = lookup("LINESTATS_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("LINESTATS_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    Ok(())
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}
