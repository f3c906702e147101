//! Configuration sections and their compiled defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the corpus lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Line annotation file (comma-separated, one row per lyrics line).
    /// Default: ./annotations/line-annotations.csv
    #[serde(default = "PathsConfig::default_annotations")]
    pub annotations: PathBuf,

    /// Folder holding the MusicXML scores named by the annotation rows.
    /// Default: ./JMSD-xml
    #[serde(default = "PathsConfig::default_scores_dir")]
    pub scores_dir: PathBuf,

    /// Where bar charts are written when no explicit plot path is given.
    /// Default: ./plots
    #[serde(default = "PathsConfig::default_plot_dir")]
    pub plot_dir: PathBuf,
}

impl PathsConfig {
    fn default_annotations() -> PathBuf {
        PathBuf::from("annotations/line-annotations.csv")
    }

    fn default_scores_dir() -> PathBuf {
        PathBuf::from("JMSD-xml")
    }

    fn default_plot_dir() -> PathBuf {
        PathBuf::from("plots")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            annotations: Self::default_annotations(),
            scores_dir: Self::default_scores_dir(),
            plot_dir: Self::default_plot_dir(),
        }
    }
}

/// Layout of the annotation file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationsConfig {
    /// Skip the first line as a column header.
    /// Default: false
    #[serde(default)]
    pub has_header: bool,
}

/// Category values selected when a filter dimension is left unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "FilterConfig::default_role_types")]
    pub role_types: Vec<String>,

    /// Mode (shengqiang) values.
    #[serde(default = "FilterConfig::default_modes")]
    pub modes: Vec<String>,

    /// Tempo category (banshi) values.
    #[serde(default = "FilterConfig::default_tempo_categories")]
    pub tempo_categories: Vec<String>,

    #[serde(default = "FilterConfig::default_line_types")]
    pub line_types: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl FilterConfig {
    pub fn default_role_types() -> Vec<String> {
        strings(&["dan", "laosheng"])
    }

    pub fn default_modes() -> Vec<String> {
        strings(&["erhuang", "xipi"])
    }

    pub fn default_tempo_categories() -> Vec<String> {
        strings(&["manban", "yuanban", "kuaiban"])
    }

    /// o1/o2: extended/compressed erhuang opening, o: xipi opening, c: closing.
    pub fn default_line_types() -> Vec<String> {
        strings(&["o1", "o2", "o", "c"])
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            role_types: Self::default_role_types(),
            modes: Self::default_modes(),
            tempo_categories: Self::default_tempo_categories(),
            line_types: Self::default_line_types(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    /// Default: warn
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "warn".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
