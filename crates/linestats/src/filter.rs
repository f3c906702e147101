//! Multi-valued categorical filter over annotation rows.

use std::collections::BTreeSet;

use linestats_conf::FilterConfig;
use serde::{Deserialize, Serialize};

use crate::annotation::AnnotationRow;

/// Accepted values for each musical-feature dimension.
///
/// A row matches when every one of its four categories is accepted.
/// Offsets are not filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicalFeatureFilter {
    pub role_types: BTreeSet<String>,
    pub modes: BTreeSet<String>,
    pub tempo_categories: BTreeSet<String>,
    pub line_types: BTreeSet<String>,
}

fn to_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl MusicalFeatureFilter {
    /// Start from the configured category values.
    pub fn from_config(config: &FilterConfig) -> Self {
        MusicalFeatureFilter {
            role_types: to_set(config.role_types.iter().cloned()),
            modes: to_set(config.modes.iter().cloned()),
            tempo_categories: to_set(config.tempo_categories.iter().cloned()),
            line_types: to_set(config.line_types.iter().cloned()),
        }
    }

    pub fn role_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_types = to_set(values);
        self
    }

    pub fn modes<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modes = to_set(values);
        self
    }

    pub fn tempo_categories<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tempo_categories = to_set(values);
        self
    }

    pub fn line_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_types = to_set(values);
        self
    }

    pub fn matches(&self, row: &AnnotationRow) -> bool {
        self.role_types.contains(&row.role_type)
            && self.modes.contains(&row.mode)
            && self.tempo_categories.contains(&row.tempo_category)
            && self.line_types.contains(&row.line_type)
    }
}

impl Default for MusicalFeatureFilter {
    /// Every known category value in every dimension.
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}
