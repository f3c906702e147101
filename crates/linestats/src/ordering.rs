//! Ordering tallied categories by pitch height or signed interval size.

use std::collections::BTreeMap;

use notation::{interval_semitones, NameError, Pitch};
use serde::{Deserialize, Serialize};

use crate::aggregate::Tally;
use crate::Result;

/// Three parallel sequences in ascending scale order.
///
/// Names that share a scale value (enharmonic spellings such as "G#4" and
/// "A-4", or "A1" and "m2") are merged into one entry labelled
/// "A-4/G#4" whose weight is their sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleOrdered {
    pub scale_values: Vec<i32>,
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl ScaleOrdered {
    pub fn len(&self) -> usize {
        self.scale_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scale_values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &str, f64)> + '_ {
        self.scale_values
            .iter()
            .zip(&self.names)
            .zip(&self.values)
            .map(|((scale, name), value)| (*scale, name.as_str(), *value))
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

fn order_by<F>(tally: &Tally, normalize: bool, scale_of: F) -> Result<ScaleOrdered>
where
    F: Fn(&str) -> std::result::Result<i32, NameError>,
{
    let mut by_scale: BTreeMap<i32, (Vec<&str>, f64)> = BTreeMap::new();
    for (name, weight) in tally {
        let scale = scale_of(name)?;
        let entry = by_scale.entry(scale).or_default();
        entry.0.push(name);
        entry.1 += weight;
    }

    let total: f64 = tally.values().sum();
    if by_scale.is_empty() || (normalize && total == 0.0) {
        return Ok(ScaleOrdered::default());
    }

    let mut ordered = ScaleOrdered::default();
    for (scale, (mut names, weight)) in by_scale {
        names.sort_unstable();
        ordered.scale_values.push(scale);
        ordered.names.push(names.join("/"));
        ordered
            .values
            .push(if normalize { weight * 100.0 / total } else { weight });
    }
    Ok(ordered)
}

/// Order pitch names by MIDI number; `normalize` turns weights into percentages.
pub fn order_pitch(tally: &Tally, normalize: bool) -> Result<ScaleOrdered> {
    order_by(tally, normalize, |name| {
        name.parse::<Pitch>().map(|pitch| pitch.midi())
    })
}

/// Order interval names by signed semitone size, descending ones first.
pub fn order_interval(tally: &Tally, normalize: bool) -> Result<ScaleOrdered> {
    order_by(tally, normalize, interval_semitones)
}
