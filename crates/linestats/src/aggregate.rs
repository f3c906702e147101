//! Tallying pitches and melodic intervals over matching scores.
//!
//! The run loop threads a [`ScoreCursor`] through a pure step: a row comes
//! in with the cursor, the updated cursor comes out together with the count
//! delta for that row. A delta exists only when the row caused a (re)load.

use std::collections::BTreeMap;

use notation::{Interval, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::annotation::{AnnotationError, AnnotationRow};
use crate::corpus::{Advance, Corpus, ScoreCursor, ScoreLoader};
use crate::filter::MusicalFeatureFilter;
use crate::Result;

/// Category name → accumulated weight.
pub type Tally = BTreeMap<String, f64>;

/// What a pitch occurrence adds to its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Quarter-note length.
    #[default]
    Duration,
    /// One per note.
    Count,
}

/// Whether interval names carry melodic direction ("M-2" vs "M2").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Undirected,
    Directed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchOptions {
    pub include_grace_notes: bool,
    pub weighting: Weighting,
}

impl Default for PitchOptions {
    fn default() -> Self {
        PitchOptions {
            include_grace_notes: true,
            weighting: Weighting::Duration,
        }
    }
}

/// Pitch tally for one vocal part, keyed by pitch-with-octave.
///
/// Every member of a chord counts. Grace notes still create their category
/// when included, with a duration weight of zero.
pub fn count_pitches(part: &Part, options: &PitchOptions) -> Tally {
    let mut tally = Tally::new();
    for element in part.notes() {
        if !options.include_grace_notes && element.quarter_length <= 0.0 {
            continue;
        }
        let weight = match options.weighting {
            Weighting::Duration => element.quarter_length,
            Weighting::Count => 1.0,
        };
        for pitch in element.pitches() {
            *tally.entry(pitch.name_with_octave()).or_insert(0.0) += weight;
        }
    }
    tally
}

/// Interval tally for one vocal part over adjacent note pairs.
///
/// A rest or chord between two notes breaks the pair.
pub fn count_intervals(part: &Part, direction: Direction) -> Tally {
    let mut tally = Tally::new();
    for pair in part.notes_and_rests().windows(2) {
        let (Some(from), Some(to)) = (pair[0].pitch(), pair[1].pitch()) else {
            continue;
        };
        let interval = Interval::between(from, to);
        let name = match direction {
            Direction::Undirected => interval.name(),
            Direction::Directed => interval.directed_name(),
        };
        *tally.entry(name).or_insert(0.0) += 1.0;
    }
    tally
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub tally: Tally,
    /// Scores read from disk, counting reloads.
    pub scores_loaded: usize,
    pub rows_matched: usize,
}

impl Aggregation {
    fn merge(&mut self, delta: Tally) {
        for (name, weight) in delta {
            *self.tally.entry(name).or_insert(0.0) += weight;
        }
    }
}

/// One row through the cursor: the new cursor and, on a load, the delta.
fn step<L, C>(
    cursor: ScoreCursor,
    row: &AnnotationRow,
    corpus: &Corpus<L>,
    counter: &mut C,
) -> Result<(ScoreCursor, Option<Tally>)>
where
    L: ScoreLoader,
    C: FnMut(&Part) -> Tally,
{
    let (cursor, advance) = cursor.advance(&row.score_file, corpus)?;
    let delta = match (advance, cursor.part()) {
        (Advance::Loaded, Some(part)) => Some(counter(part)),
        _ => None,
    };
    Ok((cursor, delta))
}

/// Stream rows, filter them, and tally each newly loaded vocal part.
///
/// `progress` is told the score id every time a score is loaded. The first
/// error from any stage ends the run.
pub fn aggregate<I, L, C, P>(
    rows: I,
    corpus: &Corpus<L>,
    filter: &MusicalFeatureFilter,
    mut counter: C,
    mut progress: P,
) -> Result<Aggregation>
where
    I: IntoIterator<Item = std::result::Result<AnnotationRow, AnnotationError>>,
    L: ScoreLoader,
    C: FnMut(&Part) -> Tally,
    P: FnMut(&str) -> Result<()>,
{
    let mut aggregation = Aggregation::default();
    let mut cursor = ScoreCursor::new();

    for row in rows {
        let row = row?;
        if !filter.matches(&row) {
            debug!(score = %row.score_file, line_type = %row.line_type, "row filtered out");
            continue;
        }
        aggregation.rows_matched += 1;

        let (next, delta) = step(cursor, &row, corpus, &mut counter)?;
        cursor = next;

        if let Some(delta) = delta {
            aggregation.scores_loaded += 1;
            progress(&row.score_file)?;
            aggregation.merge(delta);
        }
    }

    Ok(aggregation)
}

/// Pitch histogram over every matching score.
pub fn pitch_histogram<I, L, P>(
    rows: I,
    corpus: &Corpus<L>,
    filter: &MusicalFeatureFilter,
    options: &PitchOptions,
    progress: P,
) -> Result<Aggregation>
where
    I: IntoIterator<Item = std::result::Result<AnnotationRow, AnnotationError>>,
    L: ScoreLoader,
    P: FnMut(&str) -> Result<()>,
{
    aggregate(rows, corpus, filter, |part| count_pitches(part, options), progress)
}

/// Melodic-interval histogram over every matching score.
pub fn interval_histogram<I, L, P>(
    rows: I,
    corpus: &Corpus<L>,
    filter: &MusicalFeatureFilter,
    direction: Direction,
    progress: P,
) -> Result<Aggregation>
where
    I: IntoIterator<Item = std::result::Result<AnnotationRow, AnnotationError>>,
    L: ScoreLoader,
    P: FnMut(&str) -> Result<()>,
{
    aggregate(rows, corpus, filter, |part| count_intervals(part, direction), progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notation::{Element, Pitch, Score, ScoreError};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::path::Path;

    fn p(name: &str) -> Pitch {
        name.parse().unwrap()
    }

    fn voice(elements: Vec<Element>) -> Part {
        let mut part = Part::new("P1", "Voice");
        part.elements = elements;
        part
    }

    fn tally(entries: &[(&str, f64)]) -> Tally {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn chord(offset: f64, quarter_length: f64, names: &[&str]) -> Element {
        Element {
            offset,
            quarter_length,
            kind: notation::ElementKind::Chord(notation::Chord {
                pitches: names.iter().map(|n| p(n)).collect(),
                lyric: None,
            }),
        }
    }

    #[test]
    fn test_pitch_duration_weighting() {
        let part = voice(vec![
            Element::note(0.0, 1.5, p("E4")),
            Element::rest(1.5, 0.5),
            Element::note(2.0, 1.0, p("E4")),
            Element::note(3.0, 0.25, p("F#4")),
        ]);
        assert_eq!(
            count_pitches(&part, &PitchOptions::default()),
            tally(&[("E4", 2.5), ("F#4", 0.25)])
        );
    }

    #[test]
    fn test_pitch_count_weighting() {
        let part = voice(vec![
            Element::note(0.0, 1.5, p("E4")),
            Element::note(1.5, 1.0, p("E4")),
            Element::note(2.5, 0.5, p("B-3")),
        ]);
        let options = PitchOptions {
            weighting: Weighting::Count,
            ..PitchOptions::default()
        };
        assert_eq!(count_pitches(&part, &options), tally(&[("B-3", 1.0), ("E4", 2.0)]));
    }

    #[test]
    fn test_grace_notes_excluded_entirely() {
        let part = voice(vec![
            Element::note(0.0, 0.0, p("D5")),
            Element::note(0.0, 2.0, p("C5")),
        ]);
        let options = PitchOptions {
            include_grace_notes: false,
            weighting: Weighting::Count,
        };
        let counted = count_pitches(&part, &options);
        assert!(!counted.contains_key("D5"));
        assert_eq!(counted, tally(&[("C5", 1.0)]));
    }

    #[test]
    fn test_included_grace_note_keeps_its_category() {
        let part = voice(vec![
            Element::note(0.0, 0.0, p("D5")),
            Element::note(0.0, 2.0, p("C5")),
        ]);
        assert_eq!(
            count_pitches(&part, &PitchOptions::default()),
            tally(&[("C5", 2.0), ("D5", 0.0)])
        );
    }

    #[test]
    fn test_every_chord_member_counts_for_pitches() {
        let part = voice(vec![chord(0.0, 1.0, &["A3", "E4"])]);
        assert_eq!(
            count_pitches(&part, &PitchOptions::default()),
            tally(&[("A3", 1.0), ("E4", 1.0)])
        );
    }

    #[test]
    fn test_rest_breaks_interval_pair() {
        let part = voice(vec![
            Element::note(0.0, 1.0, p("E4")),
            Element::rest(1.0, 1.0),
            Element::note(2.0, 1.0, p("A4")),
        ]);
        assert!(count_intervals(&part, Direction::Undirected).is_empty());
    }

    #[test]
    fn test_chord_breaks_interval_pair() {
        let part = voice(vec![
            Element::note(0.0, 1.0, p("E4")),
            chord(1.0, 1.0, &["A3", "E4"]),
            Element::note(2.0, 1.0, p("A4")),
        ]);
        assert!(count_intervals(&part, Direction::Directed).is_empty());
    }

    #[test]
    fn test_interval_names_by_direction() {
        let part = voice(vec![
            Element::note(0.0, 1.0, p("E4")),
            Element::note(1.0, 1.0, p("F#4")),
            Element::note(2.0, 1.0, p("E4")),
            Element::note(3.0, 1.0, p("E4")),
        ]);
        assert_eq!(
            count_intervals(&part, Direction::Undirected),
            tally(&[("M2", 2.0), ("P1", 1.0)])
        );
        assert_eq!(
            count_intervals(&part, Direction::Directed),
            tally(&[("M-2", 1.0), ("M2", 1.0), ("P1", 1.0)])
        );
    }

    /// Every score has the same two-note vocal part; loads are counted.
    struct StaticLoader {
        loads: Cell<usize>,
    }

    impl ScoreLoader for StaticLoader {
        fn load(&self, _path: &Path) -> std::result::Result<Score, ScoreError> {
            self.loads.set(self.loads.get() + 1);
            let part = voice(vec![
                Element::note(0.0, 1.0, p("E4")).with_lyric("一"),
                Element::note(1.0, 2.0, p("A4")),
            ]);
            Ok(Score { parts: vec![part] })
        }
    }

    fn row(score: &str, role: &str) -> std::result::Result<AnnotationRow, AnnotationError> {
        AnnotationRow::parse(&format!("{score},{role},xipi,manban,o,0,4"), 1)
    }

    #[test]
    fn test_aggregate_counts_each_load_once() {
        let corpus = Corpus::with_loader("/corpus", StaticLoader { loads: Cell::new(0) });
        let rows = vec![
            row("a.xml", "dan"),
            row("a.xml", "dan"),
            row("b.xml", "jing"),
            row("b.xml", "laosheng"),
        ];

        let mut seen = Vec::new();
        let result = pitch_histogram(
            rows,
            &corpus,
            &MusicalFeatureFilter::default(),
            &PitchOptions::default(),
            |score| {
                seen.push(score.to_string());
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(seen, vec!["a.xml", "b.xml"]);
        assert_eq!(result.scores_loaded, 2);
        assert_eq!(result.rows_matched, 3);
        assert_eq!(result.tally, tally(&[("A4", 4.0), ("E4", 2.0)]));
    }

    #[test]
    fn test_non_contiguous_rows_reload_and_count_again() {
        let corpus = Corpus::with_loader("/corpus", StaticLoader { loads: Cell::new(0) });
        let rows = vec![row("a.xml", "dan"), row("b.xml", "dan"), row("a.xml", "dan")];

        let result = interval_histogram(
            rows,
            &corpus,
            &MusicalFeatureFilter::default(),
            Direction::Undirected,
            |_| Ok(()),
        )
        .unwrap();

        assert_eq!(result.scores_loaded, 3);
        assert_eq!(result.tally, tally(&[("P4", 3.0)]));
    }

    #[test]
    fn test_malformed_row_aborts_the_run() {
        let corpus = Corpus::with_loader("/corpus", StaticLoader { loads: Cell::new(0) });
        let rows = vec![row("a.xml", "dan"), AnnotationRow::parse("broken", 2)];

        let result = pitch_histogram(
            rows,
            &corpus,
            &MusicalFeatureFilter::default(),
            &PitchOptions::default(),
            |_| Ok(()),
        );
        assert!(matches!(result, Err(crate::Error::Annotation(_))));
    }

    #[test]
    fn test_nothing_matches() {
        let corpus = Corpus::with_loader("/corpus", StaticLoader { loads: Cell::new(0) });
        let result = pitch_histogram(
            vec![row("a.xml", "jing")],
            &corpus,
            &MusicalFeatureFilter::default(),
            &PitchOptions::default(),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(result, Aggregation::default());
        assert_eq!(corpus.root(), Path::new("/corpus"));
    }
}
