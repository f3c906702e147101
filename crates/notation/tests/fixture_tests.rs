//! Fixture-based tests for MusicXML loading.
//!
//! Each file in tests/fixtures/ is loaded from disk and checked against the
//! flattened part model.

use notation::{load_score, Interval, Pitch, Score, ScoreError};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Score {
    load_score(&fixture_path(name))
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

#[test]
fn test_fixture_two_parts() {
    let score = load_fixture("two_parts.xml");

    let names: Vec<&str> = score.parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Jinghu", "Voice"]);

    let voice = &score.parts[1];
    let pitches: Vec<String> = voice
        .notes()
        .map(|e| e.pitches()[0].name_with_octave())
        .collect();
    assert_eq!(pitches, vec!["G#4", "A4", "B4", "C#5", "B4"]);

    let lengths: Vec<f64> = voice.notes_and_rests().iter().map(|e| e.quarter_length).collect();
    assert_eq!(lengths, vec![0.5, 0.0, 0.5, 1.0, 1.5, 0.5]);

    let lyrics: Vec<Option<&str>> = voice.notes().map(|e| e.lyric()).collect();
    assert_eq!(lyrics, vec![None, Some("苏"), Some("三"), None, None]);
}

#[test]
fn test_fixture_melodic_intervals() {
    let score = load_fixture("two_parts.xml");
    let voice = &score.parts[1];

    let names: Vec<String> = voice
        .notes_and_rests()
        .windows(2)
        .filter_map(|pair| match (pair[0].pitch(), pair[1].pitch()) {
            (Some(a), Some(b)) => Some(Interval::between(a, b).directed_name()),
            _ => None,
        })
        .collect();

    assert_eq!(names, vec!["m2", "M2", "M2", "M-2"]);
}

#[test]
fn test_fixture_chords_and_voices() {
    let score = load_fixture("chords_and_voices.xml");
    let part = &score.parts[0];

    assert_eq!(part.notes_and_rests().len(), 4);
    // C3 from voice 2 sorts between the chord and F4
    let first = &part.notes_and_rests()[0];
    let expected: Vec<Pitch> = vec!["E4".parse().unwrap(), "G4".parse().unwrap()];
    assert_eq!(first.pitches(), expected.as_slice());
    assert_eq!(part.notes_and_rests()[1].pitch(), Some(&"C3".parse().unwrap()));
    assert_eq!(part.notes_and_rests()[2].offset, 2.0);
    assert!(part.notes_and_rests()[3].is_rest());
    assert_eq!(part.notes_and_rests()[3].offset, 4.0);
}

#[test]
fn test_fixture_timewise_rejected() {
    let result = load_score(&fixture_path("timewise.xml"));
    assert!(matches!(result, Err(ScoreError::Unsupported(_))));
}
