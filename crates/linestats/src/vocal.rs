//! Picks the sung part out of a multi-part score.

use notation::{Part, Score};

/// How many leading notes of a part are probed for lyrics.
pub const LYRIC_PROBE_NOTES: usize = 5;

fn carries_lyrics(part: &Part) -> bool {
    part.notes()
        .take(LYRIC_PROBE_NOTES)
        .any(|note| note.lyric().is_some_and(|text| !text.is_empty()))
}

/// The first part whose first five notes include a lyric syllable.
///
/// Assumes a single lyric-bearing part per score. `None` means the score has
/// no vocal line to analyse.
pub fn vocal_part(score: &Score) -> Option<&Part> {
    score.parts.iter().find(|part| carries_lyrics(part))
}

/// Owned variant of [`vocal_part`], consuming the score.
pub fn into_vocal_part(score: Score) -> Option<Part> {
    score.parts.into_iter().find(carries_lyrics)
}
