//! Melodic intervals between spelled pitches.
//!
//! An interval has a generic size (unison, second, ... counted on the staff),
//! a quality (P, M, m, A, d) derived from its chromatic size, and a
//! direction. Names are written "m3" (direction-agnostic) or "m-3"
//! (descending), the same spelling score libraries use.

use std::fmt;

use serde::{Deserialize, Serialize};
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;

use crate::pitch::Pitch;
use crate::NameError;

type PResult<T> = winnow::ModalResult<T>;

/// Semitones spanned by the major or perfect form of each simple interval.
const REFERENCE_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Perfect,
    Major,
    Minor,
    /// Augmented, with multiplicity (2 = doubly augmented)
    Augmented(u8),
    /// Diminished, with multiplicity (2 = doubly diminished)
    Diminished(u8),
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Perfect => f.write_str("P"),
            Quality::Major => f.write_str("M"),
            Quality::Minor => f.write_str("m"),
            Quality::Augmented(n) => f.write_str(&"A".repeat(*n as usize)),
            Quality::Diminished(n) => f.write_str(&"d".repeat(*n as usize)),
        }
    }
}

/// Unisons, fourths, fifths and their compounds take perfect qualities.
fn is_perfect_class(number: u32) -> bool {
    matches!((number - 1) % 7, 0 | 3 | 4)
}

/// Semitones of the major/perfect form of a generic interval number (>= 1).
fn reference_semitones(number: u32) -> i32 {
    let simple_index = ((number - 1) % 7) as usize;
    let octaves = ((number - 1) / 7) as i32;
    REFERENCE_SEMITONES[simple_index] + 12 * octaves
}

/// A melodic interval from one pitch to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub quality: Quality,
    /// Generic size, 1 = unison, 8 = octave
    pub number: u32,
    pub descending: bool,
    semitones: i32,
}

impl Interval {
    /// Measure the interval moving from `from` to `to`.
    pub fn between(from: &Pitch, to: &Pitch) -> Self {
        let steps = to.diatonic() - from.diatonic();
        let semitones = to.midi() - from.midi();
        // A unison has no staff direction; fall back to the chromatic one
        let descending = steps < 0 || (steps == 0 && semitones < 0);
        let number = steps.unsigned_abs() + 1;
        let size = if descending { -semitones } else { semitones };
        let diff = size - reference_semitones(number);

        let quality = if is_perfect_class(number) {
            match diff {
                0 => Quality::Perfect,
                n if n > 0 => Quality::Augmented(n as u8),
                n => Quality::Diminished((-n) as u8),
            }
        } else {
            match diff {
                0 => Quality::Major,
                -1 => Quality::Minor,
                n if n > 0 => Quality::Augmented(n as u8),
                n => Quality::Diminished((-n - 1) as u8),
            }
        };

        Interval {
            quality,
            number,
            descending,
            semitones,
        }
    }

    /// Signed chromatic displacement (negative when descending).
    pub fn semitones(&self) -> i32 {
        self.semitones
    }

    /// Direction-agnostic name, e.g. "M2" for both C-D and D-C.
    pub fn name(&self) -> String {
        format!("{}{}", self.quality, self.number)
    }

    /// Direction-qualified name: "M-2" descending, "M2" ascending.
    pub fn directed_name(&self) -> String {
        if self.descending {
            format!("{}-{}", self.quality, self.number)
        } else {
            self.name()
        }
    }
}

fn parse_quality(input: &mut &str) -> PResult<Quality> {
    alt((
        'P'.value(Quality::Perfect),
        'M'.value(Quality::Major),
        'm'.value(Quality::Minor),
        repeat(1.., 'A').map(|n: usize| Quality::Augmented(n as u8)),
        repeat(1.., 'd').map(|n: usize| Quality::Diminished(n as u8)),
    ))
    .parse_next(input)
}

/// Parse an interval name into (quality, descending, number).
pub fn parse_interval_name(input: &mut &str) -> PResult<(Quality, bool, u32)> {
    let quality = parse_quality(input)?;
    let descending = opt('-').parse_next(input)?.is_some();
    let number = digit1.try_map(str::parse::<u32>).parse_next(input)?;
    Ok((quality, descending, number))
}

/// Signed semitone size of an interval name such as "m3", "M-2" or "P8".
///
/// Descending names produce negative values, so sorting by this number puts
/// every descending interval below the unison and every ascending one above.
pub fn interval_semitones(name: &str) -> Result<i32, NameError> {
    let invalid = || NameError::InvalidInterval(name.to_string());

    let (quality, descending, number) = parse_interval_name
        .parse(name.trim())
        .map_err(|_| invalid())?;
    if number == 0 {
        return Err(invalid());
    }

    let perfect = is_perfect_class(number);
    let adjust = match (quality, perfect) {
        (Quality::Perfect, true) | (Quality::Major, false) => 0,
        (Quality::Minor, false) => -1,
        (Quality::Augmented(n), _) => n as i32,
        (Quality::Diminished(n), true) => -(n as i32),
        (Quality::Diminished(n), false) => -(n as i32) - 1,
        _ => return Err(invalid()),
    };

    let size = reference_semitones(number) + adjust;
    Ok(if descending { -size } else { size })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn itvl(from: &str, to: &str) -> Interval {
        Interval::between(&from.parse().unwrap(), &to.parse().unwrap())
    }

    #[test]
    fn test_simple_ascending() {
        assert_eq!(itvl("C4", "D4").name(), "M2");
        assert_eq!(itvl("E4", "F4").name(), "m2");
        assert_eq!(itvl("C#4", "E4").name(), "m3");
        assert_eq!(itvl("C4", "G4").name(), "P5");
        assert_eq!(itvl("F4", "B4").name(), "A4");
        assert_eq!(itvl("B3", "F4").name(), "d5");
        assert_eq!(itvl("C4", "C5").name(), "P8");
    }

    #[test]
    fn test_descending_names() {
        let i = itvl("D4", "C4");
        assert_eq!(i.name(), "M2");
        assert_eq!(i.directed_name(), "M-2");
        assert_eq!(i.semitones(), -2);

        let i = itvl("B4", "E4");
        assert_eq!(i.directed_name(), "P-5");
        assert_eq!(i.semitones(), -7);
    }

    #[test]
    fn test_unisons() {
        let i = itvl("G4", "G4");
        assert_eq!(i.directed_name(), "P1");
        assert_eq!(i.semitones(), 0);

        let i = itvl("C#4", "C4");
        assert_eq!(i.directed_name(), "A-1");
        assert_eq!(i.semitones(), -1);

        assert_eq!(itvl("C4", "C#4").directed_name(), "A1");
    }

    #[test]
    fn test_enharmonic_spelling_matters() {
        assert_eq!(itvl("C4", "D#4").name(), "A2");
        assert_eq!(itvl("C4", "E-4").name(), "m3");
        assert_eq!(itvl("C4", "D#4").semitones(), itvl("C4", "E-4").semitones());
    }

    #[test]
    fn test_compound_intervals() {
        assert_eq!(itvl("C4", "D5").name(), "M9");
        assert_eq!(itvl("D5", "C4").directed_name(), "M-9");
        assert_eq!(interval_semitones("M9").unwrap(), 14);
        assert_eq!(interval_semitones("P-15").unwrap(), -24);
    }

    #[test]
    fn test_interval_semitones() {
        let cases = [
            ("P1", 0),
            ("m2", 1),
            ("M2", 2),
            ("m3", 3),
            ("M3", 4),
            ("P4", 5),
            ("A4", 6),
            ("d5", 6),
            ("P5", 7),
            ("m6", 8),
            ("M6", 9),
            ("m7", 10),
            ("M7", 11),
            ("P8", 12),
            ("M-2", -2),
            ("m-7", -10),
            ("A-1", -1),
            ("d7", 9),
            ("AA4", 7),
        ];
        for (name, expected) in cases {
            assert_eq!(interval_semitones(name).unwrap(), expected, "{}", name);
        }
    }

    #[test]
    fn test_names_and_semitones_agree() {
        let pairs = [
            ("C4", "E4"),
            ("E4", "C4"),
            ("G#3", "C#5"),
            ("B-4", "E4"),
            ("F#4", "F#4"),
            ("A4", "G#4"),
        ];
        for (a, b) in pairs {
            let i = itvl(a, b);
            assert_eq!(interval_semitones(&i.directed_name()).unwrap(), i.semitones());
        }
    }

    #[test]
    fn test_invalid_interval_names() {
        for bad in ["", "P3", "M4", "m5", "X2", "M0", "M2x", "-2"] {
            assert!(interval_semitones(bad).is_err(), "{} should fail", bad);
        }
    }
}
