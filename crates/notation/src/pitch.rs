//! Pitch spelling and pitch-name parsing using winnow combinators.
//!
//! Names follow the score-library convention: `#` for sharps and `-` for
//! flats ("B-4" is B flat 4). `b` is accepted as a flat on input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use winnow::ascii::digit1;
use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;
use winnow::token::one_of;

use crate::NameError;

type PResult<T> = winnow::ModalResult<T>;

/// Octave assumed when a pitch name carries none.
pub const DEFAULT_OCTAVE: i8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    /// Semitone offset of the natural step from C (0-11)
    pub fn to_semitone(&self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 2,
            Step::E => 4,
            Step::F => 5,
            Step::G => 7,
            Step::A => 9,
            Step::B => 11,
        }
    }

    /// Position of the step within the diatonic scale (C=0 .. B=6)
    pub fn diatonic_index(&self) -> i32 {
        match self {
            Step::C => 0,
            Step::D => 1,
            Step::E => 2,
            Step::F => 3,
            Step::G => 4,
            Step::A => 5,
            Step::B => 6,
        }
    }

    pub fn from_char(c: char) -> Option<Step> {
        match c {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Step::C => 'C',
            Step::D => 'D',
            Step::E => 'E',
            Step::F => 'F',
            Step::G => 'G',
            Step::A => 'A',
            Step::B => 'B',
        }
    }
}

/// A spelled pitch: diatonic step, chromatic alteration, and octave.
///
/// Enharmonic spellings are distinct pitches ("G#4" != "A-4") but share a
/// MIDI number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Alteration in semitones (+1 sharp, -1 flat)
    pub alter: i8,
    pub octave: i8,
}

impl Pitch {
    pub fn new(step: Step, alter: i8, octave: i8) -> Self {
        Pitch { step, alter, octave }
    }

    /// Absolute pitch height (C4 = 60, A4 = 69), independent of spelling.
    pub fn midi(&self) -> i32 {
        12 * (self.octave as i32 + 1) + self.step.to_semitone() + self.alter as i32
    }

    /// Diatonic position counted in steps from C0, ignoring alteration.
    pub fn diatonic(&self) -> i32 {
        7 * self.octave as i32 + self.step.diatonic_index()
    }

    /// Pitch name with octave, e.g. "F#4" or "B-3".
    pub fn name_with_octave(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.step.as_char())?;
        let mark = if self.alter > 0 { "#" } else { "-" };
        for _ in 0..self.alter.unsigned_abs() {
            f.write_str(mark)?;
        }
        write!(f, "{}", self.octave)
    }
}

impl FromStr for Pitch {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_pitch_name
            .parse(s.trim())
            .map_err(|_| NameError::InvalidPitch(s.to_string()))
    }
}

fn parse_step(input: &mut &str) -> PResult<Step> {
    let c = one_of(['C', 'D', 'E', 'F', 'G', 'A', 'B']).parse_next(input)?;
    // one_of already validated the character
    Ok(Step::from_char(c).unwrap_or(Step::C))
}

/// Parse an alteration: any run of `#`, `-` or `b`.
fn parse_alter(input: &mut &str) -> PResult<i8> {
    let alter = opt(alt((
        repeat(1.., '#').map(|n: usize| n as i8),
        repeat(1.., '-').map(|n: usize| -(n as i8)),
        repeat(1.., 'b').map(|n: usize| -(n as i8)),
    )))
    .parse_next(input)?;
    Ok(alter.unwrap_or(0))
}

fn parse_octave(input: &mut &str) -> PResult<i8> {
    digit1.try_map(str::parse::<i8>).parse_next(input)
}

/// Parse a complete pitch name such as "C#5", "B-3" or "E".
pub fn parse_pitch_name(input: &mut &str) -> PResult<Pitch> {
    let step = parse_step(input)?;
    let alter = parse_alter(input)?;
    let octave = opt(parse_octave).parse_next(input)?;

    Ok(Pitch {
        step,
        alter,
        octave: octave.unwrap_or(DEFAULT_OCTAVE),
    })
}
