//! Score model, pitch/interval naming, and MusicXML loading.
//!
//! This crate turns a MusicXML file into a flat, per-part sequence of notes,
//! chords and rests, and knows how to name and measure pitches and melodic
//! intervals the way score libraries spell them ("F#4", "B-3", "M-2").
//!
//! # Example
//!
//! ```
//! use notation::{Interval, Pitch};
//!
//! let a: Pitch = "A4".parse().unwrap();
//! let b: Pitch = "G#4".parse().unwrap();
//! assert_eq!(a.midi(), 69);
//!
//! let itvl = Interval::between(&a, &b);
//! assert_eq!(itvl.name(), "m2");
//! assert_eq!(itvl.directed_name(), "m-2");
//! assert_eq!(notation::interval_semitones("m-2").unwrap(), -1);
//! ```

pub mod interval;
pub mod musicxml;
pub mod pitch;
pub mod score;

pub use interval::{interval_semitones, Interval, Quality};
pub use musicxml::{load_score, parse_musicxml};
pub use pitch::{Pitch, Step};
pub use score::{Chord, Element, ElementKind, Note, Part, Score};

use std::path::PathBuf;
use thiserror::Error;

/// Errors from parsing pitch or interval names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("invalid pitch name: {0:?}")]
    InvalidPitch(String),

    #[error("invalid interval name: {0:?}")]
    InvalidInterval(String),
}

/// Errors from loading a score file.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read score {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("unsupported score format: {0}")]
    Unsupported(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("invalid value {value:?} for element <{element}>")]
    InvalidValue { element: String, value: String },
}
