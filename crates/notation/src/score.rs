//! Flattened score model: parts holding offset-ordered notes, chords and rests.

use serde::{Deserialize, Serialize};

use crate::pitch::Pitch;

/// A parsed multi-part score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub parts: Vec<Part>,
}

/// One part (track) of a score, flattened across measures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub name: String,
    /// Elements ordered by offset
    pub elements: Vec<Element>,
}

impl Part {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Part {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
        }
    }

    /// Pitched elements only (notes and chords, no rests).
    pub fn notes(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().filter(|e| !e.is_rest())
    }

    /// Every element, rests included.
    pub fn notes_and_rests(&self) -> &[Element] {
        &self.elements
    }
}

/// A timed event within a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Position from the start of the part, in quarter notes
    pub offset: f64,
    /// Length in quarter notes; 0 for grace notes
    pub quarter_length: f64,
    pub kind: ElementKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    Note(Note),
    Chord(Chord),
    Rest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub lyric: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub pitches: Vec<Pitch>,
    pub lyric: Option<String>,
}

impl Element {
    pub fn note(offset: f64, quarter_length: f64, pitch: Pitch) -> Self {
        Element {
            offset,
            quarter_length,
            kind: ElementKind::Note(Note { pitch, lyric: None }),
        }
    }

    pub fn rest(offset: f64, quarter_length: f64) -> Self {
        Element {
            offset,
            quarter_length,
            kind: ElementKind::Rest,
        }
    }

    /// Attach lyric text (ignored for rests).
    pub fn with_lyric(mut self, text: impl Into<String>) -> Self {
        match &mut self.kind {
            ElementKind::Note(note) => note.lyric = Some(text.into()),
            ElementKind::Chord(chord) => chord.lyric = Some(text.into()),
            ElementKind::Rest => {}
        }
        self
    }

    /// True only for single pitched notes; chords and rests are not notes.
    pub fn is_note(&self) -> bool {
        matches!(self.kind, ElementKind::Note(_))
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, ElementKind::Rest)
    }

    /// Zero-length (grace) note or chord.
    pub fn is_grace(&self) -> bool {
        !self.is_rest() && self.quarter_length <= 0.0
    }

    pub fn lyric(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Note(note) => note.lyric.as_deref(),
            ElementKind::Chord(chord) => chord.lyric.as_deref(),
            ElementKind::Rest => None,
        }
    }

    /// Sounding pitches: one for a note, several for a chord, none for a rest.
    pub fn pitches(&self) -> &[Pitch] {
        match &self.kind {
            ElementKind::Note(note) => std::slice::from_ref(&note.pitch),
            ElementKind::Chord(chord) => &chord.pitches,
            ElementKind::Rest => &[],
        }
    }

    /// The pitch of a single note.
    pub fn pitch(&self) -> Option<&Pitch> {
        match &self.kind {
            ElementKind::Note(note) => Some(&note.pitch),
            _ => None,
        }
    }
}
