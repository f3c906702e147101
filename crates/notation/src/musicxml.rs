//! MusicXML loader.
//!
//! Reads `<score-partwise>` documents with roxmltree into the flattened
//! [`Score`] model. Only what pitch and interval statistics need is kept:
//! pitch spelling, duration in quarter notes, grace notes, rests, chords and
//! the first lyric syllable of each note.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::pitch::{Pitch, Step};
use crate::score::{Chord, Element, ElementKind, Note, Part, Score};
use crate::ScoreError;

type Result<T> = std::result::Result<T, ScoreError>;

/// Read and parse a MusicXML file.
pub fn load_score(path: &Path) -> Result<Score> {
    let xml = std::fs::read_to_string(path).map_err(|e| ScoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_musicxml(&xml)
}

/// Parse a MusicXML document held in memory.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc =
        Document::parse_with_options(xml, options).map_err(|e| ScoreError::Xml(e.to_string()))?;
    let root = doc.root_element();

    match root.tag_name().name() {
        "score-partwise" => parse_score_partwise(root),
        "score-timewise" => Err(ScoreError::Unsupported(
            "score-timewise (convert to score-partwise)".to_string(),
        )),
        other => Err(ScoreError::Unsupported(format!("root element <{}>", other))),
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(name))
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name).and_then(|n| n.text()).map(str::trim)
}

fn parse_number(node: Node, name: &str) -> Result<Option<f64>> {
    match child_text(node, name) {
        None => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ScoreError::InvalidValue {
                element: name.to_string(),
                value: text.to_string(),
            }),
    }
}

fn parse_score_partwise(root: Node) -> Result<Score> {
    let part_names = parse_part_list(root);

    let mut parts = Vec::new();
    for part_node in root.children().filter(|n| n.has_tag_name("part")) {
        let id = part_node
            .attribute("id")
            .ok_or_else(|| ScoreError::MissingElement("part id attribute".to_string()))?;
        let name = part_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("Part {}", parts.len() + 1));

        parts.push(parse_part(part_node, id, &name)?);
    }

    Ok(Score { parts })
}

/// Map part ids to their display names from `<part-list>`.
fn parse_part_list(root: Node) -> HashMap<String, String> {
    let mut names = HashMap::new();

    if let Some(part_list) = child(root, "part-list") {
        for score_part in part_list.children().filter(|n| n.has_tag_name("score-part")) {
            if let Some(id) = score_part.attribute("id") {
                let name = child_text(score_part, "part-name").unwrap_or("");
                names.insert(id.to_string(), name.to_string());
            }
        }
    }

    names
}

/// Running position while walking one part.
struct PartCursor {
    divisions: f64,
    position: f64,
    last_onset: f64,
}

impl Default for PartCursor {
    fn default() -> Self {
        PartCursor {
            divisions: 1.0,
            position: 0.0,
            last_onset: 0.0,
        }
    }
}

impl PartCursor {
    fn quarters(&self, divisions: f64) -> f64 {
        divisions / self.divisions
    }
}

fn parse_part(part_node: Node, id: &str, name: &str) -> Result<Part> {
    let mut part = Part::new(id, name);
    let mut cursor = PartCursor::default();

    for measure in part_node.children().filter(|n| n.has_tag_name("measure")) {
        for node in measure.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "attributes" => {
                    if let Some(divisions) = parse_number(node, "divisions")? {
                        if divisions <= 0.0 {
                            return Err(ScoreError::InvalidValue {
                                element: "divisions".to_string(),
                                value: divisions.to_string(),
                            });
                        }
                        cursor.divisions = divisions;
                    }
                }
                "backup" => {
                    let duration = parse_number(node, "duration")?.unwrap_or(0.0);
                    cursor.position = (cursor.position - cursor.quarters(duration)).max(0.0);
                }
                "forward" => {
                    let duration = parse_number(node, "duration")?.unwrap_or(0.0);
                    cursor.position += cursor.quarters(duration);
                }
                "note" => parse_note(node, &mut cursor, &mut part.elements)?,
                _ => {}
            }
        }
    }

    // Voices interleaved with <backup> arrive out of order; flatten by offset
    part.elements.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    debug!(part = id, elements = part.elements.len(), "part parsed");

    Ok(part)
}

fn parse_note(node: Node, cursor: &mut PartCursor, elements: &mut Vec<Element>) -> Result<()> {
    let in_chord = child(node, "chord").is_some();
    let grace = child(node, "grace").is_some();

    let quarter_length = if grace {
        0.0
    } else {
        cursor.quarters(parse_number(node, "duration")?.unwrap_or(0.0))
    };

    let offset = if in_chord {
        cursor.last_onset
    } else {
        let onset = cursor.position;
        cursor.position += quarter_length;
        cursor.last_onset = onset;
        onset
    };

    if child(node, "rest").is_some() {
        elements.push(Element::rest(offset, quarter_length));
        return Ok(());
    }

    // Unpitched percussion notes carry no pitch to count
    let Some(pitch_node) = child(node, "pitch") else {
        debug!(offset, "skipping note without pitch");
        return Ok(());
    };
    let pitch = parse_pitch(pitch_node)?;
    let lyric = parse_lyric(node);

    if in_chord {
        if let Some(previous) = elements.last_mut() {
            if fold_into_chord(previous, pitch, lyric.clone()) {
                return Ok(());
            }
        }
    }

    elements.push(Element {
        offset,
        quarter_length,
        kind: ElementKind::Note(Note { pitch, lyric }),
    });
    Ok(())
}

/// Merge a `<chord/>` member into the element sounding before it.
fn fold_into_chord(previous: &mut Element, pitch: Pitch, lyric: Option<String>) -> bool {
    match &mut previous.kind {
        ElementKind::Note(note) => {
            previous.kind = ElementKind::Chord(Chord {
                pitches: vec![note.pitch, pitch],
                lyric: note.lyric.take().or(lyric),
            });
            true
        }
        ElementKind::Chord(chord) => {
            chord.pitches.push(pitch);
            if chord.lyric.is_none() {
                chord.lyric = lyric;
            }
            true
        }
        ElementKind::Rest => false,
    }
}

fn parse_pitch(pitch_node: Node) -> Result<Pitch> {
    let step_text = child_text(pitch_node, "step")
        .ok_or_else(|| ScoreError::MissingElement("pitch/step".to_string()))?;
    let step = step_text
        .chars()
        .next()
        .filter(|_| step_text.len() == 1)
        .and_then(Step::from_char)
        .ok_or_else(|| ScoreError::InvalidValue {
            element: "step".to_string(),
            value: step_text.to_string(),
        })?;

    // Microtonal alters round to the nearest semitone
    let alter = parse_number(pitch_node, "alter")?.unwrap_or(0.0).round() as i8;

    let octave_text = child_text(pitch_node, "octave")
        .ok_or_else(|| ScoreError::MissingElement("pitch/octave".to_string()))?;
    let octave = octave_text
        .parse::<i8>()
        .map_err(|_| ScoreError::InvalidValue {
            element: "octave".to_string(),
            value: octave_text.to_string(),
        })?;

    Ok(Pitch::new(step, alter, octave))
}

/// Text of the first non-empty `<lyric><text>` of a note.
fn parse_lyric(node: Node) -> Option<String> {
    node.children()
        .filter(|n| n.has_tag_name("lyric"))
        .filter_map(|lyric| child_text(lyric, "text"))
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
