//! Line annotations: one comma-separated row per lyrics line of the corpus.
//!
//! Fields are positional: score file, role type, mode, tempo category, line
//! type, start offset, end offset. Extra trailing fields are ignored.
//! Only a short row is an error; offsets that are blank or not numbers read
//! as `None`, so a header line read as data just fails the filter.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of fields in a row.
pub const FIELD_COUNT: usize = 7;

#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("annotation line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("failed reading annotations: {0}")]
    Io(#[from] std::io::Error),
}

/// One annotated line of a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRow {
    pub score_file: String,
    pub role_type: String,
    pub mode: String,
    pub tempo_category: String,
    pub line_type: String,
    /// Offsets of the line within the score, in quarter notes
    pub start_offset: Option<f64>,
    pub end_offset: Option<f64>,
}

impl AnnotationRow {
    /// Parse one record; `line` is 1-based and only used in errors.
    pub fn parse(record: &str, line: usize) -> Result<Self, AnnotationError> {
        let fields: Vec<&str> = record.split(',').map(str::trim).collect();
        if fields.len() < FIELD_COUNT {
            return Err(AnnotationError::Malformed {
                line,
                reason: format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
            });
        }

        let offset = |index: usize| fields[index].parse::<f64>().ok();

        Ok(AnnotationRow {
            score_file: fields[0].to_string(),
            role_type: fields[1].to_string(),
            mode: fields[2].to_string(),
            tempo_category: fields[3].to_string(),
            line_type: fields[4].to_string(),
            start_offset: offset(5),
            end_offset: offset(6),
        })
    }
}

/// Streams [`AnnotationRow`]s from any buffered reader.
///
/// Blank lines are skipped. The first line is data unless the reader was
/// built with `has_header`.
pub struct AnnotationReader<R> {
    lines: Lines<R>,
    line: usize,
    skip_header: bool,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        AnnotationReader {
            lines: reader.lines(),
            line: 0,
            skip_header: false,
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.skip_header = has_header;
        self
    }
}

impl<R: BufRead> Iterator for AnnotationReader<R> {
    type Item = Result<AnnotationRow, AnnotationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;

            if self.line == 1 && self.skip_header {
                continue;
            }

            let record = text.trim_start_matches('\u{feff}').trim();
            if record.is_empty() {
                continue;
            }

            return Some(AnnotationRow::parse(record, self.line));
        }
    }
}

/// Open an annotation file on disk.
pub fn open_annotations(
    path: &Path,
    has_header: bool,
) -> crate::Result<AnnotationReader<BufReader<File>>> {
    let file = File::open(path).map_err(|source| crate::Error::AnnotationsUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(AnnotationReader::new(BufReader::new(file)).with_header(has_header))
}
