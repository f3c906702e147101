//! Pitch and melodic-interval histograms over an annotated score corpus.
//!
//! The pipeline runs one way:
//!
//! annotation rows → [`MusicalFeatureFilter`] → score load (one-entry
//! [`ScoreCursor`] cache) → vocal part → note/rest stream → [`Tally`] →
//! [`ScaleOrdered`] → text/JSON report and optional [`BarChart`].
//!
//! Each matching score contributes its *whole* vocal part, not only the
//! span between the row's start and end offsets. Every line of a score is
//! therefore represented once per load of that score, whichever line
//! matched the filter.
//!
//! # Example
//!
//! ```no_run
//! use linestats::{histogram, MusicalFeatureFilter, PitchOptions, ValueScale};
//! use std::path::Path;
//!
//! let request = histogram::Request {
//!     annotations: Path::new("annotations/line-annotations.csv").into(),
//!     has_header: false,
//!     scores_dir: Path::new("JMSD-xml").into(),
//!     filter: MusicalFeatureFilter::default().role_types(["laosheng"]),
//!     scale: ValueScale::Percentage,
//!     output: histogram::OutputMode::Text,
//! };
//! let mut stdout = std::io::stdout();
//! histogram::run_pitch(&request, &PitchOptions::default(), &mut stdout, None).unwrap();
//! ```

pub mod aggregate;
pub mod annotation;
pub mod corpus;
pub mod filter;
pub mod histogram;
pub mod ordering;
pub mod plot;
pub mod report;
pub mod vocal;

pub use aggregate::{
    count_intervals, count_pitches, interval_histogram, pitch_histogram, Aggregation, Direction,
    PitchOptions, Tally, Weighting,
};
pub use annotation::{open_annotations, AnnotationError, AnnotationReader, AnnotationRow};
pub use corpus::{Advance, Corpus, MusicXmlLoader, ScoreCursor, ScoreLoader};
pub use filter::MusicalFeatureFilter;
pub use ordering::{order_interval, order_pitch, ScaleOrdered};
pub use plot::{BarChart, PlotSink, SvgPlot};
pub use report::{IntervalPolicy, LineFormat, PitchPolicy, Report, ValueScale};
pub use vocal::{into_vocal_part, vocal_part};

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can abort a histogram run.
///
/// There is no partial-results mode: the first error ends the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read annotations {path}: {source}")]
    AnnotationsUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Annotation(#[from] AnnotationError),

    #[error("cannot load score {score}: {source}")]
    ScoreUnreadable {
        score: String,
        source: notation::ScoreError,
    },

    #[error("no part with lyrics in the first notes of score {score}")]
    NoVocalPart { score: String },

    #[error(transparent)]
    Name(#[from] notation::NameError),

    #[error("cannot write plot {path}: {source}")]
    Plot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
