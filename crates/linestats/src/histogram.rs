//! End-to-end histogram runs: annotations in, report (and plot) out.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use linestats_conf::LinestatsConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::{
    interval_histogram, pitch_histogram, Aggregation, Direction, PitchOptions, Tally,
};
use crate::annotation::{open_annotations, AnnotationReader};
use crate::corpus::Corpus;
use crate::filter::MusicalFeatureFilter;
use crate::ordering::{order_interval, order_pitch, ScaleOrdered};
use crate::plot::{BarChart, PlotSink};
use crate::report::{IntervalPolicy, PitchPolicy, Report, ValueScale};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Progress lines, completion marker, then one line per category.
    #[default]
    Text,
    /// A single JSON document; progress goes to the log only.
    Json,
}

/// Inputs shared by both histogram variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub annotations: PathBuf,
    pub has_header: bool,
    pub scores_dir: PathBuf,
    pub filter: MusicalFeatureFilter,
    pub scale: ValueScale,
    pub output: OutputMode,
}

impl Request {
    /// Paths and filter from configuration, percentages, text output.
    pub fn from_config(config: &LinestatsConfig) -> Self {
        Request {
            annotations: config.paths.annotations.clone(),
            has_header: config.annotations.has_header,
            scores_dir: config.paths.scores_dir.clone(),
            filter: MusicalFeatureFilter::from_config(&config.filter),
            scale: ValueScale::default(),
            output: OutputMode::default(),
        }
    }
}

fn run<A, O>(
    request: &Request,
    report: &Report,
    out: &mut dyn Write,
    plot: Option<&mut dyn PlotSink>,
    aggregate: A,
    order: O,
) -> Result<ScaleOrdered>
where
    A: FnOnce(
        AnnotationReader<BufReader<File>>,
        &Corpus,
        &mut dyn FnMut(&str) -> Result<()>,
    ) -> Result<Aggregation>,
    O: FnOnce(&Tally, bool) -> Result<ScaleOrdered>,
{
    let rows = open_annotations(&request.annotations, request.has_header)?;
    let corpus = Corpus::new(&request.scores_dir);
    let text = request.output == OutputMode::Text;

    let mut progress = |score: &str| -> Result<()> {
        info!(score, "counting vocal part");
        if text {
            report.write_progress(&mut *out, score)?;
        }
        Ok(())
    };
    let aggregation = aggregate(rows, &corpus, &mut progress)?;
    info!(
        rows = aggregation.rows_matched,
        scores = aggregation.scores_loaded,
        categories = aggregation.tally.len(),
        "aggregation finished"
    );

    let ordered = order(&aggregation.tally, request.scale.normalize())?;

    match request.output {
        OutputMode::Text => {
            report.write_done(out)?;
            report.write_results(out, &ordered)?;
        }
        OutputMode::Json => report.write_json(out, &ordered, &aggregation)?,
    }

    if let Some(sink) = plot {
        sink.render(&BarChart::from_ordered(&ordered, report.x_label(), report.y_label()))?;
    }

    Ok(ordered)
}

/// Pitch histogram over the corpus described by `request`.
pub fn run_pitch(
    request: &Request,
    options: &PitchOptions,
    out: &mut dyn Write,
    plot: Option<&mut dyn PlotSink>,
) -> Result<ScaleOrdered> {
    let report = Report::pitch(&PitchPolicy {
        scale: request.scale,
        weighting: options.weighting,
    });
    run(
        request,
        &report,
        out,
        plot,
        |rows, corpus, progress| pitch_histogram(rows, corpus, &request.filter, options, progress),
        order_pitch,
    )
}

/// Melodic-interval histogram over the corpus described by `request`.
pub fn run_interval(
    request: &Request,
    direction: Direction,
    out: &mut dyn Write,
    plot: Option<&mut dyn PlotSink>,
) -> Result<ScaleOrdered> {
    let report = Report::interval(&IntervalPolicy {
        scale: request.scale,
        direction,
    });
    run(
        request,
        &report,
        out,
        plot,
        |rows, corpus, progress| interval_histogram(rows, corpus, &request.filter, direction, progress),
        order_interval,
    )
}
