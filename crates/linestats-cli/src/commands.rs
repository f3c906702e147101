//! Subcommand implementations.

use std::io::{self, Write};

use anyhow::{Context, Result};
use linestats::histogram::{self, OutputMode, Request};
use linestats::{Direction, MusicalFeatureFilter, PitchOptions, PlotSink, SvgPlot, ValueScale, Weighting};
use linestats_conf::{ConfigSources, LinestatsConfig};
use owo_colors::OwoColorize;

use crate::{FilterArgs, OutputArgs};

/// Configured filter with any dimension given on the command line replaced.
fn build_filter(config: &LinestatsConfig, args: &FilterArgs) -> MusicalFeatureFilter {
    let mut filter = MusicalFeatureFilter::from_config(&config.filter);
    if !args.role_types.is_empty() {
        filter = filter.role_types(args.role_types.iter().cloned());
    }
    if !args.modes.is_empty() {
        filter = filter.modes(args.modes.iter().cloned());
    }
    if !args.tempo_categories.is_empty() {
        filter = filter.tempo_categories(args.tempo_categories.iter().cloned());
    }
    if !args.line_types.is_empty() {
        filter = filter.line_types(args.line_types.iter().cloned());
    }
    filter
}

fn build_request(config: &LinestatsConfig, filter: &FilterArgs, output: &OutputArgs) -> Request {
    Request {
        filter: build_filter(config, filter),
        scale: if output.raw {
            ValueScale::Raw
        } else {
            ValueScale::Percentage
        },
        output: if output.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        },
        ..Request::from_config(config)
    }
}

fn plot_sink(config: &LinestatsConfig, output: &OutputArgs, name: &str) -> Option<SvgPlot> {
    output.plot.as_ref().map(|path| match path {
        Some(path) => SvgPlot::new(path),
        None => SvgPlot::new(config.paths.plot_dir.join(format!("{}.svg", name))),
    })
}

fn report_plot(sink: Option<&SvgPlot>) {
    if let Some(sink) = sink {
        eprintln!("{} {}", "Plot written to".green(), sink.path().display());
    }
}

pub fn pitch(
    config: &LinestatsConfig,
    filter: &FilterArgs,
    include_grace_notes: bool,
    count: bool,
    output: &OutputArgs,
) -> Result<()> {
    let request = build_request(config, filter, output);
    let options = PitchOptions {
        include_grace_notes,
        weighting: if count {
            Weighting::Count
        } else {
            Weighting::Duration
        },
    };
    let mut sink = plot_sink(config, output, "pitch");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    histogram::run_pitch(
        &request,
        &options,
        &mut out,
        sink.as_mut().map(|s| s as &mut dyn PlotSink),
    )
    .with_context(|| format!("Pitch histogram over {} failed", request.annotations.display()))?;
    out.flush().context("Failed to flush output")?;

    report_plot(sink.as_ref());
    Ok(())
}

pub fn interval(
    config: &LinestatsConfig,
    filter: &FilterArgs,
    directed: bool,
    output: &OutputArgs,
) -> Result<()> {
    let request = build_request(config, filter, output);
    let direction = if directed {
        Direction::Directed
    } else {
        Direction::Undirected
    };
    let mut sink = plot_sink(config, output, "interval");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    histogram::run_interval(
        &request,
        direction,
        &mut out,
        sink.as_mut().map(|s| s as &mut dyn PlotSink),
    )
    .with_context(|| format!("Interval histogram over {} failed", request.annotations.display()))?;
    out.flush().context("Failed to flush output")?;

    report_plot(sink.as_ref());
    Ok(())
}

pub fn show_config(config: &LinestatsConfig, sources: &ConfigSources) -> Result<()> {
    let mut out = io::stdout().lock();
    write!(out, "{}", config.to_toml())?;

    writeln!(out)?;
    if sources.files.is_empty() {
        writeln!(out, "# No config files loaded (compiled defaults)")?;
    } else {
        writeln!(out, "# Loaded from:")?;
        for file in &sources.files {
            writeln!(out, "#   {}", file.display())?;
        }
    }
    if !sources.env_overrides.is_empty() {
        writeln!(out, "# Environment overrides: {}", sources.env_overrides.join(", "))?;
    }
    Ok(())
}
