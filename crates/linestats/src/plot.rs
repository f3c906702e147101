//! Bar-chart sink for ordered histograms.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ordering::ScaleOrdered;
use crate::{Error, Result};

/// Bars at numeric x positions, optionally labelled with category ticks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
    pub ticks: Option<Vec<String>>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

impl BarChart {
    /// One bar per ordered entry, placed at its scale value and ticked with its name.
    pub fn from_ordered(ordered: &ScaleOrdered, x_label: &str, y_label: &str) -> Self {
        BarChart {
            positions: ordered.scale_values.iter().map(|v| f64::from(*v)).collect(),
            values: ordered.values.clone(),
            ticks: Some(ordered.names.clone()),
            x_label: Some(x_label.to_string()),
            y_label: Some(y_label.to_string()),
        }
    }

    fn tick_label(&self, index: usize) -> String {
        match &self.ticks {
            Some(ticks) => ticks.get(index).cloned().unwrap_or_default(),
            None => format!("{}", self.positions[index]),
        }
    }
}

/// Where charts go.
pub trait PlotSink {
    fn render(&mut self, chart: &BarChart) -> Result<()>;
}

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 70.0;
/// Bar width in x units, as a fraction of the spacing between positions.
const BAR_WIDTH: f64 = 0.8;
const BAR_FILL: &str = "gray";
const Y_TICKS: usize = 5;

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Writes each chart as a standalone SVG file.
#[derive(Debug, Clone)]
pub struct SvgPlot {
    path: PathBuf,
}

impl SvgPlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SvgPlot { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Render `chart` to SVG markup.
    pub fn to_svg(chart: &BarChart) -> String {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let bottom = MARGIN_TOP + plot_h;

        let (min_x, max_x) = chart
            .positions
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(*x), hi.max(*x))
            });
        let (min_x, max_x) = if min_x.is_finite() { (min_x, max_x) } else { (0.0, 0.0) };
        // Half a slot of padding each side, like a bar plot's default limits
        let span = (max_x - min_x) + 1.0;
        let unit = plot_w / span;
        let x_of = |x: f64| MARGIN_LEFT + (x - min_x + 0.5) * unit;

        let max_y = chart.values.iter().cloned().fold(0.0_f64, f64::max);
        let max_y = if max_y > 0.0 { max_y * 1.05 } else { 1.0 };
        let y_of = |y: f64| bottom - (y / max_y) * plot_h;

        let mut buffer = String::new();
        buffer.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        buffer.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">\n",
            WIDTH, HEIGHT, WIDTH, HEIGHT
        ));
        buffer.push_str(&format!(
            "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            WIDTH, HEIGHT
        ));

        for (index, (x, y)) in chart.positions.iter().zip(&chart.values).enumerate() {
            let left = x_of(*x - BAR_WIDTH / 2.0);
            let top = y_of(y.max(0.0));
            buffer.push_str(&format!(
                "  <rect class=\"bar\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>\n",
                left,
                top,
                BAR_WIDTH * unit,
                bottom - top,
                BAR_FILL
            ));
            buffer.push_str(&format!(
                "  <text class=\"tick\" x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" text-anchor=\"middle\">{}</text>\n",
                x_of(*x),
                bottom + 16.0,
                xml_escape(&chart.tick_label(index))
            ));
        }

        // Axes
        buffer.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\"/>\n",
            MARGIN_LEFT,
            bottom,
            MARGIN_LEFT + plot_w,
            bottom
        ));
        buffer.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"black\"/>\n",
            MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom
        ));
        for step in 0..=Y_TICKS {
            let value = max_y * step as f64 / Y_TICKS as f64;
            buffer.push_str(&format!(
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" text-anchor=\"end\">{:.1}</text>\n",
                MARGIN_LEFT - 6.0,
                y_of(value) + 4.0,
                value
            ));
        }

        if let Some(label) = &chart.x_label {
            buffer.push_str(&format!(
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"15\" text-anchor=\"middle\">{}</text>\n",
                MARGIN_LEFT + plot_w / 2.0,
                HEIGHT - 20.0,
                xml_escape(label)
            ));
        }
        if let Some(label) = &chart.y_label {
            let cx = 20.0;
            let cy = MARGIN_TOP + plot_h / 2.0;
            buffer.push_str(&format!(
                "  <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"15\" text-anchor=\"middle\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>\n",
                cx,
                cy,
                cx,
                cy,
                xml_escape(label)
            ));
        }

        buffer.push_str("</svg>\n");
        buffer
    }
}

impl PlotSink for SvgPlot {
    fn render(&mut self, chart: &BarChart) -> Result<()> {
        let plot_error = |source| Error::Plot {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(plot_error)?;
        }
        fs::write(&self.path, Self::to_svg(chart)).map_err(plot_error)?;

        info!(path = %self.path.display(), bars = chart.values.len(), "plot written");
        Ok(())
    }
}
