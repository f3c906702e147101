//! Text and JSON rendering of ordered histograms.
//!
//! The output flags are resolved once into a [`LineFormat`] so the printing
//! loop never branches on them.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregation, Direction, Weighting};
use crate::ordering::ScaleOrdered;
use crate::Result;

/// Width of the rule printed after `Done!`.
pub const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueScale {
    /// Share of the total, in percent.
    #[default]
    Percentage,
    Raw,
}

impl ValueScale {
    pub fn normalize(&self) -> bool {
        matches!(self, ValueScale::Percentage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PitchPolicy {
    pub scale: ValueScale,
    pub weighting: Weighting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntervalPolicy {
    pub scale: ValueScale,
    pub direction: Direction,
}

impl PitchPolicy {
    pub fn line_format(&self) -> LineFormat {
        match (self.scale, self.weighting) {
            (ValueScale::Percentage, _) => LineFormat::Percentage,
            (ValueScale::Raw, Weighting::Duration) => LineFormat::QuarterNotes,
            (ValueScale::Raw, Weighting::Count) => LineFormat::Notes,
        }
    }

    pub fn y_label(&self) -> &'static str {
        match (self.scale, self.weighting) {
            (ValueScale::Percentage, Weighting::Duration) => "Normalized duration",
            (ValueScale::Percentage, Weighting::Count) => "Normalized count",
            (ValueScale::Raw, Weighting::Duration) => "Duration",
            (ValueScale::Raw, Weighting::Count) => "Count",
        }
    }
}

impl IntervalPolicy {
    pub fn line_format(&self) -> LineFormat {
        match self.scale {
            ValueScale::Percentage => LineFormat::Percentage,
            ValueScale::Raw => LineFormat::Times,
        }
    }

    pub fn y_label(&self) -> &'static str {
        match self.scale {
            ValueScale::Percentage => "Normalized count",
            ValueScale::Raw => "Count",
        }
    }
}

/// How a single result line is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineFormat {
    /// `- E4: 12.34%`
    Percentage,
    /// `- E4: 17.0 quarter notes`
    QuarterNotes,
    /// `- E4: 3 notes`
    Notes,
    /// `- M2: 3 times`
    Times,
}

impl LineFormat {
    pub fn render(&self, name: &str, value: f64) -> String {
        match self {
            LineFormat::Percentage => format!("- {}: {:.2}%", name, value),
            // Debug keeps the trailing ".0" on whole durations
            LineFormat::QuarterNotes => format!("- {}: {:?} quarter notes", name, value),
            LineFormat::Notes => format!("- {}: {} notes", name, value),
            LineFormat::Times => format!("- {}: {} times", name, value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Pitch,
    Interval,
}

/// Everything needed to print one histogram run.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    kind: ReportKind,
    scale: ValueScale,
    format: LineFormat,
    y_label: &'static str,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    scale_value: i32,
    name: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    kind: ReportKind,
    scale: ValueScale,
    x_label: &'a str,
    y_label: &'a str,
    rows_matched: usize,
    scores_loaded: usize,
    entries: Vec<JsonEntry<'a>>,
}

impl Report {
    pub fn pitch(policy: &PitchPolicy) -> Self {
        Report {
            kind: ReportKind::Pitch,
            scale: policy.scale,
            format: policy.line_format(),
            y_label: policy.y_label(),
        }
    }

    pub fn interval(policy: &IntervalPolicy) -> Self {
        Report {
            kind: ReportKind::Interval,
            scale: policy.scale,
            format: policy.line_format(),
            y_label: policy.y_label(),
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn line_format(&self) -> LineFormat {
        self.format
    }

    pub fn x_label(&self) -> &'static str {
        match self.kind {
            ReportKind::Pitch => "Pitch",
            ReportKind::Interval => "Interval",
        }
    }

    pub fn y_label(&self) -> &'static str {
        self.y_label
    }

    pub fn header(&self) -> &'static str {
        match self.kind {
            ReportKind::Pitch => "Occurrence of pitches:",
            ReportKind::Interval => "Occurrence of intervals:",
        }
    }

    pub fn progress_line(&self, score: &str) -> String {
        match self.kind {
            ReportKind::Pitch => format!("Working with {}", score),
            ReportKind::Interval => format!("Processing {}", score),
        }
    }

    pub fn write_progress(&self, out: &mut dyn Write, score: &str) -> Result<()> {
        writeln!(out, "{}", self.progress_line(score))?;
        Ok(())
    }

    pub fn write_done(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Done!")?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        Ok(())
    }

    /// Header followed by one line per ordered entry.
    pub fn write_results(&self, out: &mut dyn Write, ordered: &ScaleOrdered) -> Result<()> {
        writeln!(out, "{}", self.header())?;
        for (_, name, value) in ordered.iter() {
            writeln!(out, "{}", self.format.render(name, value))?;
        }
        Ok(())
    }

    /// The whole run as one pretty-printed JSON document.
    pub fn write_json(
        &self,
        out: &mut dyn Write,
        ordered: &ScaleOrdered,
        aggregation: &Aggregation,
    ) -> Result<()> {
        let report = JsonReport {
            kind: self.kind,
            scale: self.scale,
            x_label: self.x_label(),
            y_label: self.y_label,
            rows_matched: aggregation.rows_matched,
            scores_loaded: aggregation.scores_loaded,
            entries: ordered
                .iter()
                .map(|(scale_value, name, value)| JsonEntry {
                    scale_value,
                    name,
                    value,
                })
                .collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ordered() -> ScaleOrdered {
        ScaleOrdered {
            scale_values: vec![64, 66],
            names: vec!["E4".to_string(), "F#4".to_string()],
            values: vec![17.0, 2.75],
        }
    }

    #[test]
    fn test_line_formats() {
        assert_eq!(LineFormat::Percentage.render("E4", 12.3456), "- E4: 12.35%");
        assert_eq!(LineFormat::QuarterNotes.render("E4", 17.0), "- E4: 17.0 quarter notes");
        assert_eq!(LineFormat::QuarterNotes.render("E4", 2.75), "- E4: 2.75 quarter notes");
        assert_eq!(LineFormat::Notes.render("E4", 3.0), "- E4: 3 notes");
        assert_eq!(LineFormat::Times.render("M-2", 12.0), "- M-2: 12 times");
    }

    #[test]
    fn test_pitch_policy_resolution() {
        let cases = [
            (ValueScale::Percentage, Weighting::Duration, LineFormat::Percentage, "Normalized duration"),
            (ValueScale::Percentage, Weighting::Count, LineFormat::Percentage, "Normalized count"),
            (ValueScale::Raw, Weighting::Duration, LineFormat::QuarterNotes, "Duration"),
            (ValueScale::Raw, Weighting::Count, LineFormat::Notes, "Count"),
        ];
        for (scale, weighting, format, label) in cases {
            let policy = PitchPolicy { scale, weighting };
            assert_eq!(policy.line_format(), format);
            assert_eq!(policy.y_label(), label);
        }
    }

    #[test]
    fn test_interval_policy_resolution() {
        let raw = IntervalPolicy {
            scale: ValueScale::Raw,
            direction: Direction::Directed,
        };
        assert_eq!(raw.line_format(), LineFormat::Times);
        assert_eq!(raw.y_label(), "Count");
        assert_eq!(IntervalPolicy::default().y_label(), "Normalized count");
    }

    #[test]
    fn test_pitch_text_report() {
        let report = Report::pitch(&PitchPolicy {
            scale: ValueScale::Raw,
            weighting: Weighting::Duration,
        });
        let mut out: Vec<u8> = Vec::new();
        report.write_progress(&mut out, "a.xml").unwrap();
        report.write_done(&mut out).unwrap();
        report.write_results(&mut out, &ordered()).unwrap();

        let expected = format!(
            "Working with a.xml\nDone!\n{}\nOccurrence of pitches:\n- E4: 17.0 quarter notes\n- F#4: 2.75 quarter notes\n",
            "-".repeat(50)
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_interval_labels() {
        let report = Report::interval(&IntervalPolicy::default());
        assert_eq!(report.x_label(), "Interval");
        assert_eq!(report.header(), "Occurrence of intervals:");
        assert_eq!(report.progress_line("b.xml"), "Processing b.xml");
    }

    #[test]
    fn test_json_report() {
        let report = Report::pitch(&PitchPolicy::default());
        let aggregation = Aggregation {
            rows_matched: 3,
            scores_loaded: 2,
            ..Aggregation::default()
        };
        let mut out: Vec<u8> = Vec::new();
        report.write_json(&mut out, &ordered(), &aggregation).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["kind"], "pitch");
        assert_eq!(value["scale"], "percentage");
        assert_eq!(value["y_label"], "Normalized duration");
        assert_eq!(value["scores_loaded"], 2);
        assert_eq!(value["entries"][1]["name"], "F#4");
        assert_eq!(value["entries"][1]["scale_value"], 66);
    }
}
