//! Table output for scenario reports and grounding evaluations.
//!
//! Status cells are colored when the terminal supports it and fall back to
//! an icon prefix otherwise.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::GroundingReport;
use crate::services::{ScenarioOutcome, ScenarioStatus};

const MESSAGE_WIDTH: usize = 60;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// One row per scenario, in run order
    pub fn format_outcomes(&self, outcomes: &[ScenarioOutcome]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Suite").add_attribute(Attribute::Bold),
            Cell::new("Scenario").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Duration").add_attribute(Attribute::Bold),
            Cell::new("Details").add_attribute(Attribute::Bold),
        ]);

        for outcome in outcomes {
            let status_cell = if self.use_colors {
                Cell::new(outcome.status.label()).fg(status_color(&outcome.status))
            } else {
                Cell::new(format!(
                    "{} {}",
                    status_icon(&outcome.status),
                    outcome.status.label()
                ))
            };

            let details: Vec<&str> = outcome
                .status
                .message()
                .into_iter()
                .chain(outcome.notes.iter().map(String::as_str))
                .collect();
            let details = if details.is_empty() {
                "-".to_string()
            } else {
                truncate(&details.join("; "), MESSAGE_WIDTH)
            };

            table.add_row(vec![
                Cell::new(outcome.suite.as_str()),
                Cell::new(outcome.name),
                status_cell,
                Cell::new(format!("{} ms", outcome.duration_ms)),
                Cell::new(details),
            ]);
        }

        table.to_string()
    }

    /// One row per graded case
    pub fn format_grounding(&self, report: &GroundingReport) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Question").add_attribute(Attribute::Bold),
            Cell::new("Contexts").add_attribute(Attribute::Bold),
            Cell::new("Hallucinated").add_attribute(Attribute::Bold),
            Cell::new("Context OK").add_attribute(Attribute::Bold),
            Cell::new("Unsupported Tokens").add_attribute(Attribute::Bold),
        ]);

        for case in &report.cases {
            let contexts = if case.context_ids.is_empty() {
                "-".to_string()
            } else {
                case.context_ids.join(", ")
            };

            table.add_row(vec![
                Cell::new(truncate(&case.question, 40)),
                Cell::new(contexts),
                self.flag_cell(case.hallucinated, true),
                self.flag_cell(case.context_accurate, false),
                Cell::new(truncate(&case.missing_tokens.join(" "), 40)),
            ]);
        }

        table.to_string()
    }

    /// Yes/no cell, red when the value is the bad one
    fn flag_cell(&self, value: bool, bad_when: bool) -> Cell {
        let text = if value { "yes" } else { "no" };
        if !self.use_colors {
            return Cell::new(text);
        }
        let color = if value == bad_when { Color::Red } else { Color::Green };
        Cell::new(text).fg(color)
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}

const fn status_color(status: &ScenarioStatus) -> Color {
    match status {
        ScenarioStatus::Passed => Color::Green,
        ScenarioStatus::Failed(_) => Color::Red,
        ScenarioStatus::Aborted(_) => Color::Yellow,
    }
}

const fn status_icon(status: &ScenarioStatus) -> &'static str {
    match status {
        ScenarioStatus::Passed => "✓",
        ScenarioStatus::Failed(_) => "✗",
        ScenarioStatus::Aborted(_) => "⊘",
    }
}
