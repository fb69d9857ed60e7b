//! Implementation of the `voiceai evaluate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::grounding::{self, GroundingCase, GroundingReport};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSON array of cases: {question, answer, contexts: [{doc_id, text}], gold_doc}
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct EvaluateOutput(pub GroundingReport);

impl CommandOutput for EvaluateOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        if report.total == 0 {
            return "No cases to evaluate.".to_string();
        }

        format!(
            "{}\n\nCases: {}\nHallucination rate: {:.1}%\nContext accuracy: {:.1}%",
            TableFormatter::new().format_grounding(report),
            report.total,
            report.hallucination_pct,
            report.context_accuracy_pct
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn parse_cases(contents: &str) -> Result<Vec<GroundingCase>> {
    serde_json::from_str(contents).context("Cases must be a JSON array of grounding cases")
}

/// Rates are reported, not enforced; the command only fails on bad input.
pub async fn execute(args: EvaluateArgs, json_mode: bool) -> Result<()> {
    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let cases = parse_cases(&contents)?;

    let report = grounding::evaluate(&cases);
    info!(
        cases = report.total,
        hallucination_pct = report.hallucination_pct,
        context_accuracy_pct = report.context_accuracy_pct,
        "grounding evaluation finished"
    );

    output(&EvaluateOutput(report), json_mode);
    Ok(())
}
