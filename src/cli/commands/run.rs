//! Implementation of the `voiceai run` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::info;

use crate::cli::output::progress::{create_progress_bar, create_spinner};
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Config;
use crate::infrastructure::api::ApiSessionClient;
use crate::services::{PersistenceVerifier, ScenarioOutcome, ScenarioRunner, ScenarioStatus, Suite};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Suite to run; repeat for several (normal, latency, edge, hallucination, e2e). Default: all
    #[arg(short, long = "suite", value_parser = Suite::from_str)]
    pub suites: Vec<Suite>,
}

impl RunArgs {
    /// Requested suites in canonical order, duplicates removed
    pub fn selected_suites(&self) -> Vec<Suite> {
        if self.suites.is_empty() {
            return Suite::ALL.to_vec();
        }
        Suite::ALL
            .into_iter()
            .filter(|suite| self.suites.contains(suite))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub suites: Vec<Suite>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub aborted: usize,
    pub duration_ms: u64,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunOutput {
    pub fn new(suites: Vec<Suite>, outcomes: Vec<ScenarioOutcome>, duration_ms: u64) -> Self {
        let count = |pred: fn(&ScenarioStatus) -> bool| outcomes.iter().filter(|o| pred(&o.status)).count();
        Self {
            suites,
            total: outcomes.len(),
            passed: count(|s| matches!(s, ScenarioStatus::Passed)),
            failed: count(|s| matches!(s, ScenarioStatus::Failed(_))),
            aborted: count(|s| matches!(s, ScenarioStatus::Aborted(_))),
            duration_ms,
            outcomes,
        }
    }

    pub const fn all_passed(&self) -> bool {
        self.failed == 0 && self.aborted == 0
    }
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        if self.outcomes.is_empty() {
            return "No scenarios ran.".to_string();
        }

        let table = TableFormatter::new().format_outcomes(&self.outcomes);
        let verdict = if self.all_passed() {
            console::style("PASSED").green().bold()
        } else {
            console::style("FAILED").red().bold()
        };

        format!(
            "{table}\n\n{verdict}: {} passed, {} failed, {} aborted of {} scenarios in {:.1}s",
            self.passed,
            self.failed,
            self.aborted,
            self.total,
            Duration::from_millis(self.duration_ms).as_secs_f64()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let suites = args.selected_suites();
    let client = ApiSessionClient::new(&config.api).context("Failed to build API client")?;

    let verifier = if config.db.is_configured() {
        let spinner = create_spinner("Connecting to conversation store", !json_mode);
        let verifier = PersistenceVerifier::connect(&config.db)
            .await
            .context("Failed to connect to conversation store");
        spinner.finish_and_clear();
        Some(verifier?)
    } else {
        info!("db.url not configured; persistence checks will be skipped");
        None
    };

    let total: usize = suites.iter().map(|suite| suite.scenarios().len()).sum();
    let progress = create_progress_bar(u64::try_from(total).unwrap_or(u64::MAX), !json_mode);
    let mut started = 0_u64;

    info!(suites = ?suites, scenarios = total, base_url = %config.api.base_url, "starting run");
    let run_started = Instant::now();

    let mut runner = ScenarioRunner::new(client, config.clone(), verifier);
    let outcomes = runner
        .run(&suites, |scenario| {
            progress.set_position(started);
            progress.set_message(format!("{}::{}", scenario.suite(), scenario));
            started += 1;
        })
        .await;
    runner.close().await;
    progress.finish_and_clear();

    let duration_ms = u64::try_from(run_started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let report = RunOutput::new(suites, outcomes, duration_ms);
    info!(
        passed = report.passed,
        failed = report.failed,
        aborted = report.aborted,
        duration_ms,
        "run finished"
    );

    output(&report, json_mode);

    if !report.all_passed() {
        anyhow::bail!(
            "{} of {} scenarios did not pass",
            report.failed + report.aborted,
            report.total
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: ScenarioStatus) -> ScenarioOutcome {
        ScenarioOutcome {
            suite: Suite::Normal,
            name: "greeting",
            status,
            notes: vec![],
            duration_ms: 10,
        }
    }

    #[test]
    fn test_default_selects_every_suite() {
        let args = RunArgs { suites: vec![] };
        assert_eq!(args.selected_suites(), Suite::ALL.to_vec());
    }

    #[test]
    fn test_selection_is_ordered_and_deduplicated() {
        let args = RunArgs {
            suites: vec![Suite::EndToEnd, Suite::Normal, Suite::EndToEnd],
        };
        assert_eq!(args.selected_suites(), vec![Suite::Normal, Suite::EndToEnd]);
    }

    #[test]
    fn test_report_counts() {
        let report = RunOutput::new(
            vec![Suite::Normal],
            vec![
                outcome(ScenarioStatus::Passed),
                outcome(ScenarioStatus::Failed("bad intent".to_string())),
                outcome(ScenarioStatus::Aborted("connection refused".to_string())),
            ],
            30,
        );
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.aborted, 1);
        assert!(!report.all_passed());
    }

    #[test]
    fn test_report_json_shape() {
        let report = RunOutput::new(
            vec![Suite::Normal],
            vec![outcome(ScenarioStatus::Failed("bad intent".to_string()))],
            10,
        );
        let json = report.to_json();
        assert_eq!(json["suites"][0], "normal");
        assert_eq!(json["outcomes"][0]["status"], "failed");
        assert_eq!(json["outcomes"][0]["message"], "bad intent");
        assert_eq!(json["outcomes"][0]["name"], "greeting");
    }
}
