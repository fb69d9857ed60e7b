//! Implementation of the `voiceai classify` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, LatencyClassifier, LatencyStatus};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Measured latency in milliseconds
    pub latency_ms: u64,

    /// Override the soft budget (latency.acceptable)
    #[arg(long)]
    pub acceptable: Option<u64>,

    /// Override the hard budget (latency.maximum)
    #[arg(long)]
    pub maximum: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub latency_ms: u64,
    pub acceptable_ms: u64,
    pub maximum_ms: u64,
    pub is_acceptable: bool,
    pub within_threshold: bool,
    pub degraded: bool,
    pub status: LatencyStatus,
    pub simple_query_ok: bool,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let status = match self.status {
            LatencyStatus::Pass if self.degraded => console::style("PASS (degraded)").yellow().bold(),
            LatencyStatus::Pass => console::style("PASS").green().bold(),
            LatencyStatus::Fail => console::style("FAIL").red().bold(),
        };

        [
            format!("{} ms: {status}", self.latency_ms),
            format!(
                "  acceptable (<= {} ms): {}",
                self.acceptable_ms,
                yes_no(self.is_acceptable)
            ),
            format!(
                "  within threshold (<= {} ms): {}",
                self.maximum_ms,
                yes_no(self.within_threshold)
            ),
            format!("  simple query budget met: {}", yes_no(self.simple_query_ok)),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn classify(args: &ClassifyArgs, config: &Config) -> ClassifyOutput {
    let classifier = LatencyClassifier::new(
        args.acceptable.unwrap_or(config.latency.acceptable),
        args.maximum.unwrap_or(config.latency.maximum),
        config.latency.simple_query,
    );
    let result = classifier.classify(args.latency_ms);

    ClassifyOutput {
        latency_ms: result.latency_ms,
        acceptable_ms: classifier.acceptable_ms(),
        maximum_ms: classifier.maximum_ms(),
        is_acceptable: result.is_acceptable,
        within_threshold: result.within_threshold,
        degraded: result.is_degraded(),
        status: result.status(),
        simple_query_ok: classifier.simple_query_ok(args.latency_ms),
    }
}

/// Exits non-zero when the measurement misses the hard budget.
pub fn execute(args: &ClassifyArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = classify(args, config);
    output(&result, json_mode);

    if result.status == LatencyStatus::Fail {
        anyhow::bail!(
            "{} ms exceeds the maximum of {} ms",
            result.latency_ms,
            result.maximum_ms
        );
    }
    Ok(())
}
