//! CLI type definitions
//!
//! This module contains the clap structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::classify::ClassifyArgs;
use super::commands::config::ConfigArgs;
use super::commands::evaluate::EvaluateArgs;
use super::commands::run::RunArgs;
use super::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(name = "voiceai")]
#[command(about = "Black-box test harness for Voice AI conversation APIs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (default: voiceai.yaml and voiceai.local.yaml, if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run scenario suites against the configured service
    Run(RunArgs),

    /// Show the effective configuration with secrets redacted
    Config(ConfigArgs),

    /// Classify a latency measurement against the configured budgets
    Classify(ClassifyArgs),

    /// Validate a response document against a JSON schema
    Validate(ValidateArgs),

    /// Grade retrieval-backed answers for hallucination and context accuracy
    Evaluate(EvaluateArgs),
}
