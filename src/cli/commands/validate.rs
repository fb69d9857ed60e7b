//! Implementation of the `voiceai validate` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::ValidationError;
use crate::domain::models::Config;
use crate::infrastructure::validators::{ResponseValidator, SchemaId, SchemaRegistry};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON document to validate
    pub file: PathBuf,

    /// Schema to validate against (voice or session)
    #[arg(short, long, default_value = "voice", value_parser = SchemaId::from_str)]
    pub schema: SchemaId,
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub file: PathBuf,
    pub schema: &'static str,
    pub valid: bool,
    pub violations: Vec<String>,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        if self.valid {
            return format!(
                "{} {} conforms to {}",
                console::style("✓").green().bold(),
                self.file.display(),
                self.schema
            );
        }

        let mut lines = vec![format!(
            "{} {} violates {}:",
            console::style("✗").red().bold(),
            self.file.display(),
            self.schema
        )];
        lines.extend(self.violations.iter().map(|v| format!("  - {v}")));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Check `document` against `schema`
///
/// Schema or JSON violations are reported in the output; a registry that
/// cannot be used is an error.
pub fn validate_document(
    registry: &SchemaRegistry,
    schema: SchemaId,
    file: PathBuf,
    document: &str,
) -> Result<ValidateOutput> {
    let violations = match ResponseValidator::conforms_to_schema_str(registry, document, schema) {
        Ok(()) => Vec::new(),
        Err(ValidationError::SchemaViolation { violations, .. }) => violations,
        Err(err @ ValidationError::InvalidJson(_)) => vec![err.to_string()],
        Err(err) => return Err(err.into()),
    };

    Ok(ValidateOutput {
        file,
        schema: schema.name(),
        valid: violations.is_empty(),
        violations,
    })
}

pub async fn execute(args: ValidateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let registry = SchemaRegistry::from_config(&config.schemas)
        .with_context(|| format!("Failed to load schemas from {}", config.schemas.dir))?;
    let document = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let result = validate_document(&registry, args.schema, args.file, &document)?;
    output(&result, json_mode);

    if !result.valid {
        anyhow::bail!("{} violation(s) of {}", result.violations.len(), result.schema);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::load(concat!(env!("CARGO_MANIFEST_DIR"), "/schemas")).unwrap()
    }

    #[test]
    fn test_valid_voice_response() {
        let document = r#"{
            "session_id": "s1",
            "response_text": "Hello!",
            "intent": "greeting",
            "confidence": 0.92,
            "status": "success"
        }"#;
        let result =
            validate_document(&registry(), SchemaId::VoiceResponse, "ok.json".into(), document)
                .unwrap();
        assert!(result.valid);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn test_violations_are_reported() {
        let document = r#"{"session_id": "s1", "confidence": 1.7}"#;
        let result =
            validate_document(&registry(), SchemaId::VoiceResponse, "bad.json".into(), document)
                .unwrap();
        assert!(!result.valid);
        assert!(result.violations.len() >= 2);
        assert!(result.to_human().contains("bad.json"));
    }

    #[test]
    fn test_malformed_json_is_a_violation() {
        let result =
            validate_document(&registry(), SchemaId::SessionResponse, "x.json".into(), "{oops")
                .unwrap();
        assert!(!result.valid);
        assert!(result.violations[0].starts_with("Response is not valid JSON"));
    }

    #[tokio::test]
    async fn test_missing_schema_dir_is_an_error() {
        let mut config = Config::default();
        config.schemas.dir = "/definitely/not/here".to_string();
        let args = ValidateArgs {
            file: "response.json".into(),
            schema: SchemaId::VoiceResponse,
        };
        assert!(execute(args, &config, true).await.is_err());
    }
}
