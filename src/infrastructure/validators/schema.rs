//! Registry of the compiled response schema documents.

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::models::SchemaConfig;

/// The two externally supplied response contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    VoiceResponse,
    SessionResponse,
}

impl SchemaId {
    pub const ALL: [Self; 2] = [Self::VoiceResponse, Self::SessionResponse];

    pub const fn name(self) -> &'static str {
        match self {
            Self::VoiceResponse => "voice-response-schema",
            Self::SessionResponse => "session-response-schema",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voice" | "voice-response-schema" => Ok(Self::VoiceResponse),
            "session" | "session-response-schema" => Ok(Self::SessionResponse),
            other => Err(ValidationError::SchemaUnavailable {
                schema: other.to_string(),
                reason: "unknown schema id".to_string(),
            }),
        }
    }
}

/// Both schemas, compiled once and reused for every check
pub struct SchemaRegistry {
    voice: JSONSchema,
    session: JSONSchema,
}

impl SchemaRegistry {
    /// Load `voice-response-schema.json` and `session-response-schema.json`
    /// from `dir`
    pub fn load(dir: impl AsRef<Path>) -> ValidationResult<Self> {
        let dir = dir.as_ref();
        let voice = read_document(&dir.join(SchemaId::VoiceResponse.file_name()), SchemaId::VoiceResponse)?;
        let session = read_document(&dir.join(SchemaId::SessionResponse.file_name()), SchemaId::SessionResponse)?;
        let registry = Self::from_documents(&voice, &session)?;

        tracing::debug!(dir = %dir.display(), "response schemas loaded");
        Ok(registry)
    }

    pub fn from_config(config: &SchemaConfig) -> ValidationResult<Self> {
        Self::load(&config.dir)
    }

    /// Compile already-parsed schema documents
    pub fn from_documents(voice: &Value, session: &Value) -> ValidationResult<Self> {
        Ok(Self {
            voice: compile(voice, SchemaId::VoiceResponse)?,
            session: compile(session, SchemaId::SessionResponse)?,
        })
    }

    /// Validate `instance` against one schema, collecting every violation
    pub fn validate(&self, id: SchemaId, instance: &Value) -> ValidationResult<()> {
        let schema = match id {
            SchemaId::VoiceResponse => &self.voice,
            SchemaId::SessionResponse => &self.session,
        };

        match schema.validate(instance) {
            Ok(()) => Ok(()),
            Err(errors) => Err(ValidationError::SchemaViolation {
                schema: id.name(),
                violations: errors
                    .map(|e| format!("{}: {}", e.instance_path, e))
                    .collect(),
            }),
        }
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry").finish_non_exhaustive()
    }
}

fn read_document(path: &Path, id: SchemaId) -> ValidationResult<Value> {
    let unavailable = |reason: String| ValidationError::SchemaUnavailable {
        schema: id.name().to_string(),
        reason,
    };

    let raw = std::fs::read_to_string(path)
        .map_err(|e| unavailable(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| unavailable(format!("{}: {e}", path.display())))
}

fn compile(document: &Value, id: SchemaId) -> ValidationResult<JSONSchema> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(document)
        .map_err(|e| ValidationError::SchemaUnavailable {
            schema: id.name().to_string(),
            reason: format!("Failed to compile JSON schema: {e}"),
        })
}
