use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.=]+").expect("bearer pattern is valid"));

static SECRET_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(["']?(?:auth_token|api_key|apikey|token|secret|password)["']?\s*[:=]\s*)["']?([^"'\s,}]+)["']?"#)
        .expect("secret field pattern is valid")
});

static URL_CREDENTIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(://[^:/@\s]+):([^@\s]+)@").expect("url credentials pattern is valid")
});

/// Masks credentials in text that is about to be printed or logged
#[derive(Clone, Copy, Default)]
pub struct SecretRedactor;

impl SecretRedactor {
    pub const fn new() -> Self {
        Self
    }

    /// Redact bearer tokens, secret-looking `key: value` pairs, and
    /// passwords embedded in connection URLs
    pub fn redact(&self, message: &str) -> String {
        let scrubbed = BEARER.replace_all(message, "Bearer [REDACTED]");
        let scrubbed = SECRET_FIELD.replace_all(&scrubbed, |caps: &Captures| {
            if &caps[2] == "[REDACTED]" {
                caps[0].to_string()
            } else {
                format!("{}[REDACTED]", &caps[1])
            }
        });
        URL_CREDENTIALS
            .replace_all(&scrubbed, "$1:[REDACTED]@")
            .into_owned()
    }
}

impl fmt::Debug for SecretRedactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretRedactor").finish()
    }
}
