//! Error types with fix suggestions
//!
//! Error code ranges:
//! - MEDI-000-009: Configuration errors
//! - MEDI-010-019: Provider errors
//! - MEDI-020-029: Flow errors (see [`crate::flow::FlowError`])
//! - MEDI-030-039: Blog store errors
//! - MEDI-040-049: Session errors
//! - MEDI-050-059: IO / serialization errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MediSeekError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum MediSeekError {
    // ─────────────────────────────────────────────────────────────
    // Configuration (MEDI-000 to MEDI-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[MEDI-001] Configuration error: {reason}")]
    Config { reason: String },

    #[error("[MEDI-002] Unknown language code '{code}'")]
    UnknownLanguage { code: String },

    // ─────────────────────────────────────────────────────────────
    // Provider (MEDI-010 to MEDI-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[MEDI-010] Unknown provider '{name}'. Available: gemini, openai, mock")]
    UnknownProvider { name: String },

    #[error("[MEDI-011] Missing API key for provider '{provider}' (set {env_var})")]
    MissingApiKey { provider: String, env_var: String },

    #[error("[MEDI-012] Provider error: {0}")]
    Provider(String),

    // ─────────────────────────────────────────────────────────────
    // Blog store (MEDI-030 to MEDI-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[MEDI-030] Could not read blog data at '{path}': {details}")]
    StoreRead { path: String, details: String },

    #[error("[MEDI-031] Could not write blog data at '{path}': {details}")]
    StoreWrite { path: String, details: String },

    #[error("[MEDI-032] Blog post '{id}' not found")]
    PostNotFound { id: String },

    // ─────────────────────────────────────────────────────────────
    // Session (MEDI-040 to MEDI-049)
    // ─────────────────────────────────────────────────────────────
    #[error("[MEDI-040] Admin session required for '{path}'")]
    Unauthorized { path: String },

    #[error("[MEDI-041] Admin credentials are not configured")]
    AdminNotConfigured,

    // ─────────────────────────────────────────────────────────────
    // IO / serialization (MEDI-050 to MEDI-059)
    // ─────────────────────────────────────────────────────────────
    #[error("[MEDI-050] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[MEDI-051] JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixSuggestion for MediSeekError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            MediSeekError::Config { .. } => {
                Some("Check ~/.config/mediseek/config.toml (or $MEDISEEK_CONFIG) for TOML syntax")
            }
            MediSeekError::UnknownLanguage { .. } => Some("Use one of: en, es, fr, de, hi"),
            MediSeekError::UnknownProvider { .. } => Some("Use --provider gemini, openai or mock"),
            MediSeekError::MissingApiKey { .. } => {
                Some("Export the API key or add it to the [ai] section of the config file")
            }
            MediSeekError::Provider(_) => Some("Check network access and API quota"),
            MediSeekError::StoreRead { .. } => {
                Some("Ensure the blog data file is a JSON array of posts")
            }
            MediSeekError::StoreWrite { .. } => Some("Check file path and permissions"),
            MediSeekError::PostNotFound { .. } => Some("List posts with `mediseek blog list`"),
            MediSeekError::Unauthorized { .. } => {
                Some("Log in with `mediseek admin login` and pass the token via --session")
            }
            MediSeekError::AdminNotConfigured => {
                Some("Set ADMIN_PASSWORD and MEDISEEK_SESSION_SECRET, or run `mediseek config init`")
            }
            MediSeekError::Io(_) => Some("Check file path and permissions"),
            MediSeekError::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_codes() {
        let err = MediSeekError::UnknownProvider {
            name: "bard".to_string(),
        };
        assert!(err.to_string().starts_with("[MEDI-010]"));
        assert!(err.to_string().contains("bard"));
    }

    #[test]
    fn missing_key_suggests_env() {
        let err = MediSeekError::MissingApiKey {
            provider: "gemini".to_string(),
            env_var: "GEMINI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(err.fix_suggestion().is_some());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MediSeekError = io.into();
        assert!(matches!(err, MediSeekError::Io(_)));
    }
}
