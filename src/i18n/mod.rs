//! Localization
//!
//! - [`Language`] - supported UI/response languages
//! - [`MessageId`] - translatable message identifier with parameters
//! - [`Catalog`] - locale tables with English fallback

mod catalog;
mod message;

pub use catalog::Catalog;
pub use message::MessageId;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::MediSeekError;

/// Languages the app can render and ask the model to answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Hi,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Hi,
    ];

    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Hi => "hi",
        }
    }

    /// English name, used inside prompts
    pub fn english_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
            Language::Fr => "French",
            Language::De => "German",
            Language::Hi => "Hindi",
        }
    }

    /// Name of the language in itself (language picker label)
    pub fn native_name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Español",
            Language::Fr => "Français",
            Language::De => "Deutsch",
            Language::Hi => "हिन्दी",
        }
    }

    /// Parse a code such as `es`, `ES` or a browser tag like `es-MX`
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(&['-', '_'][..]).next().unwrap_or_default();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(primary))
    }

    /// Parse a code, falling back when it is absent or unsupported
    pub fn from_code_or(code: Option<&str>, fallback: Language) -> Self {
        code.and_then(Self::from_code).unwrap_or(fallback)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = MediSeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| MediSeekError::UnknownLanguage {
            code: s.to_string(),
        })
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_regional_codes() {
        assert_eq!(Language::from_code("es"), Some(Language::Es));
        assert_eq!(Language::from_code("FR"), Some(Language::Fr));
        assert_eq!(Language::from_code("de-AT"), Some(Language::De));
        assert_eq!(Language::from_code("hi_IN"), Some(Language::Hi));
        assert_eq!(Language::from_code("pt"), None);
        assert_eq!(Language::from_code(""), None);
    }

    #[test]
    fn fallback_applies_to_missing_and_unknown() {
        assert_eq!(Language::from_code_or(None, Language::Fr), Language::Fr);
        assert_eq!(Language::from_code_or(Some("xx"), Language::En), Language::En);
        assert_eq!(Language::from_code_or(Some("hi"), Language::En), Language::Hi);
    }

    #[test]
    fn native_names_are_distinct() {
        assert_eq!(Language::Fr.native_name(), "Français");
        let mut names: Vec<_> = Language::ALL.iter().map(|l| l.native_name()).collect();
        names.dedup();
        assert_eq!(names.len(), Language::ALL.len());
    }

    #[test]
    fn serde_uses_codes() {
        let json = serde_json::to_string(&Language::De).unwrap();
        assert_eq!(json, "\"de\"");
        let lang: Language = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(lang, Language::Es);
        assert!(serde_json::from_str::<Language>("\"klingon\"").is_err());
    }
}
