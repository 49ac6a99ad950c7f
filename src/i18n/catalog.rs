//! Locale tables
//!
//! Built-in tables are compiled from `locales/*.json`. Lookup order is the
//! requested language, then English, then the key literal itself.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::message::value_text;
use super::{Language, MessageId};
use crate::error::{MediSeekError, Result};

const EN: &str = include_str!("../../locales/en.json");
const ES: &str = include_str!("../../locales/es.json");
const FR: &str = include_str!("../../locales/fr.json");
const DE: &str = include_str!("../../locales/de.json");
const HI: &str = include_str!("../../locales/hi.json");

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: HashMap<Language, HashMap<String, String>>,
}

impl Catalog {
    /// Empty catalog: every lookup falls back to the key
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the bundled translations
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for (lang, raw) in [
            (Language::En, EN),
            (Language::Es, ES),
            (Language::Fr, FR),
            (Language::De, DE),
            (Language::Hi, HI),
        ] {
            catalog.load_table(lang, raw)?;
        }
        Ok(catalog)
    }

    /// Replace the table for `lang` with a JSON object of `key → template`
    pub fn load_table(&mut self, lang: Language, raw_json: &str) -> Result<()> {
        let table: HashMap<String, String> =
            serde_json::from_str(raw_json).map_err(|e| MediSeekError::Config {
                reason: format!("Invalid locale table for '{}': {}", lang, e),
            })?;
        self.tables.insert(lang, table);
        Ok(())
    }

    /// Raw template for a key, without fallback
    pub fn template(&self, lang: Language, key: &str) -> Option<&str> {
        self.tables
            .get(&lang)
            .and_then(|t| t.get(key))
            .map(String::as_str)
    }

    /// Translate a message, interpolating `{param}` placeholders
    pub fn translate(&self, message: &MessageId, lang: Language) -> String {
        let template = self
            .template(lang, &message.key)
            .or_else(|| self.template(Language::En, &message.key));

        let Some(template) = template else {
            return message.key.clone();
        };

        // one pass over the template: substituted values are never rescanned
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match message.params.get(&caps[1]) {
                Some(value) => value_text(value),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Translate a bare key
    pub fn text(&self, key: &str, lang: Language) -> String {
        self.translate(&MessageId::new(key), lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tables_share_keys() {
        let catalog = Catalog::builtin().unwrap();
        let en = &catalog.tables[&Language::En];
        for lang in Language::ALL {
            let table = &catalog.tables[&lang];
            for key in en.keys() {
                assert!(table.contains_key(key), "{} missing '{}'", lang, key);
            }
        }
    }

    #[test]
    fn interpolates_params() {
        let catalog = Catalog::builtin().unwrap();
        let msg = MessageId::new("validationMinChars").with_param("count", 10);
        assert_eq!(
            catalog.translate(&msg, Language::En),
            "Please enter at least 10 characters."
        );
        assert_eq!(
            catalog.translate(&msg, Language::Es),
            "Introduce al menos 10 caracteres."
        );
    }

    #[test]
    fn falls_back_to_english_then_key() {
        let mut catalog = Catalog::new();
        catalog
            .load_table(Language::En, r#"{"greeting": "Hello {name}"}"#)
            .unwrap();
        catalog.load_table(Language::Fr, r#"{}"#).unwrap();

        let msg = MessageId::new("greeting").with_param("name", "Ada");
        assert_eq!(catalog.translate(&msg, Language::Fr), "Hello Ada");
        assert_eq!(
            catalog.translate(&MessageId::new("missingKey"), Language::Fr),
            "missingKey"
        );
    }

    #[test]
    fn substituted_values_are_not_interpolated_again() {
        let mut catalog = Catalog::new();
        catalog
            .load_table(
                Language::En,
                r#"{"found": "{disclaimer} Results for {location}, {location}. {unknown}"}"#,
            )
            .unwrap();

        let msg = MessageId::new("found")
            .with_param("disclaimer", "Check {location} yourself.")
            .with_param("location", "Lyon");
        assert_eq!(
            catalog.translate(&msg, Language::En),
            "Check {location} yourself. Results for Lyon, Lyon. {unknown}"
        );
    }

    #[test]
    fn rejects_non_object_tables() {
        let mut catalog = Catalog::new();
        assert!(catalog.load_table(Language::En, "[1, 2]").is_err());
    }
}
