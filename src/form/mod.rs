//! # Form Boundary
//!
//! Raw submissions arrive as string pairs ([`FormData`]). Each handler has a
//! typed form implementing [`FromForm`]; conversion either yields the typed
//! value or a [`FieldErrors`] map keyed by field name (`_form` for errors that
//! belong to no single field).
//!
//! Fields not declared by the form are rejected, except `language`, which
//! every form may carry.

mod rules;

pub use rules::{FieldCheck, TextField};

use std::collections::BTreeMap;

use crate::i18n::MessageId;

/// Key for errors that belong to the whole form
pub const FORM_ERRORS: &str = "_form";

/// Field every form accepts (UI language code)
pub const LANGUAGE_FIELD: &str = "language";

/// Ordered `field -> messages` map
pub type FieldErrors = BTreeMap<String, Vec<MessageId>>;

/// Single form-level error
pub fn form_error(message: MessageId) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(FORM_ERRORS.to_string(), vec![message]);
    errors
}

/// Raw form submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: BTreeMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert (later values replace earlier ones)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Parse an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &str) -> Self {
        url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Value with surrounding whitespace removed; blank counts as absent
    pub fn get_trimmed(&self, name: &str) -> Option<&str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Language code submitted with the form, if any
    pub fn language(&self) -> Option<&str> {
        self.get_trimmed(LANGUAGE_FIELD)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Typed view of a submission
pub trait FromForm: Sized {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urlencoded_body_is_decoded() {
        let form = FormData::from_urlencoded("symptoms=sore+throat%2C+cough&language=es");
        assert_eq!(form.get("symptoms"), Some("sore throat, cough"));
        assert_eq!(form.language(), Some("es"));
        assert_eq!(form.len(), 2);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let form = FormData::new().with("author", "   ").with("title", " Hello ");
        assert_eq!(form.get_trimmed("author"), None);
        assert_eq!(form.get_trimmed("title"), Some("Hello"));
        assert_eq!(form.get("author"), Some("   "));
    }

    #[test]
    fn later_values_replace_earlier() {
        let form: FormData = vec![("a", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(form.get("a"), Some("2"));
    }

    #[test]
    fn form_error_goes_under_form_key() {
        let errors = form_error(MessageId::new("adminInvalidCredentials"));
        assert_eq!(errors[FORM_ERRORS][0].key, "adminInvalidCredentials");
    }
}
