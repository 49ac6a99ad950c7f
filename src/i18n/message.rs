//! Translatable message identifiers
//!
//! Handlers never return rendered text. They return a [`MessageId`]: a locale
//! table key plus named parameters, which the consumer looks up and
//! interpolates.
//!
//! The wire form used by older clients is `key` or `key|{"param":"value"}`.
//! [`MessageId::parse_encoded`] splits on the first `|`; a parameter segment
//! that is not a JSON object is dropped and the bare key is kept.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId {
    pub key: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl MessageId {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            params: Map::new(),
        }
    }

    /// Add a named parameter
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Parameter rendered as display text (strings unquoted)
    pub fn param_text(&self, name: &str) -> Option<String> {
        self.params.get(name).map(value_text)
    }

    /// Decode the legacy `key|{json}` form
    pub fn parse_encoded(encoded: &str) -> Self {
        match encoded.split_once('|') {
            None => Self::new(encoded.trim()),
            Some((key, raw_params)) => {
                let params = serde_json::from_str::<Map<String, Value>>(raw_params.trim())
                    .unwrap_or_else(|e| {
                        tracing::debug!(key, error = %e, "Dropping malformed message params");
                        Map::new()
                    });
                Self {
                    key: key.trim().to_string(),
                    params,
                }
            }
        }
    }

    /// Encode to the legacy `key|{json}` form (bare key when there are no params)
    pub fn encode(&self) -> String {
        if self.params.is_empty() {
            self.key.clone()
        } else {
            format!("{}|{}", self.key, Value::Object(self.params.clone()))
        }
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for MessageId {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_key_with_params() {
        let msg = MessageId::parse_encoded(r#"searchFailed|{"entity":"Doctor","error":"timeout"}"#);
        assert_eq!(msg.key, "searchFailed");
        assert_eq!(msg.param_text("entity").as_deref(), Some("Doctor"));
        assert_eq!(msg.param_text("error").as_deref(), Some("timeout"));
        assert_eq!(msg.params.len(), 2);
    }

    #[test]
    fn parses_bare_key() {
        let msg = MessageId::parse_encoded("validationFailedMessage");
        assert_eq!(msg, MessageId::new("validationFailedMessage"));
    }

    #[test]
    fn malformed_params_keep_key() {
        let msg = MessageId::parse_encoded("symptomAnalysisFailed|{not json");
        assert_eq!(msg.key, "symptomAnalysisFailed");
        assert!(msg.params.is_empty());

        // Only the first pipe splits; the rest belongs to the JSON segment
        let msg = MessageId::parse_encoded(r#"searchFailed|{"error":"a|b"}"#);
        assert_eq!(msg.param_text("error").as_deref(), Some("a|b"));
    }

    #[test]
    fn encode_escapes_params_as_json() {
        let msg = MessageId::new("symptomAnalysisFailed").with_param("error", "quote \" here");
        let encoded = msg.encode();
        assert_eq!(MessageId::parse_encoded(&encoded), msg);
    }

    #[test]
    fn numeric_params_render_as_text() {
        let msg = MessageId::new("validationMinChars").with_param("count", 10);
        assert_eq!(msg.param_text("count").as_deref(), Some("10"));
        assert_eq!(msg.encode(), r#"validationMinChars|{"count":10}"#);
    }

    #[test]
    fn serializes_structured() {
        let msg = MessageId::new("searchCompletedMessage").with_param("entity", "Doctors");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"key": "searchCompletedMessage", "params": {"entity": "Doctors"}})
        );
        assert_eq!(
            serde_json::to_value(MessageId::new("x")).unwrap(),
            json!({"key": "x"})
        );
    }
}
