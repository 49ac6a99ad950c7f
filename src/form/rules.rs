//! Text field rules and the error collector used by every `FromForm` impl

use super::{FieldErrors, FormData, FORM_ERRORS, LANGUAGE_FIELD};
use crate::i18n::MessageId;

/// Length rule for one text field
///
/// Values are trimmed first and lengths count characters. A blank value is
/// treated as absent.
#[derive(Debug, Clone)]
pub struct TextField {
    name: &'static str,
    required: bool,
    min: usize,
    max: Option<usize>,
    required_key: &'static str,
    min_key: &'static str,
    max_key: &'static str,
}

impl TextField {
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            min: 0,
            max: None,
            required_key: "validationRequired",
            min_key: "validationMinChars",
            max_key: "validationMaxChars",
        }
    }

    pub fn optional(name: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name)
        }
    }

    pub fn min(mut self, count: usize) -> Self {
        self.min = count;
        self
    }

    pub fn max(mut self, count: usize) -> Self {
        self.max = Some(count);
        self
    }

    /// Message used when a required value is missing
    pub fn missing_message(mut self, key: &'static str) -> Self {
        self.required_key = key;
        self
    }

    /// Messages for the length bounds (both receive `{count}`)
    pub fn length_messages(mut self, min_key: &'static str, max_key: &'static str) -> Self {
        self.min_key = min_key;
        self.max_key = max_key;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The upper bound applies to the value as submitted, the lower bound to
    /// the trimmed value, so padding can neither sneak past the maximum nor
    /// fill up the minimum.
    fn check(&self, raw: Option<&str>) -> Result<Option<String>, MessageId> {
        let Some((raw, value)) = raw
            .map(|raw| (raw, raw.trim()))
            .filter(|(_, value)| !value.is_empty())
        else {
            return if self.required {
                Err(MessageId::new(self.required_key))
            } else {
                Ok(None)
            };
        };

        if value.chars().count() < self.min {
            return Err(MessageId::new(self.min_key).with_param("count", self.min));
        }
        if let Some(max) = self.max {
            if raw.chars().count() > max {
                return Err(MessageId::new(self.max_key).with_param("count", max));
            }
        }
        Ok(Some(value.to_string()))
    }
}

/// Collects field errors while a form is converted
///
/// ```rust
/// use mediseek::form::{FieldCheck, FormData, TextField};
///
/// let form = FormData::new().with("location", "NY");
/// let mut check = FieldCheck::new(&form, &["location"]);
/// let location = check.text(&TextField::required("location").min(3));
/// assert!(location.is_none());
/// assert!(check.finish(|| ()).is_err());
/// ```
pub struct FieldCheck<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl<'a> FieldCheck<'a> {
    /// Start a check; fields outside `allowed` (and `language`) are reported
    /// under `_form`
    pub fn new(form: &'a FormData, allowed: &[&str]) -> Self {
        let mut check = Self {
            form,
            errors: FieldErrors::new(),
        };
        for name in form.names() {
            if name != LANGUAGE_FIELD && !allowed.contains(&name) {
                check.push(
                    FORM_ERRORS,
                    MessageId::new("validationUnknownField").with_param("field", name),
                );
            }
        }
        check
    }

    /// Apply a text rule; `None` means absent or invalid
    pub fn text(&mut self, field: &TextField) -> Option<String> {
        match field.check(self.form.get(field.name())) {
            Ok(value) => value,
            Err(message) => {
                self.push(field.name(), message);
                None
            }
        }
    }

    /// Apply a required text rule; the fallback fills the typed value when
    /// the check fails (the error map is what gets returned then)
    pub fn required_text(&mut self, field: &TextField) -> String {
        self.text(field).unwrap_or_default()
    }

    pub fn push(&mut self, field: &str, message: MessageId) {
        self.errors.entry(field.to_string()).or_default().push(message);
    }

    /// Build the typed value when no rule failed
    pub fn finish<T>(self, build: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(build())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn symptoms() -> TextField {
        TextField::required("symptoms").min(10).max(1000)
    }

    #[test]
    fn missing_required_value() {
        assert_eq!(symptoms().check(None), Err(MessageId::new("validationRequired")));
        assert_eq!(symptoms().check(Some("   ")), Err(MessageId::new("validationRequired")));
    }

    #[test]
    fn length_bounds_carry_count() {
        assert_eq!(
            symptoms().check(Some("short")),
            Err(MessageId::new("validationMinChars").with_param("count", 10))
        );
        let long = "a".repeat(1001);
        assert_eq!(
            symptoms().check(Some(long.as_str())),
            Err(MessageId::new("validationMaxChars").with_param("count", 1000))
        );
        assert_eq!(
            symptoms().check(Some("a".repeat(1000).as_str())),
            Ok(Some("a".repeat(1000)))
        );
    }

    #[test]
    fn padding_counts_toward_the_maximum_only() {
        let padded = format!("  {}", "a".repeat(1000));
        assert_eq!(
            symptoms().check(Some(padded.as_str())),
            Err(MessageId::new("validationMaxChars").with_param("count", 1000))
        );

        // the minimum looks at what is left after trimming
        assert_eq!(
            symptoms().check(Some("   cough    ")),
            Err(MessageId::new("validationMinChars").with_param("count", 10))
        );
        assert_eq!(
            symptoms().check(Some(" dry cough at night ")),
            Ok(Some("dry cough at night".to_string()))
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let field = TextField::required("location").min(3).max(4);
        assert_eq!(field.check(Some("Köln")), Ok(Some("Köln".to_string())));
    }

    #[test]
    fn custom_messages() {
        let location = TextField::required("location")
            .min(3)
            .max(100)
            .length_messages("validationLocationMinChars", "validationLocationMaxChars");
        assert_eq!(
            location.check(Some("NY")),
            Err(MessageId::new("validationLocationMinChars").with_param("count", 3))
        );

        let username = TextField::required("username").missing_message("adminUsernameRequired");
        assert_eq!(username.check(Some("")), Err(MessageId::new("adminUsernameRequired")));
    }

    #[test]
    fn optional_blank_is_absent() {
        let author = TextField::optional("author").max(10);
        assert_eq!(author.check(Some("  ")), Ok(None));
        assert_eq!(author.check(None), Ok(None));
    }

    #[test]
    fn unknown_fields_are_reported() {
        let form = FormData::new()
            .with("symptoms", "persistent dry cough")
            .with("language", "fr")
            .with("debug", "1");
        let mut check = FieldCheck::new(&form, &["symptoms"]);
        let value = check.required_text(&symptoms());
        assert_eq!(value, "persistent dry cough");

        let errors = check.finish(|| value).unwrap_err();
        assert_eq!(
            errors[FORM_ERRORS],
            vec![MessageId::new("validationUnknownField").with_param("field", "debug")]
        );
        assert!(!errors.contains_key("symptoms"));
    }
}
