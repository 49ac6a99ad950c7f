use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{lookup_prompt, Flow, LocationInput};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathologyLab {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services_offered: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPathologyLabsOutput {
    pub labs: Vec<PathologyLab>,
    pub disclaimer: String,
    pub searched_location: String,
}

pub struct FindPathologyLabs;

impl Flow for FindPathologyLabs {
    const NAME: &'static str = "findPathologyLabs";
    type Input = LocationInput;
    type Output = FindPathologyLabsOutput;

    fn prompt(input: &LocationInput) -> String {
        lookup_prompt(
            "pathology labs",
            &input.location,
            None,
            "'name', 'address', and when plausible 'phone', 'operatingHours' and a list of \
'servicesOffered' (e.g. blood tests, urinalysis)",
            input.language,
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "required": ["labs", "disclaimer", "searchedLocation"],
            "properties": {
                "labs": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "address"],
                        "properties": {
                            "name": {"type": "string"},
                            "address": {"type": "string"},
                            "phone": {"type": "string"},
                            "operatingHours": {"type": "string"},
                            "servicesOffered": {"type": "array", "items": {"type": "string"}}
                        }
                    }
                },
                "disclaimer": {"type": "string", "minLength": 1},
                "searchedLocation": {"type": "string"}
            }
        })
    }

    fn language(input: &LocationInput) -> Language {
        input.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_fields_use_camel_case() {
        let lab: PathologyLab = serde_json::from_value(json!({
            "name": "Metro Diagnostics",
            "address": "12 Ring Rd",
            "operatingHours": "7am-7pm",
            "servicesOffered": ["CBC", "Lipid panel"]
        }))
        .unwrap();
        assert_eq!(lab.operating_hours.as_deref(), Some("7am-7pm"));
        assert_eq!(lab.services_offered.map(|s| s.len()), Some(2));
    }

    #[test]
    fn prompt_lists_lab_fields() {
        let prompt = FindPathologyLabs::prompt(&LocationInput {
            location: "Madrid".into(),
            language: Language::Es,
        });
        assert!(prompt.contains("pathology labs near \"Madrid\""));
        assert!(prompt.contains("servicesOffered"));
        assert!(prompt.contains("Spanish"));
    }
}
