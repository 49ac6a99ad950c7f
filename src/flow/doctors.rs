use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{lookup_prompt, Flow};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindDoctorsInput {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub specialty: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindDoctorsOutput {
    pub doctors: Vec<Doctor>,
    pub disclaimer: String,
    pub searched_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searched_specialty: Option<String>,
}

pub struct FindDoctors;

impl Flow for FindDoctors {
    const NAME: &'static str = "findDoctors";
    type Input = FindDoctorsInput;
    type Output = FindDoctorsOutput;

    fn prompt(input: &FindDoctorsInput) -> String {
        let focus = input
            .specialty
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("doctors practising {} and echo it back as 'searchedSpecialty'", s));

        lookup_prompt(
            "doctors",
            &input.location,
            focus.as_deref(),
            "'name', 'specialty', 'address', and when plausible 'phone'",
            input.language,
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "required": ["doctors", "disclaimer", "searchedLocation"],
            "properties": {
                "doctors": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "specialty", "address"],
                        "properties": {
                            "name": {"type": "string"},
                            "specialty": {"type": "string"},
                            "address": {"type": "string"},
                            "phone": {"type": "string"}
                        }
                    }
                },
                "disclaimer": {"type": "string", "minLength": 1},
                "searchedLocation": {"type": "string"},
                "searchedSpecialty": {"type": "string"}
            }
        })
    }

    fn language(input: &FindDoctorsInput) -> Language {
        input.language
    }
}
