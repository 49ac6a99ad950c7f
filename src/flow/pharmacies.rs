use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{lookup_prompt, Flow, LocationInput};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pharmacy {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPharmaciesOutput {
    pub pharmacies: Vec<Pharmacy>,
    pub disclaimer: String,
    pub searched_location: String,
}

pub struct FindPharmacies;

impl Flow for FindPharmacies {
    const NAME: &'static str = "findPharmacies";
    type Input = LocationInput;
    type Output = FindPharmaciesOutput;

    fn prompt(input: &LocationInput) -> String {
        lookup_prompt(
            "pharmacies",
            &input.location,
            None,
            "'name', 'address', and when plausible 'phone' and opening 'hours'",
            input.language,
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "required": ["pharmacies", "disclaimer", "searchedLocation"],
            "properties": {
                "pharmacies": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "address"],
                        "properties": {
                            "name": {"type": "string"},
                            "address": {"type": "string"},
                            "phone": {"type": "string"},
                            "hours": {"type": "string", "description": "Opening hours, e.g. 'Mon-Sat 9:00-21:00'."}
                        }
                    }
                },
                "disclaimer": {"type": "string", "minLength": 1},
                "searchedLocation": {"type": "string", "description": "The location that was searched."}
            }
        })
    }

    fn language(input: &LocationInput) -> Language {
        input.language
    }
}
