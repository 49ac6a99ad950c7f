use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{lookup_prompt, Flow, LocationInput};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// 0 to 5
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindHospitalsOutput {
    pub hospitals: Vec<Hospital>,
    pub disclaimer: String,
    pub searched_location: String,
}

pub struct FindHospitals;

impl Flow for FindHospitals {
    const NAME: &'static str = "findHospitals";
    type Input = LocationInput;
    type Output = FindHospitalsOutput;

    fn prompt(input: &LocationInput) -> String {
        lookup_prompt(
            "hospitals",
            &input.location,
            None,
            "'name', 'address', and when plausible 'phone', a 'rating' between 0 and 5 \
and a list of notable 'specialties'",
            input.language,
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "required": ["hospitals", "disclaimer", "searchedLocation"],
            "properties": {
                "hospitals": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "address"],
                        "properties": {
                            "name": {"type": "string"},
                            "address": {"type": "string"},
                            "phone": {"type": "string"},
                            "rating": {"type": "number", "minimum": 0, "maximum": 5},
                            "specialties": {"type": "array", "items": {"type": "string"}}
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
    use crate::flow::{FlowError, FlowRunner};
    use crate::provider::MockProvider;
    use std::sync::Arc;

    fn input() -> LocationInput {
        LocationInput {
            location: "Pune".into(),
            language: Language::Hi,
        }
    }

    #[tokio::test]
    async fn rating_out_of_range_is_rejected() {
        let mock = MockProvider::new();
        mock.queue_response(
            r#"{"hospitals": [{"name": "City", "address": "A", "rating": 7}],
                "disclaimer": "d", "searchedLocation": "Pune"}"#,
        );
        let err = FlowRunner::new(Arc::new(mock))
            .run::<FindHospitals>(&input())
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::SchemaMismatch { flow: "findHospitals", .. }));
    }

    #[tokio::test]
    async fn full_entry_round_trips() {
        let mock = MockProvider::new();
        mock.queue_response(
            r#"{"hospitals": [{"name": "City", "address": "A", "rating": 4.5,
                "specialties": ["Cardiology"]}], "disclaimer": "d", "searchedLocation": "Pune"}"#,
        );
        let out = FlowRunner::new(Arc::new(mock))
            .run::<FindHospitals>(&input())
            .await
            .unwrap();
        assert_eq!(out.hospitals[0].rating, Some(4.5));
        assert_eq!(out.hospitals[0].specialties.as_deref(), Some(&["Cardiology".to_string()][..]));
    }
}
