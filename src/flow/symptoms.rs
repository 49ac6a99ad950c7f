//! Symptom analysis: over-the-counter suggestions, a specialty, a diet plan

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{language_clause, Flow};
use crate::i18n::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeSymptomsInput {
    pub symptoms: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineSuggestion {
    pub name: String,
    pub dosage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeSymptomsOutput {
    pub suggested_medicines: Vec<MedicineSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_diet_plan: Option<String>,
    pub disclaimer: String,
}

pub struct AnalyzeSymptoms;

impl Flow for AnalyzeSymptoms {
    const NAME: &'static str = "analyzeSymptoms";
    type Input = AnalyzeSymptomsInput;
    type Output = AnalyzeSymptomsOutput;

    fn prompt(input: &AnalyzeSymptomsInput) -> String {
        format!(
            "Analyze the symptoms a user reported. Based on them:\n\
1. Suggest potential over-the-counter medicines, each with general dosage information.\n\
2. Suggest a general medical specialty worth consulting (for example \"General Practitioner\", \
\"Dermatologist\", \"Pulmonologist\"). If the symptoms are generic, omit it or suggest \
\"General Practitioner\".\n\
3. Suggest a short diet plan as plain descriptive text that may help with the symptoms.\n\
4. Provide a comprehensive disclaimer stating that every suggestion is informational only, \
is not a substitute for professional medical, pharmaceutical or nutritional advice, that \
dosages are general, and that the user should read labels and consult a healthcare \
professional.\n\n\
{clause}\n\n\
Symptoms: {symptoms}\n\n\
Return 'suggestedMedicines' (each with 'name' and 'dosage'), 'suggestedSpecialty' when \
applicable, 'suggestedDietPlan' and 'disclaimer'.",
            clause = language_clause(input.language),
            symptoms = input.symptoms.trim(),
        )
    }

    fn output_schema() -> Value {
        json!({
            "type": "object",
            "required": ["suggestedMedicines", "disclaimer"],
            "properties": {
                "suggestedMedicines": {
                    "type": "array",
                    "description": "Over-the-counter medicines with general dosages, informational only.",
                    "items": {
                        "type": "object",
                        "required": ["name", "dosage"],
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "Name of the over-the-counter medicine."
                            },
                            "dosage": {
                                "type": "string",
                                "description": "General dosage, e.g. '1-2 tablets every 4-6 hours'."
                            }
                        }
                    }
                },
                "suggestedSpecialty": {
                    "type": "string",
                    "description": "Medical specialty that may be relevant, e.g. 'General Practitioner'."
                },
                "suggestedDietPlan": {
                    "type": "string",
                    "description": "General diet suggestion as descriptive text."
                },
                "disclaimer": {
                    "type": "string",
                    "minLength": 1,
                    "description": "States that all suggestions are informational and not professional advice."
                }
            }
        })
    }

    fn language(input: &AnalyzeSymptomsInput) -> Language {
        input.language
    }
}
