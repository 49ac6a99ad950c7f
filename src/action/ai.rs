//! Symptom analysis and nearby-service searches

use super::ViewState;
use crate::context::AppContext;
use crate::flow::{
    AnalyzeSymptoms, AnalyzeSymptomsInput, AnalyzeSymptomsOutput, FindDoctors, FindDoctorsInput,
    FindDoctorsOutput, FindHospitals, FindHospitalsOutput, FindPathologyLabs,
    FindPathologyLabsOutput, FindPharmacies, FindPharmaciesOutput, Flow, LocationInput,
};
use crate::form::{form_error, FieldCheck, FieldErrors, FormData, FromForm, TextField};
use crate::i18n::{Language, MessageId};

const SYMPTOMS_MIN: usize = 10;
const SYMPTOMS_MAX: usize = 1000;
const LOCATION_MIN: usize = 3;
const LOCATION_MAX: usize = 100;
const SPECIALTY_MAX: usize = 100;

// ============================================================================
// FORMS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SymptomsForm {
    pub symptoms: String,
}

impl FromForm for SymptomsForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, &["symptoms"]);
        let symptoms = check.required_text(
            &TextField::required("symptoms")
                .min(SYMPTOMS_MIN)
                .max(SYMPTOMS_MAX),
        );
        check.finish(|| Self { symptoms })
    }
}

fn location_field() -> TextField {
    TextField::required("location")
        .min(LOCATION_MIN)
        .max(LOCATION_MAX)
        .length_messages("validationLocationMinChars", "validationLocationMaxChars")
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationForm {
    pub location: String,
}

impl FromForm for LocationForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, &["location"]);
        let location = check.required_text(&location_field());
        check.finish(|| Self { location })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoctorSearchForm {
    pub location: String,
    pub specialty: Option<String>,
}

impl FromForm for DoctorSearchForm {
    fn from_form(form: &FormData) -> Result<Self, FieldErrors> {
        let mut check = FieldCheck::new(form, &["location", "specialty"]);
        let location = check.required_text(&location_field());
        let specialty = check.text(
            &TextField::optional("specialty")
                .max(SPECIALTY_MAX)
                .length_messages("validationMinChars", "validationSpecialtyMaxChars"),
        );
        check.finish(|| Self {
            location,
            specialty,
        })
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Names used in the messages of one search kind
struct Search {
    /// Success message, e.g. "Pharmacies"
    entity: &'static str,
    /// General failure message, e.g. "pharmacies"
    entity_plural: &'static str,
    /// Form-level failure, e.g. "Pharmacy"
    entity_singular: &'static str,
}

const PHARMACIES: Search = Search {
    entity: "Pharmacies",
    entity_plural: "pharmacies",
    entity_singular: "Pharmacy",
};
const DOCTORS: Search = Search {
    entity: "Doctors",
    entity_plural: "doctors",
    entity_singular: "Doctor",
};
const HOSPITALS: Search = Search {
    entity: "Hospitals",
    entity_plural: "hospitals",
    entity_singular: "Hospital",
};
const LABS: Search = Search {
    entity: "Pathology Labs",
    entity_plural: "pathology labs",
    entity_singular: "Pathology Lab",
};

pub async fn handle_symptom_analysis(
    ctx: &AppContext,
    _prev: &ViewState<AnalyzeSymptomsOutput>,
    form: &FormData,
) -> ViewState<AnalyzeSymptomsOutput> {
    let parsed = match SymptomsForm::from_form(form) {
        Ok(parsed) => parsed,
        Err(errors) => return rejected(ctx, AnalyzeSymptoms::NAME, errors),
    };

    let input = AnalyzeSymptomsInput {
        symptoms: parsed.symptoms,
        language: submitted_language(ctx, form),
    };

    match ctx.runner().run::<AnalyzeSymptoms>(&input).await {
        Ok(analysis) => ViewState::success(
            MessageId::new("symptomsAnalyzedMessage"),
            analysis,
            ctx.now(),
        ),
        Err(e) => {
            tracing::error!(flow = AnalyzeSymptoms::NAME, error = %e, "Symptom analysis failed");
            ViewState::failure(
                MessageId::new("errorDuringAnalysisMessage"),
                form_error(MessageId::new("symptomAnalysisFailed").with_param("error", e.to_string())),
                ctx.now(),
            )
        }
    }
}

pub async fn handle_find_pharmacies(
    ctx: &AppContext,
    _prev: &ViewState<FindPharmaciesOutput>,
    form: &FormData,
) -> ViewState<FindPharmaciesOutput> {
    match LocationForm::from_form(form) {
        Ok(parsed) => {
            let input = LocationInput {
                location: parsed.location,
                language: submitted_language(ctx, form),
            };
            search::<FindPharmacies>(ctx, &PHARMACIES, &input).await
        }
        Err(errors) => rejected(ctx, FindPharmacies::NAME, errors),
    }
}

pub async fn handle_find_doctors(
    ctx: &AppContext,
    _prev: &ViewState<FindDoctorsOutput>,
    form: &FormData,
) -> ViewState<FindDoctorsOutput> {
    match DoctorSearchForm::from_form(form) {
        Ok(parsed) => {
            let input = FindDoctorsInput {
                location: parsed.location,
                specialty: parsed.specialty,
                language: submitted_language(ctx, form),
            };
            search::<FindDoctors>(ctx, &DOCTORS, &input).await
        }
        Err(errors) => rejected(ctx, FindDoctors::NAME, errors),
    }
}

pub async fn handle_find_hospitals(
    ctx: &AppContext,
    _prev: &ViewState<FindHospitalsOutput>,
    form: &FormData,
) -> ViewState<FindHospitalsOutput> {
    match LocationForm::from_form(form) {
        Ok(parsed) => {
            let input = LocationInput {
                location: parsed.location,
                language: submitted_language(ctx, form),
            };
            search::<FindHospitals>(ctx, &HOSPITALS, &input).await
        }
        Err(errors) => rejected(ctx, FindHospitals::NAME, errors),
    }
}

pub async fn handle_find_pathology_labs(
    ctx: &AppContext,
    _prev: &ViewState<FindPathologyLabsOutput>,
    form: &FormData,
) -> ViewState<FindPathologyLabsOutput> {
    match LocationForm::from_form(form) {
        Ok(parsed) => {
            let input = LocationInput {
                location: parsed.location,
                language: submitted_language(ctx, form),
            };
            search::<FindPathologyLabs>(ctx, &LABS, &input).await
        }
        Err(errors) => rejected(ctx, FindPathologyLabs::NAME, errors),
    }
}

async fn search<F: Flow>(ctx: &AppContext, kind: &Search, input: &F::Input) -> ViewState<F::Output> {
    match ctx.runner().run::<F>(input).await {
        Ok(output) => ViewState::success(
            MessageId::new("searchCompletedMessage").with_param("entity", kind.entity),
            output,
            ctx.now(),
        ),
        Err(e) => {
            tracing::error!(flow = F::NAME, error = %e, "Search failed");
            ViewState::failure(
                MessageId::new("errorDuringSearchMessage")
                    .with_param("entity_plural", kind.entity_plural),
                form_error(
                    MessageId::new("searchFailed")
                        .with_param("entity", kind.entity_singular)
                        .with_param("error", e.to_string()),
                ),
                ctx.now(),
            )
        }
    }
}

fn rejected<T>(ctx: &AppContext, flow: &'static str, errors: FieldErrors) -> ViewState<T> {
    tracing::debug!(
        flow,
        fields = ?errors.keys().collect::<Vec<_>>(),
        "Submission rejected by validation"
    );
    ViewState::invalid(errors, ctx.now())
}

/// Language from the form, else the configured default
fn submitted_language(ctx: &AppContext, form: &FormData) -> Language {
    Language::from_code_or(form.language(), ctx.default_language())
}
