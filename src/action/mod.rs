//! # Action Handlers
//!
//! Every user-triggered operation is a handler with the same shape:
//!
//! ```text
//! (ctx, previous ViewState, FormData) ──validate──▶ typed form
//!                                     ──invoke────▶ flow / store
//!                                     ──map───────▶ next ViewState
//! ```
//!
//! Handlers never return `Err` and never panic on external input: every
//! outcome is a view-state carrying either an output or a field-error map.
//! Each view-state is stamped from the context clock, so a newer state always
//! has a larger timestamp.

mod admin;
mod ai;

pub use admin::{
    handle_admin_login, handle_admin_logout, handle_create_post, handle_delete_post,
    handle_update_post, DeletePostForm, DeletedPost, LoginForm, LoginOutcome, LogoutOutcome,
    PostForm, UpdatePostForm,
};
pub use ai::{
    handle_find_doctors, handle_find_hospitals, handle_find_pathology_labs,
    handle_find_pharmacies, handle_symptom_analysis, DoctorSearchForm, LocationForm,
    SymptomsForm,
};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::blog::BlogPost;
use crate::flow::{
    AnalyzeSymptomsOutput, FindDoctorsOutput, FindHospitalsOutput, FindPathologyLabsOutput,
    FindPharmaciesOutput,
};
use crate::form::FieldErrors;
use crate::i18n::MessageId;

/// Message returned with every validation failure
pub const VALIDATION_FAILED: &str = "validationFailedMessage";

/// Output carried by a view-state
pub trait Payload: Serialize {
    /// Field name the output is serialized under
    const FIELD: &'static str = "data";
}

impl Payload for AnalyzeSymptomsOutput {
    const FIELD: &'static str = "analysis";
}
impl Payload for FindPharmaciesOutput {}
impl Payload for FindDoctorsOutput {}
impl Payload for FindHospitalsOutput {}
impl Payload for FindPathologyLabsOutput {}
impl Payload for BlogPost {}

/// What the UI renders after a submission
///
/// Exactly one of `output` / `errors` is set on every state a handler
/// returns; both are empty only in [`ViewState::initial`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    pub message: Option<MessageId>,
    pub output: Option<T>,
    pub errors: Option<FieldErrors>,
    pub timestamp: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::initial()
    }
}

impl<T> ViewState<T> {
    /// State before any submission
    pub fn initial() -> Self {
        Self {
            message: None,
            output: None,
            errors: None,
            timestamp: 0,
        }
    }

    pub fn success(message: MessageId, output: T, timestamp: u64) -> Self {
        Self {
            message: Some(message),
            output: Some(output),
            errors: None,
            timestamp,
        }
    }

    pub fn failure(message: MessageId, errors: FieldErrors, timestamp: u64) -> Self {
        Self {
            message: Some(message),
            output: None,
            errors: Some(errors),
            timestamp,
        }
    }

    /// Field errors from the boundary check
    pub fn invalid(errors: FieldErrors, timestamp: u64) -> Self {
        Self::failure(MessageId::new(VALIDATION_FAILED), errors, timestamp)
    }

    pub fn is_success(&self) -> bool {
        self.output.is_some()
    }

    /// Messages attached to one field (`_form` for form-level errors)
    pub fn field_errors(&self, field: &str) -> &[MessageId] {
        self.errors
            .as_ref()
            .and_then(|e| e.get(field))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl<T: Payload> Serialize for ViewState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(message) = &self.message {
            map.serialize_entry("message", message)?;
        }
        if let Some(output) = &self.output {
            map.serialize_entry(T::FIELD, output)?;
        }
        if let Some(errors) = &self.errors {
            map.serialize_entry("errors", errors)?;
        }
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}
