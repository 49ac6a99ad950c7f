//! MediSeek - AI-assisted symptom analysis and health-service lookup
//!
//! Every user operation goes through the same pipeline: a raw form is
//! validated into a typed value, a schema-validated model call (or a blog
//! store operation) runs, and the outcome is mapped into a [`ViewState`]
//! carrying localizable [`MessageId`]s.

pub mod action;
pub mod blog;
pub mod config;
pub mod context;
pub mod error;
pub mod flow;
pub mod form;
pub mod i18n;
pub mod links;
pub mod provider;
pub mod render;
pub mod session;

pub use action::ViewState;
pub use config::MediSeekConfig;
pub use context::AppContext;
pub use error::{FixSuggestion, MediSeekError};
pub use flow::{FlowError, FlowRunner};
pub use form::FormData;
pub use i18n::{Catalog, Language, MessageId};
