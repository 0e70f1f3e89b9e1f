//! Multi-step operations against the API.
//!
//! Each flow validates locally, issues its requests strictly in order, and
//! reports a [`FlowError`] that the caller renders inline. Flows never retry,
//! except the single documented PATCH -> POST fallback in [`preferences`].

pub mod auth;
pub mod organization;
pub mod preferences;

use std::fmt;

use crate::api::RequestError;

pub use auth::{AuthFields, AuthFlow, AuthMode};
pub use organization::{
    AddressSelection, Attachment, OrganizationDraft, OrganizationFlow, OrganizationId,
    OrganizationOutcome, OrganizationType,
};
pub use preferences::{
    Preference, PreferenceSet, PreferencesSync, RemotePreferences, SaveOutcome,
};

/// Categories of flow failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowErrorKind {
    /// A local precondition failed; no request was issued
    Validation,
    /// A request failed (network or non-2xx)
    Request,
}

/// Failure reported at a flow boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    pub kind: FlowErrorKind,
    pub message: String,
}

impl FlowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: FlowErrorKind::Validation,
            message: message.into(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self {
            kind: FlowErrorKind::Request,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind == FlowErrorKind::Validation
    }
}

impl From<RequestError> for FlowError {
    fn from(err: RequestError) -> Self {
        Self::request(err.message)
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FlowError {}
