//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and timers only (no direct state mutations).

use std::time::Duration;

use calmmap_core::flows::{AuthFields, AuthMode, OrganizationDraft, PreferenceSet};
use calmmap_core::session::SubjectId;

use crate::events::UiEvent;

#[derive(Debug)]
pub enum UiEffect {
    /// Run the auth flow with a snapshot of the form.
    SubmitAuth { mode: AuthMode, fields: AuthFields },

    /// Drop the credential (no request).
    Logout,

    /// Read stored preferences for the signed-in subject.
    FetchPreferences { subject_id: SubjectId },

    /// Write all preferences.
    SavePreferences { preferences: PreferenceSet },

    /// Create an organization and upload its files.
    SubmitOrganization { draft: OrganizationDraft },

    /// Feed `event` back into the reducer after `delay`.
    Schedule { delay: Duration, event: Box<UiEvent> },
}
