//! UI events.
//!
//! User interactions and async completions both arrive here; the reducer is the
//! only consumer.

use calmmap_core::api::UploadFile;
use calmmap_core::flows::{
    AddressSelection, AuthFields, AuthMode, FlowError, OrganizationOutcome, Preference,
    RemotePreferences, SaveOutcome,
};
use calmmap_core::session::Session;

use crate::dialog::DialogKind;

/// File slot on the organization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgFileSlot {
    Map,
    Picture,
}

/// Edits to individual organization form controls.
#[derive(Debug, Clone, PartialEq)]
pub enum OrgFieldEdit {
    Address(String),
    OrganizationType(String),
    Latitude(String),
    Longitude(String),
    File(OrgFileSlot, Option<UploadFile>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Auth dialog
    AuthButtonClicked,
    AuthModeSwitched(AuthMode),
    AuthFieldsEdited(AuthFields),
    AuthSubmitted,
    LogoutClicked,

    // Shared close triggers
    OverlayClicked(DialogKind),
    CloseClicked(DialogKind),
    EscapePressed,

    // Preferences form
    PreferenceToggled { preference: Preference, value: bool },
    PreferencesSaveClicked,

    // Map selection and organization dialog
    AddressSelected(AddressSelection),
    OrgButtonClicked,
    OrgFieldEdited(OrgFieldEdit),
    OrgSubmitted,

    // Completions
    /// The session was recomputed from the token store.
    SessionRefreshed(Option<Session>),
    AuthCompleted(Result<Option<Session>, FlowError>),
    PreferencesFetched(Option<RemotePreferences>),
    PreferencesSaved(Result<SaveOutcome, FlowError>),
    OrganizationCompleted(Result<OrganizationOutcome, FlowError>),

    // Timers
    OrgDialogCloseElapsed { generation: u64 },
    OrgSubmitResetElapsed,
}
