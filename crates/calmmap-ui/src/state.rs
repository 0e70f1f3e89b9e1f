//! Application state.
//!
//! `AppState` holds everything the presentation layer renders. It is mutated only
//! by [`crate::update::update`].

use calmmap_core::config::DialogConfig;
use calmmap_core::flows::{AddressSelection, PreferenceSet};
use calmmap_core::session::Session;

use crate::dialog::{AuthDialog, OrgDialog};

/// Placeholder for profile fields the credential does not carry.
pub const MISSING_FIELD: &str = "—";

/// Preferences save status shown next to the save control.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

impl SaveStatus {
    pub fn label(&self) -> String {
        match self {
            SaveStatus::Idle => String::new(),
            SaveStatus::Saving => "Saving...".to_string(),
            SaveStatus::Saved => "Saved".to_string(),
            SaveStatus::Error(message) => format!("Error: {message}"),
        }
    }

    pub fn is_saving(&self) -> bool {
        matches!(self, SaveStatus::Saving)
    }
}

/// Display strings for the profile view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    /// `Role: <role>`, or empty when the credential has no role.
    pub role: String,
}

impl ProfileView {
    fn from_session(session: &Session) -> Self {
        let or_missing = |value: Option<&String>| {
            value.map_or_else(|| MISSING_FIELD.to_string(), Clone::clone)
        };
        Self {
            name: or_missing(session.name.as_ref()),
            email: or_missing(session.email.as_ref()),
            role: session
                .role
                .as_ref()
                .map(|role| format!("Role: {role}"))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Decoded view of the held credential as of the last refresh.
    pub session: Option<Session>,
    pub auth_dialog: AuthDialog,
    pub org_dialog: OrgDialog,
    /// Editable copy bound to the preference toggles.
    pub preferences: PreferenceSet,
    pub preferences_status: SaveStatus,
    /// Current map selection.
    pub address: AddressSelection,
    pub timing: DialogConfig,
}

impl AppState {
    pub fn new(timing: DialogConfig) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn auth_button_label(&self) -> &'static str {
        if self.is_signed_in() {
            "Profile"
        } else {
            "Sign in"
        }
    }

    pub fn profile(&self) -> Option<ProfileView> {
        self.session.as_ref().map(ProfileView::from_session)
    }
}
