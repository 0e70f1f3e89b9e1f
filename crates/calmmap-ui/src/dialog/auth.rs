//! Auth dialog state.

use calmmap_core::flows::{AuthFields, AuthMode};

/// What the auth dialog renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthView {
    Login,
    Register,
    /// Shown whenever a session exists, regardless of `mode`.
    Profile,
}

/// State for the auth dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthDialog {
    pub open: bool,
    /// Persisted form mode. Only changed by [`AuthDialog::switch_mode`].
    pub mode: AuthMode,
    /// Values bound to the form controls.
    pub fields: AuthFields,
    /// Inline error text.
    pub error: Option<String>,
    /// True while a submit is in flight.
    pub submitting: bool,
}

impl AuthDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Switches the form mode, resetting error text and every bound field.
    ///
    /// Switching to the current mode changes nothing.
    pub fn switch_mode(&mut self, mode: AuthMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.reset_form();
        tracing::debug!(?mode, "auth dialog mode switched");
    }

    /// Clears bound fields and error text; keeps visibility and mode.
    pub fn reset_form(&mut self) {
        self.fields = AuthFields::default();
        self.error = None;
    }

    pub fn view(&self, has_session: bool) -> AuthView {
        match (has_session, self.mode) {
            (true, _) => AuthView::Profile,
            (false, AuthMode::Login) => AuthView::Login,
            (false, AuthMode::Register) => AuthView::Register,
        }
    }

    /// Name and role inputs are visible only in Register mode.
    pub fn shows_name_and_role(&self) -> bool {
        self.mode == AuthMode::Register
    }

    /// Marks a submit as started and returns what to send.
    ///
    /// Returns `None` while a previous submit is still in flight.
    pub fn begin_submit(&mut self) -> Option<(AuthMode, AuthFields)> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some((self.mode, self.fields.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(mode: AuthMode) -> AuthDialog {
        AuthDialog {
            open: true,
            mode,
            fields: AuthFields {
                name: "Ada".into(),
                email: "a@b.com".into(),
                password: "x".into(),
                role: "owner".into(),
            },
            error: Some("Invalid credentials".into()),
            submitting: false,
        }
    }

    /// Test: initial state is closed and in login mode.
    #[test]
    fn test_initial_state() {
        let dialog = AuthDialog::default();
        assert!(!dialog.open);
        assert_eq!(dialog.mode, AuthMode::Login);
        assert_eq!(dialog.view(false), AuthView::Login);
    }

    /// Test: every distinct mode pair resets fields and error.
    #[test]
    fn test_switch_mode_resets_for_all_pairs() {
        for (from, to) in [
            (AuthMode::Login, AuthMode::Register),
            (AuthMode::Register, AuthMode::Login),
        ] {
            let mut dialog = filled(from);
            dialog.switch_mode(to);
            assert_eq!(dialog.mode, to);
            assert_eq!(dialog.fields, AuthFields::default());
            assert!(dialog.error.is_none());
            assert!(dialog.open, "visibility is untouched");
        }
    }

    #[test]
    fn test_switch_to_same_mode_is_noop() {
        for mode in [AuthMode::Login, AuthMode::Register] {
            let mut dialog = filled(mode);
            let before = dialog.clone();
            dialog.switch_mode(mode);
            assert_eq!(dialog, before);
        }
    }

    #[test]
    fn test_session_shows_profile_without_changing_mode() {
        let mut dialog = AuthDialog::default();
        dialog.switch_mode(AuthMode::Register);
        dialog.open();

        assert_eq!(dialog.view(true), AuthView::Profile);
        assert_eq!(dialog.mode, AuthMode::Register);
        assert_eq!(dialog.view(false), AuthView::Register);
        assert!(dialog.shows_name_and_role());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut dialog = AuthDialog::default();
        dialog.close();
        assert!(!dialog.open);
        dialog.open();
        dialog.close();
        dialog.close();
        assert!(!dialog.open);
    }

    #[test]
    fn test_begin_submit_blocks_reentry() {
        let mut dialog = filled(AuthMode::Login);
        let (mode, fields) = dialog.begin_submit().unwrap();
        assert_eq!(mode, AuthMode::Login);
        assert_eq!(fields.email, "a@b.com");
        assert!(dialog.error.is_none());
        assert!(dialog.begin_submit().is_none());
    }
}
