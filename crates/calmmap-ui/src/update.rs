//! Reducer.
//!
//! All state mutations happen here. The runtime calls `update(app, event)` and
//! executes the returned effects.

use calmmap_core::flows::{AuthMode, FlowError, OrganizationOutcome};
use calmmap_core::session::Session;

use crate::dialog::{DialogKind, SubmitControl};
use crate::effects::UiEffect;
use crate::events::{OrgFieldEdit, OrgFileSlot, UiEvent};
use crate::state::{AppState, SaveStatus};

/// Takes the current state and an event, mutates state, and returns effects for
/// the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::AuthButtonClicked => {
            if !app.is_signed_in() {
                app.auth_dialog.switch_mode(AuthMode::Login);
            }
            app.auth_dialog.open();
            vec![]
        }
        UiEvent::AuthModeSwitched(mode) => {
            app.auth_dialog.switch_mode(mode);
            vec![]
        }
        UiEvent::AuthFieldsEdited(fields) => {
            app.auth_dialog.fields = fields;
            vec![]
        }
        UiEvent::AuthSubmitted => {
            if app.is_signed_in() {
                return vec![];
            }
            match app.auth_dialog.begin_submit() {
                Some((mode, fields)) => vec![UiEffect::SubmitAuth { mode, fields }],
                None => vec![],
            }
        }
        UiEvent::LogoutClicked => {
            app.auth_dialog.close();
            vec![UiEffect::Logout]
        }

        UiEvent::OverlayClicked(kind) | UiEvent::CloseClicked(kind) => {
            close_dialog(app, kind);
            vec![]
        }
        UiEvent::EscapePressed => {
            close_dialog(app, DialogKind::Auth);
            close_dialog(app, DialogKind::Organization);
            vec![]
        }

        UiEvent::PreferenceToggled { preference, value } => {
            app.preferences.set(preference, value);
            vec![]
        }
        UiEvent::PreferencesSaveClicked => {
            if app.preferences_status.is_saving() {
                return vec![];
            }
            app.preferences_status = SaveStatus::Saving;
            vec![UiEffect::SavePreferences {
                preferences: app.preferences,
            }]
        }

        UiEvent::AddressSelected(selection) => {
            app.address = selection;
            vec![]
        }
        UiEvent::OrgButtonClicked => {
            app.org_dialog.request_open(&app.address);
            vec![]
        }
        UiEvent::OrgFieldEdited(edit) => {
            apply_org_edit(app, edit);
            vec![]
        }
        UiEvent::OrgSubmitted => match app.org_dialog.begin_submit() {
            Some(draft) => vec![UiEffect::SubmitOrganization { draft }],
            None => vec![],
        },

        UiEvent::SessionRefreshed(session) => refresh_session(app, session),
        UiEvent::AuthCompleted(result) => handle_auth_completed(app, result),
        UiEvent::PreferencesFetched(remote) => {
            // A fetch that lands after logout must not rebind the form.
            if let Some(remote) = remote
                && app.is_signed_in()
            {
                remote.apply(&mut app.preferences);
            }
            vec![]
        }
        UiEvent::PreferencesSaved(result) => {
            app.preferences_status = match result {
                Ok(_) => SaveStatus::Saved,
                Err(err) => SaveStatus::Error(err.message),
            };
            vec![]
        }
        UiEvent::OrganizationCompleted(result) => handle_organization_completed(app, result),

        UiEvent::OrgDialogCloseElapsed { generation } => {
            if app.org_dialog.generation() == generation {
                app.org_dialog.close();
            }
            vec![]
        }
        UiEvent::OrgSubmitResetElapsed => {
            app.org_dialog.submit = SubmitControl::Ready;
            vec![]
        }
    }
}

fn close_dialog(app: &mut AppState, kind: DialogKind) {
    match kind {
        DialogKind::Auth => app.auth_dialog.close(),
        DialogKind::Organization => app.org_dialog.close(),
    }
}

fn apply_org_edit(app: &mut AppState, edit: OrgFieldEdit) {
    let form = &mut app.org_dialog.form;
    match edit {
        OrgFieldEdit::Address(value) => form.address = value,
        OrgFieldEdit::OrganizationType(value) => form.organization_type = value,
        OrgFieldEdit::Latitude(value) => form.latitude = value,
        OrgFieldEdit::Longitude(value) => form.longitude = value,
        OrgFieldEdit::File(OrgFileSlot::Map, file) => form.map_file = file,
        OrgFieldEdit::File(OrgFileSlot::Picture, file) => form.picture_file = file,
    }
}

/// Re-renders everything that depends on the session.
fn refresh_session(app: &mut AppState, session: Option<Session>) -> Vec<UiEffect> {
    app.session = session;
    match app.session.as_ref() {
        Some(session) => session
            .subject_id
            .clone()
            .map(|subject_id| UiEffect::FetchPreferences { subject_id })
            .into_iter()
            .collect(),
        None => {
            app.preferences = Default::default();
            app.preferences_status = SaveStatus::Idle;
            app.auth_dialog.reset_form();
            vec![]
        }
    }
}

fn handle_auth_completed(
    app: &mut AppState,
    result: Result<Option<Session>, FlowError>,
) -> Vec<UiEffect> {
    app.auth_dialog.submitting = false;
    match result {
        Ok(session) => {
            let effects = refresh_session(app, session);
            app.auth_dialog.close();
            effects
        }
        Err(err) => {
            app.auth_dialog.error = Some(err.message);
            vec![]
        }
    }
}

fn handle_organization_completed(
    app: &mut AppState,
    result: Result<OrganizationOutcome, FlowError>,
) -> Vec<UiEffect> {
    let timing = app.timing.clone();
    let dialog = &mut app.org_dialog;
    let reset = UiEffect::Schedule {
        delay: timing.submit_reset_delay(),
        event: Box::new(UiEvent::OrgSubmitResetElapsed),
    };

    // A submit from an earlier opening only releases the control; the current
    // draft keeps its own messages and stays open.
    let Some(generation) = dialog
        .finish_submit()
        .filter(|&started| started == dialog.generation())
    else {
        tracing::debug!("organization outcome from a previous opening");
        return match result {
            Err(err) if err.is_validation() => {
                dialog.submit = SubmitControl::Ready;
                vec![]
            }
            _ => vec![reset],
        };
    };

    match result {
        Err(err) if err.is_validation() => {
            dialog.error = Some(err.message);
            dialog.submit = SubmitControl::Ready;
            vec![]
        }
        Err(err) => {
            dialog.error = Some(err.message);
            vec![reset]
        }
        Ok(outcome) => match outcome.failed {
            Some((_, err)) => {
                dialog.error = Some(err.message);
                dialog.notice = Some(format!("Organization {} created", outcome.id));
                vec![reset]
            }
            None => {
                dialog.submit = SubmitControl::Done;
                dialog.notice = Some(format!("Organization {} created", outcome.id));
                vec![
                    UiEffect::Schedule {
                        delay: timing.close_delay(),
                        event: Box::new(UiEvent::OrgDialogCloseElapsed { generation }),
                    },
                    reset,
                ]
            }
        },
    }
}
