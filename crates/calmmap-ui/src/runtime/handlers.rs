//! Effect handlers.
//!
//! Pure async functions returning the completion `UiEvent`. The runtime spawns
//! them and sends the result to the inbox. They never touch `AppState`.

use calmmap_core::flows::{
    AuthFields, AuthFlow, AuthMode, OrganizationDraft, OrganizationFlow, PreferenceSet,
    PreferencesSync,
};
use calmmap_core::session::SubjectId;

use crate::events::UiEvent;

pub async fn auth_submit(flow: AuthFlow, mode: AuthMode, fields: AuthFields) -> UiEvent {
    let result = flow.submit(mode, &fields).await;
    if let Err(err) = &result {
        tracing::info!(?mode, error = %err, "auth submit failed");
    }
    UiEvent::AuthCompleted(result)
}

pub async fn preferences_fetch(flow: PreferencesSync, subject_id: SubjectId) -> UiEvent {
    UiEvent::PreferencesFetched(flow.fetch(Some(&subject_id)).await)
}

pub async fn preferences_save(flow: PreferencesSync, preferences: PreferenceSet) -> UiEvent {
    let result = flow.save(&preferences).await;
    if let Err(err) = &result {
        tracing::info!(error = %err, "preferences save failed");
    }
    UiEvent::PreferencesSaved(result)
}

pub async fn organization_submit(flow: OrganizationFlow, draft: OrganizationDraft) -> UiEvent {
    let result = flow.submit(&draft).await;
    match &result {
        Ok(outcome) if !outcome.is_complete() => {
            tracing::info!(id = %outcome.id, "organization created with failed attachment");
        }
        Ok(_) => {}
        Err(err) => tracing::info!(error = %err, "organization submit failed"),
    }
    UiEvent::OrganizationCompleted(result)
}
