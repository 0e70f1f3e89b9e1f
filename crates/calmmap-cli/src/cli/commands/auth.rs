//! Session command handlers.

use anyhow::{Result, bail};
use calmmap_core::flows::{AuthFields, AuthMode};
use calmmap_core::session::{FileStorage, TokenStore};
use calmmap_ui::{AppState, Runtime, UiEvent, update};
use chrono::Utc;

pub async fn login(mut runtime: Runtime, email: String, password: String) -> Result<()> {
    runtime.dispatch(UiEvent::AuthButtonClicked);
    runtime.dispatch(UiEvent::AuthFieldsEdited(AuthFields {
        email,
        password,
        ..AuthFields::default()
    }));
    submit(runtime).await
}

pub async fn register(mut runtime: Runtime, fields: AuthFields) -> Result<()> {
    runtime.dispatch(UiEvent::AuthButtonClicked);
    runtime.dispatch(UiEvent::AuthModeSwitched(AuthMode::Register));
    runtime.dispatch(UiEvent::AuthFieldsEdited(fields));
    submit(runtime).await
}

async fn submit(mut runtime: Runtime) -> Result<()> {
    runtime.dispatch(UiEvent::AuthSubmitted);
    runtime.run_until_idle().await;

    let state = &runtime.state;
    if let Some(error) = &state.auth_dialog.error {
        bail!("{error}");
    }
    match state.profile() {
        Some(profile) => println!("Signed in as {} <{}>", profile.name, profile.email),
        None => println!("Account accepted. Run `calmmap login` to sign in."),
    }
    Ok(())
}

pub async fn logout(mut runtime: Runtime) -> Result<()> {
    runtime.dispatch(UiEvent::LogoutClicked);
    runtime.run_until_idle().await;
    println!("Signed out");
    Ok(())
}

pub fn whoami() -> Result<()> {
    let tokens = TokenStore::new(FileStorage::default_location());
    if tokens.get().is_none() {
        println!("Not signed in");
        return Ok(());
    }

    let session = tokens.session();
    let expires_at = session.as_ref().and_then(|s| s.expires_at);
    let expired = session.as_ref().is_some_and(|s| s.looks_expired(Utc::now()));

    // Render only: the preference fetch this produces is not executed.
    let mut state = AppState::default();
    let _ = update(&mut state, UiEvent::SessionRefreshed(session));

    let Some(profile) = state.profile() else {
        bail!("Stored credential is unreadable. Run `calmmap login` again.");
    };
    println!("{}", profile.name);
    println!("{}", profile.email);
    if !profile.role.is_empty() {
        println!("{}", profile.role);
    }
    if let Some(at) = expires_at {
        let suffix = if expired { " (expired)" } else { "" };
        println!("Expires: {}{suffix}", at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}
