//! Preference command handlers.

use anyhow::{Result, anyhow, bail};
use calmmap_core::flows::{Preference, PreferenceSet};
use calmmap_ui::{Runtime, SaveStatus, UiEvent};

pub async fn show(mut runtime: Runtime) -> Result<()> {
    runtime.start();
    runtime.run_until_idle().await;

    if !runtime.state.is_signed_in() {
        bail!("Not signed in. Run `calmmap login` first.");
    }
    print_preferences(&runtime.state.preferences);
    Ok(())
}

pub async fn set(mut runtime: Runtime, assignments: &[String]) -> Result<()> {
    let changes = assignments
        .iter()
        .map(|a| parse_assignment(a))
        .collect::<Result<Vec<_>>>()?;

    runtime.start();
    runtime.run_until_idle().await;

    for (preference, value) in changes {
        runtime.dispatch(UiEvent::PreferenceToggled { preference, value });
    }
    runtime.dispatch(UiEvent::PreferencesSaveClicked);
    runtime.run_until_idle().await;

    let status = &runtime.state.preferences_status;
    if let SaveStatus::Error(message) = status {
        bail!("{message}");
    }
    println!("{}", status.label());
    print_preferences(&runtime.state.preferences);
    Ok(())
}

fn print_preferences(preferences: &PreferenceSet) {
    for (preference, value) in preferences.iter() {
        println!("{:<16} {}", preference.key(), if value { "on" } else { "off" });
    }
}

fn parse_assignment(assignment: &str) -> Result<(Preference, bool)> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=BOOL, got '{assignment}'"))?;
    let preference = key.parse::<Preference>().map_err(|err| anyhow!(err))?;
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => true,
        "false" | "off" | "no" | "0" => false,
        other => bail!("invalid value '{other}' for {preference}: use true or false"),
    };
    Ok((preference, value))
}
