//! Runtime: owns state, executes effects, feeds completions back.
//!
//! This is the side-effect boundary. The reducer stays pure and produces
//! effects; this module runs them on the Tokio runtime.
//!
//! ## Inbox Pattern
//!
//! Spawned handlers send exactly one `UiEvent` each to `inbox_tx`. The runtime
//! counts outstanding handlers and drains the inbox until none remain, so a
//! caller can drive a scripted interaction to completion with
//! [`Runtime::run_until_idle`].

mod handlers;

use std::future::Future;

use anyhow::Result;
use calmmap_core::api::RequestClient;
use calmmap_core::config::{Config, DialogConfig};
use calmmap_core::flows::{AuthFlow, OrganizationFlow, PreferencesSync};
use calmmap_core::session::SessionContext;
use tokio::sync::mpsc;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::update;

pub struct Runtime {
    /// Application state, read by the renderer after each run.
    pub state: AppState,
    tokens: SessionContext,
    auth: AuthFlow,
    preferences: PreferencesSync,
    organizations: OrganizationFlow,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    /// Spawned handlers whose event has not been received yet.
    pending: usize,
}

impl Runtime {
    /// Creates a runtime whose flows all share `client` (and its token store).
    pub fn new(client: RequestClient, timing: DialogConfig) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::new(timing),
            tokens: SessionContext::clone(client.tokens()),
            auth: AuthFlow::new(client.clone()),
            preferences: PreferencesSync::new(client.clone()),
            organizations: OrganizationFlow::new(client),
            inbox_tx,
            inbox_rx,
            pending: 0,
        }
    }

    /// Creates a runtime from configuration.
    ///
    /// # Errors
    /// Returns an error if the API base URL is invalid or the HTTP client cannot be built.
    pub fn from_config(config: &Config, tokens: SessionContext) -> Result<Self> {
        let client = RequestClient::from_config(config, tokens)?;
        Ok(Self::new(client, config.dialog.clone()))
    }

    pub fn tokens(&self) -> &SessionContext {
        &self.tokens
    }

    /// Renders the initial session from whatever credential is already held.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(&mut self) {
        let session = self.tokens.session();
        self.dispatch(UiEvent::SessionRefreshed(session));
    }

    /// Feeds one event through the reducer and executes the resulting effects.
    ///
    /// Must be called within a Tokio runtime.
    pub fn dispatch(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// True while any spawned handler or timer has not reported back.
    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    /// Drains completions until no handler or timer is outstanding.
    pub async fn run_until_idle(&mut self) {
        while self.pending > 0 {
            let Some(event) = self.inbox_rx.recv().await else {
                break;
            };
            self.pending -= 1;
            self.dispatch(event);
        }
    }

    fn spawn_effect<F, Fut>(&mut self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        self.pending += 1;
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::SubmitAuth { mode, fields } => {
                let flow = self.auth.clone();
                self.spawn_effect(move || handlers::auth_submit(flow, mode, fields));
            }
            UiEffect::Logout => {
                self.auth.logout();
                let session = self.tokens.session();
                self.dispatch(UiEvent::SessionRefreshed(session));
            }
            UiEffect::FetchPreferences { subject_id } => {
                let flow = self.preferences.clone();
                self.spawn_effect(move || handlers::preferences_fetch(flow, subject_id));
            }
            UiEffect::SavePreferences { preferences } => {
                let flow = self.preferences.clone();
                self.spawn_effect(move || handlers::preferences_save(flow, preferences));
            }
            UiEffect::SubmitOrganization { draft } => {
                let flow = self.organizations.clone();
                self.spawn_effect(move || handlers::organization_submit(flow, draft));
            }
            UiEffect::Schedule { delay, event } => {
                tracing::debug!(?delay, ?event, "timer scheduled");
                self.spawn_effect(move || async move {
                    tokio::time::sleep(delay).await;
                    *event
                });
            }
        }
    }
}
