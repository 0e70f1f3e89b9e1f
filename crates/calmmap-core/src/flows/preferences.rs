//! User preference synchronization.
//!
//! The server owns the authoritative preference record. The client keeps an
//! editable [`PreferenceSet`] bound to form controls: it is filled on profile
//! entry ([`PreferencesSync::fetch`]) and flushed in full on save
//! ([`PreferencesSync::save`]).

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::FlowError;
use crate::api::{Method, RequestClient, StatusCode};
use crate::session::{SessionContext, SubjectId};

/// One of the eleven boolean sensory preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preference {
    Appearance,
    Lighting,
    Smell,
    Temperature,
    Tactility,
    Signage,
    Intuitiveness,
    StaffAttitude,
    PeopleDensity,
    SelfService,
    Calmness,
}

impl Preference {
    pub const ALL: [Preference; 11] = [
        Preference::Appearance,
        Preference::Lighting,
        Preference::Smell,
        Preference::Temperature,
        Preference::Tactility,
        Preference::Signage,
        Preference::Intuitiveness,
        Preference::StaffAttitude,
        Preference::PeopleDensity,
        Preference::SelfService,
        Preference::Calmness,
    ];

    /// Wire name of the attribute.
    pub fn key(self) -> &'static str {
        match self {
            Preference::Appearance => "appearance",
            Preference::Lighting => "lighting",
            Preference::Smell => "smell",
            Preference::Temperature => "temperature",
            Preference::Tactility => "tactility",
            Preference::Signage => "signage",
            Preference::Intuitiveness => "intuitiveness",
            Preference::StaffAttitude => "staff_attitude",
            Preference::PeopleDensity => "people_density",
            Preference::SelfService => "self_service",
            Preference::Calmness => "calmness",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Preference::ALL
            .into_iter()
            .find(|p| p.key() == wanted)
            .ok_or_else(|| format!("unknown preference '{s}'"))
    }
}

/// Current value of every preference. All default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferenceSet {
    values: [bool; Preference::ALL.len()],
}

impl PreferenceSet {
    pub fn get(&self, preference: Preference) -> bool {
        self.values[preference.index()]
    }

    pub fn set(&mut self, preference: Preference, value: bool) {
        self.values[preference.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Preference, bool)> + '_ {
        Preference::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    /// Full request body: always all eleven keys.
    pub fn to_payload(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(p, value)| (p.key().to_string(), Value::Bool(value)))
            .collect();
        Value::Object(map)
    }
}

/// Values read from the server: only known keys with boolean values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemotePreferences {
    entries: Vec<(Preference, bool)>,
}

impl RemotePreferences {
    /// Extracts known boolean attributes; unknown or non-boolean fields are ignored.
    pub fn from_json(body: &Value) -> Self {
        let entries = Preference::ALL
            .into_iter()
            .filter_map(|p| body.get(p.key()).and_then(Value::as_bool).map(|v| (p, v)))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds the received values onto `set`; absent keys keep their local value.
    pub fn apply(&self, set: &mut PreferenceSet) {
        for &(preference, value) in &self.entries {
            set.set(preference, value);
        }
    }
}

/// How a successful save reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// `PATCH /user-params/{id}` succeeded
    Updated,
    /// PATCH answered 404 and the `POST /user-params` fallback succeeded
    Created,
}

#[derive(Debug, Clone)]
pub struct PreferencesSync {
    client: RequestClient,
}

impl PreferencesSync {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    fn tokens(&self) -> &SessionContext {
        self.client.tokens()
    }

    /// Reads the stored preferences for `subject_id`.
    ///
    /// Returns `None` without a request when there is no subject id or no
    /// credential, and `None` on any failure: a missing record simply leaves the
    /// local defaults in place.
    pub async fn fetch(&self, subject_id: Option<&SubjectId>) -> Option<RemotePreferences> {
        let subject_id = subject_id?;
        self.tokens().get()?;

        let path = format!("/user-params/{subject_id}");
        let response = match self.client.execute(Method::GET, &path, None).await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(error = %err, "preference fetch failed; keeping defaults");
                return None;
            }
        };

        if !response.is_success() {
            tracing::debug!(status = %response.status, "no stored preferences; keeping defaults");
            return None;
        }

        let remote = RemotePreferences::from_json(&response.json());
        tracing::debug!(bound = remote.len(), "preferences fetched");
        Some(remote)
    }

    /// Writes all eleven preferences for the signed-in user.
    ///
    /// Sends `PATCH /user-params/{id}`; if that answers 404, retries exactly once
    /// with `POST /user-params` and the same payload.
    ///
    /// # Errors
    /// Returns a validation error if there is no credential or it carries no
    /// subject id, and a request error (body excerpt as message) otherwise.
    pub async fn save(&self, preferences: &PreferenceSet) -> Result<SaveOutcome, FlowError> {
        let Some(token) = self.tokens().get() else {
            return Err(FlowError::validation("No credential: sign in first"));
        };
        let Some(subject_id) =
            crate::session::decode(&token).and_then(|session| session.subject_id)
        else {
            return Err(FlowError::validation("No user id in credential"));
        };

        let payload = preferences.to_payload();
        let path = format!("/user-params/{subject_id}");

        let mut outcome = SaveOutcome::Updated;
        let mut response = self
            .client
            .execute(Method::PATCH, &path, Some(&payload))
            .await?;

        if response.status == StatusCode::NOT_FOUND {
            tracing::info!(%subject_id, "preference record missing; creating it");
            outcome = SaveOutcome::Created;
            response = self
                .client
                .execute(Method::POST, "/user-params", Some(&payload))
                .await?;
        }

        if !response.is_success() {
            let excerpt = response.excerpt();
            let message = if excerpt.trim().is_empty() {
                format!("Failed to save preferences (HTTP {})", response.status.as_u16())
            } else {
                excerpt
            };
            return Err(FlowError::request(message));
        }

        tracing::info!(%subject_id, ?outcome, "preferences saved");
        Ok(outcome)
    }
}
