//! Login and registration.

use serde_json::{Value, json};

use super::FlowError;
use crate::api::{Method, RequestClient};
use crate::session::{Session, SessionContext};

/// Role sent on registration when none was chosen.
pub const DEFAULT_ROLE: &str = "user";

/// Which form the auth dialog is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    fn endpoint(self) -> &'static str {
        match self {
            AuthMode::Login => "/login",
            AuthMode::Register => "/register",
        }
    }
}

/// Values bound to the auth form controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthFields {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl AuthFields {
    /// Builds the request body for `mode`, or the first validation failure.
    fn payload(&self, mode: AuthMode) -> Result<Value, FlowError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(FlowError::validation("Enter email and password"));
        }

        match mode {
            AuthMode::Login => Ok(json!({
                "email": email,
                "password": self.password,
            })),
            AuthMode::Register => {
                let name = self.name.trim();
                if name.is_empty() {
                    return Err(FlowError::validation("Enter your name"));
                }
                let role = match self.role.trim() {
                    "" => DEFAULT_ROLE,
                    role => role,
                };
                Ok(json!({
                    "name": name,
                    "email": email,
                    "password": self.password,
                    "role": role,
                }))
            }
        }
    }
}

/// Submits credentials and keeps the [`SessionContext`] in sync.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    client: RequestClient,
}

impl AuthFlow {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    fn tokens(&self) -> &SessionContext {
        self.client.tokens()
    }

    /// Validates `fields`, posts them, and stores the returned credential.
    ///
    /// Returns the session decoded from whatever credential is held afterwards.
    /// A 2xx response without a `token` is accepted and leaves the store untouched.
    ///
    /// # Errors
    /// Returns a validation error (no request issued) or the request failure.
    pub async fn submit(
        &self,
        mode: AuthMode,
        fields: &AuthFields,
    ) -> Result<Option<Session>, FlowError> {
        let payload = fields.payload(mode)?;
        let response = self
            .client
            .send(Method::POST, mode.endpoint(), Some(&payload))
            .await?;

        match response.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => self.tokens().set(token),
            _ => tracing::info!(?mode, "auth response carried no token"),
        }

        let session = self.tokens().session();
        tracing::info!(
            ?mode,
            signed_in = session.is_some(),
            "auth submit completed"
        );
        Ok(session)
    }

    /// Drops the credential. Does not contact the server.
    pub fn logout(&self) {
        self.tokens().clear();
        tracing::info!("logged out");
    }
}
