//! Organization creation with optional file attachments.
//!
//! The workflow is create-then-attach: `POST /organization`, then one upload per
//! selected file, map before picture. The first failed upload stops the
//! remaining ones. An organization that was created stays created; the outcome
//! reports which attachments made it.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::FlowError;
use crate::api::{Method, RequestClient, UploadFile};

/// Multipart field name the upload endpoints read.
pub const UPLOAD_FIELD: &str = "file";

/// Extensions the upload endpoints accept.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

/// Label prefix the map module shows while nothing is selected.
pub const ADDRESS_PLACEHOLDER_PREFIX: &str = "Select";

/// Address and coordinates chosen in the map-selection module.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressSelection {
    pub label: String,
    /// `(longitude, latitude)` of the selected marker
    pub coordinates: Option<(f64, f64)>,
    /// Set when reverse geocoding failed for the selection.
    pub error: bool,
}

impl AddressSelection {
    pub fn new(label: impl Into<String>, coordinates: Option<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            coordinates,
            error: false,
        }
    }

    /// The initial state before anything was picked on the map.
    pub fn placeholder() -> Self {
        Self::new(format!("{ADDRESS_PLACEHOLDER_PREFIX} a point on the map"), None)
    }

    /// A selection whose address lookup failed.
    pub fn failed(label: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::new(label, None)
        }
    }

    /// True when the selection may seed an organization draft.
    pub fn is_usable(&self) -> bool {
        let label = self.label.trim();
        !self.error && !label.is_empty() && !label.starts_with(ADDRESS_PLACEHOLDER_PREFIX)
    }
}

impl Default for AddressSelection {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Organization category. The value set is owned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrganizationType(String);

impl OrganizationType {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrganizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Self::new(s);
        if value.0.is_empty() {
            return Err("organization type must not be empty".to_string());
        }
        Ok(value)
    }
}

impl fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-assigned organization identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrganizationId(String);

impl OrganizationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads the `id` field of a create response (number or non-empty string).
    fn from_response(body: &Value) -> Option<Self> {
        match body.get("id")? {
            Value::Number(n) => Some(Self(n.to_string())),
            Value::String(s) if !s.trim().is_empty() => Some(Self(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file slot on the organization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Map,
    Picture,
}

impl Attachment {
    fn segment(self) -> &'static str {
        match self {
            Attachment::Map => "map",
            Attachment::Picture => "picture",
        }
    }

    pub fn upload_path(self, id: &OrganizationId) -> String {
        format!("/organization/{id}/{}/upload", self.segment())
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Everything the organization form collected.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrganizationDraft {
    pub address: String,
    pub organization_type: OrganizationType,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub map_file: Option<UploadFile>,
    pub picture_file: Option<UploadFile>,
}

impl OrganizationDraft {
    pub fn new(address: impl Into<String>, organization_type: OrganizationType) -> Self {
        Self {
            address: address.into(),
            organization_type,
            ..Self::default()
        }
    }

    /// Selected files in upload order.
    pub fn attachments(&self) -> impl Iterator<Item = (Attachment, &UploadFile)> {
        [
            (Attachment::Map, self.map_file.as_ref()),
            (Attachment::Picture, self.picture_file.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, file)| file.map(|f| (slot, f)))
    }

    /// Create request body. Coordinates are included only when finite.
    fn payload(&self) -> Value {
        let mut map = Map::new();
        map.insert("address".into(), Value::String(self.address.trim().to_string()));
        map.insert(
            "organization_type".into(),
            Value::String(self.organization_type.as_str().to_string()),
        );
        for (key, value) in [("latitude", self.latitude), ("longitude", self.longitude)] {
            if let Some(v) = value.filter(|v| v.is_finite())
                && let Some(number) = serde_json::Number::from_f64(v)
            {
                map.insert(key.into(), Value::Number(number));
            }
        }
        Value::Object(map)
    }

    fn validate_attachments(&self) -> Result<(), FlowError> {
        for (slot, file) in self.attachments() {
            let ext = file.extension().unwrap_or_default();
            if !ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                return Err(FlowError::validation(format!(
                    "Unsupported {slot} file '{}': use {}",
                    file.file_name,
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Terminal state of a submit that got past organization creation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationOutcome {
    pub id: OrganizationId,
    /// Attachments uploaded successfully, in order.
    pub attached: Vec<Attachment>,
    /// The upload that failed, if any. Later uploads were not attempted.
    pub failed: Option<(Attachment, FlowError)>,
}

impl OrganizationOutcome {
    /// True when the organization and every selected file made it.
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct OrganizationFlow {
    client: RequestClient,
}

impl OrganizationFlow {
    pub fn new(client: RequestClient) -> Self {
        Self { client }
    }

    /// Creates the organization, then uploads its files.
    ///
    /// # Errors
    /// Returns a validation error (no request issued) when signed out, when the
    /// address or type is blank, or when a file has an unsupported extension;
    /// a request error when creation fails. Upload failures are reported in
    /// [`OrganizationOutcome::failed`] instead, since the organization exists.
    pub async fn submit(&self, draft: &OrganizationDraft) -> Result<OrganizationOutcome, FlowError> {
        if self.client.tokens().get().is_none() {
            return Err(FlowError::validation("Authorization required"));
        }
        if draft.address.trim().is_empty() {
            return Err(FlowError::validation("Address is empty"));
        }
        if draft.organization_type.as_str().is_empty() {
            return Err(FlowError::validation("Choose an organization type"));
        }
        draft.validate_attachments()?;

        let created = self
            .client
            .send(Method::POST, "/organization", Some(&draft.payload()))
            .await?;
        let id = OrganizationId::from_response(&created).ok_or_else(|| {
            FlowError::request("Organization created but the response carried no id")
        })?;
        tracing::info!(%id, "organization created");

        let mut attached = Vec::new();
        for (slot, file) in draft.attachments() {
            let path = slot.upload_path(&id);
            if let Err(err) = self.client.upload(&path, file, UPLOAD_FIELD).await {
                tracing::warn!(
                    %id,
                    %slot,
                    kind = %err.kind,
                    status = ?err.status,
                    error = %err,
                    "upload failed; skipping remaining files"
                );
                return Ok(OrganizationOutcome {
                    id,
                    attached,
                    failed: Some((slot, err.into())),
                });
            }
            attached.push(slot);
        }

        Ok(OrganizationOutcome {
            id,
            attached,
            failed: None,
        })
    }
}
