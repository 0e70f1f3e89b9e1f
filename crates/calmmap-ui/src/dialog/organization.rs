//! Organization dialog state.

use calmmap_core::api::UploadFile;
use calmmap_core::flows::{AddressSelection, OrganizationDraft, OrganizationType};

/// Inline message shown when the dialog refuses to open.
pub const SELECT_ADDRESS_FIRST: &str = "Select a valid address on the map first.";

/// Label/enablement of the submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitControl {
    #[default]
    Ready,
    Busy,
    Done,
}

impl SubmitControl {
    pub fn label(self) -> &'static str {
        match self {
            SubmitControl::Ready => "Create",
            SubmitControl::Busy => "Creating...",
            SubmitControl::Done => "Done",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == SubmitControl::Ready
    }
}

/// Values bound to the organization form controls.
///
/// Coordinates are kept as text, the way the inputs hold them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgForm {
    pub address: String,
    pub organization_type: String,
    pub latitude: String,
    pub longitude: String,
    pub map_file: Option<UploadFile>,
    pub picture_file: Option<UploadFile>,
}

impl OrgForm {
    fn prefilled(selection: &AddressSelection) -> Self {
        let mut form = Self {
            address: selection.label.trim().to_string(),
            ..Self::default()
        };
        if let Some((lon, lat)) = selection.coordinates {
            form.longitude = format!("{lon:.6}");
            form.latitude = format!("{lat:.6}");
        }
        form
    }

    /// Snapshot handed to the organization flow.
    pub fn draft(&self) -> OrganizationDraft {
        let parse = |text: &str| text.trim().parse::<f64>().ok();
        OrganizationDraft {
            address: self.address.trim().to_string(),
            organization_type: OrganizationType::new(self.organization_type.as_str()),
            latitude: parse(&self.latitude),
            longitude: parse(&self.longitude),
            map_file: self.map_file.clone(),
            picture_file: self.picture_file.clone(),
        }
    }
}

/// State for the organization dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgDialog {
    pub open: bool,
    pub form: OrgForm,
    /// Inline error text.
    pub error: Option<String>,
    /// Transient confirmation text.
    pub notice: Option<String>,
    pub submit: SubmitControl,
    /// Incremented on every successful open; stale close timers compare against it.
    generation: u64,
    /// Generation of the opening the in-flight submit was started from.
    submit_generation: Option<u64>,
}

impl OrgDialog {
    /// Opens the dialog seeded from `selection`, or refuses with an inline error.
    ///
    /// Returns whether the dialog opened. A successful open starts a fresh draft.
    pub fn request_open(&mut self, selection: &AddressSelection) -> bool {
        if !selection.is_usable() {
            self.error = Some(SELECT_ADDRESS_FIRST.to_string());
            tracing::debug!(label = %selection.label, "organization dialog refused");
            return false;
        }
        self.form = OrgForm::prefilled(selection);
        self.error = None;
        self.notice = None;
        self.open = true;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marks the submit control busy and returns the draft to send.
    ///
    /// Returns `None` while the control is not enabled.
    pub fn begin_submit(&mut self) -> Option<OrganizationDraft> {
        if !self.submit.is_enabled() {
            return None;
        }
        self.submit = SubmitControl::Busy;
        self.error = None;
        self.notice = None;
        self.submit_generation = Some(self.generation);
        Some(self.form.draft())
    }

    /// Clears the in-flight submit and returns the generation it started in.
    pub fn finish_submit(&mut self) -> Option<u64> {
        self.submit_generation.take()
    }
}
