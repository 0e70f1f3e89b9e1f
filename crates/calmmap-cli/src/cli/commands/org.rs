//! Organization command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use calmmap_core::api::UploadFile;
use calmmap_core::flows::AddressSelection;
use calmmap_ui::events::{OrgFieldEdit, OrgFileSlot};
use calmmap_ui::{Runtime, UiEvent};

/// Arguments of `org create`.
pub struct CreateRequest {
    pub address: String,
    pub organization_type: String,
    /// `(longitude, latitude)`
    pub coordinates: Option<(f64, f64)>,
    pub map: Option<PathBuf>,
    pub picture: Option<PathBuf>,
}

pub async fn create(mut runtime: Runtime, request: CreateRequest) -> Result<()> {
    let map = read_optional(request.map.as_deref()).await?;
    let picture = read_optional(request.picture.as_deref()).await?;

    runtime.dispatch(UiEvent::AddressSelected(AddressSelection::new(
        request.address,
        request.coordinates,
    )));
    runtime.dispatch(UiEvent::OrgButtonClicked);
    if !runtime.state.org_dialog.open {
        let error = runtime.state.org_dialog.error.clone().unwrap_or_default();
        bail!("{error}");
    }

    for edit in [
        OrgFieldEdit::OrganizationType(request.organization_type),
        OrgFieldEdit::File(OrgFileSlot::Map, map),
        OrgFieldEdit::File(OrgFileSlot::Picture, picture),
    ] {
        runtime.dispatch(UiEvent::OrgFieldEdited(edit));
    }
    runtime.dispatch(UiEvent::OrgSubmitted);
    runtime.run_until_idle().await;

    let dialog = &runtime.state.org_dialog;
    if let Some(notice) = &dialog.notice {
        println!("{notice}");
    }
    if let Some(error) = &dialog.error {
        bail!("{error}");
    }
    Ok(())
}

async fn read_optional(path: Option<&Path>) -> Result<Option<UploadFile>> {
    match path {
        Some(path) => Ok(Some(UploadFile::read(path).await?)),
        None => Ok(None),
    }
}
