//! Modal dialogs.
//!
//! Each dialog owns its visibility, bound form values, and inline error text.
//! Transitions are methods on the dialog; the reducer decides when to call them.
//!
//! - `auth.rs`: login / register / profile dialog
//! - `organization.rs`: organization creation dialog

pub mod auth;
pub mod organization;

pub use auth::{AuthDialog, AuthView};
pub use organization::{OrgDialog, OrgForm, SubmitControl};

/// Identifies a dialog for the shared close triggers (overlay click, close control).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Auth,
    Organization,
}
