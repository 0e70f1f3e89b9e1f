//! Presentation model for calmmap.
//!
//! Framework-agnostic: dialogs and app state are plain data, user input arrives
//! as [`UiEvent`]s, [`update`] mutates state and returns [`UiEffect`]s, and the
//! [`Runtime`] executes those effects against the API flows.

pub mod dialog;
pub mod effects;
pub mod events;
pub mod runtime;
pub mod state;
pub mod update;

pub use dialog::{AuthDialog, AuthView, DialogKind, OrgDialog, OrgForm, SubmitControl};
pub use effects::UiEffect;
pub use events::UiEvent;
pub use runtime::Runtime;
pub use state::{AppState, ProfileView, SaveStatus};
pub use update::update;
