pub mod codec;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod dialog;
pub mod error;
pub mod form;
pub mod models;

pub use config::{AppInfo, DashboardConfig, app_info};
pub use crate::core::db::{ProjectDb, ProjectRepository, SettingsRepository};
pub use crate::core::sync::{ListenerHandle, Publisher, Subscription, SyncHub, SyncMessage};
pub use dashboard::{Dashboard, DeleteRequest, ExportOutcome};
pub use error::{CodecError, FormError};
pub use form::ProjectForm;
pub use models::{Appearance, Milestone, Priority, Project, ProjectDraft, Tasks, Theme};

#[cfg(feature = "dialog")]
pub use dialog::RfdSaveDialog;
