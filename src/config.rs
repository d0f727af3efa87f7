use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::sync::{DEFAULT_CHANNEL_CAPACITY, SyncHub};

/// Quiet period after the last change before the list is written to disk.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// SQLite file holding the projects and settings.
    pub db_path: PathBuf,
    /// Directory offered by the export dialog.
    pub export_dir: PathBuf,
    pub save_debounce: Duration,
    pub sync_capacity: usize,
}

impl DashboardConfig {
    /// Defaults for everything but the database path; exports go next to the database.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        let db_path = db_path.as_ref().to_path_buf();
        let export_dir = db_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            db_path,
            export_dir,
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            sync_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn with_export_dir<P: AsRef<Path>>(mut self, export_dir: P) -> Self {
        self.export_dir = export_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_save_debounce(mut self, save_debounce: Duration) -> Self {
        self.save_debounce = save_debounce;
        self
    }

    pub fn with_sync_capacity(mut self, sync_capacity: usize) -> Self {
        self.sync_capacity = sync_capacity;
        self
    }

    /// A hub sized for this configuration, to be shared by every view.
    pub fn new_hub(&self) -> SyncHub {
        SyncHub::new(self.sync_capacity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
}

/// Name and version shown on the settings "About" page.
pub fn app_info() -> AppInfo {
    AppInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }
}
