#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from projex for tests
pub use projex::{
    Dashboard, DashboardConfig, Milestone, Priority, Project, ProjectDb, ProjectForm,
    ProjectRepository, SettingsRepository, SyncHub, Theme,
};
