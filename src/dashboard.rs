//! Headless model behind the project grid.
//!
//! A [`Dashboard`] is one open view: it owns the in-memory project list and
//! wires every mutation to the debounced saver, which writes the list to the
//! record store and then broadcasts it to the other views. Lists received
//! from other views replace the local one without being written or
//! broadcast again.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    codec,
    config::DashboardConfig,
    core::{
        db::{ProjectDb, ProjectRepository, SettingsRepository},
        sync::{SaveHandle, Subscription, SyncHub, spawn_debounced_saver},
    },
    dialog::{SaveDialog, available_filename},
    error::CodecError,
    form::ProjectForm,
    models::{Project, Theme, new_project_id},
};

const EXPORT_BASE_NAME: &str = "projects";
const EXPORT_EXTENSION: &str = "xlsx";

/// A pending deletion, created by [`Dashboard::request_delete`] and carried
/// out only by [`Dashboard::confirm_delete`]. Dropping it cancels.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a delete request does nothing until confirmed"]
pub struct DeleteRequest {
    id: String,
}

impl DeleteRequest {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Cancelled,
}

#[derive(Debug)]
pub struct Dashboard {
    config: DashboardConfig,
    db: ProjectDb,
    projects: Vec<Project>,
    search_term: String,
    theme: Theme,
    /// Set when the saved list could not be loaded. Saving would replace the
    /// stored rows with a list that never contained them, so changes stay in
    /// memory.
    save_suspended: bool,
    subscription: Subscription,
    saver: SaveHandle,
    saver_task: JoinHandle<()>,
}

impl Dashboard {
    /// Open the store, load the saved projects and join the sync hub.
    pub async fn open(config: DashboardConfig, hub: &SyncHub) -> anyhow::Result<Self> {
        let db = ProjectDb::new(&config.db_path)
            .await
            .with_context(|| format!("Failed to open project store {:?}", config.db_path))?;

        let (projects, save_suspended) = match db.load().await {
            Ok(projects) => (projects, false),
            Err(e) => {
                warn!(error = %e, "failed to load saved projects; starting empty with saving suspended");
                (Vec::new(), true)
            }
        };
        let theme = db.get_theme().await.unwrap_or_else(|e| {
            warn!(error = %e, "failed to load theme; using system");
            Theme::default()
        });

        let subscription = hub.subscribe();
        let (saver, saver_task) =
            spawn_debounced_saver(db.clone(), Some(subscription.publisher()), config.save_debounce);

        info!(
            view = %subscription.view_id(),
            count = projects.len(),
            db = ?config.db_path,
            "dashboard opened"
        );
        Ok(Self {
            config,
            db,
            projects,
            search_term: String::new(),
            theme,
            save_suspended,
            subscription,
            saver,
            saver_task,
        })
    }

    pub fn view_id(&self) -> Uuid {
        self.subscription.view_id()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// `true` when changes are kept in memory only because the saved list
    /// could not be loaded.
    pub fn is_save_suspended(&self) -> bool {
        self.save_suspended
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Projects matching the search term on name, category or description.
    pub fn visible_projects(&self) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| p.matches(&self.search_term))
            .collect()
    }

    pub fn new_form(&self) -> ProjectForm {
        ProjectForm::new()
    }

    pub fn edit_form(&self, id: &str) -> Option<ProjectForm> {
        self.project(id).cloned().map(ProjectForm::edit)
    }

    /// Submit `form` into the list: a project with a known id is replaced
    /// wholesale, anything else is appended. The form is reset.
    pub fn commit(&mut self, form: &mut ProjectForm) -> &Project {
        let project = form.submit();
        let index = match self.projects.iter().position(|p| p.id == project.id) {
            Some(index) => {
                debug!(id = %project.id, "project replaced");
                self.projects[index] = project;
                index
            }
            None => {
                debug!(id = %project.id, "project created");
                self.projects.push(project);
                self.projects.len() - 1
            }
        };
        self.mark_changed();
        &self.projects[index]
    }

    pub fn request_delete(&self, id: impl Into<String>) -> DeleteRequest {
        DeleteRequest { id: id.into() }
    }

    /// Remove the requested project. Returns `false`, and changes nothing,
    /// if no project has that id.
    pub fn confirm_delete(&mut self, request: DeleteRequest) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != request.id);
        if self.projects.len() == before {
            debug!(id = %request.id, "delete of unknown project ignored");
            return false;
        }
        info!(id = %request.id, "project deleted");
        self.mark_changed();
        true
    }

    /// Append every project found in an `.xlsx` buffer. Ids that would clash
    /// with the list are replaced with fresh ones. On error nothing is added.
    pub fn import_bytes(&mut self, bytes: &[u8]) -> Result<usize, CodecError> {
        let imported = codec::import_projects(bytes).inspect_err(|e| {
            warn!(error = %e, "import aborted");
        })?;

        let count = imported.len();
        let mut seen: HashSet<String> = self.projects.iter().map(|p| p.id.clone()).collect();
        for mut project in imported {
            if !seen.insert(project.id.clone()) {
                let fresh = new_project_id();
                debug!(old = %project.id, new = %fresh, "imported id already in use");
                project.id = fresh.clone();
                seen.insert(fresh);
            }
            self.projects.push(project);
        }
        if count > 0 {
            self.mark_changed();
        }
        Ok(count)
    }

    pub async fn import_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read import file {:?}", path))?;
        let count = self.import_bytes(&bytes)?;
        info!(path = ?path, count, "imported spreadsheet");
        Ok(count)
    }

    pub fn export_bytes(&self) -> Result<Vec<u8>, CodecError> {
        codec::export_projects(&self.projects)
    }

    /// Export the list through `dialog`. The suggested file name never
    /// clobbers an existing file in the export directory.
    pub async fn export_to<D: SaveDialog>(&self, dialog: &D) -> anyhow::Result<ExportOutcome> {
        let bytes = self.export_bytes()?;
        let export_dir = &self.config.export_dir;
        let file_name = available_filename(export_dir, EXPORT_BASE_NAME, EXPORT_EXTENSION).await?;

        let Some(path) = dialog.pick_save_path(export_dir, &file_name).await else {
            info!("export cancelled by user");
            return Ok(ExportOutcome::Cancelled);
        };

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write export file {:?}", path))?;
        info!(path = ?path, bytes = bytes.len(), "export saved");
        Ok(ExportOutcome::Saved(path))
    }

    /// Take the newest list other views have already published, if any.
    pub fn apply_remote_updates(&mut self) -> bool {
        match self.subscription.try_recv_latest() {
            Some(projects) => {
                self.replace_from_peer(projects);
                true
            }
            None => false,
        }
    }

    /// Wait for the next list from another view and take it.
    /// Returns `false` once the hub is gone.
    pub async fn next_remote_update(&mut self) -> bool {
        match self.subscription.recv().await {
            Some(projects) => {
                self.replace_from_peer(projects);
                true
            }
            None => false,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Switch theme. The choice applies immediately even if it cannot be stored.
    pub async fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if let Err(e) = self.db.set_theme(theme).await {
            warn!(error = %e, %theme, "failed to store theme");
        }
    }

    /// Write any pending change now instead of waiting for the debounce window.
    pub async fn flush(&self) {
        self.saver.flush().await;
    }

    /// Write pending changes, leave the hub and close the store.
    pub async fn close(self) -> anyhow::Result<()> {
        let Dashboard {
            db,
            subscription,
            saver,
            saver_task,
            ..
        } = self;
        saver.flush().await;
        drop(saver);
        if let Err(e) = saver_task.await {
            warn!(error = %e, "saver task ended abnormally");
        }
        subscription.unsubscribe();
        db.close().await
    }

    fn replace_from_peer(&mut self, projects: Vec<Project>) {
        debug!(count = projects.len(), "project list replaced by another view");
        self.projects = projects;
    }

    fn mark_changed(&self) {
        if self.save_suspended {
            warn!("saving suspended; change kept in memory only");
            return;
        }
        self.saver.schedule(self.projects.clone());
    }
}
