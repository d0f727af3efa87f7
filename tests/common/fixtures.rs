use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use projex::{
    Dashboard, DashboardConfig, Priority, Project, ProjectDb, ProjectForm, ProjectRepository, SyncHub,
    dialog::SaveDialog,
};

/// Creates a ProjectDb in a temporary directory.
/// Returns both the store and the temp directory (which must be kept alive).
pub async fn create_test_store() -> (ProjectDb, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("projects.db");
    let store = ProjectDb::new(&path)
        .await
        .expect("Failed to create test store");
    (store, dir)
}

/// Path of the shared database inside a test directory.
pub fn test_db_path(dir: &Path) -> PathBuf {
    dir.join("projects.db")
}

/// Opens a dashboard on the database in `dir`, exporting into the same directory.
pub async fn open_test_dashboard(dir: &Path, hub: &SyncHub) -> Dashboard {
    Dashboard::open(DashboardConfig::new(test_db_path(dir)), hub)
        .await
        .expect("Failed to open test dashboard")
}

/// Builds a submitted project. `completed[i]` marks milestone `i` as done.
pub fn make_project(name: &str, category: &str, completed: &[bool]) -> Project {
    let mut form = make_form(name, category, completed);
    form.submit()
}

/// A filled-in form for a new project.
pub fn make_form(name: &str, category: &str, completed: &[bool]) -> ProjectForm {
    let mut form = ProjectForm::new();
    form.set_name(name);
    form.set_description(format!("{} description", name));
    form.set_category(category);
    form.set_priority(Priority::High);
    form.set_tasks_total(10);
    form.set_tasks_completed(4);
    for index in 0..5 {
        form.set_milestone_name(index, format!("Step {}", index + 1))
            .expect("milestone index in range");
        form.set_milestone_description(index, format!("Do part {}", index + 1))
            .expect("milestone index in range");
        let done = completed.get(index).copied().unwrap_or(false);
        form.set_milestone_completed(index, done)
            .expect("milestone index in range");
    }
    form
}

/// Save dialog that answers with a fixed path (or cancels) and records the
/// file names it was offered.
#[derive(Debug, Default)]
pub struct ScriptedDialog {
    target: Option<PathBuf>,
    pub suggested: Mutex<Vec<String>>,
}

impl ScriptedDialog {
    pub fn save_to(path: PathBuf) -> Self {
        Self {
            target: Some(path),
            suggested: Mutex::new(Vec::new()),
        }
    }

    pub fn cancel() -> Self {
        Self::default()
    }
}

impl SaveDialog for ScriptedDialog {
    async fn pick_save_path(&self, _directory: &Path, file_name: &str) -> Option<PathBuf> {
        self.suggested.lock().unwrap().push(file_name.to_string());
        self.target.clone()
    }
}

/// In-memory repository recording every full-list write.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepo {
    writes: Arc<Mutex<Vec<Vec<Project>>>>,
    failing: bool,
}

impl MemoryRepo {
    /// A repository whose writes always fail, like an unavailable store.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_write(&self) -> Option<Vec<Project>> {
        self.writes.lock().unwrap().last().cloned()
    }
}

impl ProjectRepository for MemoryRepo {
    async fn load(&self) -> anyhow::Result<Vec<Project>> {
        Ok(self.last_write().unwrap_or_default())
    }

    async fn save_all(&self, projects: &[Project]) -> anyhow::Result<()> {
        if self.failing {
            anyhow::bail!("storage unavailable");
        }
        self.writes.lock().unwrap().push(projects.to_vec());
        Ok(())
    }
}

/// A valid `.xlsx` package whose workbook lists no worksheets.
pub fn workbook_without_sheets() -> anyhow::Result<Vec<u8>> {
    use std::io::{Cursor, Write};

    const PARTS: [(&str, &str); 4] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets/></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
        ),
    ];

    let mut archive = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (name, body) in PARTS {
        archive.start_file(name, options)?;
        archive.write_all(body.as_bytes())?;
    }
    Ok(archive.finish()?.into_inner())
}
