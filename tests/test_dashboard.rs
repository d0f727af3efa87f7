//! Integration tests for the dashboard view model.
//!
//! Tests cover:
//! - Creating, editing and deleting projects through forms
//! - Search filtering
//! - Import with id collisions and export through a save dialog
//! - Sync between two views sharing one database
//! - Theme persistence
//! - Failed imports and unreadable stores leaving data untouched

mod common;

use std::time::Duration;

use projex::{CodecError, ExportOutcome, app_info};

use common::*;

#[tokio::test]
async fn test_commit_creates_then_replaces() -> anyhow::Result<()> {
    // 1. Open a dashboard on an empty store
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    assert!(dashboard.projects().is_empty());

    // 2. Create a project
    let mut form = make_form("Website", "Marketing", &[true]);
    let id = dashboard.commit(&mut form).id.clone();
    assert_eq!(dashboard.projects().len(), 1);
    assert!(!form.is_editing());

    // 3. Edit it through a form
    let mut form = dashboard.edit_form(&id).expect("project should exist");
    form.set_name("Website relaunch");
    form.set_milestone_completed(1, true)?;
    let edited = dashboard.commit(&mut form);
    assert_eq!(edited.id, id);
    assert_eq!(edited.progress(), 40);

    // 4. Still one project, now changed
    assert_eq!(dashboard.projects().len(), 1);
    assert_eq!(dashboard.project(&id).map(|p| p.name.as_str()), Some("Website relaunch"));
    assert!(dashboard.edit_form("no-such-id").is_none());

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_delete_needs_confirmation_and_known_id() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    let id = dashboard.commit(&mut make_form("Doomed", "A", &[])).id.clone();
    dashboard.commit(&mut make_form("Kept", "A", &[]));

    // 1. A request alone removes nothing
    let request = dashboard.request_delete(id.clone());
    assert_eq!(request.id(), id);
    assert_eq!(dashboard.projects().len(), 2);

    // 2. Confirming removes exactly that project
    assert!(dashboard.confirm_delete(request));
    assert_eq!(dashboard.projects().len(), 1);
    assert!(dashboard.project(&id).is_none());

    // 3. Unknown ids are ignored
    let request = dashboard.request_delete("no-such-id");
    assert!(!dashboard.confirm_delete(request));
    assert_eq!(dashboard.projects().len(), 1);

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_search_filters_visible_projects() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    dashboard.commit(&mut make_form("Website", "Marketing", &[]));
    dashboard.commit(&mut make_form("Backend", "Engineering", &[]));
    dashboard.commit(&mut make_form("Hiring", "People", &[]));

    // Empty term shows everything
    assert_eq!(dashboard.visible_projects().len(), 3);

    // Matches category, case-insensitively
    dashboard.set_search_term("ENGINEER");
    let names: Vec<&str> = dashboard.visible_projects().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Backend"]);

    // Matches description ("<name> description")
    dashboard.set_search_term("hiring desc");
    assert_eq!(dashboard.visible_projects().len(), 1);

    dashboard.set_search_term("nothing like this");
    assert!(dashboard.visible_projects().is_empty());
    assert_eq!(dashboard.projects().len(), 3, "search never changes the list");

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_importing_same_file_twice_gives_distinct_ids() -> anyhow::Result<()> {
    // 1. Export two projects
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    dashboard.commit(&mut make_form("One", "A", &[true]));
    dashboard.commit(&mut make_form("Two", "B", &[]));
    let bytes = dashboard.export_bytes()?;
    let file = temp_dir.path().join("incoming.xlsx");
    tokio::fs::write(&file, &bytes).await?;

    // 2. Import the same sheet twice
    assert_eq!(dashboard.import_file(&file).await?, 2);
    assert_eq!(dashboard.import_bytes(&bytes)?, 2);

    // 3. Six projects, all with unique ids
    let projects = dashboard.projects();
    assert_eq!(projects.len(), 6);
    let mut ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert_eq!(projects[2].name, "One");
    assert_eq!(projects[2].progress(), 20);

    // 4. A broken file changes nothing
    assert!(dashboard.import_bytes(b"garbage").is_err());
    assert_eq!(dashboard.projects().len(), 6);

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_import_without_worksheet_changes_nothing() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    dashboard.commit(&mut make_form("Existing", "A", &[]));
    let before = dashboard.projects().to_vec();

    let result = dashboard.import_bytes(&workbook_without_sheets()?);
    assert!(matches!(result, Err(CodecError::MissingWorksheet)));
    assert_eq!(dashboard.projects(), before.as_slice());

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_unreadable_store_is_never_overwritten() -> anyhow::Result<()> {
    // 1. Save one project, then corrupt its stored deadline
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = test_db_path(temp_dir.path());
    let store = ProjectDb::new(&db_path).await?;
    store.save_all(&[make_project("Precious", "A", &[true])]).await?;
    store.close().await?;
    let pool = sqlx::SqlitePool::connect(&format!("sqlite://{}", db_path.display())).await?;
    sqlx::query("UPDATE project SET deadline = 'someday'")
        .execute(&pool)
        .await?;

    // 2. The dashboard opens empty with saving suspended
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    assert!(dashboard.projects().is_empty());
    assert!(dashboard.is_save_suspended());

    // 3. Edits stay in memory; the stored row survives
    dashboard.commit(&mut make_form("Scratch", "A", &[]));
    dashboard.flush().await;
    assert_eq!(dashboard.projects().len(), 1);
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project WHERE name = 'Precious'")
        .fetch_one(&pool)
        .await?;
    assert_eq!(stored, 1);

    dashboard.close().await?;
    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn test_export_through_dialog() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    dashboard.commit(&mut make_form("Exported", "A", &[true, true]));

    // 1. Cancelling writes nothing
    let dialog = ScriptedDialog::cancel();
    assert_eq!(dashboard.export_to(&dialog).await?, ExportOutcome::Cancelled);
    assert!(!temp_dir.path().join("projects.xlsx").exists());
    assert_eq!(*dialog.suggested.lock().unwrap(), vec!["projects.xlsx".to_string()]);

    // 2. Saving writes the workbook where the dialog said
    let target = temp_dir.path().join("projects.xlsx");
    let dialog = ScriptedDialog::save_to(target.clone());
    assert_eq!(
        dashboard.export_to(&dialog).await?,
        ExportOutcome::Saved(target.clone())
    );
    let written = tokio::fs::read(&target).await?;
    let imported = projex::codec::import_projects(&written)?;
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].name, "Exported");

    // 3. The next suggestion avoids the existing file
    let dialog = ScriptedDialog::cancel();
    dashboard.export_to(&dialog).await?;
    assert_eq!(*dialog.suggested.lock().unwrap(), vec!["projects(1).xlsx".to_string()]);

    dashboard.close().await?;
    Ok(())
}

#[tokio::test]
async fn test_two_views_stay_in_sync() -> anyhow::Result<()> {
    // 1. Two dashboards on one database and one hub
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let mut first = open_test_dashboard(temp_dir.path(), &hub).await;
    let mut second = open_test_dashboard(temp_dir.path(), &hub).await;
    assert!(!first.is_save_suspended());
    assert_ne!(first.view_id(), second.view_id());
    assert!(!second.apply_remote_updates());

    // 2. First view creates a project and writes it out
    first.commit(&mut make_form("Shared", "Ops", &[true, true, true]));
    first.flush().await;

    // 3. Second view receives the full list
    let updated = tokio::time::timeout(Duration::from_secs(5), second.next_remote_update()).await?;
    assert!(updated);
    assert_eq!(second.projects(), first.projects());

    // 4. The first view does not hear its own broadcast
    assert!(!first.apply_remote_updates());

    // 5. Second view deletes it; first view follows
    let id = second.projects()[0].id.clone();
    let request = second.request_delete(id);
    assert!(second.confirm_delete(request));
    second.flush().await;
    assert!(first.apply_remote_updates());
    assert!(first.projects().is_empty());

    first.close().await?;
    second.close().await?;

    // 6. A fresh view loads the last saved list
    let third = open_test_dashboard(temp_dir.path(), &hub).await;
    assert!(third.projects().is_empty());
    third.close().await?;

    Ok(())
}

#[tokio::test]
async fn test_changes_persist_after_close() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();

    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    dashboard.commit(&mut make_form("Durable", "A", &[true]));
    let saved = dashboard.projects().to_vec();
    // Closing inside the debounce window still writes the change
    dashboard.close().await?;

    let reopened = open_test_dashboard(temp_dir.path(), &hub).await;
    assert_eq!(reopened.projects(), saved.as_slice());
    reopened.close().await?;

    Ok(())
}

#[tokio::test]
async fn test_theme_is_persisted() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();

    let mut dashboard = open_test_dashboard(temp_dir.path(), &hub).await;
    assert_eq!(dashboard.theme(), Theme::System);
    dashboard.set_theme(Theme::Dark).await;
    assert_eq!(dashboard.theme(), Theme::Dark);
    dashboard.close().await?;

    let reopened = open_test_dashboard(temp_dir.path(), &hub).await;
    assert_eq!(reopened.theme(), Theme::Dark);
    reopened.close().await?;

    Ok(())
}

#[tokio::test]
async fn test_open_fails_without_parent_directory() -> anyhow::Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let hub = SyncHub::default();
    let config = DashboardConfig::new(temp_dir.path().join("missing").join("projects.db"));

    assert!(Dashboard::open(config, &hub).await.is_err());
    assert_eq!(hub.subscriber_count(), 0);

    Ok(())
}

#[test]
fn test_theme_resolution_and_app_info() {
    use projex::Appearance;

    assert_eq!(Theme::System.appearance(true), Appearance::Dark);
    assert_eq!(Theme::System.appearance(false), Appearance::Light);
    assert_eq!(Theme::Light.appearance(true), Appearance::Light);
    assert_eq!("dark".parse::<Theme>().ok(), Some(Theme::Dark));

    let info = app_info();
    assert_eq!(info.name, "projex");
    assert!(!info.version.is_empty());
}
