mod model;
mod project;
mod settings;
mod state;

use std::{path::Path, sync::Arc};

use sqlx::Connection;
use tracing::debug;

use model::{MilestoneRow, ProjectRow, group_milestones, last_per_id};
use state::StoreState;

use crate::models::{DATE_FORMAT, Project, Theme};

pub use project::ProjectRepository;
pub use settings::SettingsRepository;

/// SQLite-backed record store holding the project list and UI settings.
///
/// Cloning is cheap and every clone talks to the same pool.
#[derive(Debug, Clone)]
pub struct ProjectDb {
    state: Arc<StoreState>,
}

impl ProjectDb {
    /// Open (creating if missing) the database at `db_file` and run migrations.
    pub async fn new<P: AsRef<Path>>(db_file: P) -> anyhow::Result<Self> {
        Ok(Self {
            state: Arc::new(StoreState::new(db_file).await?),
        })
    }

    pub fn db_file(&self) -> &Path {
        self.state.db_file()
    }

    /// Close the underlying pool. Every later operation on this store, or on
    /// any clone of it, fails.
    pub async fn close(&self) -> anyhow::Result<()> {
        self.state.close().await
    }
}

impl ProjectRepository for ProjectDb {
    async fn load(&self) -> anyhow::Result<Vec<Project>> {
        let mut conn = self.state.conn().await?;
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"SELECT id, name, description, tasks_completed, tasks_total,
                days_left, priority, category, deadline
            FROM project
            ORDER BY position ASC"#,
        )
        .fetch_all(&mut **conn)
        .await?;
        let milestone_rows: Vec<MilestoneRow> = sqlx::query_as(
            r#"SELECT project_id, position, percent, name, description, completed
            FROM milestone
            ORDER BY project_id ASC, position ASC"#,
        )
        .fetch_all(&mut **conn)
        .await?;

        let mut milestones = group_milestones(milestone_rows);
        let projects = rows
            .into_iter()
            .map(|row| {
                let rows = milestones.remove(&row.id).unwrap_or_default();
                row.into_project(rows)
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        debug!(count = projects.len(), "loaded projects");
        Ok(projects)
    }

    async fn save_all(&self, projects: &[Project]) -> anyhow::Result<()> {
        let mut conn = self.state.conn().await?;
        let mut tx = conn.begin().await?;
        sqlx::query(r#"DELETE FROM milestone"#)
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM project"#)
            .execute(&mut *tx)
            .await?;

        let projects = last_per_id(projects);
        for (position, project) in projects.iter().enumerate() {
            let deadline = project
                .deadline
                .map(|deadline| deadline.format(DATE_FORMAT))
                .transpose()?;
            sqlx::query(
                r#"INSERT INTO project
                (id, position, name, description, progress, tasks_completed, tasks_total,
                 days_left, priority, category, deadline)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#,
            )
            .bind(&project.id)
            .bind(position as i64)
            .bind(&project.name)
            .bind(&project.description)
            .bind(i64::from(project.progress()))
            .bind(i64::from(project.tasks.completed))
            .bind(i64::from(project.tasks.total))
            .bind(project.days_left)
            .bind(project.priority.as_str())
            .bind(&project.category)
            .bind(deadline)
            .execute(&mut *tx)
            .await?;

            for (slot, milestone) in project.milestones().iter().enumerate() {
                sqlx::query(
                    r#"INSERT INTO milestone
                    (project_id, position, percent, name, description, completed)
                    VALUES ($1, $2, $3, $4, $5, $6)"#,
                )
                .bind(&project.id)
                .bind(slot as i64)
                .bind(i64::from(milestone.percent))
                .bind(&milestone.name)
                .bind(&milestone.description)
                .bind(milestone.completed)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        debug!(count = projects.len(), "saved projects");
        Ok(())
    }
}

impl SettingsRepository for ProjectDb {
    async fn get_theme(&self) -> anyhow::Result<Theme> {
        let mut conn = self.state.conn().await?;
        let value: Option<String> =
            sqlx::query_scalar(r#"SELECT value FROM settings WHERE key = $1"#)
                .bind(settings::THEME_KEY)
                .fetch_optional(&mut **conn)
                .await?;
        match value {
            Some(value) => value.parse(),
            None => Ok(Theme::default()),
        }
    }

    async fn set_theme(&self, theme: Theme) -> anyhow::Result<()> {
        let mut conn = self.state.conn().await?;
        sqlx::query(
            r#"INSERT INTO settings (key, value) VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value"#,
        )
        .bind(settings::THEME_KEY)
        .bind(theme.as_str())
        .execute(&mut **conn)
        .await?;
        Ok(())
    }
}
