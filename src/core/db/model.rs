use std::collections::HashMap;

use anyhow::Context;
use time::Date;

use crate::models::{DATE_FORMAT, MILESTONE_COUNT, Milestone, Project, ProjectDraft, Tasks, milestone_template};

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tasks_completed: i64,
    pub tasks_total: i64,
    pub days_left: i64,
    pub priority: String,
    pub category: String,
    pub deadline: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MilestoneRow {
    pub project_id: String,
    pub position: i64,
    pub percent: i64,
    pub name: String,
    pub description: String,
    pub completed: bool,
}

impl ProjectRow {
    /// Rebuild the project from its row and its milestone rows. Slots without a
    /// row stay empty; progress is derived again from what was stored.
    pub fn into_project(self, milestone_rows: Vec<MilestoneRow>) -> anyhow::Result<Project> {
        let mut milestones = milestone_template();
        for row in milestone_rows {
            let position = usize::try_from(row.position)
                .ok()
                .filter(|p| *p < MILESTONE_COUNT)
                .ok_or_else(|| anyhow::anyhow!("Invalid milestone position: {}", row.position))?;
            milestones[position] = Milestone {
                percent: u8::try_from(row.percent)?,
                name: row.name,
                description: row.description,
                completed: row.completed,
            };
        }

        let deadline = self
            .deadline
            .map(|value| {
                Date::parse(&value, DATE_FORMAT)
                    .with_context(|| format!("Invalid stored deadline {:?}", value))
            })
            .transpose()?;

        let draft = ProjectDraft {
            id: Some(self.id),
            name: self.name,
            description: self.description,
            tasks: Tasks::new(
                u32::try_from(self.tasks_completed)?,
                u32::try_from(self.tasks_total)?,
            ),
            days_left: self.days_left,
            priority: self.priority.parse()?,
            category: self.category,
            deadline,
            milestones,
        };
        Ok(draft.into_project())
    }
}

/// Group milestone rows by the project they belong to.
pub(super) fn group_milestones(rows: Vec<MilestoneRow>) -> HashMap<String, Vec<MilestoneRow>> {
    let mut map: HashMap<String, Vec<MilestoneRow>> = HashMap::new();
    for row in rows {
        map.entry(row.project_id.clone()).or_default().push(row);
    }
    map
}

/// Keep only the last occurrence of each id, in the order those occurrences appear.
pub(super) fn last_per_id(projects: &[Project]) -> Vec<&Project> {
    let last_index: HashMap<&str, usize> = projects
        .iter()
        .enumerate()
        .map(|(index, project)| (project.id.as_str(), index))
        .collect();
    projects
        .iter()
        .enumerate()
        .filter(|(index, project)| last_index.get(project.id.as_str()) == Some(index))
        .map(|(_, project)| project)
        .collect()
}
