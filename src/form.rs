use time::{Date, OffsetDateTime};

use crate::{
    error::FormError,
    models::{Milestone, Priority, Project, ProjectDraft, Tasks, days_until, progress_of},
};

/// Staging area for creating a project or editing an existing one.
///
/// Nothing here touches the project list; [`ProjectForm::submit`] hands the
/// finished record to the caller.
#[derive(Debug, Clone, Default)]
pub struct ProjectForm {
    draft: ProjectDraft,
    editing: bool,
}

impl ProjectForm {
    /// A blank form for a new project.
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with `project`; submitting it keeps the project's id.
    pub fn edit(project: Project) -> Self {
        Self {
            draft: project.into(),
            editing: true,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = category.into();
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.draft.priority = priority;
    }

    /// Lowering the total below the completed count lowers the completed count too.
    pub fn set_tasks_total(&mut self, total: u32) {
        self.draft.tasks = Tasks::new(self.draft.tasks.completed, total);
    }

    pub fn set_tasks_completed(&mut self, completed: u32) {
        self.draft.tasks = Tasks::new(completed, self.draft.tasks.total);
    }

    pub fn set_days_left(&mut self, days_left: i64) {
        self.draft.days_left = days_left;
    }

    /// Set the deadline, recomputing days left against the current time.
    pub fn set_deadline(&mut self, deadline: Option<Date>) {
        self.set_deadline_at(deadline, OffsetDateTime::now_utc());
    }

    /// Set the deadline, recomputing days left against `now`. Clearing the
    /// deadline leaves the days-left count as it was.
    pub fn set_deadline_at(&mut self, deadline: Option<Date>, now: OffsetDateTime) {
        if let Some(deadline) = deadline {
            self.draft.days_left = days_until(deadline, now);
        }
        self.draft.deadline = deadline;
    }

    /// Replace the milestone in slot `index`. The slot's percent is kept
    /// whatever `milestone.percent` says.
    pub fn set_milestone(&mut self, index: usize, milestone: Milestone) -> Result<(), FormError> {
        let slot = self.milestone_mut(index)?;
        let percent = slot.percent;
        *slot = Milestone { percent, ..milestone };
        Ok(())
    }

    pub fn set_milestone_name(&mut self, index: usize, name: impl Into<String>) -> Result<(), FormError> {
        self.milestone_mut(index)?.name = name.into();
        Ok(())
    }

    pub fn set_milestone_description(
        &mut self,
        index: usize,
        description: impl Into<String>,
    ) -> Result<(), FormError> {
        self.milestone_mut(index)?.description = description.into();
        Ok(())
    }

    pub fn set_milestone_completed(&mut self, index: usize, completed: bool) -> Result<(), FormError> {
        self.milestone_mut(index)?.completed = completed;
        Ok(())
    }

    /// Progress the project would have if submitted now.
    pub fn progress_preview(&self) -> u8 {
        progress_of(&self.draft.milestones)
    }

    /// Finish the form: derive progress, assign an id if the project is new,
    /// and reset the form to the empty template.
    pub fn submit(&mut self) -> Project {
        let draft = std::mem::take(&mut self.draft);
        self.editing = false;
        draft.into_project()
    }

    /// Discard the working copy and restore the empty template.
    pub fn cancel(&mut self) {
        self.draft = ProjectDraft::template();
        self.editing = false;
    }

    fn milestone_mut(&mut self, index: usize) -> Result<&mut Milestone, FormError> {
        self.draft
            .milestones
            .get_mut(index)
            .ok_or(FormError::MilestoneIndex(index))
    }
}
