use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

/// Every project carries exactly this many milestones.
pub const MILESTONE_COUNT: usize = 5;

/// Percent bucket of each milestone slot, in slot order.
pub const MILESTONE_PERCENTS: [u8; MILESTONE_COUNT] = [20, 40, 60, 80, 100];

/// Progress contributed by one completed milestone.
pub const PROGRESS_PER_MILESTONE: u8 = 20;

/// `YYYY-MM-DD`, used for deadlines everywhere they are written as text.
pub const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(deadline_format, Date, "[year]-[month]-[day]");

const MILLIS_PER_DAY: i128 = 86_400_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(anyhow::anyhow!("Invalid priority value: {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tasks {
    pub completed: u32,
    pub total: u32,
}

impl Tasks {
    /// Builds a task count, clamping `completed` to `total`.
    pub fn new(completed: u32, total: u32) -> Self {
        Self {
            completed: completed.min(total),
            total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub percent: u8,
    pub name: String,
    pub description: String,
    pub completed: bool,
}

impl Milestone {
    pub fn empty(percent: u8) -> Self {
        Self {
            percent,
            ..Default::default()
        }
    }

    /// Name given to milestones that arrive without one (e.g. from a spreadsheet).
    pub fn default_name(percent: u8) -> String {
        format!("Milestone {}%", percent)
    }
}

/// Five empty milestones at their fixed percents.
pub fn milestone_template() -> [Milestone; MILESTONE_COUNT] {
    MILESTONE_PERCENTS.map(Milestone::empty)
}

/// Progress implied by a milestone list: 20 points per completed milestone.
pub fn progress_of(milestones: &[Milestone]) -> u8 {
    let completed = milestones.iter().filter(|m| m.completed).count() as u8;
    completed * PROGRESS_PER_MILESTONE
}

/// Reset each milestone's percent to the one its slot stands for.
fn pin_percents(milestones: &mut [Milestone; MILESTONE_COUNT]) {
    for (milestone, percent) in milestones.iter_mut().zip(MILESTONE_PERCENTS) {
        milestone.percent = percent;
    }
}

/// Whole days from `now` until midnight UTC of `deadline`, rounded up.
/// Negative once the deadline has passed.
pub fn days_until(deadline: Date, now: OffsetDateTime) -> i64 {
    let target = deadline.midnight().assume_utc();
    let millis = (target - now).whole_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY) + i128::from(millis.rem_euclid(MILLIS_PER_DAY) > 0);
    days as i64
}

pub fn new_project_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProjectRecord")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    progress: u8,
    pub tasks: Tasks,
    /// Cached when the deadline is edited; see [`Project::days_left_at`] for a live value.
    pub days_left: i64,
    pub priority: Priority,
    pub category: String,
    #[serde(serialize_with = "deadline_format::option::serialize")]
    pub deadline: Option<Date>,
    milestones: [Milestone; MILESTONE_COUNT],
}

/// Incoming form of a [`Project`]. A `progress` in the input is ignored and
/// derived again from the milestones.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRecord {
    id: String,
    name: String,
    description: String,
    tasks: Tasks,
    days_left: i64,
    priority: Priority,
    category: String,
    #[serde(default, with = "deadline_format::option")]
    deadline: Option<Date>,
    milestones: [Milestone; MILESTONE_COUNT],
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        ProjectDraft {
            id: Some(record.id),
            name: record.name,
            description: record.description,
            tasks: record.tasks,
            days_left: record.days_left,
            priority: record.priority,
            category: record.category,
            deadline: record.deadline,
            milestones: record.milestones,
        }
        .into_project()
    }
}

impl Project {
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn milestones(&self) -> &[Milestone; MILESTONE_COUNT] {
        &self.milestones
    }

    /// Replaces the milestone list, keeping `progress` in step with it. Each
    /// milestone takes the percent of the slot it lands in.
    pub fn set_milestones(&mut self, mut milestones: [Milestone; MILESTONE_COUNT]) {
        pin_percents(&mut milestones);
        self.progress = progress_of(&milestones);
        self.milestones = milestones;
    }

    /// Days left computed against `now` instead of the cached value.
    pub fn days_left_at(&self, now: OffsetDateTime) -> i64 {
        match self.deadline {
            Some(deadline) => days_until(deadline, now),
            None => self.days_left,
        }
    }

    /// Case-insensitive substring match on name, category, or description.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.category.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
    }
}

/// Project-shaped record being staged before it becomes a [`Project`].
/// Has no `progress`; it is derived from the milestones on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub tasks: Tasks,
    pub days_left: i64,
    pub priority: Priority,
    pub category: String,
    pub deadline: Option<Date>,
    pub milestones: [Milestone; MILESTONE_COUNT],
}

impl ProjectDraft {
    /// The empty project: blank fields, five empty milestones, Medium priority.
    pub fn template() -> Self {
        Self {
            id: None,
            name: String::new(),
            description: String::new(),
            tasks: Tasks::default(),
            days_left: 0,
            priority: Priority::Medium,
            category: String::new(),
            deadline: None,
            milestones: milestone_template(),
        }
    }

    /// Finish the record: milestone percents follow their slots, `completed`
    /// is clamped to `total` and progress is derived.
    pub fn into_project(self) -> Project {
        let mut milestones = self.milestones;
        pin_percents(&mut milestones);
        let progress = progress_of(&milestones);
        Project {
            id: self.id.unwrap_or_else(new_project_id),
            name: self.name,
            description: self.description,
            progress,
            tasks: Tasks::new(self.tasks.completed, self.tasks.total),
            days_left: self.days_left,
            priority: self.priority,
            category: self.category,
            deadline: self.deadline,
            milestones,
        }
    }
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self::template()
    }
}

impl From<Project> for ProjectDraft {
    fn from(project: Project) -> Self {
        Self {
            id: Some(project.id),
            name: project.name,
            description: project.description,
            tasks: project.tasks,
            days_left: project.days_left,
            priority: project.priority,
            category: project.category,
            deadline: project.deadline,
            milestones: project.milestones,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// What a theme resolves to once the host preference is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::System => "system",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn appearance(&self, prefers_dark: bool) -> Appearance {
        match self {
            Theme::Light => Appearance::Light,
            Theme::Dark => Appearance::Dark,
            Theme::System if prefers_dark => Appearance::Dark,
            Theme::System => Appearance::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Theme::System),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow::anyhow!("Invalid theme value: {:?}", other)),
        }
    }
}
