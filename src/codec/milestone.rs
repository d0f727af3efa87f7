use crate::models::Milestone;

/// Separates a milestone's text from its completion status in a cell.
pub const STATUS_SEPARATOR: &str = " - ";

const NAME_SEPARATOR: &str = ": ";
const COMPLETED: &str = "Completed";
const NOT_COMPLETED: &str = "Not Completed";

/// `"<name>: <description> - <Completed|Not Completed>"`
pub fn format_milestone_cell(milestone: &Milestone) -> String {
    format!(
        "{}{}{}{}{}",
        milestone.name,
        NAME_SEPARATOR,
        milestone.description,
        STATUS_SEPARATOR,
        if milestone.completed { COMPLETED } else { NOT_COMPLETED }
    )
}

/// Parse a milestone cell back into the milestone for the `percent` slot.
///
/// The status is whatever follows the last `" - "`; the milestone counts as
/// completed only if it reads `completed` (any case). Text before it is
/// `"<name>: <description>"`, or just a description. A cell without the
/// status separator yields an empty, incomplete milestone.
pub fn parse_milestone_cell(text: &str, percent: u8) -> Milestone {
    let Some((head, status)) = text.rsplit_once(STATUS_SEPARATOR) else {
        return Milestone {
            percent,
            name: Milestone::default_name(percent),
            description: String::new(),
            completed: false,
        };
    };

    let (name, description) = match head.split_once(NAME_SEPARATOR) {
        Some((name, description)) => (name.trim().to_string(), description.trim().to_string()),
        None => (Milestone::default_name(percent), head.trim().to_string()),
    };

    Milestone {
        percent,
        name,
        description,
        completed: status.trim().eq_ignore_ascii_case(COMPLETED),
    }
}
