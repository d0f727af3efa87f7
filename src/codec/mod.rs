//! Spreadsheet import and export of the project list.
//!
//! Export writes one worksheet named `Projects` with a fixed 13-column header
//! and one row per project. Import reads the first worksheet of any `.xlsx`
//! with the same layout. Individual cells that do not parse fall back to
//! defaults; only an unreadable workbook or a missing worksheet fails the
//! whole import.

mod milestone;

use std::io::Cursor;

use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
use rust_xlsxwriter::Workbook;
use time::Date;
use tracing::{debug, info};

use crate::{
    error::CodecError,
    models::{DATE_FORMAT, MILESTONE_PERCENTS, Priority, Project, ProjectDraft, Tasks},
};

pub use milestone::{STATUS_SEPARATOR, format_milestone_cell, parse_milestone_cell};

pub const SHEET_NAME: &str = "Projects";

pub const HEADERS: [&str; COLUMN_COUNT] = [
    "ID",
    "Name",
    "Description",
    "Progress",
    "Priority",
    "Days Left",
    "Deadline",
    "Category",
    "Milestone 1 (20%)",
    "Milestone 2 (40%)",
    "Milestone 3 (60%)",
    "Milestone 4 (80%)",
    "Milestone 5 (100%)",
];

pub const COLUMN_COUNT: usize = 13;

const COL_ID: u16 = 0;
const COL_NAME: u16 = 1;
const COL_DESCRIPTION: u16 = 2;
const COL_PROGRESS: u16 = 3;
const COL_PRIORITY: u16 = 4;
const COL_DAYS_LEFT: u16 = 5;
const COL_DEADLINE: u16 = 6;
const COL_CATEGORY: u16 = 7;
const COL_FIRST_MILESTONE: u16 = 8;

/// Serialize `projects` into an `.xlsx` workbook.
pub fn export_projects(projects: &[Project]) -> Result<Vec<u8>, CodecError> {
    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string(0, col as u16, *header)?;
        }

        for (index, project) in projects.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, COL_ID, project.id.as_str())?;
            worksheet.write_string(row, COL_NAME, project.name.as_str())?;
            worksheet.write_string(row, COL_DESCRIPTION, project.description.as_str())?;
            worksheet.write_string(row, COL_PROGRESS, format!("{}%", project.progress()))?;
            worksheet.write_string(row, COL_PRIORITY, project.priority.as_str())?;
            worksheet.write_number(row, COL_DAYS_LEFT, project.days_left as f64)?;
            if let Some(deadline) = project.deadline {
                worksheet.write_string(row, COL_DEADLINE, deadline.format(DATE_FORMAT)?)?;
            }
            worksheet.write_string(row, COL_CATEGORY, project.category.as_str())?;
            for (slot, milestone) in project.milestones().iter().enumerate() {
                worksheet.write_string(
                    row,
                    COL_FIRST_MILESTONE + slot as u16,
                    format_milestone_cell(milestone),
                )?;
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    info!(count = projects.len(), bytes = buffer.len(), "exported projects");
    Ok(buffer)
}

/// Parse the first worksheet of an `.xlsx` buffer into projects.
///
/// The first sheet row is the header and is skipped, as are rows with no
/// content. Rows without an ID get a fresh one.
pub fn import_projects(bytes: &[u8]) -> Result<Vec<Project>, CodecError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(CodecError::MissingWorksheet)??;

    let (Some((start_row, _)), Some((end_row, _))) = (range.start(), range.end()) else {
        info!("imported empty worksheet");
        return Ok(Vec::new());
    };

    let mut projects = Vec::new();
    for row in start_row.max(1)..=end_row {
        let cells = RowCells { range: &range, row };
        if cells.is_blank() {
            continue;
        }
        projects.push(cells.into_project());
    }
    info!(count = projects.len(), "imported projects");
    Ok(projects)
}

struct RowCells<'a> {
    range: &'a Range<Data>,
    row: u32,
}

impl RowCells<'_> {
    fn text(&self, col: u16) -> String {
        match self.range.get_value((self.row, u32::from(col))) {
            None | Some(Data::Empty) | Some(Data::Error(_)) => String::new(),
            Some(Data::String(s)) => s.clone(),
            Some(Data::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
            Some(other) => other.to_string(),
        }
    }

    fn is_blank(&self) -> bool {
        (0..COLUMN_COUNT as u16).all(|col| self.text(col).trim().is_empty())
    }

    fn into_project(self) -> Project {
        let id = self.text(COL_ID).trim().to_string();
        let priority_text = self.text(COL_PRIORITY);
        let priority: Priority = priority_text.parse().unwrap_or_else(|_| {
            if !priority_text.trim().is_empty() {
                debug!(row = self.row, value = %priority_text, "unknown priority, using Medium");
            }
            Default::default()
        });
        let deadline = Date::parse(self.text(COL_DEADLINE).trim(), DATE_FORMAT).ok();

        let milestones = std::array::from_fn(|slot| {
            let percent = MILESTONE_PERCENTS[slot];
            let text = self.text(COL_FIRST_MILESTONE + slot as u16);
            parse_milestone_cell(&text, percent)
        });

        let draft = ProjectDraft {
            id: (!id.is_empty()).then_some(id),
            name: self.text(COL_NAME),
            description: self.text(COL_DESCRIPTION),
            tasks: Tasks::default(),
            days_left: parse_leading_int(&self.text(COL_DAYS_LEFT)).unwrap_or(0),
            priority,
            category: self.text(COL_CATEGORY),
            deadline,
            milestones,
        };
        let project = draft.into_project();

        let stated = parse_leading_int(&self.text(COL_PROGRESS)).unwrap_or(0);
        if stated != i64::from(project.progress()) {
            debug!(
                row = self.row,
                stated,
                derived = project.progress(),
                "progress cell disagrees with milestones; using milestones"
            );
        }
        project
    }
}

/// Integer at the start of `text`, ignoring leading whitespace and any
/// trailing garbage: `"40%"` is 40, `"-3 days"` is -3, `"abc"` is `None`.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

