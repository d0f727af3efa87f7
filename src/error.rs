use thiserror::Error;

use crate::models::MILESTONE_COUNT;

/// Failures of the spreadsheet codec that abort a whole import or export.
/// Malformed individual cells never surface here; they fall back to defaults.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read workbook: {0}")]
    Read(#[from] calamine::XlsxError),

    #[error("no worksheet found in the workbook")]
    MissingWorksheet,

    #[error("failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to format date: {0}")]
    Date(#[from] time::error::Format),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("milestone index {0} out of range (expected 0..{MILESTONE_COUNT})")]
    MilestoneIndex(usize),
}
