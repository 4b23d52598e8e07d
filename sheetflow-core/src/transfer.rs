//! Spreadsheet transfer operations
//!
//! The three operations the pipeline can schedule, plus the executor
//! seam the runner drives them through. Every operation reads the
//! workbooks fresh from disk and saves the destination in place, so the
//! steps of a run compose through the filesystem.

use std::path::Path;

use tracing::debug;

use crate::domain::paths::SheetPaths;
use crate::domain::step::StepId;
use crate::error::{PipelineError, Result};
use crate::workbook::{self, CellValue, SheetData};

/// Name of the sheet created by the different-sheet transfer
pub const TRANSFER_SHEET_NAME: &str = "Transferred Data";

/// Executes one pipeline step against the current path state
///
/// Trait seam so the runner can be exercised without touching real
/// workbooks.
pub trait StepExecutor: Send + Sync {
    fn execute(&self, step: StepId, paths: &SheetPaths) -> Result<()>;
}

/// Executor backed by the real workbook operations
pub struct WorkbookStepExecutor;

impl StepExecutor for WorkbookStepExecutor {
    fn execute(&self, step: StepId, paths: &SheetPaths) -> Result<()> {
        match step {
            StepId::DifferentSheetTransfer => {
                transfer_to_new_sheet(&paths.source, &paths.destination)
            }
            StepId::ExcelMacro => execute_macro(&paths.destination),
            StepId::SameSheetTransfer => append_to_base_sheet(&paths.source, &paths.destination),
        }
    }
}

/// Appends the source sheet's data rows to the destination's active
/// sheet
///
/// The source header row is skipped. Rows land at the first empty row
/// of the destination, found by scanning column 1 downward.
pub fn append_to_base_sheet(source: &Path, destination: &Path) -> Result<()> {
    let source_book = workbook::read_workbook(source)?;
    let mut dest_book = workbook::read_workbook(destination)?;

    let data_rows: Vec<Vec<CellValue>> = source_book
        .active_sheet()
        .map(|sheet| sheet.rows.iter().skip(1).cloned().collect())
        .unwrap_or_default();

    let dest_sheet = dest_book
        .active_sheet_mut()
        .ok_or_else(|| PipelineError::workbook_read(destination, "workbook has no sheets"))?;

    let mut next_row = dest_sheet.first_empty_row();
    for row in &data_rows {
        for (col, value) in row.iter().enumerate() {
            dest_sheet.set_cell(next_row, col, value.clone());
        }
        next_row += 1;
    }

    workbook::write_workbook(&dest_book, destination)?;
    debug!(
        "appended {} data row(s) to {}",
        data_rows.len(),
        destination.display()
    );
    Ok(())
}

/// Copies every source row, header included, into a new
/// "Transferred Data" sheet in the destination
///
/// Fails if the destination already contains a sheet of that name.
pub fn transfer_to_new_sheet(source: &Path, destination: &Path) -> Result<()> {
    let source_book = workbook::read_workbook(source)?;
    let mut dest_book = workbook::read_workbook(destination)?;

    if dest_book.has_sheet(TRANSFER_SHEET_NAME) {
        return Err(PipelineError::workbook_write(
            destination,
            format!("sheet '{TRANSFER_SHEET_NAME}' already exists"),
        ));
    }

    let mut sheet = SheetData::new(TRANSFER_SHEET_NAME);
    if let Some(src) = source_book.active_sheet() {
        for row in &src.rows {
            sheet.push_row(row.clone());
        }
    }
    dest_book.sheets.push(sheet);

    workbook::write_workbook(&dest_book, destination)?;
    debug!(
        "transferred source rows into '{TRANSFER_SHEET_NAME}' in {}",
        destination.display()
    );
    Ok(())
}

/// Macro execution placeholder
///
/// Macros cannot be executed in this environment. The step keeps its
/// place in the pipeline: it verifies the destination is a readable
/// workbook and leaves the file bytes untouched, so any embedded macro
/// content survives.
pub fn execute_macro(destination: &Path) -> Result<()> {
    workbook::read_workbook(destination)?;
    debug!("macro execution skipped - not supported in this environment");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{WorkbookData, read_workbook, write_workbook};
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_sheet(path: &Path, name: &str, rows: Vec<Vec<CellValue>>) {
        let mut sheet = SheetData::new(name);
        sheet.rows = rows;
        write_workbook(
            &WorkbookData {
                sheets: vec![sheet],
            },
            path,
        )
        .unwrap();
    }

    fn text_row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::text(*v)).collect()
    }

    /// Base workbook with three populated rows, source with a header
    /// and two data rows
    fn fixtures() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempdir().unwrap();
        let destination = dir.path().join("base_sheet.xlsx");
        let source = dir.path().join("new_data.xlsx");

        write_sheet(
            &destination,
            "Sheet1",
            vec![
                text_row(&["id", "amount"]),
                vec![CellValue::text("a"), CellValue::Number(1.0)],
                vec![CellValue::text("b"), CellValue::Number(2.0)],
            ],
        );
        write_sheet(
            &source,
            "Sheet1",
            vec![
                text_row(&["id", "amount"]),
                vec![CellValue::text("c"), CellValue::Number(3.0)],
                vec![CellValue::text("d"), CellValue::Number(4.0)],
            ],
        );

        (dir, source, destination)
    }

    #[test]
    fn test_append_skips_header_and_lands_after_existing_rows() {
        let (_dir, source, destination) = fixtures();

        append_to_base_sheet(&source, &destination).unwrap();

        let book = read_workbook(&destination).unwrap();
        let sheet = book.active_sheet().unwrap();
        assert_eq!(sheet.rows.len(), 5);
        assert_eq!(sheet.rows[3], vec![CellValue::text("c"), CellValue::Number(3.0)]);
        assert_eq!(sheet.rows[4], vec![CellValue::text("d"), CellValue::Number(4.0)]);
        // Existing rows untouched
        assert_eq!(sheet.rows[0], text_row(&["id", "amount"]));
        assert_eq!(sheet.rows[1][0], CellValue::text("a"));
    }

    #[test]
    fn test_append_to_empty_destination_starts_at_row_one() {
        let (_dir, source, destination) = fixtures();
        write_sheet(&destination, "Sheet1", vec![]);

        append_to_base_sheet(&source, &destination).unwrap();

        let book = read_workbook(&destination).unwrap();
        let sheet = book.active_sheet().unwrap();
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][0], CellValue::text("c"));
    }

    #[test]
    fn test_transfer_creates_named_sheet_with_header() {
        let (_dir, source, destination) = fixtures();

        transfer_to_new_sheet(&source, &destination).unwrap();

        let book = read_workbook(&destination).unwrap();
        assert_eq!(book.sheets.len(), 2);
        let sheet = book
            .sheets
            .iter()
            .find(|s| s.name == TRANSFER_SHEET_NAME)
            .unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0], text_row(&["id", "amount"]));
        assert_eq!(sheet.rows[2][0], CellValue::text("d"));
        // Original sheet untouched
        assert_eq!(book.active_sheet().unwrap().rows.len(), 3);
    }

    #[test]
    fn test_transfer_twice_fails_on_duplicate_sheet() {
        let (_dir, source, destination) = fixtures();

        transfer_to_new_sheet(&source, &destination).unwrap();
        let result = transfer_to_new_sheet(&source, &destination);
        assert!(matches!(result, Err(PipelineError::WorkbookWrite { .. })));
    }

    #[test]
    fn test_macro_step_leaves_file_untouched() {
        let (_dir, _source, destination) = fixtures();
        let before = std::fs::read(&destination).unwrap();

        execute_macro(&destination).unwrap();

        let after = std::fs::read(&destination).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_macro_step_fails_on_unreadable_destination() {
        let dir = tempdir().unwrap();
        let result = execute_macro(&dir.path().join("absent.xlsx"));
        assert!(matches!(result, Err(PipelineError::WorkbookRead { .. })));
    }

    #[test]
    fn test_operations_fail_on_missing_source() {
        let (_dir, _source, destination) = fixtures();
        let missing = destination.parent().unwrap().join("absent.xlsx");

        assert!(append_to_base_sheet(&missing, &destination).is_err());
        assert!(transfer_to_new_sheet(&missing, &destination).is_err());
    }

    #[test]
    fn test_executor_runs_all_steps_in_default_order() {
        let (dir, source, destination) = fixtures();
        let paths = SheetPaths::derive(&source, &destination, dir.path());

        let executor = WorkbookStepExecutor;
        for step in crate::domain::step::Step::default_order() {
            executor.execute(step.id, &paths).unwrap();
        }

        let book = read_workbook(&destination).unwrap();
        assert!(book.has_sheet(TRANSFER_SHEET_NAME));
        assert_eq!(book.active_sheet().unwrap().rows.len(), 5);
    }
}
