//! Workbook I/O
//!
//! Reads whole workbooks into memory with `calamine` and rebuilds them
//! with `rust_xlsxwriter`. The transfer operations edit the in-memory
//! model and save the result over the destination file.
//!
//! Date and time cells are textualized to `dd/mm/yyyy` at read time, so
//! every write path sees the already-formatted value.

use std::path::Path;

use calamine::{Data, DataType as _, Range, Reader as _, open_workbook_auto};
use rust_xlsxwriter::Workbook;

use crate::error::{PipelineError, Result};

/// Fixed textual representation for date/time cells
const DATE_FORMAT: &str = "%d/%m/%Y";

/// A single cell in the in-memory model
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    fn from_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(|d| CellValue::Text(d.format(DATE_FORMAT).to_string()))
                .unwrap_or(CellValue::Number(dt.as_f64())),
            Data::DateTimeIso(s) => cell
                .as_datetime()
                .map(|d| CellValue::Text(d.format(DATE_FORMAT).to_string()))
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// One sheet: its name plus a dense row-major grid
///
/// The grid is anchored at A1, so leading empty rows and columns survive
/// a read/write round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Index of the first row whose column 1 cell is empty, scanning
    /// down from row 1
    pub fn first_empty_row(&self) -> usize {
        self.rows
            .iter()
            .position(|row| row.first().map(CellValue::is_empty).unwrap_or(true))
            .unwrap_or(self.rows.len())
    }

    /// Writes one cell, growing the grid as needed
    pub fn set_cell(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, Vec::new());
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }

    /// Appends a full row after the existing ones
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }
}

/// A whole workbook as an ordered list of sheets
///
/// The first sheet is the active one, matching how the upload surface
/// and the transfer operations address workbooks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkbookData {
    pub sheets: Vec<SheetData>,
}

impl WorkbookData {
    pub fn active_sheet(&self) -> Option<&SheetData> {
        self.sheets.first()
    }

    pub fn active_sheet_mut(&mut self) -> Option<&mut SheetData> {
        self.sheets.first_mut()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|sheet| sheet.name == name)
    }
}

/// Reads every sheet of the workbook at `path`
///
/// Accepts `.xlsx` and `.xls`; format detection is delegated to
/// calamine.
pub fn read_workbook(path: &Path) -> Result<WorkbookData> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PipelineError::workbook_read(path, e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| PipelineError::workbook_read(path, format!("sheet '{name}': {e}")))?;
        sheets.push(sheet_from_range(name, &range));
    }

    Ok(WorkbookData { sheets })
}

fn sheet_from_range(name: String, range: &Range<Data>) -> SheetData {
    let mut sheet = SheetData::new(name);

    // Ranges are addressed with absolute coordinates so a used area not
    // anchored at A1 still lands in the right grid position.
    let Some(end) = range.end() else {
        return sheet;
    };

    for row in 0..=end.0 {
        let mut cells = Vec::with_capacity(end.1 as usize + 1);
        for col in 0..=end.1 {
            let value = range
                .get_value((row, col))
                .map(CellValue::from_cell)
                .unwrap_or(CellValue::Empty);
            cells.push(value);
        }
        sheet.rows.push(cells);
    }

    sheet
}

/// Rebuilds the workbook at `path` from the in-memory model
///
/// The output is always written in xlsx format.
pub fn write_workbook(data: &WorkbookData, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    for sheet in &data.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet.name.as_str())
            .map_err(|e| PipelineError::workbook_write(path, e.to_string()))?;

        for (row, cells) in sheet.rows.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                let (row, col) = (row as u32, col as u16);
                let written = match value {
                    CellValue::Empty => Ok(&mut *worksheet),
                    CellValue::Text(s) => worksheet.write_string(row, col, s.as_str()),
                    CellValue::Number(n) => worksheet.write_number(row, col, *n),
                    CellValue::Bool(b) => worksheet.write_boolean(row, col, *b),
                };
                written.map_err(|e| PipelineError::workbook_write(path, e.to_string()))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| PipelineError::workbook_write(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sheet_with_rows(name: &str, rows: Vec<Vec<CellValue>>) -> SheetData {
        let mut sheet = SheetData::new(name);
        sheet.rows = rows;
        sheet
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("book.xlsx");

        let data = WorkbookData {
            sheets: vec![sheet_with_rows(
                "Data",
                vec![
                    vec![CellValue::text("name"), CellValue::text("count")],
                    vec![CellValue::text("widgets"), CellValue::Number(42.0)],
                    vec![CellValue::text("flagged"), CellValue::Bool(true)],
                ],
            )],
        };

        write_workbook(&data, &path).unwrap();
        let back = read_workbook(&path).unwrap();

        assert_eq!(back.sheets.len(), 1);
        let sheet = back.active_sheet().unwrap();
        assert_eq!(sheet.name, "Data");
        assert_eq!(sheet.rows[1][0], CellValue::text("widgets"));
        assert_eq!(sheet.rows[1][1], CellValue::Number(42.0));
        assert_eq!(sheet.rows[2][1], CellValue::Bool(true));
    }

    #[test]
    fn test_read_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let result = read_workbook(&dir.path().join("absent.xlsx"));
        assert!(matches!(result, Err(PipelineError::WorkbookRead { .. })));
    }

    #[test]
    fn test_first_empty_row_scans_column_one() {
        let sheet = sheet_with_rows(
            "Data",
            vec![
                vec![CellValue::text("a")],
                vec![CellValue::text("b")],
                vec![CellValue::Empty, CellValue::text("stray")],
                vec![CellValue::text("d")],
            ],
        );
        // Scan stops at the first empty column-1 cell even when later
        // rows are populated
        assert_eq!(sheet.first_empty_row(), 2);

        let full = sheet_with_rows("Data", vec![vec![CellValue::text("a")]]);
        assert_eq!(full.first_empty_row(), 1);

        assert_eq!(SheetData::new("Empty").first_empty_row(), 0);
    }

    #[test]
    fn test_set_cell_grows_grid() {
        let mut sheet = SheetData::new("Data");
        sheet.set_cell(2, 1, CellValue::Number(7.0));
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[2][0], CellValue::Empty);
        assert_eq!(sheet.rows[2][1], CellValue::Number(7.0));
    }

    #[test]
    fn test_iso_date_cell_is_textualized() {
        let cell = Data::DateTimeIso("2024-03-05T09:30:00".to_string());
        assert_eq!(CellValue::from_cell(&cell), CellValue::text("05/03/2024"));
    }

    #[test]
    fn test_plain_values_pass_through() {
        assert_eq!(
            CellValue::from_cell(&Data::String("hello".into())),
            CellValue::text("hello")
        );
        assert_eq!(
            CellValue::from_cell(&Data::Float(1.5)),
            CellValue::Number(1.5)
        );
        assert_eq!(CellValue::from_cell(&Data::Empty), CellValue::Empty);
    }
}
