use crate::error::StoreError;
use crate::traits::{
    AppendAck, ClearAck, Rows, Sheet, SheetProperties, SheetStore, SpreadsheetMetadata, UpdateAck,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sheetapi_common::{A1Range, CellValue, GridBounds};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
struct MemoryFixture {
    #[serde(default)]
    spreadsheets: BTreeMap<String, MemorySpreadsheet>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
struct MemorySpreadsheet {
    #[serde(default)]
    sheets: Vec<MemorySheet>,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone)]
struct MemorySheet {
    title: String,
    #[serde(default)]
    rows: Rows,
}

impl MemorySheet {
    /// Number of rows up to and including the last one holding a non-blank cell.
    fn filled_rows(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_blank()))
            .map_or(0, |idx| idx + 1)
    }

    fn width(&self) -> u32 {
        self.rows.iter().map(Vec::len).max().unwrap_or(0) as u32
    }

    fn read(&self, bounds: &GridBounds) -> Rows {
        let mut out: Rows = self
            .rows
            .iter()
            .enumerate()
            .filter(|(idx, _)| bounds.contains_row(*idx as u32 + 1))
            .map(|(_, row)| {
                let mut cells: Vec<CellValue> = row
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| bounds.contains_col(*idx as u32 + 1))
                    .map(|(_, cell)| match cell {
                        // Interior blanks come back as empty strings, like a formatted read.
                        CellValue::Empty => CellValue::Text(String::new()),
                        other => other.clone(),
                    })
                    .collect();
                while cells.last().is_some_and(CellValue::is_blank) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while out.last().is_some_and(Vec::is_empty) {
            out.pop();
        }
        out
    }

    fn write_row(&mut self, row: u32, first_col: u32, values: Vec<CellValue>) {
        let row_idx = row.max(1) as usize - 1;
        if self.rows.len() <= row_idx {
            self.rows.resize_with(row_idx + 1, Vec::new);
        }
        let cells = &mut self.rows[row_idx];
        let start = first_col.max(1) as usize - 1;
        let needed = start + values.len();
        if cells.len() < needed {
            cells.resize(needed, CellValue::Empty);
        }
        for (offset, value) in values.into_iter().enumerate() {
            cells[start + offset] = value;
        }
    }

    fn clear(&mut self, bounds: &GridBounds) {
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            if !bounds.contains_row(row_idx as u32 + 1) {
                continue;
            }
            for (col_idx, cell) in row.iter_mut().enumerate() {
                if bounds.contains_col(col_idx as u32 + 1) {
                    *cell = CellValue::Empty;
                }
            }
        }
    }
}

/// In-process store with the same read/write semantics as a Sheets backend.
///
/// Semantics:
/// - Reads trim trailing blank cells of each row and trailing blank rows.
/// - Appends land after the last row holding a non-blank cell.
/// - Clears blank cells in place; rows are never removed, so row numbers stay stable.
///
/// Fixtures use the shape
/// `{ "spreadsheets": { "<id>": { "sheets": [ { "title": "...", "rows": [[...]] } ] } } }`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryFixture>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = File::open(path.as_ref())?;
        Self::open_reader(BufReader::new(file))
    }

    pub fn open_reader<R: Read>(reader: R) -> Result<Self, StoreError> {
        let data: MemoryFixture = serde_json::from_reader(reader)?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    pub fn open_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        let data: MemoryFixture = serde_json::from_slice(bytes)?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    /// Builder form of [`MemoryStore::insert_sheet`].
    pub fn with_sheet(self, spreadsheet_id: &str, title: &str, rows: Rows) -> Self {
        self.insert_sheet(spreadsheet_id, title, rows);
        self
    }

    /// Create or replace a tab, creating the spreadsheet on first use.
    pub fn insert_sheet(&self, spreadsheet_id: &str, title: &str, rows: Rows) {
        let mut data = self.data.write();
        let spreadsheet = data
            .spreadsheets
            .entry(spreadsheet_id.to_string())
            .or_default();
        match spreadsheet.sheets.iter_mut().find(|s| s.title == title) {
            Some(sheet) => sheet.rows = rows,
            None => spreadsheet.sheets.push(MemorySheet {
                title: title.to_string(),
                rows,
            }),
        }
    }

    /// Untrimmed contents of a tab, for inspection.
    pub fn raw_rows(&self, spreadsheet_id: &str, title: &str) -> Option<Rows> {
        let data = self.data.read();
        data.spreadsheets
            .get(spreadsheet_id)?
            .sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.rows.clone())
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&*self.data.read())?)
    }

    fn read_sheet<T>(
        &self,
        spreadsheet_id: &str,
        title: &str,
        f: impl FnOnce(&MemorySheet) -> T,
    ) -> Result<T, StoreError> {
        let data = self.data.read();
        let spreadsheet = data
            .spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| StoreError::SpreadsheetNotFound(spreadsheet_id.to_string()))?;
        let sheet = spreadsheet
            .sheets
            .iter()
            .find(|s| s.title == title)
            .ok_or_else(|| sheet_not_found(spreadsheet_id, title))?;
        Ok(f(sheet))
    }

    fn write_sheet<T>(
        &self,
        spreadsheet_id: &str,
        title: &str,
        f: impl FnOnce(&mut MemorySheet) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut data = self.data.write();
        let spreadsheet = data
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| StoreError::SpreadsheetNotFound(spreadsheet_id.to_string()))?;
        let sheet = spreadsheet
            .sheets
            .iter_mut()
            .find(|s| s.title == title)
            .ok_or_else(|| sheet_not_found(spreadsheet_id, title))?;
        f(sheet)
    }
}

fn sheet_not_found(spreadsheet_id: &str, title: &str) -> StoreError {
    StoreError::SheetNotFound {
        spreadsheet_id: spreadsheet_id.to_string(),
        sheet: title.to_string(),
    }
}

fn written_ack(spreadsheet_id: &str, title: &str, row: u32, first_col: u32, width: u32) -> UpdateAck {
    let updated_range = if width == 0 {
        A1Range::cell(title, row, first_col)
    } else {
        A1Range::rect(title, row, first_col, row, first_col + width - 1)
    };
    UpdateAck {
        spreadsheet_id: spreadsheet_id.to_string(),
        updated_range: updated_range.to_string(),
        updated_rows: u32::from(width > 0),
        updated_columns: width,
        updated_cells: width,
    }
}

impl SheetStore for MemoryStore {
    async fn fetch_range(&self, spreadsheet_id: &str, range: &A1Range) -> Result<Rows, StoreError> {
        let bounds = range.bounds();
        self.read_sheet(spreadsheet_id, &range.sheet, |sheet| sheet.read(&bounds))
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<AppendAck, StoreError> {
        let first_col = range.bounds().first_col;
        self.write_sheet(spreadsheet_id, &range.sheet, |sheet| {
            let filled = sheet.filled_rows() as u32;
            let table_range = (filled > 0)
                .then(|| A1Range::rect(&sheet.title, 1, 1, filled, sheet.width().max(1)).to_string());
            let row = filled + 1;
            let width = values.len() as u32;
            sheet.write_row(row, first_col, values);
            Ok(AppendAck {
                spreadsheet_id: spreadsheet_id.to_string(),
                table_range,
                updates: written_ack(spreadsheet_id, &sheet.title, row, first_col, width),
            })
        })
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<UpdateAck, StoreError> {
        let bounds = range.bounds();
        if let Some(last_col) = bounds.last_col {
            let room = last_col.saturating_sub(bounds.first_col) + 1;
            if values.len() as u32 > room {
                return Err(StoreError::Rejected {
                    status: 400,
                    message: format!(
                        "requested writing {} values within range [{range}] which has room for {room}",
                        values.len()
                    ),
                });
            }
        }
        self.write_sheet(spreadsheet_id, &range.sheet, |sheet| {
            let width = values.len() as u32;
            sheet.write_row(bounds.first_row, bounds.first_col, values);
            Ok(written_ack(
                spreadsheet_id,
                &sheet.title,
                bounds.first_row,
                bounds.first_col,
                width,
            ))
        })
    }

    async fn clear_ranges(
        &self,
        spreadsheet_id: &str,
        ranges: &[A1Range],
    ) -> Result<ClearAck, StoreError> {
        let mut data = self.data.write();
        let spreadsheet = data
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| StoreError::SpreadsheetNotFound(spreadsheet_id.to_string()))?;

        // Resolve every tab before touching any cell so a bad range clears nothing.
        if let Some(missing) = ranges
            .iter()
            .find(|range| !spreadsheet.sheets.iter().any(|s| s.title == range.sheet))
        {
            return Err(sheet_not_found(spreadsheet_id, &missing.sheet));
        }

        for range in ranges {
            if let Some(sheet) = spreadsheet.sheets.iter_mut().find(|s| s.title == range.sheet) {
                sheet.clear(&range.bounds());
            }
        }

        Ok(ClearAck {
            spreadsheet_id: spreadsheet_id.to_string(),
            cleared_ranges: ranges.iter().map(ToString::to_string).collect(),
        })
    }

    async fn fetch_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata, StoreError> {
        let data = self.data.read();
        let spreadsheet = data
            .spreadsheets
            .get(spreadsheet_id)
            .ok_or_else(|| StoreError::SpreadsheetNotFound(spreadsheet_id.to_string()))?;
        let sheets = spreadsheet
            .sheets
            .iter()
            .enumerate()
            .map(|(idx, sheet)| Sheet {
                properties: SheetProperties {
                    sheet_id: idx as i64,
                    title: sheet.title.clone(),
                    index: idx as u32,
                },
            })
            .collect();
        Ok(SpreadsheetMetadata {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheets,
        })
    }
}
