use crate::error::SheetApiError;
use crate::grid::{Grid, Record, RowPayload, to_values};
use crate::lookup::{find_index_by_field, resolve_store_row_range};
use sheetapi_common::{A1Range, CellValue};
use sheetapi_store::{AppendAck, ClearAck, SheetStore, UpdateAck};
use std::sync::Arc;
use tracing::debug;

/// Read `range` and map it to records.
///
/// A range with no rows at all maps to an empty sequence; a range whose first row is blank is
/// a malformed grid.
pub async fn fetch_records<S: SheetStore>(
    store: &S,
    spreadsheet_id: &str,
    range: &A1Range,
) -> Result<Vec<Record>, SheetApiError> {
    let rows = store.fetch_range(spreadsheet_id, range).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    Ok(Grid::from_rows(rows)?.to_records())
}

struct Located {
    grid: Grid,
    records: Vec<Record>,
    index: usize,
}

/// CRUD over one tab.
///
/// Every call fetches the tab fresh; nothing is cached between calls. Each operation issues at
/// most one read followed by at most one write, without locking: two concurrent mutations of
/// the same record race and the last write wins.
#[derive(Debug)]
pub struct Collection<S> {
    store: Arc<S>,
    spreadsheet_id: String,
    title: String,
}

impl<S: SheetStore> Collection<S> {
    pub fn new(store: Arc<S>, spreadsheet_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            store,
            spreadsheet_id: spreadsheet_id.into(),
            title: title.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn whole_tab(&self) -> A1Range {
        A1Range::whole_sheet(self.title.as_str())
    }

    /// `None` when the tab has no rows at all.
    async fn read_grid(&self) -> Result<Option<Grid>, SheetApiError> {
        let rows = self
            .store
            .fetch_range(&self.spreadsheet_id, &self.whole_tab())
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(Grid::from_rows(rows)?))
    }

    /// First record where `field == value`, along with the grid it came from.
    async fn locate(&self, field: &str, value: &str) -> Result<Located, SheetApiError> {
        let grid = self
            .read_grid()
            .await?
            .ok_or_else(|| SheetApiError::record_not_found(field, value))?;
        let records = grid.to_records();
        let index = find_index_by_field(&records, field, value)
            .ok_or_else(|| SheetApiError::record_not_found(field, value))?;
        Ok(Located {
            grid,
            records,
            index,
        })
    }

    pub async fn list(&self) -> Result<Vec<Record>, SheetApiError> {
        debug!(spreadsheet_id = %self.spreadsheet_id, title = %self.title, "list records");
        fetch_records(self.store.as_ref(), &self.spreadsheet_id, &self.whole_tab()).await
    }

    pub async fn get_one(&self, field: &str, value: &str) -> Result<Record, SheetApiError> {
        debug!(title = %self.title, field, value, "get record");
        let Located {
            mut records, index, ..
        } = self.locate(field, value).await?;
        Ok(records.swap_remove(index))
    }

    /// Append one row. A positional payload is written without reading anything; a field
    /// payload costs one read of the header row to put the values in column order.
    pub async fn create(&self, payload: &RowPayload) -> Result<AppendAck, SheetApiError> {
        debug!(title = %self.title, "create record");
        let values = if payload.needs_header() {
            let header_row = A1Range::rows(self.title.as_str(), 1, 1);
            let rows = self
                .store
                .fetch_range(&self.spreadsheet_id, &header_row)
                .await?;
            let grid = Grid::from_rows(rows)?;
            to_values(payload, grid.header())?
        } else {
            to_values(payload, &Default::default())?
        };
        Ok(self
            .store
            .append_row(&self.spreadsheet_id, &self.whole_tab(), values)
            .await?)
    }

    /// Replace the whole row of the first record where `field == value`.
    ///
    /// Every column the payload does not cover is blanked, up to the wider of the header and
    /// the stored row, so the stored row ends up holding exactly the new values.
    pub async fn update_one(
        &self,
        field: &str,
        value: &str,
        payload: &RowPayload,
    ) -> Result<UpdateAck, SheetApiError> {
        let Located { grid, index, .. } = self.locate(field, value).await?;
        let mut values = to_values(payload, grid.header())?;
        let row_width = grid.data_rows().get(index).map_or(0, Vec::len);
        let span = values.len().max(grid.header().len()).max(row_width);
        values.resize(span, CellValue::Empty);
        // An explicit empty write blanks the cell; a null would leave the old value in place.
        for cell in values.iter_mut().filter(|cell| matches!(cell, CellValue::Empty)) {
            *cell = CellValue::Text(String::new());
        }
        let range = resolve_store_row_range(index, &self.title, span);
        debug!(title = %self.title, field, value, %range, "update record");
        Ok(self
            .store
            .update_row(&self.spreadsheet_id, &range, values)
            .await?)
    }

    /// Blank the row of the first record where `field == value`.
    ///
    /// The row itself stays in the sheet, so every later record keeps its row number.
    pub async fn delete_one(&self, field: &str, value: &str) -> Result<ClearAck, SheetApiError> {
        let Located { grid, index, .. } = self.locate(field, value).await?;
        let row_width = grid.data_rows().get(index).map_or(0, Vec::len);
        let span = row_width.max(grid.header().len());
        let range = resolve_store_row_range(index, &self.title, span);
        debug!(title = %self.title, field, value, %range, "delete record");
        Ok(self
            .store
            .clear_ranges(&self.spreadsheet_id, std::slice::from_ref(&range))
            .await?)
    }
}
