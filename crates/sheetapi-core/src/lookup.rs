use crate::grid::Record;
use sheetapi_common::A1Range;

/// Store rows are 1-based and row 1 is the header, so record `k` lives on row `k + 2`.
const RECORD_ROW_OFFSET: u32 = 2;

/// First record whose `field` stringifies to exactly `value`.
///
/// Duplicates are resolved first-match-wins: a later record sharing the value is never
/// returned, so it cannot be updated or deleted through this lookup.
pub fn find_by_field<'a>(records: &'a [Record], field: &str, value: &str) -> Option<&'a Record> {
    records.iter().find(|record| record.field_matches(field, value))
}

/// Position of the record [`find_by_field`] would return.
pub fn find_index_by_field(records: &[Record], field: &str, value: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record.field_matches(field, value))
}

/// 1-based row number in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreRow(u32);

impl StoreRow {
    pub fn from_record_index(index: usize) -> Self {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        Self(index.saturating_add(RECORD_ROW_OFFSET))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// `Title!A{k+2}:{last}{k+2}` for record `index`, `column_span` columns wide (at least one).
pub fn resolve_store_row_range(index: usize, sheet_title: &str, column_span: usize) -> A1Range {
    let row = StoreRow::from_record_index(index).get();
    let span = u32::try_from(column_span.max(1)).unwrap_or(u32::MAX);
    A1Range::rect(sheet_title, row, 1, row, span)
}
