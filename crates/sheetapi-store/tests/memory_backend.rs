use sheetapi_common::text_row;
use sheetapi_store::{A1Range, CellValue, MemoryStore, SheetStore, StoreError};
use std::io::Write;

fn people() -> MemoryStore {
    MemoryStore::new().with_sheet(
        "sheet-1",
        "People",
        vec![
            text_row(["name", "age"]),
            text_row(["Alice", "30"]),
            text_row(["Bob", "25"]),
        ],
    )
}

#[tokio::test]
async fn whole_sheet_read_returns_header_and_rows() {
    let store = people();
    let rows = store
        .fetch_range("sheet-1", &A1Range::whole_sheet("People"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], text_row(["name", "age"]));
    assert_eq!(rows[2], text_row(["Bob", "25"]));
}

#[tokio::test]
async fn header_row_range_reads_only_row_one() {
    let store = people();
    let rows = store
        .fetch_range("sheet-1", &A1Range::rows("People", 1, 1))
        .await
        .unwrap();
    assert_eq!(rows, vec![text_row(["name", "age"])]);
}

#[tokio::test]
async fn append_lands_after_last_filled_row() {
    let store = people();
    let ack = store
        .append_row(
            "sheet-1",
            &A1Range::whole_sheet("People"),
            text_row(["Carol", "41"]),
        )
        .await
        .unwrap();
    assert_eq!(ack.updates.updated_range, "People!A4:B4");
    assert_eq!(ack.table_range.as_deref(), Some("People!A1:B3"));
    assert_eq!(ack.updates.updated_cells, 2);

    let rows = store.raw_rows("sheet-1", "People").unwrap();
    assert_eq!(rows[3], text_row(["Carol", "41"]));
}

#[tokio::test]
async fn append_skips_over_cleared_tail_rows() {
    let store = people();
    store
        .clear_ranges("sheet-1", &[A1Range::rect("People", 3, 1, 3, 2)])
        .await
        .unwrap();
    let ack = store
        .append_row("sheet-1", &A1Range::whole_sheet("People"), text_row(["Dan", "19"]))
        .await
        .unwrap();
    assert_eq!(ack.updates.updated_range, "People!A3:B3");
}

#[tokio::test]
async fn clear_keeps_row_positions() {
    let store = people();
    let ack = store
        .clear_ranges("sheet-1", &[A1Range::rect("People", 2, 1, 2, 2)])
        .await
        .unwrap();
    assert_eq!(ack.cleared_ranges, vec!["People!A2:B2".to_string()]);

    let rows = store
        .fetch_range("sheet-1", &A1Range::whole_sheet("People"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].is_empty());
    assert_eq!(rows[2], text_row(["Bob", "25"]));
}

#[tokio::test]
async fn clear_with_unknown_tab_clears_nothing() {
    let store = people();
    let err = store
        .clear_ranges(
            "sheet-1",
            &[
                A1Range::rect("People", 2, 1, 2, 2),
                A1Range::rect("Missing", 2, 1, 2, 2),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::SheetNotFound { .. }));
    assert_eq!(
        store.raw_rows("sheet-1", "People").unwrap()[1],
        text_row(["Alice", "30"])
    );
}

#[tokio::test]
async fn update_overwrites_from_range_start() {
    let store = people();
    let ack = store
        .update_row(
            "sheet-1",
            &A1Range::rect("People", 2, 1, 2, 2),
            text_row(["Alice", "31"]),
        )
        .await
        .unwrap();
    assert_eq!(ack.updated_range, "People!A2:B2");
    assert_eq!(ack.updated_rows, 1);
    assert_eq!(
        store.raw_rows("sheet-1", "People").unwrap()[1],
        text_row(["Alice", "31"])
    );
}

#[tokio::test]
async fn update_wider_than_range_is_rejected() {
    let store = people();
    let err = store
        .update_row(
            "sheet-1",
            &A1Range::rect("People", 2, 1, 2, 2),
            text_row(["Alice", "31", "extra"]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn interior_blanks_read_as_empty_text_and_short_rows_stay_short() {
    let store = MemoryStore::new().with_sheet(
        "s",
        "T",
        vec![
            text_row(["a", "b", "c"]),
            vec![CellValue::from("x"), CellValue::Empty, CellValue::from("z")],
            vec![CellValue::from("only"), CellValue::Empty],
        ],
    );
    let rows = store.fetch_range("s", &A1Range::whole_sheet("T")).await.unwrap();
    assert_eq!(rows[1], text_row(["x", "", "z"]));
    assert_eq!(rows[2], text_row(["only"]));
}

#[tokio::test]
async fn metadata_lists_tabs_in_order() {
    let store = people().with_sheet("sheet-1", "Archive", vec![text_row(["id"])]);
    let meta = store.fetch_metadata("sheet-1").await.unwrap();
    assert_eq!(meta.spreadsheet_id, "sheet-1");
    assert_eq!(meta.titles().collect::<Vec<_>>(), vec!["People", "Archive"]);
    assert_eq!(meta.sheets[1].properties.index, 1);
}

#[tokio::test]
async fn unknown_spreadsheet_is_reported_as_not_found() {
    let store = people();
    let err = store.fetch_metadata("nope").await.unwrap_err();
    assert!(err.is_spreadsheet_not_found());

    let err = store
        .fetch_range("sheet-1", &A1Range::whole_sheet("Nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::SheetNotFound { .. }));
}

#[tokio::test]
async fn fixture_file_loads() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
  "spreadsheets": {{
    "fixture": {{
      "sheets": [
        {{ "title": "Sheet1", "rows": [["name", "age"], ["Alice", 30]] }}
      ]
    }}
  }}
}}"#
    )
    .unwrap();

    let store = MemoryStore::open_path(file.path()).unwrap();
    let rows = store
        .fetch_range("fixture", &A1Range::whole_sheet("Sheet1"))
        .await
        .unwrap();
    assert_eq!(rows[1], vec![CellValue::from("Alice"), CellValue::Int(30)]);
}
