//! Store boundary for sheetapi.
//!
//! [`SheetStore`] is the only way the rest of the workspace talks to a spreadsheet: fetch a
//! range, append a row, overwrite a row, clear ranges, and list tabs. Authentication and
//! transport live entirely inside the backends.

pub mod backends;
pub mod error;
pub mod traits;

#[cfg(feature = "google")]
pub use backends::GoogleSheetsStore;
#[cfg(feature = "google")]
pub use backends::google::{DEFAULT_API_BASE, GoogleSheetsConfig};
pub use backends::MemoryStore;
pub use error::StoreError;
pub use traits::{
    AppendAck, ClearAck, Rows, Sheet, SheetProperties, SheetStore, SpreadsheetMetadata, UpdateAck,
};

// Re-export for convenience
pub use sheetapi_common::{A1Range, CellValue};
