//! Spreadsheet tabs as JSON collections.
//!
//! A tab's first row is its only schema. [`Grid`] splits fetched rows into that header and
//! the data rows, [`Record`]s are materialized per request, and a [`Collection`] runs the
//! list/get/create/update/delete flow for one tab against any [`SheetStore`]. The
//! [`CollectionRegistrar`] owns the table of bound tabs that a transport dispatches through.

mod collection;
mod error;
mod grid;
mod locator;
mod lookup;
mod registrar;

pub use collection::{Collection, fetch_records};
pub use error::{GridError, PayloadError, SheetApiError};
pub use grid::{Grid, Header, Record, RowPayload, cell_from_json, to_records, to_values};
pub use locator::extract_spreadsheet_id;
pub use lookup::{StoreRow, find_by_field, find_index_by_field, resolve_store_row_range};
pub use registrar::{CollectionRegistrar, Connected, Registration, RegistrationPolicy};

pub use sheetapi_store::SheetStore;
