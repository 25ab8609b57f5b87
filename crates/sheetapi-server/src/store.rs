use crate::config::{Config, StoreKind};
use anyhow::{Context, Result};
use sheetapi_common::{A1Range, CellValue};
use sheetapi_store::{
    AppendAck, ClearAck, GoogleSheetsConfig, GoogleSheetsStore, MemoryStore, Rows, SheetStore,
    SpreadsheetMetadata, StoreError, UpdateAck,
};

/// The backend picked at startup.
pub enum AnyStore {
    Google(GoogleSheetsStore),
    Memory(MemoryStore),
}

impl AnyStore {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.store {
            StoreKind::Google => {
                let access_token = config
                    .access_token
                    .clone()
                    .context("GOOGLE_ACCESS_TOKEN (or --access-token) is required for the google store")?;
                let store = GoogleSheetsStore::new(GoogleSheetsConfig {
                    access_token,
                    api_base: config.api_base.clone(),
                    timeout: config.request_timeout(),
                })?;
                Ok(AnyStore::Google(store))
            }
            StoreKind::Memory => {
                let store = match &config.seed {
                    Some(path) => MemoryStore::open_path(path)
                        .with_context(|| format!("failed to load seed {}", path.display()))?,
                    None => MemoryStore::new(),
                };
                Ok(AnyStore::Memory(store))
            }
        }
    }

    pub fn kind(&self) -> StoreKind {
        match self {
            AnyStore::Google(_) => StoreKind::Google,
            AnyStore::Memory(_) => StoreKind::Memory,
        }
    }
}

impl SheetStore for AnyStore {
    async fn fetch_range(&self, spreadsheet_id: &str, range: &A1Range) -> Result<Rows, StoreError> {
        match self {
            AnyStore::Google(store) => store.fetch_range(spreadsheet_id, range).await,
            AnyStore::Memory(store) => store.fetch_range(spreadsheet_id, range).await,
        }
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<AppendAck, StoreError> {
        match self {
            AnyStore::Google(store) => store.append_row(spreadsheet_id, range, values).await,
            AnyStore::Memory(store) => store.append_row(spreadsheet_id, range, values).await,
        }
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        range: &A1Range,
        values: Vec<CellValue>,
    ) -> Result<UpdateAck, StoreError> {
        match self {
            AnyStore::Google(store) => store.update_row(spreadsheet_id, range, values).await,
            AnyStore::Memory(store) => store.update_row(spreadsheet_id, range, values).await,
        }
    }

    async fn clear_ranges(
        &self,
        spreadsheet_id: &str,
        ranges: &[A1Range],
    ) -> Result<ClearAck, StoreError> {
        match self {
            AnyStore::Google(store) => store.clear_ranges(spreadsheet_id, ranges).await,
            AnyStore::Memory(store) => store.clear_ranges(spreadsheet_id, ranges).await,
        }
    }

    async fn fetch_metadata(&self, spreadsheet_id: &str) -> Result<SpreadsheetMetadata, StoreError> {
        match self {
            AnyStore::Google(store) => store.fetch_metadata(spreadsheet_id).await,
            AnyStore::Memory(store) => store.fetch_metadata(spreadsheet_id).await,
        }
    }
}
