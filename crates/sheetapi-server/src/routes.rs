use crate::error::{ApiError, Operation};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use sheetapi_common::A1Range;
use sheetapi_core::{
    Collection, CollectionRegistrar, Record, RowPayload, SheetApiError, SheetStore, fetch_records,
};
use sheetapi_store::StoreError;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state behind every route.
pub struct AppState<S> {
    registrar: CollectionRegistrar<S>,
    port: u16,
}

impl<S: SheetStore> AppState<S> {
    pub fn new(registrar: CollectionRegistrar<S>, port: u16) -> Self {
        Self { registrar, port }
    }

    pub fn registrar(&self) -> &CollectionRegistrar<S> {
        &self.registrar
    }

    fn collection(&self, title: &str) -> Result<Arc<Collection<S>>, ApiError> {
        self.registrar
            .resolve(title)
            .ok_or_else(|| ApiError::CollectionNotFound(title.to_string()))
    }
}

type SharedState<S> = State<Arc<AppState<S>>>;
type Body<T> = Result<Json<T>, JsonRejection>;

/// Static routes are matched before the `/{title}` captures, so a tab titled `fetch-sheet`
/// cannot be reached.
pub fn router<S: SheetStore>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(health::<S>).post(connect::<S>))
        .route("/fetch-sheet", post(fetch_sheet::<S>))
        .route("/{title}", get(list::<S>).post(create::<S>))
        .route(
            "/{title}/{field}/{id}",
            get(get_one::<S>).put(update::<S>).delete(delete::<S>),
        )
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest {
    spreadsheet_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FetchSheetRequest {
    spreadsheet_id: String,
    sheet_name: String,
}

#[derive(Deserialize)]
struct DataRequest {
    data: RowPayload,
}

async fn health<S: SheetStore>(State(state): SharedState<S>) -> Json<JsonValue> {
    Json(json!({ "msg": format!("Server running on port {}", state.port) }))
}

async fn connect<S: SheetStore>(
    State(state): SharedState<S>,
    body: Body<ConnectRequest>,
) -> Result<Json<JsonValue>, ApiError> {
    let Json(request) = body?;
    let connected = state
        .registrar
        .connect(&request.spreadsheet_url)
        .await
        .map_err(ApiError::during(Operation::Connect))?;
    info!(
        spreadsheet_id = %connected.metadata.spreadsheet_id,
        tabs = ?connected.registration.bound,
        replaced = connected.registration.replaced.len(),
        "spreadsheet connected"
    );
    Ok(Json(json!({
        "id": connected.metadata.spreadsheet_id,
        "sheets": connected.metadata.sheets,
    })))
}

async fn fetch_sheet<S: SheetStore>(
    State(state): SharedState<S>,
    body: Body<FetchSheetRequest>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let Json(request) = body?;
    let range = A1Range::parse(&request.sheet_name)
        .map_err(|err| SheetApiError::Store(StoreError::from(err)))
        .map_err(ApiError::during(Operation::FetchSheet))?;
    let records = fetch_records(
        state.registrar.store().as_ref(),
        &request.spreadsheet_id,
        &range,
    )
    .await
    .map_err(ApiError::during(Operation::FetchSheet))?;
    Ok(Json(records))
}

async fn list<S: SheetStore>(
    State(state): SharedState<S>,
    Path(title): Path<String>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let collection = state.collection(&title)?;
    let records = collection
        .list()
        .await
        .map_err(ApiError::during(Operation::List))?;
    Ok(Json(records))
}

async fn get_one<S: SheetStore>(
    State(state): SharedState<S>,
    Path((title, field, id)): Path<(String, String, String)>,
) -> Result<Json<Record>, ApiError> {
    let collection = state.collection(&title)?;
    let record = collection
        .get_one(&field, &id)
        .await
        .map_err(ApiError::during(Operation::GetOne))?;
    Ok(Json(record))
}

async fn create<S: SheetStore>(
    State(state): SharedState<S>,
    Path(title): Path<String>,
    body: Body<DataRequest>,
) -> Result<(StatusCode, Json<JsonValue>), ApiError> {
    let collection = state.collection(&title)?;
    let Json(request) = body?;
    let ack = collection
        .create(&request.data)
        .await
        .map_err(ApiError::during(Operation::Create))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "msg": "Record created successfully", "data": ack })),
    ))
}

async fn update<S: SheetStore>(
    State(state): SharedState<S>,
    Path((title, field, id)): Path<(String, String, String)>,
    body: Body<DataRequest>,
) -> Result<Json<JsonValue>, ApiError> {
    let collection = state.collection(&title)?;
    let Json(request) = body?;
    let ack = collection
        .update_one(&field, &id, &request.data)
        .await
        .map_err(ApiError::during(Operation::Update))?;
    Ok(Json(json!({ "msg": "Record updated successfully", "data": ack })))
}

async fn delete<S: SheetStore>(
    State(state): SharedState<S>,
    Path((title, field, id)): Path<(String, String, String)>,
) -> Result<Json<JsonValue>, ApiError> {
    let collection = state.collection(&title)?;
    let ack = collection
        .delete_one(&field, &id)
        .await
        .map_err(ApiError::during(Operation::Delete))?;
    Ok(Json(json!({ "msg": "Record deleted successfully", "data": ack })))
}
