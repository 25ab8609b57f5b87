use crate::error::{GridError, PayloadError};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use sheetapi_common::CellValue;
use sheetapi_store::Rows;

/// Ordered field names from row 1 of a tab. Names are not required to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header(Vec<String>);

impl Header {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Header cells are names whatever their stored type (`2024` becomes `"2024"`).
    pub fn from_cells(cells: &[CellValue]) -> Self {
        Self(cells.iter().map(ToString::to_string).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First column carrying `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }
}

/// A fetched tab split into its header and data rows.
///
/// Column position is the only binding between a header name and a cell; data rows may be
/// shorter (or longer) than the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    header: Header,
    rows: Rows,
}

impl Grid {
    pub fn from_rows(mut rows: Rows) -> Result<Self, GridError> {
        if rows.is_empty() {
            return Err(GridError::MissingHeader);
        }
        let data = rows.split_off(1);
        let header = Header::from_cells(&rows[0]);
        if header.is_empty() {
            return Err(GridError::BlankHeader);
        }
        Ok(Self { header, rows: data })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn data_rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| Record::from_row(&self.header, row))
            .collect()
    }
}

/// One data row keyed by header name.
///
/// Keys keep header order. A cell missing from a short row is absent (`None`), which
/// serializes as `null`. When a name repeats in the header, the later column's cell wins
/// and the key stays at its first position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Option<CellValue>)>,
}

impl Record {
    pub fn from_row(header: &Header, row: &[CellValue]) -> Self {
        let mut fields: Vec<(String, Option<CellValue>)> = Vec::with_capacity(header.len());
        for (idx, name) in header.names().iter().enumerate() {
            let cell = row.get(idx).cloned();
            match fields.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, slot)) => *slot = cell,
                None => fields.push((name.clone(), cell)),
            }
        }
        Self { fields }
    }

    /// Cell stored under `field`; `None` when the field is unknown or the cell is absent.
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, cell)| cell.as_ref())
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&CellValue>)> {
        self.fields
            .iter()
            .map(|(name, cell)| (name.as_str(), cell.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exact match of `field`'s stringified cell against `value`. Absent cells never match.
    pub fn field_matches(&self, field: &str, value: &str) -> bool {
        self.get(field).is_some_and(|cell| cell.matches_text(value))
    }

    /// Project back onto `header` order; absent cells become `Empty`.
    pub fn to_values(&self, header: &Header) -> Vec<CellValue> {
        header
            .names()
            .iter()
            .map(|name| self.get(name).cloned().unwrap_or_default())
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, cell) in &self.fields {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// A row supplied by a client for create/update.
///
/// `Ordered` values are written positionally, exactly as given. `Fields` are projected
/// through the sheet's header so the client's key order never matters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RowPayload {
    Ordered(Vec<JsonValue>),
    Fields(Map<String, JsonValue>),
}

impl RowPayload {
    pub fn needs_header(&self) -> bool {
        matches!(self, RowPayload::Fields(_))
    }
}

impl From<&Record> for RowPayload {
    fn from(record: &Record) -> Self {
        let fields = record
            .fields()
            .map(|(name, cell)| {
                let value = match cell {
                    None | Some(CellValue::Empty) => JsonValue::Null,
                    Some(CellValue::Int(i)) => JsonValue::from(*i),
                    Some(CellValue::Number(n)) => JsonValue::from(*n),
                    Some(CellValue::Boolean(b)) => JsonValue::Bool(*b),
                    Some(CellValue::Text(s)) => JsonValue::String(s.clone()),
                };
                (name.to_string(), value)
            })
            .collect();
        RowPayload::Fields(fields)
    }
}

/// JSON scalar to cell. Nested arrays/objects are stored as their JSON text.
pub fn cell_from_json(value: &JsonValue) -> CellValue {
    match value {
        JsonValue::Null => CellValue::Empty,
        JsonValue::Bool(b) => CellValue::Boolean(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Int(i),
            None => CellValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => CellValue::Text(s.clone()),
        nested => CellValue::Text(nested.to_string()),
    }
}

pub fn to_records(grid: &Grid) -> Vec<Record> {
    grid.to_records()
}

/// Turn a client row into cells for `header`.
///
/// Header columns missing from a `Fields` payload become `Empty`; a key that names no
/// header column is rejected rather than silently dropped.
pub fn to_values(payload: &RowPayload, header: &Header) -> Result<Vec<CellValue>, PayloadError> {
    match payload {
        RowPayload::Ordered(values) => Ok(values.iter().map(cell_from_json).collect()),
        RowPayload::Fields(fields) => {
            if let Some(unknown) = fields.keys().find(|key| header.position(key).is_none()) {
                return Err(PayloadError::UnknownField(unknown.clone()));
            }
            Ok(header
                .names()
                .iter()
                .map(|name| fields.get(name).map(cell_from_json).unwrap_or_default())
                .collect())
        }
    }
}
