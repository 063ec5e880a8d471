use egui::RichText;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// Stable row identity for selection and expansion bookkeeping.
///
/// Hosts normally derive it from a row field through `RowSelection::get_row_id`.
/// Without one the grid falls back to the row's position in the filtered and
/// sorted set, which does not survive filter, sort or page size changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowKey {
    Num(i64),
    Str(String),
}

impl RowKey {
    /// Positional fallback key for the row at `position` in the processed set.
    #[must_use]
    pub fn positional(position: usize) -> Self {
        Self::Num(i64::try_from(position).unwrap_or(i64::MAX))
    }

    /// Key taken from a cell value, used when a host identifies rows by a field.
    #[must_use]
    pub fn from_cell(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(Self::Num(*n as i64)),
            CellValue::Null => None,
            other => Some(Self::Str(other.display())),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowKey {
    fn from(value: i64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for RowKey {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for RowKey {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Stable column identity, the name of the row field a column reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnKey(pub String);

impl ColumnKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Raw field value read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Structured value (object or array), kept as JSON.
    Object(Value),
}

impl CellValue {
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Object(value.clone()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// String form of the value. Null is empty, objects are JSON text and
    /// integral numbers have no fractional part.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::Text(s) => s.clone(),
            Self::Object(v) => v.to_string(),
        }
    }

    /// Lower-cased string form used by the filter stage.
    #[must_use]
    pub fn search_text(&self) -> String {
        self.display().to_lowercase()
    }

    /// Values nested one level inside an object or array.
    ///
    /// Multi-select filters match these for structured fields.
    #[must_use]
    pub fn members(&self) -> Vec<CellValue> {
        match self {
            Self::Object(Value::Object(map)) => map.values().map(CellValue::from_json).collect(),
            Self::Object(Value::Array(items)) => items.iter().map(CellValue::from_json).collect(),
            _ => vec![],
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Self::Bool(_) => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
            Self::Object(_) => 3,
            Self::Null => 4,
        }
    }

    /// Natural ordering between two values. Values of different kinds order
    /// by kind so the comparison stays total.
    #[must_use]
    pub fn natural_cmp(&self, other: &Self) -> Ordering {
        let (rank_a, rank_b) = (self.kind_rank(), other.kind_rank());
        if rank_a != rank_b {
            return rank_a.cmp(&rank_b);
        }

        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Object(a), Self::Object(b)) => a.to_string().cmp(&b.to_string()),
            _ => Ordering::Equal,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.is_nan() {
        "NaN".to_string()
    } else {
        n.to_string()
    }
}

/// A record the grid can display. The grid only reads fields, never writes.
pub trait GridRow {
    fn field(&self, key: &ColumnKey) -> CellValue;
}

impl GridRow for Map<String, Value> {
    fn field(&self, key: &ColumnKey) -> CellValue {
        self.get(key.as_str())
            .map_or(CellValue::Null, CellValue::from_json)
    }
}

impl GridRow for Value {
    fn field(&self, key: &ColumnKey) -> CellValue {
        match self {
            Value::Object(map) => map.field(key),
            _ => CellValue::Null,
        }
    }
}

/// Display-ready cell content.
#[derive(Debug, Clone)]
pub enum GridCell {
    Text(String),
    RichText(RichText),
}

impl GridCell {
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::RichText(rt) => rt.text().to_string(),
        }
    }
}

impl From<String> for GridCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for GridCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<RichText> for GridCell {
    fn from(value: RichText) -> Self {
        Self::RichText(value)
    }
}
