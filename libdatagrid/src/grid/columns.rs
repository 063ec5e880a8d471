use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::model::{CellValue, ColumnKey, GridCell, GridRow};

/// Custom cell renderer.
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> GridCell + Send + Sync>;
/// Row-dependent class name (space separated names are allowed).
pub type ClassFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Filter control shown under a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterKind {
    #[display("input")]
    Input,
    #[display("singleSelect")]
    SingleSelect,
    #[display("multiSelect")]
    MultiSelect,
    #[display("date")]
    Date,
    #[display("dateRange")]
    DateRange,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Explicit option list for select filters. When absent the options are
    /// derived from the data.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Display labels for option values.
    #[serde(default)]
    pub label_map: BTreeMap<String, String>,
}

impl FilterParams {
    #[must_use]
    pub fn label_for(&self, value: &str) -> String {
        self.label_map
            .get(value)
            .cloned()
            .unwrap_or_else(|| value.to_string())
    }
}

/// Column registry entry.
pub struct ColumnDef<T> {
    pub key: ColumnKey,
    pub header: String,
    pub sortable: bool,
    pub filter: Option<FilterKind>,
    pub filter_params: FilterParams,
    /// Static class name for every cell of the column.
    pub col_class: Option<String>,
    /// Class name computed per cell.
    pub col_class_params: Option<ClassFn<T>>,
    pub render: Option<CellRenderer<T>>,
    /// Initial visibility.
    pub column_visible: bool,
}

impl<T> ColumnDef<T> {
    pub fn new(key: impl Into<ColumnKey>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: false,
            filter: None,
            filter_params: FilterParams::default(),
            col_class: None,
            col_class_params: None,
            render: None,
            column_visible: true,
        }
    }

    #[must_use]
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    #[must_use]
    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.filter = Some(kind);
        self
    }

    #[must_use]
    pub fn filter_options<S: ToString>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.filter_params.options = Some(options.into_iter().map(|o| o.to_string()).collect());
        self
    }

    #[must_use]
    pub fn label_map<K: ToString, V: ToString>(
        mut self,
        labels: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.filter_params.label_map = labels
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    #[must_use]
    pub fn col_class(mut self, class: impl Into<String>) -> Self {
        self.col_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn col_class_params(mut self, class: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.col_class_params = Some(Arc::new(class));
        self
    }

    #[must_use]
    pub fn render<C: Into<GridCell>>(
        mut self,
        render: impl Fn(&T) -> C + Send + Sync + 'static,
    ) -> Self {
        self.render = Some(Arc::new(move |row| render(row).into()));
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.column_visible = false;
        self
    }

    /// Combined class names for a cell of this column.
    pub fn cell_class(&self, row: &T) -> String {
        let dynamic = self.col_class_params.as_ref().map(|class| class(row));
        [self.col_class.clone(), dynamic]
            .into_iter()
            .flatten()
            .filter(|class| !class.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<T: GridRow> ColumnDef<T> {
    #[must_use]
    pub fn raw(&self, row: &T) -> CellValue {
        row.field(&self.key)
    }

    /// Renderer output if present, else the raw value.
    #[must_use]
    pub fn cell(&self, row: &T) -> GridCell {
        match &self.render {
            Some(render) => render(row),
            None => GridCell::Text(self.raw(row).display()),
        }
    }

    #[must_use]
    pub fn cell_text(&self, row: &T) -> String {
        self.cell(row).text()
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            sortable: self.sortable,
            filter: self.filter,
            filter_params: self.filter_params.clone(),
            col_class: self.col_class.clone(),
            col_class_params: self.col_class_params.clone(),
            render: self.render.clone(),
            column_visible: self.column_visible,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filter", &self.filter)
            .field("filter_params", &self.filter_params)
            .field("col_class", &self.col_class)
            .field("col_class_params", &self.col_class_params.as_ref().map(|_| "..."))
            .field("render", &self.render.as_ref().map(|_| "..."))
            .field("column_visible", &self.column_visible)
            .finish()
    }
}

/// Serializable column description, used for column files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub key: String,
    pub header: String,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filter: Option<FilterKind>,
    #[serde(default)]
    pub filter_params: FilterParams,
    #[serde(default)]
    pub col_class: Option<String>,
    #[serde(default = "default_visible")]
    pub column_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Top level of a column file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFile {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnFile {
    pub fn from_toml(content: &str) -> eyre::Result<Self> {
        toml::from_str(content).map_err(|e| eyre::eyre!("Failed to parse column file: {e}"))
    }

    pub fn into_columns<T>(self) -> Vec<ColumnDef<T>> {
        self.columns.into_iter().map(ColumnDef::from).collect()
    }
}

impl<T> From<ColumnSpec> for ColumnDef<T> {
    fn from(spec: ColumnSpec) -> Self {
        Self {
            key: ColumnKey(spec.key),
            header: spec.header,
            sortable: spec.sortable,
            filter: spec.filter,
            filter_params: spec.filter_params,
            col_class: spec.col_class,
            col_class_params: None,
            render: None,
            column_visible: spec.column_visible,
        }
    }
}

/// Builds a sortable, text-filterable column for every field of the first row.
pub fn infer_columns(rows: &[Value]) -> Vec<ColumnDef<Value>> {
    let Some(Value::Object(first)) = rows.first() else {
        return vec![];
    };
    first
        .keys()
        .map(|key| {
            ColumnDef::new(key.as_str(), header_from_key(key))
                .sortable()
                .filter(FilterKind::Input)
        })
        .collect()
}

fn header_from_key(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
