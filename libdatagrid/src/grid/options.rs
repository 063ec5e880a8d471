use derive_more::{Display, FromStr};
use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::columns::ClassFn;
use super::model::RowKey;
use super::selection::SharedSelection;

/// Host callback receiving the emitted selection.
pub type SelectCallback<T> = Box<dyn FnMut(&[RowKey], &[&T])>;
/// Draws the detail content of an expanded row.
pub type DetailRenderer<T> = Arc<dyn Fn(&mut egui::Ui, &T) + Send + Sync>;

/// Cell density token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, FromStr, Sequence, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GridSize {
    #[display("xs")]
    Xs,
    #[display("sm")]
    Sm,
    #[default]
    #[display("md")]
    Md,
    #[display("lg")]
    Lg,
}

/// Font and spacing derived from a [`GridSize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeMetrics {
    pub font_size: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl SizeMetrics {
    #[must_use]
    pub fn row_height(&self) -> f32 {
        self.font_size + 2.0 * self.padding_y + 4.0
    }
}

impl GridSize {
    #[must_use]
    pub fn metrics(self) -> SizeMetrics {
        let (font_size, padding_x, padding_y) = match self {
            Self::Xs => (10.0, 4.0, 4.0),
            Self::Sm => (12.0, 8.0, 6.0),
            Self::Md => (14.0, 12.0, 8.0),
            Self::Lg => (18.0, 12.0, 8.0),
        };
        SizeMetrics {
            font_size,
            padding_x,
            padding_y,
        }
    }
}

/// Theme input: a bare size token or a layout object carrying one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridTheme {
    Size(GridSize),
    Layouts { layouts: ThemeLayouts },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeLayouts {
    #[serde(default)]
    pub grid_size: Option<GridSize>,
}

impl GridTheme {
    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        match self {
            Self::Size(size) => *size,
            Self::Layouts { layouts } => layouts.grid_size.unwrap_or_default(),
        }
    }
}

/// Row selection configuration.
pub struct RowSelection<T> {
    pub enabled: bool,
    /// Stable identity. Without it rows are keyed by position, which does not
    /// survive filtering, sorting or page size changes.
    pub get_row_id: Option<Arc<dyn Fn(&T) -> RowKey + Send + Sync>>,
    pub on_select: Option<SelectCallback<T>>,
    /// Rows for which this returns false get no checkbox and are never emitted.
    pub is_selectable: Option<Arc<dyn Fn(&T) -> bool + Send + Sync>>,
}

impl<T> Default for RowSelection<T> {
    fn default() -> Self {
        Self {
            enabled: true,
            get_row_id: None,
            on_select: None,
            is_selectable: None,
        }
    }
}

impl<T> RowSelection<T> {
    #[must_use]
    pub fn with_row_id(mut self, get_row_id: impl Fn(&T) -> RowKey + Send + Sync + 'static) -> Self {
        self.get_row_id = Some(Arc::new(get_row_id));
        self
    }

    #[must_use]
    pub fn with_selectable(mut self, is_selectable: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.is_selectable = Some(Arc::new(is_selectable));
        self
    }

    #[must_use]
    pub fn on_select(mut self, callback: impl FnMut(&[RowKey], &[&T]) + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn is_selectable(&self, row: &T) -> bool {
        self.is_selectable
            .as_ref()
            .is_none_or(|is_selectable| is_selectable(row))
    }
}

/// Expandable row configuration.
pub struct RowExpandable<T> {
    pub enabled: bool,
    pub render: DetailRenderer<T>,
    /// Height reserved for the detail line.
    pub detail_height: f32,
}

impl<T> RowExpandable<T> {
    pub fn new(render: impl Fn(&mut egui::Ui, &T) + Send + Sync + 'static) -> Self {
        Self {
            enabled: true,
            render: Arc::new(render),
            detail_height: 48.0,
        }
    }
}

/// Grid configuration supplied by the host.
pub struct GridOptions<T> {
    pub page_size: usize,
    pub pagination: bool,
    /// Show the global search box.
    pub input_filter: bool,
    pub row_expandable: Option<RowExpandable<T>>,
    pub row_selection: Option<RowSelection<T>>,
    pub row_class: Option<ClassFn<T>>,
    pub columns_visible_option: bool,
    pub data_export: bool,
    pub row_col_highlight: bool,
    pub theme: Option<GridTheme>,
    pub on_row_double_click: Option<Box<dyn FnMut(&T)>>,
    /// Fires with the selection restricted to rows passing the filters.
    pub on_row_selected: Option<SelectCallback<T>>,
    /// Host-owned selection set; when absent the grid keeps its own.
    pub selected_row_keys: Option<SharedSelection>,
}

impl<T> Default for GridOptions<T> {
    fn default() -> Self {
        Self {
            page_size: 10,
            pagination: true,
            input_filter: true,
            row_expandable: None,
            row_selection: None,
            row_class: None,
            columns_visible_option: false,
            data_export: false,
            row_col_highlight: false,
            theme: None,
            on_row_double_click: None,
            on_row_selected: None,
            selected_row_keys: None,
        }
    }
}

impl<T> GridOptions<T> {
    #[must_use]
    pub fn selection_enabled(&self) -> bool {
        self.row_selection
            .as_ref()
            .is_some_and(|selection| selection.enabled)
    }

    #[must_use]
    pub fn expansion_enabled(&self) -> bool {
        self.row_expandable
            .as_ref()
            .is_some_and(|expandable| expandable.enabled)
    }

    #[must_use]
    pub fn is_selectable(&self, row: &T) -> bool {
        self.row_selection
            .as_ref()
            .is_none_or(|selection| selection.is_selectable(row))
    }
}
