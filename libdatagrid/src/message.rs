use std::time::Instant;

use crate::export::ExportFormat;
use crate::grid::{ColumnKey, FilterValue, GridSize, RowKey, SortState};

/// Every state transition of a grid. The view collects these while drawing
/// and applies them afterwards through `DataGrid::update`.
#[derive(Debug, Clone, PartialEq)]
pub enum GridMessage {
    SetGlobalFilter(String),
    /// An empty value removes the column's filter.
    SetColumnFilter {
        column: ColumnKey,
        value: FilterValue,
    },
    ClearColumnFilter(ColumnKey),
    SetSort(SortState),
    /// Header click. Ignored for columns that are not sortable.
    ToggleSort(ColumnKey),
    SetPage(usize),
    NextPage,
    PrevPage,
    SetPageSize(usize),
    ToggleRowSelected(RowKey),
    /// Header checkbox of the current page.
    TogglePageSelected(bool),
    DeselectRow(RowKey),
    ClearSelectedRows,
    ToggleRowExpanded(RowKey),
    ResizeColumn {
        column: ColumnKey,
        delta: f32,
    },
    /// Measured widths of the column's rendered cells.
    AutoSizeColumn {
        column: ColumnKey,
        measured: Vec<f32>,
    },
    ToggleColumnVisibility(ColumnKey),
    /// Primary click on a body row, used for double-click detection.
    RowClicked {
        key: RowKey,
        data_index: usize,
        at: Instant,
    },
    HoverCell {
        row: usize,
        column: ColumnKey,
    },
    ClearHover,
    SetGridSize(GridSize),
    Export(ExportFormat),
}
