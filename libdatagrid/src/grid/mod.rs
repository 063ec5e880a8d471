pub mod columns;
pub mod expansion;
pub mod handle;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod selection;
pub mod state;
pub mod view;

pub use columns::{ColumnDef, ColumnFile, ColumnSpec, FilterKind, FilterParams, infer_columns};
pub use expansion::ExpansionState;
pub use handle::GridHandle;
pub use interaction::{CellHighlight, HoverCell, RowInteraction};
pub use layout::{ColumnLayout, LayoutSettings, TextMeasure};
pub use model::{CellValue, ColumnKey, GridCell, GridRow, RowKey};
pub use options::{
    GridOptions, GridSize, GridTheme, RowExpandable, RowSelection, SelectCallback, SizeMetrics,
};
pub use pipeline::{
    FilterState, FilterValue, PageButton, PageInfo, Pagination, SortDirection, SortState,
    page_buttons, sort_indicator,
};
pub use selection::{
    HeaderCheckState, PageRowKey, SelectionManager, SharedSelection, format_selection_count,
};
pub use state::{DataGrid, PageRow};
pub use view::GridResponse;

#[cfg(test)]
mod tests;
