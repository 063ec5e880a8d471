pub mod config;
pub mod export;
pub mod grid;
pub mod grid_controller;
pub mod logs;
pub mod message;

pub use config::GridConfig;
pub use export::{ExportError, ExportFormat, ExportRequest, ExportSettings, ExportTable};
pub use grid::{
    CellValue, ColumnDef, ColumnKey, DataGrid, FilterKind, FilterState, FilterValue, GridCell,
    GridHandle, GridOptions, GridResponse, GridRow, GridSize, GridTheme, RowExpandable, RowKey,
    RowSelection, SortDirection, SortState,
};
pub use message::GridMessage;
