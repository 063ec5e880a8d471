use tracing::{debug, info};

use crate::export::ExportRequest;
use crate::grid::{DataGrid, GridRow};
use crate::message::GridMessage;

impl<T: GridRow> DataGrid<T> {
    /// Applies one state transition.
    pub fn update(&mut self, message: GridMessage) {
        match message {
            GridMessage::SetGlobalFilter(text) => {
                self.filter.set_global(text);
                self.pagination.reset();
            }
            GridMessage::SetColumnFilter { column, value } => {
                self.filter.set_column(column, value);
                self.pagination.reset();
            }
            GridMessage::ClearColumnFilter(column) => {
                self.filter.clear_column(&column);
                self.pagination.reset();
            }
            GridMessage::SetSort(sort) => {
                self.sort = sort;
            }
            GridMessage::ToggleSort(column) => {
                let sortable = self
                    .columns()
                    .iter()
                    .any(|def| def.key == column && def.sortable);
                if sortable {
                    self.sort = self.sort.on_click(&column);
                } else {
                    debug!("Ignoring sort on column '{column}', it is not sortable");
                }
            }
            GridMessage::SetPage(page) => self.pagination.set_page(page),
            GridMessage::NextPage => {
                let total = self.processed().len();
                self.pagination.next(total);
            }
            GridMessage::PrevPage => self.pagination.prev(),
            GridMessage::SetPageSize(size) => self.pagination.set_page_size(size),
            GridMessage::ToggleRowSelected(key) => {
                if self.options.selection_enabled() {
                    self.selection.toggle(key);
                    self.notify_selection();
                }
            }
            GridMessage::TogglePageSelected(checked) => {
                if self.options.selection_enabled() && self.set_page_selected(checked) {
                    self.notify_selection();
                }
            }
            GridMessage::DeselectRow(key) => {
                if self.selection.deselect(&key) {
                    self.notify_selection();
                }
            }
            GridMessage::ClearSelectedRows => {
                if self.selection.clear() {
                    self.notify_selection();
                }
            }
            GridMessage::ToggleRowExpanded(key) => {
                self.expansion.toggle(key);
            }
            GridMessage::ResizeColumn { column, delta } => {
                self.layout.resize_by(&column, delta);
            }
            GridMessage::AutoSizeColumn { column, measured } => {
                let header = self
                    .columns()
                    .iter()
                    .find(|def| def.key == column)
                    .map(|def| def.header.clone())
                    .unwrap_or_default();
                let width = self.layout.auto_size(&column, &measured, &header);
                debug!("Auto-sized column '{column}' to {width:.0}px");
            }
            GridMessage::ToggleColumnVisibility(column) => {
                self.layout.toggle_visibility(&column);
            }
            GridMessage::RowClicked {
                key,
                data_index,
                at,
            } => {
                if self.interaction.register_click(key, at) {
                    self.fire_double_click(data_index);
                }
            }
            GridMessage::HoverCell { row, column } => {
                if self.row_col_highlight {
                    self.interaction
                        .set_hover(crate::grid::HoverCell { row, column });
                }
            }
            GridMessage::ClearHover => self.interaction.clear_hover(),
            GridMessage::SetGridSize(size) => self.grid_size = size,
            GridMessage::Export(format) => {
                let table = self.export_table();
                info!(
                    "Preparing {format} export of {} rows and {} columns",
                    table.row_count(),
                    table.column_count()
                );
                self.pending_export = Some(ExportRequest { format, table });
            }
        }
    }
}
