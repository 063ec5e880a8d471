use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::warn;

use crate::config::GridSettings;
use crate::export::{ExportRequest, ExportTable};
use crate::message::GridMessage;

use super::columns::{ColumnDef, FilterKind};
use super::expansion::ExpansionState;
use super::handle::GridHandle;
use super::interaction::RowInteraction;
use super::layout::ColumnLayout;
use super::model::{ColumnKey, GridRow, RowKey};
use super::options::{GridOptions, GridSize};
use super::pipeline::{
    FilterState, PageInfo, Pagination, PipelineCache, PipelineKey, SortState, select_options,
};
use super::selection::{HeaderCheckState, PageRowKey, SelectionManager, format_selection_count};

/// Row shown on the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    /// Index into the grid's row set.
    pub data_index: usize,
    /// Position within the filtered and sorted rows.
    pub position: usize,
    pub key: RowKey,
    pub selectable: bool,
}

/// A data grid over an in-memory row set.
///
/// Rows are never mutated. Filtering and sorting produce an index order that
/// is cached until the data, the columns, the filters or the sort change.
pub struct DataGrid<T> {
    rows: Vec<T>,
    columns: Vec<ColumnDef<T>>,
    pub(crate) options: GridOptions<T>,
    pub(crate) settings: GridSettings,
    data_generation: u64,
    pub(crate) columns_generation: u64,
    pub(crate) filter: FilterState,
    pub(crate) sort: SortState,
    pub(crate) pagination: Pagination,
    pub(crate) selection: SelectionManager,
    pub(crate) expansion: ExpansionState,
    pub(crate) layout: ColumnLayout,
    pub(crate) interaction: RowInteraction,
    pub(crate) grid_size: GridSize,
    pub(crate) row_col_highlight: bool,
    cache: PipelineCache,
    option_cache: HashMap<ColumnKey, Arc<Vec<String>>>,
    pub(crate) pending_export: Option<ExportRequest>,
    command_sender: Sender<GridMessage>,
    commands: Receiver<GridMessage>,
    pub(crate) id: egui::Id,
}

impl<T: GridRow> DataGrid<T> {
    pub fn new(rows: Vec<T>, columns: Vec<ColumnDef<T>>, options: GridOptions<T>) -> Self {
        Self::with_settings(rows, columns, options, GridSettings::default())
    }

    pub fn with_settings(
        rows: Vec<T>,
        columns: Vec<ColumnDef<T>>,
        options: GridOptions<T>,
        settings: GridSettings,
    ) -> Self {
        let (command_sender, commands) = channel();
        let selection = options
            .selected_row_keys
            .clone()
            .map_or_else(SelectionManager::internal, SelectionManager::external);
        let grid_size = options
            .theme
            .as_ref()
            .map_or(settings.grid_size, |theme| theme.grid_size());

        Self {
            pagination: Pagination::new(options.page_size, options.pagination),
            layout: ColumnLayout::new(&columns, settings.layout.clone()),
            interaction: RowInteraction::new(settings.double_click_window),
            row_col_highlight: options.row_col_highlight || settings.row_col_highlight,
            grid_size,
            selection,
            rows,
            columns,
            options,
            settings,
            data_generation: 0,
            columns_generation: 0,
            filter: FilterState::default(),
            sort: SortState::default(),
            expansion: ExpansionState::default(),
            cache: PipelineCache::default(),
            option_cache: HashMap::new(),
            pending_export: None,
            command_sender,
            commands,
            id: egui::Id::new("datagrid"),
        }
    }

    /// Distinguishes several grids in one egui context.
    #[must_use]
    pub fn with_id_salt(mut self, salt: impl std::hash::Hash) -> Self {
        self.id = egui::Id::new(salt);
        self
    }

    /// Replaces the row set. Selection and expansion keys are kept.
    pub fn set_data(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.data_generation += 1;
        self.option_cache.clear();
        self.interaction.reset();
    }

    /// Replaces the column registry and resets everything derived from it.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<T>>) {
        self.layout = ColumnLayout::new(&columns, self.settings.layout.clone());
        self.columns = columns;
        self.columns_generation += 1;
        self.filter.clear();
        self.sort = SortState::default();
        self.expansion.clear();
        self.pagination.reset();
        self.option_cache.clear();
        self.interaction.reset();
    }

    #[must_use]
    pub fn handle(&self) -> GridHandle {
        GridHandle::new(self.command_sender.clone())
    }

    /// Applies commands queued through [`GridHandle`]s.
    pub fn process_pending(&mut self) {
        let pending: Vec<GridMessage> = self.commands.try_iter().collect();
        for message in pending {
            self.update(message);
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    #[must_use]
    pub fn options(&self) -> &GridOptions<T> {
        &self.options
    }

    #[must_use]
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    #[must_use]
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    #[must_use]
    pub fn interaction(&self) -> &RowInteraction {
        &self.interaction
    }

    #[must_use]
    pub fn grid_size(&self) -> GridSize {
        self.grid_size
    }

    #[must_use]
    pub fn row_col_highlight(&self) -> bool {
        self.row_col_highlight
    }

    #[must_use]
    pub fn selected_keys(&self) -> BTreeSet<RowKey> {
        self.selection.keys()
    }

    #[must_use]
    pub fn is_selected(&self, key: &RowKey) -> bool {
        self.selection.contains(key)
    }

    /// Whether a page row gets the selection highlight. Unselectable rows
    /// never do, even when a host-owned set holds their key.
    #[must_use]
    pub fn shows_selected(&self, row: &PageRow) -> bool {
        self.options.selection_enabled() && row.selectable && self.selection.contains(&row.key)
    }

    /// Number of filter and sort rebuilds so far.
    #[must_use]
    pub fn pipeline_builds(&self) -> u64 {
        self.cache.builds()
    }

    /// Export waiting to be written, if the user asked for one.
    pub fn take_export(&mut self) -> Option<ExportRequest> {
        self.pending_export.take()
    }

    fn pipeline_key(&self) -> PipelineKey {
        PipelineKey {
            data_generation: self.data_generation,
            columns_generation: self.columns_generation,
            filter: self.filter.clone(),
            sort: self.sort.clone(),
        }
    }

    /// Filtered and sorted row indices, before pagination.
    pub fn processed(&mut self) -> Arc<Vec<usize>> {
        let key = self.pipeline_key();
        self.cache.get_or_build(&key, &self.rows, &self.columns)
    }

    /// Key of the row at `data_index`, sitting at `position` in the processed rows.
    ///
    /// Without an identity function the key is the position, so it follows
    /// the slot rather than the record.
    #[must_use]
    pub fn row_key(&self, data_index: usize, position: usize) -> RowKey {
        let get_row_id = self
            .options
            .row_selection
            .as_ref()
            .and_then(|selection| selection.get_row_id.as_ref());
        match (get_row_id, self.rows.get(data_index)) {
            (Some(get_row_id), Some(row)) => get_row_id(row),
            _ => RowKey::positional(position),
        }
    }

    fn is_row_selectable(&self, data_index: usize) -> bool {
        self.rows
            .get(data_index)
            .is_some_and(|row| self.options.is_selectable(row))
    }

    pub fn page_info(&mut self) -> PageInfo {
        let total = self.processed().len();
        self.pagination.info(total)
    }

    /// Rows of the current page, or every processed row without pagination.
    pub fn page_rows(&mut self) -> Vec<PageRow> {
        let order = self.processed();
        let range = self.pagination.page_range(order.len());
        order[range.clone()]
            .iter()
            .zip(range)
            .map(|(&data_index, position)| PageRow {
                data_index,
                position,
                key: self.row_key(data_index, position),
                selectable: self.is_row_selectable(data_index),
            })
            .collect()
    }

    fn page_row_keys(&mut self) -> Vec<PageRowKey> {
        self.page_rows()
            .into_iter()
            .map(|row| PageRowKey {
                key: row.key,
                selectable: row.selectable,
            })
            .collect()
    }

    pub fn header_check_state(&mut self) -> HeaderCheckState {
        let page = self.page_row_keys();
        self.selection.header_state(&page)
    }

    pub(crate) fn set_page_selected(&mut self, checked: bool) -> bool {
        let page = self.page_row_keys();
        self.selection.set_page(&page, checked)
    }

    /// Keys of all processed rows, in processed order.
    fn processed_keys(&mut self) -> Vec<(usize, RowKey)> {
        let order = self.processed();
        order
            .iter()
            .enumerate()
            .map(|(position, &data_index)| (data_index, self.row_key(data_index, position)))
            .collect()
    }

    /// Selected keys and row indices that pass the filters and are selectable,
    /// in processed order. Stale keys stay in the set but are left out here.
    pub fn emitted_selection(&mut self) -> (Vec<RowKey>, Vec<usize>) {
        self.processed_keys()
            .into_iter()
            .filter(|(data_index, key)| {
                self.selection.contains(key) && self.is_row_selectable(*data_index)
            })
            .map(|(data_index, key)| (key, data_index))
            .unzip()
    }

    /// "N selected", with the number of selected keys hidden by filters.
    pub fn selection_summary(&mut self) -> String {
        let visible: HashSet<RowKey> = self
            .processed_keys()
            .into_iter()
            .map(|(_, key)| key)
            .collect();
        format_selection_count(self.selection.len(), self.selection.count_hidden(&visible))
    }

    /// Hands the emitted selection to both host callbacks.
    pub(crate) fn notify_selection(&mut self) {
        if self.options.row_selection.is_none() && self.options.on_row_selected.is_none() {
            return;
        }
        let (keys, indices) = self.emitted_selection();
        let rows: Vec<&T> = indices.iter().filter_map(|&i| self.rows.get(i)).collect();

        if let Some(selection) = self.options.row_selection.as_mut()
            && let Some(on_select) = selection.on_select.as_mut()
        {
            on_select(&keys, &rows);
        }
        if let Some(on_row_selected) = self.options.on_row_selected.as_mut() {
            on_row_selected(&keys, &rows);
        }
    }

    pub(crate) fn fire_double_click(&mut self, data_index: usize) {
        if let Some(callback) = self.options.on_row_double_click.as_mut()
            && let Some(row) = self.rows.get(data_index)
        {
            callback(row);
        }
    }

    /// Indices of visible columns in display order.
    #[must_use]
    pub fn visible_columns(&self) -> Vec<usize> {
        self.layout.visible_columns(&self.columns)
    }

    /// Options for a select filter, derived from the data when the column
    /// has none. Computed once per data generation.
    pub fn select_options(&mut self, column: &ColumnKey) -> Arc<Vec<String>> {
        if let Some(options) = self.option_cache.get(column) {
            return Arc::clone(options);
        }
        let Some(def) = self.columns.iter().find(|def| &def.key == column) else {
            return Arc::default();
        };

        let options = select_options(def, &self.rows);
        if options.is_empty() && def.filter_params.options.is_none() && !self.rows.is_empty() {
            warn!(
                "[DataGrid] Column '{}' ({}) fallback yielded no options from data.",
                def.key,
                def.filter.unwrap_or(FilterKind::SingleSelect)
            );
        }
        let options = Arc::new(options);
        self.option_cache.insert(column.clone(), Arc::clone(&options));
        options
    }

    /// The filtered, sorted and unpaginated rows over the visible columns.
    pub fn export_table(&mut self) -> ExportTable {
        let order = self.processed();
        let columns: Vec<&ColumnDef<T>> = self
            .visible_columns()
            .into_iter()
            .map(|index| &self.columns[index])
            .collect();
        ExportTable::build(&self.rows, &order, &columns)
    }
}
