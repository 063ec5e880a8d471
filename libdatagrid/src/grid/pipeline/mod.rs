mod filter;
mod paginate;
mod sort;

pub use filter::{
    FilterState, FilterValue, filter_rows, parse_date_prefix, search_options, select_options,
};
pub use paginate::{PageButton, PageInfo, Pagination, page_buttons, total_pages};
pub use sort::{SortDirection, SortState, compare_for_sort, sort_indicator, sort_rows};

use std::sync::Arc;
use tracing::debug;

use super::columns::ColumnDef;
use super::model::GridRow;

/// Everything the filtered and sorted row order depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub data_generation: u64,
    pub columns_generation: u64,
    pub filter: FilterState,
    pub sort: SortState,
}

/// Memoized filter and sort output, as indices into the row set.
#[derive(Debug, Default)]
pub struct PipelineCache {
    key: Option<PipelineKey>,
    indices: Arc<Vec<usize>>,
    builds: u64,
}

impl PipelineCache {
    /// Returns the cached order for `key`, rebuilding only when the key changed.
    pub fn get_or_build<T: GridRow>(
        &mut self,
        key: &PipelineKey,
        rows: &[T],
        columns: &[ColumnDef<T>],
    ) -> Arc<Vec<usize>> {
        if self.key.as_ref() != Some(key) {
            let indices = build_pipeline(rows, columns, &key.filter, &key.sort);
            debug!(
                "Rebuilt grid pipeline: {} of {} rows pass",
                indices.len(),
                rows.len()
            );
            self.indices = Arc::new(indices);
            self.key = Some(key.clone());
            self.builds += 1;
        }
        Arc::clone(&self.indices)
    }

    /// Number of rebuilds so far.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

/// Filter stage followed by the sort stage.
pub fn build_pipeline<T: GridRow>(
    rows: &[T],
    columns: &[ColumnDef<T>],
    filter: &FilterState,
    sort: &SortState,
) -> Vec<usize> {
    let mut indices = filter_rows(rows, columns, filter);
    sort_rows(rows, &mut indices, sort);
    indices
}
