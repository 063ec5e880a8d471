use std::time::{Duration, Instant};

use super::model::{ColumnKey, RowKey};

/// Default window for two clicks to count as a double click (milliseconds).
pub const DOUBLE_CLICK_MS: u64 = 250;

/// Body cell under the pointer, by row position on the page and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverCell {
    pub row: usize,
    pub column: ColumnKey,
}

/// Highlight applied to a body cell while hover highlighting is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellHighlight {
    None,
    /// Same row or column as the hovered cell.
    Line,
    /// The hovered cell itself.
    Cell,
}

/// Click timing and highlight state for body rows.
#[derive(Debug, Clone)]
pub struct RowInteraction {
    double_click_window: Duration,
    last_click: Option<(RowKey, Instant)>,
    highlighted: Option<RowKey>,
    hover: Option<HoverCell>,
}

impl Default for RowInteraction {
    fn default() -> Self {
        Self::new(Duration::from_millis(DOUBLE_CLICK_MS))
    }
}

impl RowInteraction {
    #[must_use]
    pub fn new(double_click_window: Duration) -> Self {
        Self {
            double_click_window,
            last_click: None,
            highlighted: None,
            hover: None,
        }
    }

    /// Records a click on `key` at `now`. Returns true when it completes a
    /// double click, in which case the row becomes the highlighted row.
    /// Accepts `now` for deterministic testing.
    pub fn register_click(&mut self, key: RowKey, now: Instant) -> bool {
        let previous = self.last_click.replace((key.clone(), now));
        let is_double = previous.is_some_and(|(last_key, last)| {
            last_key == key && now.saturating_duration_since(last) < self.double_click_window
        });
        if is_double {
            self.highlighted = Some(key);
        }
        is_double
    }

    #[must_use]
    pub fn highlighted(&self) -> Option<&RowKey> {
        self.highlighted.as_ref()
    }

    /// The double-click highlight yields to the selection highlight.
    #[must_use]
    pub fn shows_double_click(&self, key: &RowKey, selection_enabled: bool, selected: bool) -> bool {
        self.highlighted.as_ref() == Some(key) && (!selection_enabled || !selected)
    }

    pub fn set_hover(&mut self, cell: HoverCell) {
        self.hover = Some(cell);
    }

    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverCell> {
        self.hover.as_ref()
    }

    #[must_use]
    pub fn cell_highlight(&self, row: usize, column: &ColumnKey) -> CellHighlight {
        match &self.hover {
            Some(hover) if hover.row == row && &hover.column == column => CellHighlight::Cell,
            Some(hover) if hover.row == row || &hover.column == column => CellHighlight::Line,
            _ => CellHighlight::None,
        }
    }

    /// Forgets click history and highlights, used when the row set is replaced.
    pub fn reset(&mut self) {
        self.last_click = None;
        self.highlighted = None;
        self.hover = None;
    }
}
