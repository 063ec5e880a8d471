use serde::Deserialize;
use std::collections::HashMap;

use super::columns::ColumnDef;
use super::model::{ColumnKey, GridRow};

/// Width limits and auto-size constants.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutSettings {
    pub min_column_width: f32,
    /// `None` leaves widths unbounded above.
    #[serde(default)]
    pub max_column_width: Option<f32>,
    pub default_column_width: f32,
    pub header_char_width: f32,
    pub auto_size_padding: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            min_column_width: 50.0,
            max_column_width: Some(500.0),
            default_column_width: 150.0,
            header_char_width: 8.0,
            auto_size_padding: 20.0,
        }
    }
}

impl LayoutSettings {
    #[must_use]
    pub fn clamp(&self, width: f32) -> f32 {
        let width = width.max(self.min_column_width);
        match self.max_column_width {
            Some(max) => width.min(max.max(self.min_column_width)),
            None => width,
        }
    }
}

/// Measures rendered text width. Implemented on top of the UI font system in
/// the view and with fixed metrics in tests.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
}

/// Width of every rendered cell of `column` among `rows`.
pub fn measure_column<'a, T: GridRow + 'a>(
    column: &ColumnDef<T>,
    rows: impl IntoIterator<Item = &'a T>,
    measure: &dyn TextMeasure,
) -> Vec<f32> {
    rows.into_iter()
        .map(|row| measure.text_width(&column.cell_text(row)))
        .collect()
}

/// Per-column widths and visibility. Lives as long as the grid instance.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    settings: LayoutSettings,
    widths: HashMap<ColumnKey, f32>,
    visible: HashMap<ColumnKey, bool>,
}

impl ColumnLayout {
    pub fn new<T>(columns: &[ColumnDef<T>], settings: LayoutSettings) -> Self {
        Self {
            settings,
            widths: HashMap::new(),
            visible: columns
                .iter()
                .map(|column| (column.key.clone(), column.column_visible))
                .collect(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    #[must_use]
    pub fn width(&self, key: &ColumnKey) -> Option<f32> {
        self.widths.get(key).copied()
    }

    #[must_use]
    pub fn width_or_default(&self, key: &ColumnKey) -> f32 {
        self.width(key)
            .unwrap_or(self.settings.default_column_width)
    }

    /// True until the column has been sized once.
    #[must_use]
    pub fn needs_auto_size(&self, key: &ColumnKey) -> bool {
        !self.widths.contains_key(key)
    }

    /// Applies a drag delta and returns the clamped width.
    pub fn resize_by(&mut self, key: &ColumnKey, delta: f32) -> f32 {
        let width = self.settings.clamp(self.width_or_default(key) + delta);
        self.widths.insert(key.clone(), width);
        width
    }

    pub fn set_width(&mut self, key: &ColumnKey, width: f32) -> f32 {
        let width = self.settings.clamp(width);
        self.widths.insert(key.clone(), width);
        width
    }

    /// Sizes a column to its widest measured cell, falling back to the header
    /// length when nothing was measured, plus padding.
    pub fn auto_size(&mut self, key: &ColumnKey, measured: &[f32], header: &str) -> f32 {
        let header_width = header.chars().count() as f32 * self.settings.header_char_width;
        let content = measured.iter().copied().fold(header_width, f32::max);
        self.set_width(key, content + self.settings.auto_size_padding)
    }

    #[must_use]
    pub fn is_visible(&self, key: &ColumnKey) -> bool {
        self.visible.get(key).copied().unwrap_or(true)
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, key: &ColumnKey) -> bool {
        let visible = !self.is_visible(key);
        self.visible.insert(key.clone(), visible);
        visible
    }

    /// Indices of visible columns in registry order.
    pub fn visible_columns<T>(&self, columns: &[ColumnDef<T>]) -> Vec<usize> {
        columns
            .iter()
            .enumerate()
            .filter(|(_, column)| self.is_visible(&column.key))
            .map(|(index, _)| index)
            .collect()
    }
}
