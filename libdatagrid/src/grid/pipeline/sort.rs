use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::super::model::{CellValue, ColumnKey, GridRow};

/// Sort order for a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// At most one active sort column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<ColumnKey>,
    pub direction: SortDirection,
}

impl SortState {
    #[must_use]
    pub fn by(key: impl Into<ColumnKey>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    /// Sort state after a header click: the active column flips direction,
    /// any other column becomes the ascending sort.
    #[must_use]
    pub fn on_click(&self, clicked: &ColumnKey) -> Self {
        if self.key.as_ref() == Some(clicked) {
            Self {
                key: self.key.clone(),
                direction: self.direction.flipped(),
            }
        } else {
            Self::by(clicked.clone(), SortDirection::Ascending)
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }
}

/// Header indicator for a column, `None` when it is not the sort column.
#[must_use]
pub fn sort_indicator(sort: &SortState, column: &ColumnKey) -> Option<&'static str> {
    if sort.key.as_ref() != Some(column) {
        return None;
    }
    Some(match sort.direction {
        SortDirection::Ascending => "▲",
        SortDirection::Descending => "▼",
    })
}

/// Ordering of two field values under `direction`. Nulls trail in both directions.
#[must_use]
pub fn compare_for_sort(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.natural_cmp(b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

/// Reorders `indices` by the sort column. Ties keep their relative order.
pub fn sort_rows<T: GridRow>(rows: &[T], indices: &mut Vec<usize>, sort: &SortState) {
    let Some(key) = &sort.key else {
        return;
    };

    let mut keyed: Vec<(usize, CellValue)> = indices
        .iter()
        .map(|&index| (index, rows[index].field(key)))
        .collect();
    keyed.sort_by(|(_, a), (_, b)| compare_for_sort(a, b, sort.direction));

    *indices = keyed.into_iter().map(|(index, _)| index).collect();
}
