use std::collections::BTreeSet;

use super::model::RowKey;

/// Rows currently showing their detail line. Independent of selection and
/// not collapsed on page changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    rows: BTreeSet<RowKey>,
}

impl ExpansionState {
    /// Returns the new expanded state of `key`.
    pub fn toggle(&mut self, key: RowKey) -> bool {
        if self.rows.remove(&key) {
            false
        } else {
            self.rows.insert(key);
            true
        }
    }

    #[must_use]
    pub fn is_expanded(&self, key: &RowKey) -> bool {
        self.rows.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
