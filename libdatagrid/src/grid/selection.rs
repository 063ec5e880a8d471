use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use super::model::RowKey;

/// Selection set owned by the host (controlled mode).
pub type SharedSelection = Rc<RefCell<BTreeSet<RowKey>>>;

#[derive(Debug, Clone)]
enum SelectionStore {
    Internal(BTreeSet<RowKey>),
    External(SharedSelection),
}

/// Selected row keys, kept across pages, sorting and filtering.
///
/// Keys of rows that are filtered out stay in the set; they are only left out
/// of what gets emitted to the host.
#[derive(Debug, Clone)]
pub struct SelectionManager {
    store: SelectionStore,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::internal()
    }
}

/// Tri-state of the "select all on page" header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderCheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Row on the current page as seen by the selection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRowKey {
    pub key: RowKey,
    pub selectable: bool,
}

impl SelectionManager {
    #[must_use]
    pub fn internal() -> Self {
        Self {
            store: SelectionStore::Internal(BTreeSet::new()),
        }
    }

    #[must_use]
    pub fn external(shared: SharedSelection) -> Self {
        Self {
            store: SelectionStore::External(shared),
        }
    }

    fn read<R>(&self, f: impl FnOnce(&BTreeSet<RowKey>) -> R) -> R {
        match &self.store {
            SelectionStore::Internal(keys) => f(keys),
            SelectionStore::External(shared) => f(&*shared.borrow()),
        }
    }

    fn write<R>(&mut self, f: impl FnOnce(&mut BTreeSet<RowKey>) -> R) -> R {
        match &mut self.store {
            SelectionStore::Internal(keys) => f(keys),
            SelectionStore::External(shared) => f(&mut *shared.borrow_mut()),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &RowKey) -> bool {
        self.read(|keys| keys.contains(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read(BTreeSet::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn keys(&self) -> BTreeSet<RowKey> {
        self.read(Clone::clone)
    }

    /// Flips membership of `key`.
    pub fn toggle(&mut self, key: RowKey) {
        self.write(|keys| {
            if !keys.remove(&key) {
                keys.insert(key);
            }
        });
    }

    /// Returns true if the set changed.
    pub fn set(&mut self, key: RowKey, selected: bool) -> bool {
        self.write(|keys| {
            if selected {
                keys.insert(key)
            } else {
                keys.remove(&key)
            }
        })
    }

    /// Header checkbox action. Checking adds every selectable row of the
    /// page; unchecking removes every row of the page.
    pub fn set_page(&mut self, page: &[PageRowKey], checked: bool) -> bool {
        self.write(|keys| {
            let mut changed = false;
            for row in page {
                changed |= if checked {
                    row.selectable && keys.insert(row.key.clone())
                } else {
                    keys.remove(&row.key)
                };
            }
            changed
        })
    }

    pub fn deselect(&mut self, key: &RowKey) -> bool {
        self.write(|keys| keys.remove(key))
    }

    pub fn clear(&mut self) -> bool {
        self.write(|keys| {
            let changed = !keys.is_empty();
            keys.clear();
            changed
        })
    }

    /// State of the header checkbox over the selectable rows of a page.
    #[must_use]
    pub fn header_state(&self, page: &[PageRowKey]) -> HeaderCheckState {
        self.read(|keys| {
            let (selected, selectable) = page
                .iter()
                .filter(|row| row.selectable)
                .fold((0usize, 0usize), |(selected, total), row| {
                    (selected + usize::from(keys.contains(&row.key)), total + 1)
                });
            if selectable == 0 || selected == 0 {
                HeaderCheckState::Unchecked
            } else if selected == selectable {
                HeaderCheckState::Checked
            } else {
                HeaderCheckState::Indeterminate
            }
        })
    }

    /// Selected keys that are not among `visible` (filtered out).
    #[must_use]
    pub fn count_hidden(&self, visible: &HashSet<RowKey>) -> usize {
        self.read(|keys| keys.iter().filter(|key| !visible.contains(key)).count())
    }
}

/// Formats the selection summary, empty when nothing is selected.
#[must_use]
pub fn format_selection_count(selected: usize, hidden: usize) -> String {
    match (selected, hidden) {
        (0, _) => String::new(),
        (n, 0) => format!("{n} selected"),
        (n, h) => format!("{n} selected ({h} hidden)"),
    }
}
