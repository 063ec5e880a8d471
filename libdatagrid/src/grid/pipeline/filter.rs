use chrono::NaiveDate;
use itertools::Itertools;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use super::super::columns::ColumnDef;
use super::super::model::{CellValue, ColumnKey, GridRow};

static ISO_DATE_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").ok());

/// Value held by a per-column filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// Input, single-select and date filters.
    Text(String),
    /// Multi-select filters; a row passes when any option matches. Scalars
    /// and scalar members of structured values must equal an option.
    Many(BTreeSet<String>),
    /// Inclusive date range.
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl FilterValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Many(options) => options.is_empty(),
            Self::Range { from, to } => from.is_none() && to.is_none(),
        }
    }
}

/// Global text plus per-column filters.
///
/// An empty value is never stored: clearing a filter removes its key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub global_text: String,
    per_column: BTreeMap<ColumnKey, FilterValue>,
}

impl FilterState {
    pub fn set_global(&mut self, text: impl Into<String>) {
        self.global_text = text.into();
    }

    pub fn set_column(&mut self, key: ColumnKey, value: FilterValue) {
        if value.is_empty() {
            self.per_column.remove(&key);
        } else {
            self.per_column.insert(key, value);
        }
    }

    pub fn clear_column(&mut self, key: &ColumnKey) {
        self.per_column.remove(key);
    }

    #[must_use]
    pub fn column(&self, key: &ColumnKey) -> Option<&FilterValue> {
        self.per_column.get(key)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &FilterValue)> {
        self.per_column.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global_text.is_empty() && self.per_column.is_empty()
    }

    pub fn clear(&mut self) {
        self.global_text.clear();
        self.per_column.clear();
    }
}

enum Matcher {
    Contains(String),
    AnyOf(Vec<String>),
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

struct ColumnFilter {
    key: ColumnKey,
    matcher: Matcher,
}

impl ColumnFilter {
    fn new(key: &ColumnKey, value: &FilterValue) -> Self {
        let matcher = match value {
            FilterValue::Text(text) => Matcher::Contains(text.to_lowercase()),
            FilterValue::Many(options) => {
                Matcher::AnyOf(options.iter().map(|o| o.to_lowercase()).collect())
            }
            FilterValue::Range { from, to } => Matcher::DateRange {
                from: *from,
                to: *to,
            },
        };
        Self {
            key: key.clone(),
            matcher,
        }
    }

    fn matches<T: GridRow>(&self, row: &T) -> bool {
        let raw = row.field(&self.key);
        match &self.matcher {
            Matcher::Contains(needle) => raw.search_text().contains(needle.as_str()),
            Matcher::AnyOf(options) => {
                if raw.is_object() {
                    raw.members().iter().any(|member| member_matches(member, options))
                } else {
                    let text = raw.search_text();
                    options.iter().any(|option| *option == text)
                }
            }
            Matcher::DateRange { from, to } => parse_date_prefix(&raw).is_some_and(|date| {
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }),
        }
    }
}

/// Scalar members must equal an option; nested objects and arrays are
/// searched through their JSON text.
fn member_matches(member: &CellValue, options: &[String]) -> bool {
    let text = member.search_text();
    if member.is_object() {
        options.iter().any(|option| text.contains(option.as_str()))
    } else {
        options.iter().any(|option| *option == text)
    }
}

/// Parses the leading `YYYY-MM-DD` of a value.
#[must_use]
pub fn parse_date_prefix(value: &CellValue) -> Option<NaiveDate> {
    let text = value.display();
    let regex = ISO_DATE_PREFIX.as_ref()?;
    let captures = regex.captures(&text)?;
    NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
}

/// Returns indices of rows passing every filter, in their original order.
pub fn filter_rows<T: GridRow>(rows: &[T], columns: &[ColumnDef<T>], state: &FilterState) -> Vec<usize> {
    let global = state.global_text.to_lowercase();
    let column_filters: Vec<ColumnFilter> = state
        .columns()
        .map(|(key, value)| ColumnFilter::new(key, value))
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            global.is_empty()
                || columns
                    .iter()
                    .any(|column| column.cell_text(row).to_lowercase().contains(&global))
        })
        .filter(|(_, row)| column_filters.iter().all(|filter| filter.matches(*row)))
        .map(|(index, _)| index)
        .collect()
}

/// Options offered by a select filter.
///
/// Explicit options win; otherwise the distinct non-empty values of the
/// column, sorted.
pub fn select_options<T: GridRow>(column: &ColumnDef<T>, rows: &[T]) -> Vec<String> {
    if let Some(options) = &column.filter_params.options {
        return options.clone();
    }
    rows.iter()
        .map(|row| column.raw(row).display())
        .filter(|value| !value.is_empty())
        .unique()
        .sorted()
        .collect()
}

/// Narrows an option list by the search box of a multi-select menu.
pub fn search_options<'a>(options: &'a [String], query: &str) -> Vec<&'a String> {
    let query = query.to_lowercase();
    options
        .iter()
        .filter(|option| option.to_lowercase().contains(&query))
        .collect()
}
