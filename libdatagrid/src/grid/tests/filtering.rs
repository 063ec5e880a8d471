use super::support::*;
use super::*;
use crate::grid::pipeline::{filter_rows, parse_date_prefix, search_options, select_options};
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

#[test]
fn empty_filter_keeps_every_row_in_order() {
    let rows = users();
    let columns = user_columns();

    let indices = filter_rows(&rows, &columns, &FilterState::default());

    assert_eq!(indices, (0..rows.len()).collect::<Vec<_>>());
}

#[test]
fn filtered_rows_are_a_subset_of_the_input() {
    let rows = users();
    let columns = user_columns();
    let mut state = FilterState::default();
    state.set_global("e");
    state.set_column("status".into(), FilterValue::Text("inactive".into()));

    let indices = filter_rows(&rows, &columns, &state);

    assert!(!indices.is_empty());
    assert!(indices.len() <= rows.len());
    assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(indices.iter().all(|&index| index < rows.len()));
}

#[test]
fn global_filter_matches_any_column_case_insensitively() {
    let rows = vec![json!({"name": "Alice Smith"}), json!({"name": "Bob"})];
    let columns = vec![ColumnDef::new("name", "Name")];
    let mut state = FilterState::default();
    state.set_global("smith");

    assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);

    state.set_global("SMITH");
    assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);
}

#[test]
fn global_filter_searches_rendered_text() {
    let rows = vec![json!({"flag": true}), json!({"flag": false})];
    let columns = vec![
        ColumnDef::new("flag", "Flag")
            .render(|row: &Value| if row["flag"] == json!(true) { "Yes" } else { "No" }),
    ];
    let mut state = FilterState::default();
    state.set_global("yes");

    assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);
}

#[test]
fn input_filter_is_a_substring_match() {
    let mut grid = grid(GridOptions::default());
    grid.update(GridMessage::SetColumnFilter {
        column: "name".into(),
        value: FilterValue::Text("A".into()),
    });

    assert_eq!(processed_ids(&mut grid), vec![1, 3, 4, 6, 7, 9, 11, 12]);
}

#[test]
fn single_select_keeps_substring_semantics() {
    let mut grid = grid(GridOptions::default());
    grid.update(GridMessage::SetColumnFilter {
        column: "status".into(),
        value: FilterValue::Text("inactive".into()),
    });
    assert_eq!(processed_ids(&mut grid), vec![2, 4, 6, 8, 10, 12]);

    // "active" is contained in "inactive"
    grid.update(GridMessage::SetColumnFilter {
        column: "status".into(),
        value: FilterValue::Text("active".into()),
    });
    assert_eq!(processed_ids(&mut grid).len(), 12);
}

#[test]
fn multi_select_matches_scalars_exactly() {
    let rows = vec![
        json!({"status": "Active"}),
        json!({"status": "pending"}),
        json!({"status": "inactive"}),
        json!({"status": "closed"}),
    ];
    let columns = vec![ColumnDef::new("status", "Status").filter(FilterKind::MultiSelect)];
    let mut state = FilterState::default();
    state.set_column(
        "status".into(),
        FilterValue::Many(BTreeSet::from(["active".to_string(), "pending".to_string()])),
    );

    assert_eq!(filter_rows(&rows, &columns, &state), vec![0, 1]);
}

#[test]
fn multi_select_matches_object_members() {
    let mut grid = grid(GridOptions::default());
    grid.update(GridMessage::SetColumnFilter {
        column: "role".into(),
        value: FilterValue::Many(BTreeSet::from(["Admin".to_string(), "Viewer".to_string()])),
    });

    assert_eq!(processed_ids(&mut grid), vec![1, 3, 5, 7, 9, 11]);
}

#[test]
fn multi_select_searches_array_members() {
    let rows = vec![
        json!({"groups": [{"id": 1, "name": "Support"}, {"id": 2, "name": "Billing"}]}),
        json!({"groups": [{"id": 3, "name": "Sales"}]}),
        json!({"groups": []}),
    ];
    let columns = vec![ColumnDef::new("groups", "Groups").filter(FilterKind::MultiSelect)];
    let mut state = FilterState::default();
    state.set_column(
        "groups".into(),
        FilterValue::Many(BTreeSet::from(["support".to_string()])),
    );

    assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);
}

#[test]
fn multi_select_needs_whole_scalar_members() {
    let rows = vec![
        json!({"role": {"id": 2, "name": "Administrator"}}),
        json!({"role": {"id": 12, "name": "Admin"}}),
        json!({"role": {"id": 1, "name": "Viewer"}}),
    ];
    let columns = vec![ColumnDef::new("role", "Role").filter(FilterKind::MultiSelect)];
    let mut state = FilterState::default();

    state.set_column("role".into(), FilterValue::Many(BTreeSet::from(["admin".to_string()])));
    assert_eq!(filter_rows(&rows, &columns, &state), vec![1]);

    state.set_column("role".into(), FilterValue::Many(BTreeSet::from(["1".to_string()])));
    assert_eq!(filter_rows(&rows, &columns, &state), vec![2]);
}

#[test]
fn single_value_filter_on_object_uses_json_text() {
    let mut grid = grid(GridOptions::default());
    grid.update(GridMessage::SetColumnFilter {
        column: "role".into(),
        value: FilterValue::Text("\"name\":\"editor\"".into()),
    });

    assert_eq!(processed_ids(&mut grid), vec![2, 4, 6, 8, 10, 12]);
}

#[test]
fn date_range_bounds_are_inclusive() {
    let mut grid = grid(GridOptions::default());
    grid.update(GridMessage::SetColumnFilter {
        column: "created_at".into(),
        value: FilterValue::Range {
            from: date(2024, 1, 3),
            to: date(2024, 1, 5),
        },
    });
    assert_eq!(processed_ids(&mut grid), vec![3, 4, 5]);

    grid.update(GridMessage::SetColumnFilter {
        column: "created_at".into(),
        value: FilterValue::Range {
            from: date(2024, 1, 10),
            to: None,
        },
    });
    assert_eq!(processed_ids(&mut grid), vec![10, 11, 12]);
}

#[test]
fn date_range_rejects_unparsable_values() {
    let rows = vec![
        json!({"when": "2024-03-01"}),
        json!({"when": "soon"}),
        json!({"when": null}),
    ];
    let columns = vec![ColumnDef::new("when", "When").filter(FilterKind::DateRange)];
    let mut state = FilterState::default();
    state.set_column(
        "when".into(),
        FilterValue::Range {
            from: None,
            to: date(2024, 12, 31),
        },
    );

    assert_eq!(filter_rows(&rows, &columns, &state), vec![0]);
}

#[test]
fn empty_filter_values_remove_the_key() {
    let mut state = FilterState::default();
    state.set_column("name".into(), FilterValue::Text("a".into()));
    assert!(state.column(&"name".into()).is_some());

    state.set_column("name".into(), FilterValue::Text(String::new()));
    assert!(state.column(&"name".into()).is_none());

    state.set_column("role".into(), FilterValue::Many(BTreeSet::new()));
    state.set_column("created_at".into(), FilterValue::Range { from: None, to: None });
    assert!(state.is_empty());
}

#[test]
fn filter_change_resets_the_page() {
    let mut grid = grid(GridOptions {
        page_size: 5,
        ..Default::default()
    });
    grid.update(GridMessage::SetPage(3));
    assert_eq!(grid.pagination().current_page(), 3);

    grid.update(GridMessage::SetGlobalFilter("a".into()));
    assert_eq!(grid.pagination().current_page(), 1);

    grid.update(GridMessage::SetPage(2));
    grid.update(GridMessage::ClearColumnFilter("name".into()));
    assert_eq!(grid.pagination().current_page(), 1);
}

#[test]
fn select_options_prefer_explicit_list() {
    let rows = users();
    let derived = ColumnDef::<Value>::new("status", "Status").filter(FilterKind::SingleSelect);
    let explicit = ColumnDef::<Value>::new("status", "Status")
        .filter(FilterKind::SingleSelect)
        .filter_options(["pending", "active"]);

    assert_eq!(select_options(&derived, &rows), vec!["active", "inactive"]);
    assert_eq!(select_options(&explicit, &rows), vec!["pending", "active"]);
}

#[test]
fn option_search_is_case_insensitive() {
    let options = vec!["Admin".to_string(), "Editor".to_string(), "Viewer".to_string()];

    assert_eq!(search_options(&options, "ED"), vec!["Editor"]);
    assert_eq!(search_options(&options, "").len(), 3);
}

#[test]
fn date_prefix_parses_timestamps() {
    assert_eq!(
        parse_date_prefix(&CellValue::Text("2024-01-02T10:00:00Z".into())),
        date(2024, 1, 2)
    );
    assert_eq!(parse_date_prefix(&CellValue::Text("02/01/2024".into())), None);
    assert_eq!(parse_date_prefix(&CellValue::Null), None);
}

#[test_log::test]
fn select_fallback_warns_once_when_data_has_no_values() {
    let rows = vec![json!({"id": 1}), json!({"id": 2})];
    let columns = vec![ColumnDef::new("missing", "Missing").filter(FilterKind::SingleSelect)];
    let mut grid = DataGrid::new(rows, columns, GridOptions::default());

    assert!(grid.select_options(&"missing".into()).is_empty());
    assert!(grid.select_options(&"missing".into()).is_empty());
    assert!(grid.select_options(&"unknown".into()).is_empty());
}
