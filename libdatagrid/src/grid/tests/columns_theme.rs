use super::*;

#[test]
fn theme_accepts_token_or_layouts() {
    let token: GridTheme = serde_json::from_value(json!("sm")).unwrap();
    let nested: GridTheme =
        serde_json::from_value(json!({"layouts": {"gridSize": "lg"}})).unwrap();
    let empty: GridTheme = serde_json::from_value(json!({"layouts": {}})).unwrap();

    assert_eq!(token.grid_size(), GridSize::Sm);
    assert_eq!(nested.grid_size(), GridSize::Lg);
    assert_eq!(empty.grid_size(), GridSize::Md);
    assert!(serde_json::from_value::<GridTheme>(json!("huge")).is_err());
}

#[test]
fn size_tokens_map_to_metrics() {
    let xs = GridSize::Xs.metrics();
    assert_eq!((xs.font_size, xs.padding_x, xs.padding_y), (10.0, 4.0, 4.0));
    let lg = GridSize::Lg.metrics();
    assert_eq!((lg.font_size, lg.padding_x, lg.padding_y), (18.0, 12.0, 8.0));
    assert!(GridSize::Sm.metrics().row_height() < GridSize::Md.metrics().row_height());
    assert_eq!(GridSize::default().to_string(), "md");
    assert_eq!(enum_iterator::all::<GridSize>().count(), 4);
}

#[test]
fn cell_values_display_like_text() {
    assert_eq!(CellValue::Null.display(), "");
    assert_eq!(CellValue::Number(3.0).display(), "3");
    assert_eq!(CellValue::Number(2.5).display(), "2.5");
    assert_eq!(CellValue::Bool(true).display(), "true");
    assert_eq!(
        CellValue::from_json(&json!({"a": 1})).display(),
        "{\"a\":1}"
    );
}

#[test]
fn row_keys_from_cells() {
    assert_eq!(RowKey::from_cell(&CellValue::Number(4.0)), Some(RowKey::Num(4)));
    assert_eq!(
        RowKey::from_cell(&CellValue::Text("u-1".into())),
        Some(RowKey::Str("u-1".into()))
    );
    assert_eq!(RowKey::from_cell(&CellValue::Null), None);
    assert_eq!(RowKey::Num(7).to_string(), "7");
}

#[test]
fn cell_classes_combine_static_and_dynamic() {
    let column = ColumnDef::new("status", "Status")
        .col_class("muted")
        .col_class_params(|row: &Value| format!("status-{}", row["status"].as_str().unwrap_or("")));

    assert_eq!(
        column.cell_class(&json!({"status": "active"})),
        "muted status-active"
    );
    assert_eq!(ColumnDef::<Value>::new("id", "ID").cell_class(&json!({})), "");
}

#[test]
fn malformed_column_file_is_an_error() {
    assert!(ColumnFile::from_toml("[[columns]]\nkey = 1").is_err());
}

#[test]
fn columns_inferred_from_first_row() {
    let rows = vec![json!({"created_at": "2024-01-01", "id": 1})];

    let columns = infer_columns(&rows);

    let headers: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
    assert_eq!(headers, vec!["Created At", "Id"]);
    assert!(columns.iter().all(|c| c.sortable && c.filter == Some(FilterKind::Input)));
    assert!(infer_columns(&[json!(1)]).is_empty());
}

#[test]
fn column_file_parses_from_toml() {
    let file = ColumnFile::from_toml(
        r#"
        [[columns]]
        key = "status"
        header = "Status"
        filter = "multiSelect"
        filterParams = { options = ["active", "inactive"], labelMap = { active = "Active" } }

        [[columns]]
        key = "id"
        header = "ID"
        sortable = true
        columnVisible = false
        "#,
    )
    .unwrap();

    let columns: Vec<ColumnDef<Value>> = file.into_columns();
    assert_eq!(columns[0].filter, Some(FilterKind::MultiSelect));
    assert_eq!(columns[0].filter_params.label_for("active"), "Active");
    assert_eq!(columns[0].filter_params.label_for("inactive"), "inactive");
    assert!(columns[1].sortable);
    assert!(!columns[1].column_visible);
}
