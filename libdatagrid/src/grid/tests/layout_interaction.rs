use super::support::*;
use super::*;
use crate::grid::layout::measure_column;

fn t0() -> Instant {
    Instant::now()
}

#[test]
fn resize_is_clamped_to_the_configured_bounds() {
    let mut grid = grid(GridOptions::default());
    let name = ColumnKey::from("name");
    assert!(grid.layout().needs_auto_size(&name));

    grid.update(GridMessage::ResizeColumn {
        column: name.clone(),
        delta: 30.0,
    });
    assert_eq!(grid.layout().width(&name), Some(180.0));
    assert!(!grid.layout().needs_auto_size(&name));

    grid.update(GridMessage::ResizeColumn {
        column: name.clone(),
        delta: -1000.0,
    });
    assert_eq!(grid.layout().width(&name), Some(50.0));

    grid.update(GridMessage::ResizeColumn {
        column: name.clone(),
        delta: 10_000.0,
    });
    assert_eq!(grid.layout().width(&name), Some(500.0));
}

#[test]
fn unbounded_maximum() {
    let settings = LayoutSettings {
        max_column_width: None,
        ..Default::default()
    };

    assert_eq!(settings.clamp(10_000.0), 10_000.0);
    assert_eq!(settings.clamp(1.0), 50.0);
}

#[test]
fn auto_size_uses_widest_rendered_cell() {
    let mut grid = grid(GridOptions::default());
    let page = grid.page_rows();
    let column = &grid.columns()[1];
    let rows = page.iter().map(|row| &grid.rows()[row.data_index]);
    let measured = measure_column(column, rows, &FixedMeasure(7.0));
    assert_eq!(measured.len(), 10);

    grid.update(GridMessage::AutoSizeColumn {
        column: "name".into(),
        measured,
    });

    // Five character names on the first page beat the four character header
    assert_eq!(grid.layout().width(&"name".into()), Some(5.0 * 7.0 + 20.0));
}

#[test]
fn auto_size_falls_back_to_the_header() {
    let mut grid = grid(GridOptions::default());

    grid.update(GridMessage::AutoSizeColumn {
        column: "created_at".into(),
        measured: vec![],
    });

    assert_eq!(grid.layout().width(&"created_at".into()), Some(7.0 * 8.0 + 20.0));
}

#[test]
fn hidden_columns_leave_the_projection() {
    let mut grid = grid(GridOptions::default());
    assert_eq!(grid.visible_columns(), vec![0, 1, 2, 3, 4, 5]);

    grid.update(GridMessage::ToggleColumnVisibility("age".into()));
    assert_eq!(grid.visible_columns(), vec![0, 1, 2, 3, 5]);

    grid.update(GridMessage::ToggleColumnVisibility("age".into()));
    assert_eq!(grid.visible_columns().len(), 6);
}

#[test]
fn initially_hidden_columns() {
    let columns = vec![
        ColumnDef::new("id", "ID"),
        ColumnDef::new("name", "Name").hidden(),
    ];
    let grid = DataGrid::new(users(), columns, GridOptions::default());

    assert_eq!(grid.visible_columns(), vec![0]);
    assert!(!grid.layout().is_visible(&"name".into()));
}

#[test]
fn two_quick_clicks_make_a_double_click() {
    let mut interaction = RowInteraction::new(Duration::from_millis(250));
    let key = RowKey::Num(7);
    let start = t0();

    assert!(!interaction.register_click(key.clone(), start));
    assert!(interaction.register_click(key.clone(), start + Duration::from_millis(100)));
    assert_eq!(interaction.highlighted(), Some(&key));

    // Too slow after the previous click
    assert!(!interaction.register_click(key.clone(), start + Duration::from_millis(400)));
}

#[test]
fn clicks_on_different_rows_do_not_combine() {
    let mut interaction = RowInteraction::default();
    let start = t0();

    assert!(!interaction.register_click(RowKey::Num(1), start));
    assert!(!interaction.register_click(RowKey::Num(2), start + Duration::from_millis(10)));
    assert_eq!(interaction.highlighted(), None);
}

#[test]
fn click_in_between_breaks_a_double_click() {
    let mut interaction = RowInteraction::default();
    let start = t0();

    interaction.register_click(RowKey::Num(1), start);
    interaction.register_click(RowKey::Num(2), start + Duration::from_millis(50));

    assert!(!interaction.register_click(RowKey::Num(1), start + Duration::from_millis(100)));
    assert!(interaction.register_click(RowKey::Num(1), start + Duration::from_millis(150)));
}

#[test]
fn double_click_fires_the_callback_and_highlights() {
    let clicked: Rc<RefCell<Vec<String>>> = Rc::default();
    let log = Rc::clone(&clicked);
    let mut grid = grid(GridOptions {
        row_selection: Some(keyed_selection()),
        on_row_double_click: Some(Box::new(move |row: &Value| {
            log.borrow_mut()
                .push(row["name"].as_str().unwrap_or_default().to_string());
        })),
        ..Default::default()
    });
    let start = t0();
    let click = |at| GridMessage::RowClicked {
        key: RowKey::Num(3),
        data_index: 2,
        at,
    };

    grid.update(click(start));
    assert!(clicked.borrow().is_empty());
    grid.update(click(start + Duration::from_millis(120)));
    assert_eq!(*clicked.borrow(), vec!["Carol"]);

    let key = RowKey::Num(3);
    assert!(grid.interaction().shows_double_click(&key, true, false));

    // The selection highlight wins
    grid.update(GridMessage::ToggleRowSelected(key.clone()));
    assert!(!grid.interaction().shows_double_click(&key, true, true));
    assert!(grid.interaction().shows_double_click(&key, false, true));
}

#[test]
fn hover_highlights_row_and_column() {
    let mut grid = grid(GridOptions {
        row_col_highlight: true,
        ..Default::default()
    });
    let name = ColumnKey::from("name");
    let age = ColumnKey::from("age");

    grid.update(GridMessage::HoverCell {
        row: 1,
        column: name.clone(),
    });
    let interaction = grid.interaction();
    assert_eq!(interaction.cell_highlight(1, &name), CellHighlight::Cell);
    assert_eq!(interaction.cell_highlight(1, &age), CellHighlight::Line);
    assert_eq!(interaction.cell_highlight(4, &name), CellHighlight::Line);
    assert_eq!(interaction.cell_highlight(4, &age), CellHighlight::None);

    grid.update(GridMessage::ClearHover);
    assert_eq!(grid.interaction().hover(), None);
}

#[test]
fn hover_is_ignored_without_highlighting() {
    let mut grid = grid(GridOptions::default());

    grid.update(GridMessage::HoverCell {
        row: 0,
        column: "id".into(),
    });

    assert_eq!(grid.interaction().hover(), None);
}

#[test]
fn new_data_forgets_click_history() {
    let mut grid = grid(GridOptions::default());
    let start = t0();
    grid.update(GridMessage::RowClicked {
        key: RowKey::Num(1),
        data_index: 0,
        at: start,
    });
    grid.update(GridMessage::RowClicked {
        key: RowKey::Num(1),
        data_index: 0,
        at: start + Duration::from_millis(50),
    });
    assert!(grid.interaction().highlighted().is_some());

    grid.set_data(users());

    assert!(grid.interaction().highlighted().is_none());
}
