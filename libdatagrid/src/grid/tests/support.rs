use super::*;

const NAMES: [&str; 12] = [
    "Alice", "Bob", "Carol", "Dave", "Eve", "Frank", "Grace", "Heidi", "Ivan", "Judy", "Mallory",
    "Niaj",
];

/// User record with id in 1..=12.
///
/// Odd ids are active, id 1 is the only admin, every fourth user has no age.
pub(super) fn user(id: i64) -> Value {
    let (role_id, role_name) = match id {
        1 => (1, "Admin"),
        id if id % 2 == 0 => (2, "Editor"),
        _ => (3, "Viewer"),
    };
    json!({
        "id": id,
        "name": NAMES[(id - 1) as usize],
        "status": if id % 2 == 1 { "active" } else { "inactive" },
        "role": { "id": role_id, "name": role_name },
        "age": if id % 4 == 0 { Value::Null } else { json!(20 + id) },
        "created_at": format!("2024-01-{id:02}T10:00:00Z"),
    })
}

pub(super) fn users() -> Vec<Value> {
    (1..=12).map(user).collect()
}

pub(super) fn user_columns() -> Vec<ColumnDef<Value>> {
    vec![
        ColumnDef::new("id", "ID").sortable(),
        ColumnDef::new("name", "Name")
            .sortable()
            .filter(FilterKind::Input),
        ColumnDef::new("status", "Status").filter(FilterKind::SingleSelect),
        ColumnDef::new("role", "Role").filter(FilterKind::MultiSelect),
        ColumnDef::new("age", "Age").sortable(),
        ColumnDef::new("created_at", "Created").filter(FilterKind::DateRange),
    ]
}

pub(super) fn id_of(row: &Value) -> RowKey {
    RowKey::Num(row["id"].as_i64().unwrap_or_default())
}

pub(super) fn keyed_selection() -> RowSelection<Value> {
    RowSelection::default().with_row_id(id_of)
}

pub(super) fn grid(options: GridOptions<Value>) -> DataGrid<Value> {
    DataGrid::new(users(), user_columns(), options)
}

pub(super) fn selectable_grid() -> DataGrid<Value> {
    grid(GridOptions {
        row_selection: Some(keyed_selection()),
        ..Default::default()
    })
}

/// Ids of the processed rows, in order.
pub(super) fn processed_ids(grid: &mut DataGrid<Value>) -> Vec<i64> {
    let order = grid.processed();
    order
        .iter()
        .map(|&index| grid.rows()[index]["id"].as_i64().unwrap_or_default())
        .collect()
}

pub(super) fn page_ids(grid: &mut DataGrid<Value>) -> Vec<i64> {
    grid.page_rows()
        .iter()
        .map(|row| grid.rows()[row.data_index]["id"].as_i64().unwrap_or_default())
        .collect()
}

pub(super) fn keys(ids: &[i64]) -> Vec<RowKey> {
    ids.iter().map(|&id| RowKey::Num(id)).collect()
}

/// Text width of a fixed number of pixels per character.
pub(super) struct FixedMeasure(pub f32);

impl TextMeasure for FixedMeasure {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.0
    }
}
