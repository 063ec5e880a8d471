use super::ExportTable;

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn line<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|field| quote(field.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Every field quoted, `\n` between records and none after the last.
#[must_use]
pub fn to_csv(table: &ExportTable) -> String {
    std::iter::once(line(&table.headers))
        .chain(table.rows.iter().map(|row| line(row)))
        .collect::<Vec<_>>()
        .join("\n")
}
