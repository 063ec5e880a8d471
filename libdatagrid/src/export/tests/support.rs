use super::*;

pub(super) fn table(rows: usize) -> ExportTable {
    ExportTable {
        headers: vec!["ID".into(), "Name".into(), "Note".into()],
        rows: (1..=rows)
            .map(|id| vec![id.to_string(), format!("User {id}"), format!("row {id}")])
            .collect(),
    }
}

pub(super) fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .unwrap_or_default()
}
