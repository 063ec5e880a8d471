#![deny(unused_crate_dependencies)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod accounts;
mod app;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use emath::Vec2;
use eyre::{Context, Result, eyre};
use libdatagrid::config::GridSettings;
use libdatagrid::export::write_export;
use libdatagrid::grid::{ColumnFile, infer_columns};
use libdatagrid::{
    ColumnDef, ColumnKey, DataGrid, ExportFormat, GridConfig, GridMessage, GridOptions, GridRow,
    GridSize, GridTheme, RowKey, RowSelection, SortDirection, SortState, logs,
};
use serde_json::Value;
use tracing::info;

use crate::accounts::{AccountsScreen, sample_accounts};
use crate::app::{DataGridApp, Screen};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SizeArg {
    Xs,
    Sm,
    Md,
    Lg,
}

impl From<SizeArg> for GridSize {
    fn from(size: SizeArg) -> Self {
        match size {
            SizeArg::Xs => GridSize::Xs,
            SizeArg::Sm => GridSize::Sm,
            SizeArg::Md => GridSize::Md,
            SizeArg::Lg => GridSize::Lg,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Xlsx,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Pdf => ExportFormat::Pdf,
        }
    }
}

/// Parses `KEY` or `KEY:asc` / `KEY:desc`.
fn parse_sort(value: &str) -> Result<SortState, String> {
    let (key, direction) = match value.rsplit_once(':') {
        Some((key, "asc")) => (key, SortDirection::Ascending),
        Some((key, "desc")) => (key, SortDirection::Descending),
        Some((_, other)) => return Err(format!("unknown sort direction '{other}'")),
        None => (value, SortDirection::Ascending),
    };
    if key.is_empty() {
        return Err("missing sort column".to_string());
    }
    Ok(SortState::by(key, direction))
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// JSON file holding an array of row objects
    #[clap(long)]
    data: Utf8PathBuf,
    /// TOML column file; columns are inferred from the first row when absent
    #[clap(long)]
    columns: Option<Utf8PathBuf>,
    #[clap(long, value_enum, default_value = "csv")]
    format: FormatArg,
    /// Global search text applied before exporting
    #[clap(long)]
    filter: Option<String>,
    /// Sort column, optionally suffixed with `:asc` or `:desc`
    #[clap(long, value_parser = parse_sort)]
    sort: Option<SortState>,
    /// Output directory, the configured export directory by default
    #[clap(long)]
    out: Option<Utf8PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Writes the filtered and sorted rows to a file without opening a window
    Export(ExportArgs),
}

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding an array of row objects. The accounts demo is shown
    /// when absent.
    #[clap(long)]
    data: Option<Utf8PathBuf>,
    /// TOML column file for --data
    #[clap(long)]
    columns: Option<Utf8PathBuf>,
    /// Cell density
    #[clap(long, value_enum)]
    size: Option<SizeArg>,
    /// Ignore user and local configuration files
    #[clap(long)]
    default_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn load_rows(path: &Utf8Path) -> Result<Vec<Value>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read rows from {path}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse rows in {path}"))
}

fn load_columns(path: Option<&Utf8Path>, rows: &[Value]) -> Result<Vec<ColumnDef<Value>>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read columns from {path}"))?;
            Ok(ColumnFile::from_toml(&content)?.into_columns())
        }
        None => Ok(infer_columns(rows)),
    }
}

/// Identifies rows by their `id` field when the first row has one.
fn json_selection(rows: &[Value]) -> RowSelection<Value> {
    let id = ColumnKey::from("id");
    let has_id = rows.first().is_some_and(|row| !row.field(&id).is_null());
    if has_id {
        RowSelection::default().with_row_id(move |row: &Value| {
            RowKey::from_cell(&row.field(&id)).unwrap_or_else(|| RowKey::Str(String::new()))
        })
    } else {
        RowSelection::default()
    }
}

fn json_grid(
    rows: Vec<Value>,
    columns: Vec<ColumnDef<Value>>,
    settings: GridSettings,
    size: Option<GridSize>,
) -> DataGrid<Value> {
    let options = GridOptions {
        page_size: settings.page_size,
        row_selection: Some(json_selection(&rows)),
        columns_visible_option: true,
        data_export: true,
        theme: size.map(GridTheme::Size),
        ..Default::default()
    };
    DataGrid::with_settings(rows, columns, options, settings).with_id_salt("json")
}

fn run_export(config: &GridConfig, args: ExportArgs) -> Result<Utf8PathBuf> {
    let rows = load_rows(&args.data)?;
    let columns = load_columns(args.columns.as_deref(), &rows)?;
    let options = GridOptions {
        pagination: false,
        ..Default::default()
    };
    let mut grid = DataGrid::with_settings(rows, columns, options, config.settings());

    if let Some(filter) = args.filter {
        grid.update(GridMessage::SetGlobalFilter(filter));
    }
    if let Some(sort) = args.sort {
        grid.update(GridMessage::SetSort(sort));
    }
    grid.update(GridMessage::Export(args.format.into()));
    let request = grid
        .take_export()
        .ok_or_else(|| eyre!("The grid produced no export"))?;

    let directory = args
        .out
        .unwrap_or_else(|| config.export.resolve_directory());
    let path = write_export(&request, &config.export, &directory, Utc::now())?;
    Ok(path)
}

fn main() -> Result<()> {
    simple_eyre::install()?;
    logs::start_logging()?;

    let args = Args::parse();
    let config = GridConfig::new(args.default_config)?;

    if let Some(Commands::Export(export)) = args.command {
        let path = run_export(&config, export)?;
        info!("Exported to {path}");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start the export runtime")?;

    let settings = config.settings();
    let size = args.size.map(GridSize::from);
    let screen = match &args.data {
        Some(data) => {
            let rows = load_rows(data)?;
            let columns = load_columns(args.columns.as_deref(), &rows)?;
            Screen::Json(json_grid(rows, columns, settings, size))
        }
        None => Screen::Accounts(Box::new(AccountsScreen::new(
            sample_accounts()?,
            settings,
            size,
        ))),
    };
    let app = DataGridApp::new(screen, config.export.clone(), runtime.handle().clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_app_id("org.datagrid.datagrid")
            .with_title("Data Grid")
            .with_inner_size(Vec2::new(1280.0, 800.0)),
        ..Default::default()
    };
    eframe::run_native("Data Grid", options, Box::new(|_cc| Ok(Box::new(app))))
        .map_err(|e| eyre!("Failed to run the window: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gui_flags() {
        let args = Args::parse_from(["datagrid", "--data", "rows.json", "--size", "lg"]);

        assert_eq!(args.data.as_deref(), Some(Utf8Path::new("rows.json")));
        assert_eq!(args.size, Some(SizeArg::Lg));
        assert!(args.command.is_none());
        assert!(!args.default_config);
    }

    #[test]
    fn export_subcommand() {
        let args = Args::parse_from([
            "datagrid", "export", "--data", "rows.json", "--format", "pdf", "--sort", "age:desc",
        ]);

        let Some(Commands::Export(export)) = args.command else {
            panic!("expected the export subcommand");
        };
        assert_eq!(export.format, FormatArg::Pdf);
        assert_eq!(
            export.sort,
            Some(SortState::by("age", SortDirection::Descending))
        );
        assert!(export.out.is_none());
    }

    #[test]
    fn export_requires_data() {
        assert!(Args::try_parse_from(["datagrid", "export"]).is_err());
        assert!(
            Args::try_parse_from(["datagrid", "export", "--data", "a.json", "--sort", "age:up"])
                .is_err()
        );
    }

    #[test]
    fn sort_argument() {
        assert_eq!(
            parse_sort("name"),
            Ok(SortState::by("name", SortDirection::Ascending))
        );
        assert_eq!(
            parse_sort("created:at:desc"),
            Ok(SortState::by("created:at", SortDirection::Descending))
        );
        assert!(parse_sort(":desc").is_err());
    }

    #[test]
    fn headless_export_writes_filtered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let data = root.join("rows.json");
        std::fs::write(
            &data,
            r#"[{"id": 1, "name": "Alice Smith", "age": 30},
                {"id": 2, "name": "Bob", "age": null},
                {"id": 3, "name": "Carl Smith", "age": 10}]"#,
        )
        .unwrap();
        let config = GridConfig::new(true).unwrap();
        let export = ExportArgs {
            data,
            columns: None,
            format: FormatArg::Csv,
            filter: Some("smith".to_string()),
            sort: Some(SortState::by("age", SortDirection::Ascending)),
            out: Some(root.join("out")),
        };

        let path = run_export(&config, export).unwrap();

        let csv = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            csv,
            "\"Age\",\"Id\",\"Name\"\n\"10\",\"3\",\"Carl Smith\"\n\"30\",\"1\",\"Alice Smith\""
        );
    }

    #[test]
    fn column_file_selects_and_orders_columns() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let columns = root.join("columns.toml");
        std::fs::write(
            &columns,
            "[[columns]]\nkey = \"name\"\nheader = \"Full name\"\n",
        )
        .unwrap();
        let rows = vec![serde_json::json!({"id": 1, "name": "Alice"})];

        let loaded = load_columns(Some(&columns), &rows).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].header, "Full name");
        assert!(load_columns(Some(&root.join("missing.toml")), &rows).is_err());
    }

    #[test]
    fn configured_page_size_applies_to_json_grids() {
        let config = GridConfig::new_from_toml("[grid]\npage_size = 25\n").unwrap();
        let rows: Vec<Value> = (1..=30).map(|id| serde_json::json!({"id": id})).collect();
        let columns = infer_columns(&rows);

        let mut grid = json_grid(rows, columns, config.settings(), None);

        assert_eq!(grid.pagination().page_size(), 25);
        assert_eq!(grid.page_rows().len(), 25);
        assert_eq!(grid.settings().page_size_choices(25), vec![10, 25, 50, 100]);
    }

    #[test]
    fn json_rows_keyed_by_id_when_present() {
        let rows = vec![serde_json::json!({"id": 7})];
        let selection = json_selection(&rows);

        let key = selection.get_row_id.map(|get_row_id| get_row_id(&rows[0]));

        assert_eq!(key, Some(RowKey::Num(7)));
        assert!(json_selection(&[serde_json::json!({"x": 1})]).get_row_id.is_none());
    }
}
