use camino::Utf8PathBuf;
use chrono::Utc;
use egui::RichText;
use libdatagrid::export::write_export;
use libdatagrid::logs::draw_log_window;
use libdatagrid::{
    DataGrid, ExportRequest, ExportSettings, GridMessage, GridResponse, GridSize,
};
use serde_json::Value;
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{error, info};

use crate::accounts::AccountsScreen;

/// What the central panel shows.
pub enum Screen {
    Accounts(Box<AccountsScreen>),
    /// Rows loaded from a JSON file.
    Json(DataGrid<Value>),
}

impl Screen {
    fn grid_size(&self) -> GridSize {
        match self {
            Self::Accounts(screen) => screen.grid.grid_size(),
            Self::Json(grid) => grid.grid_size(),
        }
    }

    fn update(&mut self, message: GridMessage) {
        match self {
            Self::Accounts(screen) => screen.grid.update(message),
            Self::Json(grid) => grid.update(message),
        }
    }

    fn show(&mut self, ui: &mut egui::Ui) -> GridResponse {
        match self {
            Self::Accounts(screen) => {
                let response = screen.grid.show(ui);
                screen.after_frame();
                response
            }
            Self::Json(grid) => grid.show(ui),
        }
    }
}

type ExportResult = Result<Utf8PathBuf, String>;

pub struct DataGridApp {
    screen: Screen,
    export_settings: ExportSettings,
    runtime: tokio::runtime::Handle,
    export_sender: Sender<ExportResult>,
    export_results: Receiver<ExportResult>,
    status: Option<String>,
    show_logs: bool,
}

impl DataGridApp {
    pub fn new(
        screen: Screen,
        export_settings: ExportSettings,
        runtime: tokio::runtime::Handle,
    ) -> Self {
        let (export_sender, export_results) = channel();
        Self {
            screen,
            export_settings,
            runtime,
            export_sender,
            export_results,
            status: None,
            show_logs: false,
        }
    }

    /// Writes the export on a blocking worker; the result arrives on the channel.
    fn start_export(&self, ctx: &egui::Context, request: ExportRequest) {
        let settings = self.export_settings.clone();
        let directory = settings.resolve_directory();
        let sender = self.export_sender.clone();
        let ctx = ctx.clone();
        info!("Writing {} export to {directory}", request.format);

        self.runtime.spawn_blocking(move || {
            let result = write_export(&request, &settings, &directory, Utc::now())
                .inspect_err(|e| error!("Export failed: {e}"))
                .map_err(|e| e.to_string());
            libdatagrid::try_log_error!(sender.send(result), "Export result dropped");
            ctx.request_repaint();
        });
    }

    fn poll_exports(&mut self) {
        while let Ok(result) = self.export_results.try_recv() {
            self.status = Some(match result {
                Ok(path) => format!("Exported to {path}"),
                Err(e) => format!("Export failed: {e}"),
            });
        }
    }

    fn draw_top_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Size");
            let current = self.screen.grid_size();
            egui::ComboBox::from_id_salt("grid_size")
                .selected_text(current.to_string())
                .show_ui(ui, |ui| {
                    for size in enum_iterator::all::<GridSize>() {
                        if ui.selectable_label(size == current, size.to_string()).clicked() {
                            self.screen.update(GridMessage::SetGridSize(size));
                        }
                    }
                });
            ui.separator();
            ui.toggle_value(&mut self.show_logs, "Logs");

            if let Some(status) = &self.status {
                ui.separator();
                ui.label(RichText::new(status).italics());
            }
        });
    }
}

impl eframe::App for DataGridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_exports();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.draw_top_panel(ui);
        });

        if let Screen::Accounts(screen) = &self.screen {
            egui::SidePanel::right("selection_panel")
                .default_width(220.0)
                .show(ctx, |ui| screen.draw_selection_panel(ui));
        }

        let response = egui::CentralPanel::default()
            .show(ctx, |ui| self.screen.show(ui))
            .inner;
        if let Some(request) = response.export {
            self.start_export(ctx, request);
        }

        draw_log_window(ctx, &mut self.show_logs);
    }
}
