use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use ecolor::Color32;
use egui::{RichText, TextWrapMode};
use egui_extras::{Column, TableBuilder, TableRow};
use eyre::Result;
use tracing::{
    Level,
    field::{Field, Visit},
};
use tracing_subscriber::{EnvFilter, Layer};

/// Records kept for the log window; older ones are dropped first.
const MAX_RECORDS: usize = 500;

static RECORDS: Mutex<VecDeque<LogRecord>> = Mutex::new(VecDeque::new());

/// Logs the error of a `Result` without propagating it.
#[macro_export]
macro_rules! try_log_error {
    ($expr:expr, $what:expr $(,)?) => {
        if let Err(e) = $expr {
            ::tracing::error!("{}: {}", $what, e)
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub target: String,
    pub message: String,
    pub level: Level,
}

struct CaptureLayer;

struct MessageVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut MessageVisitor(&mut fields));
        push_record(LogRecord {
            target: event.metadata().target().to_string(),
            message: fields.remove("message").unwrap_or_else(|| "-".to_string()),
            level: *event.metadata().level(),
        });
    }
}

fn push_record(record: LogRecord) {
    // A poisoned lock only means a panic elsewhere; the records are still usable.
    let mut records = RECORDS.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    if records.len() == MAX_RECORDS {
        records.pop_front();
    }
    records.push_back(record);
}

/// Snapshot of the captured records, oldest first.
#[must_use]
pub fn recent_logs() -> Vec<LogRecord> {
    RECORDS
        .lock()
        .map(|records| records.iter().cloned().collect())
        .unwrap_or_default()
}

fn level_label(level: Level) -> (Color32, &'static str) {
    match level {
        Level::ERROR => (Color32::RED, "Error"),
        Level::WARN => (Color32::YELLOW, "Warn"),
        Level::INFO => (Color32::GREEN, "Info"),
        Level::DEBUG => (Color32::LIGHT_BLUE, "Debug"),
        Level::TRACE => (Color32::GRAY, "Trace"),
    }
}

/// Shows captured records in a window. Clears `open` when the user closes it.
pub fn draw_log_window(ctx: &egui::Context, open: &mut bool) {
    egui::Window::new("Logs")
        .open(open)
        .collapsible(true)
        .resizable(true)
        .show(ctx, |ui| {
            ui.style_mut().wrap_mode = Some(TextWrapMode::Extend);
            let records = recent_logs();
            let heights = records
                .iter()
                .map(|record| record.message.lines().count().max(1) as f32 * 15.0);

            TableBuilder::new(ui)
                .column(Column::auto().resizable(true))
                .column(Column::auto().resizable(true))
                .column(Column::remainder())
                .vscroll(true)
                .stick_to_bottom(true)
                .header(20.0, |mut header| {
                    for title in ["Level", "Source", "Message"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.heterogeneous_rows(heights, |mut row: TableRow| {
                        let record = &records[row.index()];
                        row.col(|ui| {
                            let (color, text) = level_label(record.level);
                            ui.colored_label(color, text);
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&record.target).color(Color32::GRAY).monospace());
                        });
                        row.col(|ui| {
                            ui.label(RichText::new(&record.message).monospace());
                        });
                    });
                });
        });
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber: stdout formatting plus the capture layer
/// feeding the log window. Both honour `RUST_LOG`, defaulting to `info`.
pub fn start_logging() -> Result<()> {
    use std::io::stdout;
    use tracing_subscriber::{Registry, fmt, layer::SubscriberExt};

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .without_time()
                .with_writer(stdout)
                .with_filter(env_filter()),
        )
        .with(CaptureLayer.with_filter(env_filter()));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn capture_layer_records_messages_and_stays_bounded() {
        for i in 0..(MAX_RECORDS + 10) {
            push_record(LogRecord {
                target: "test".to_string(),
                message: format!("bounded {i}"),
                level: Level::DEBUG,
            });
        }
        assert!(recent_logs().len() <= MAX_RECORDS);

        let subscriber = tracing_subscriber::registry().with(CaptureLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("capture test message");
        });
        let records = recent_logs();
        assert!(
            records
                .iter()
                .any(|r| r.message == "capture test message" && r.level == Level::WARN)
        );
    }

    #[test]
    fn try_log_error_swallows_errors() {
        let failing: std::result::Result<(), String> = Err("boom".to_string());
        try_log_error!(failing, "Failed to do the thing");
        let ok: std::result::Result<(), String> = Ok(());
        try_log_error!(ok, "Never logged");
    }
}
