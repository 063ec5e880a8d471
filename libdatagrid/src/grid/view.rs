use chrono::NaiveDate;
use ecolor::Color32;
use egui::{
    Align, Button, Checkbox, ComboBox, CursorIcon, FontId, Label, Layout, RichText, Sense,
    TextEdit, UiBuilder,
};
use egui_extras::{Column, TableBuilder};
use emath::{Rect, pos2, vec2};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use crate::export::{ExportFormat, ExportRequest};
use crate::message::GridMessage;

use super::columns::{ColumnDef, FilterKind};
use super::interaction::{CellHighlight, HoverCell};
use super::layout::{TextMeasure, measure_column};
use super::model::{ColumnKey, GridCell, GridRow};
use super::options::SizeMetrics;
use super::pipeline::{FilterValue, PageButton, PageInfo, page_buttons, search_options, sort_indicator};
use super::selection::HeaderCheckState;
use super::state::{DataGrid, PageRow};

const CONTROL_COLUMN_WIDTH: f32 = 24.0;
const RESIZE_HANDLE_WIDTH: f32 = 6.0;
const PAGE_BUTTON_RADIUS: usize = 2;

/// What the host has to act on after a frame.
#[derive(Debug, Default)]
pub struct GridResponse {
    pub export: Option<ExportRequest>,
}

/// Text width from the egui font system.
struct EguiTextMeasure<'a> {
    ui: &'a egui::Ui,
    font: FontId,
}

impl TextMeasure for EguiTextMeasure<'_> {
    fn text_width(&self, text: &str) -> f32 {
        self.ui
            .painter()
            .layout_no_wrap(text.to_string(), self.font.clone(), Color32::PLACEHOLDER)
            .size()
            .x
    }
}

/// Body line of the table: a data row or the detail line under it.
#[derive(Debug, Clone, Copy)]
enum BodyLine {
    Main(usize),
    Detail(usize),
}

/// Values computed before drawing, as they need the pipeline cache.
struct FrameData {
    page: Vec<PageRow>,
    info: PageInfo,
    header_state: HeaderCheckState,
    summary: String,
    visible: Vec<usize>,
    options: HashMap<ColumnKey, Arc<Vec<String>>>,
    metrics: SizeMetrics,
}

fn styled(cell: GridCell, color: Option<Color32>, size: f32) -> RichText {
    let text = match cell {
        GridCell::Text(text) => RichText::new(text).size(size),
        GridCell::RichText(text) => text,
    };
    match color {
        Some(color) => text.color(color),
        None => text,
    }
}

fn parse_date_input(text: &str) -> Result<Option<NaiveDate>, chrono::ParseError> {
    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map(Some)
    }
}

impl<T: GridRow> DataGrid<T> {
    /// Draws the grid and applies the interactions of this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> GridResponse {
        self.process_pending();

        let metrics = self.grid_size.metrics();
        let font = FontId::proportional(metrics.font_size);
        let page = self.page_rows();
        self.auto_size_new_columns(ui, &page, &font);

        let frame = self.frame_data(page, metrics);
        let mut msgs = vec![];
        ui.vertical(|ui| {
            self.draw_toolbar(ui, &mut msgs, &frame);
            ui.separator();
            self.draw_table(ui, &mut msgs, &frame, &font);
            ui.separator();
            self.draw_footer(ui, &mut msgs, &frame);
        });

        for msg in msgs {
            self.update(msg);
        }
        GridResponse {
            export: self.take_export(),
        }
    }

    fn frame_data(&mut self, page: Vec<PageRow>, metrics: SizeMetrics) -> FrameData {
        let visible = self.visible_columns();
        let select_columns: Vec<ColumnKey> = visible
            .iter()
            .map(|&index| &self.columns()[index])
            .filter(|column| {
                matches!(
                    column.filter,
                    Some(FilterKind::SingleSelect | FilterKind::MultiSelect)
                )
            })
            .map(|column| column.key.clone())
            .collect();
        let options = select_columns
            .into_iter()
            .map(|key| {
                let options = self.select_options(&key);
                (key, options)
            })
            .collect();

        FrameData {
            info: self.page_info(),
            header_state: self.header_check_state(),
            summary: self.selection_summary(),
            page,
            visible,
            options,
            metrics,
        }
    }

    /// Sizes visible columns that have no width yet from the rendered page.
    fn auto_size_new_columns(&mut self, ui: &egui::Ui, page: &[PageRow], font: &FontId) {
        let pending: Vec<usize> = self
            .visible_columns()
            .into_iter()
            .filter(|&index| self.layout.needs_auto_size(&self.columns()[index].key))
            .collect();
        if pending.is_empty() {
            return;
        }

        let measure = EguiTextMeasure {
            ui,
            font: font.clone(),
        };
        for index in pending {
            let column = &self.columns()[index];
            let rows = page
                .iter()
                .filter_map(|row| self.rows().get(row.data_index));
            let measured = measure_column(column, rows, &measure);
            let column = column.key.clone();
            self.update(GridMessage::AutoSizeColumn { column, measured });
        }
    }

    fn draw_toolbar(&self, ui: &mut egui::Ui, msgs: &mut Vec<GridMessage>, frame: &FrameData) {
        ui.horizontal(|ui| {
            if self.options.input_filter {
                let mut text = self.filter.global_text.clone();
                let response = ui.add(
                    TextEdit::singleline(&mut text)
                        .hint_text("Search...")
                        .desired_width(200.0),
                );
                if response.changed() {
                    msgs.push(GridMessage::SetGlobalFilter(text));
                }
            }

            if self.options.columns_visible_option {
                ui.menu_button("Columns", |ui| {
                    for column in self.columns() {
                        let mut visible = self.layout.is_visible(&column.key);
                        if ui.checkbox(&mut visible, &column.header).changed() {
                            msgs.push(GridMessage::ToggleColumnVisibility(column.key.clone()));
                        }
                    }
                });
            }

            if self.options.data_export {
                ui.menu_button("Export", |ui| {
                    for format in enum_iterator::all::<ExportFormat>() {
                        if ui.button(format.to_string()).clicked() {
                            ui.close_menu();
                            msgs.push(GridMessage::Export(format));
                        }
                    }
                });
            }

            if !frame.summary.is_empty() {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(RichText::new(&frame.summary).italics());
                });
            }
        });
    }

    fn draw_table(
        &self,
        ui: &mut egui::Ui,
        msgs: &mut Vec<GridMessage>,
        frame: &FrameData,
        font: &FontId,
    ) {
        let selection_enabled = self.options.selection_enabled();
        let expandable = self
            .options
            .row_expandable
            .as_ref()
            .filter(|expandable| expandable.enabled);
        let metrics = frame.metrics;
        let row_height = metrics.row_height();
        let has_filters = frame
            .visible
            .iter()
            .any(|&index| self.columns()[index].filter.is_some());
        let header_height = if has_filters {
            row_height * 2.0 + 4.0
        } else {
            row_height
        };

        let widths: Vec<f32> = frame
            .visible
            .iter()
            .map(|&index| self.layout.width_or_default(&self.columns()[index].key))
            .collect();
        let control_columns = usize::from(expandable.is_some()) + usize::from(selection_enabled);
        let spacing = ui.spacing().item_spacing.x;
        let table_width = widths.iter().sum::<f32>()
            + control_columns as f32 * CONTROL_COLUMN_WIDTH
            + (widths.len() + control_columns) as f32 * spacing;

        let mut builder = TableBuilder::new(ui)
            .id_salt(self.id.with("table"))
            .striped(false)
            .vscroll(true)
            .sense(Sense::click())
            .cell_layout(Layout::left_to_right(Align::Center));
        // Detail lines draw across the whole row from the first cell, which
        // therefore must not clip.
        for _ in 0..control_columns {
            builder = builder.column(Column::exact(CONTROL_COLUMN_WIDTH).clip(false));
        }
        for width in &widths {
            builder = builder.column(Column::exact(*width).clip(true));
        }

        let lines: Vec<BodyLine> = frame
            .page
            .iter()
            .enumerate()
            .flat_map(|(index, row)| {
                let expanded = expandable.is_some() && self.expansion.is_expanded(&row.key);
                std::iter::once(BodyLine::Main(index))
                    .chain(expanded.then_some(BodyLine::Detail(index)))
            })
            .collect();
        let detail_height = expandable.map_or(0.0, |expandable| expandable.detail_height);
        let heights = lines.iter().map(|line| match line {
            BodyLine::Main(_) => row_height,
            BodyLine::Detail(_) => detail_height,
        });

        let highlight = &self.settings.style.highlight;
        let mut hovered: Option<HoverCell> = None;

        builder
            .header(header_height, |mut header| {
                if expandable.is_some() {
                    header.col(|_| {});
                }
                if selection_enabled {
                    header.col(|ui| {
                        let mut all = frame.header_state == HeaderCheckState::Checked;
                        let checkbox = Checkbox::new(&mut all, "")
                            .indeterminate(frame.header_state == HeaderCheckState::Indeterminate);
                        if ui.add(checkbox).changed() {
                            msgs.push(GridMessage::TogglePageSelected(all));
                        }
                    });
                }
                for &index in &frame.visible {
                    let column = &self.columns()[index];
                    header.col(|ui| {
                        ui.painter().rect_filled(
                            ui.available_rect_before_wrap(),
                            0.0,
                            ui.visuals().faint_bg_color,
                        );
                        ui.vertical(|ui| {
                            self.draw_header_label(ui, msgs, column, metrics);
                            if column.filter.is_some() {
                                self.draw_filter(ui, msgs, column, frame);
                            }
                        });
                        self.draw_resize_handle(ui, msgs, column, frame, font);
                    });
                }
            })
            .body(|body| {
                body.heterogeneous_rows(heights, |mut row| {
                    match lines[row.index()] {
                        BodyLine::Main(index) => {
                            let Some(page_row) = frame.page.get(index) else {
                                return;
                            };
                            let Some(data) = self.rows().get(page_row.data_index) else {
                                return;
                            };
                            let key = &page_row.key;
                            let selected = self.shows_selected(page_row);
                            let expanded = expandable.is_some() && self.expansion.is_expanded(key);
                            row.set_selected(selected);

                            let row_style = self
                                .options
                                .row_class
                                .as_ref()
                                .map(|row_class| self.settings.style.resolve(&row_class(data)))
                                .unwrap_or_default();
                            let row_background = if selected {
                                Some(highlight.selected)
                            } else if self
                                .interaction
                                .shows_double_click(key, selection_enabled, selected)
                            {
                                Some(highlight.double_clicked)
                            } else if expanded {
                                Some(highlight.expanded)
                            } else {
                                row_style.background
                            };
                            let paint_row = |ui: &mut egui::Ui| {
                                if let Some(background) = row_background {
                                    ui.painter().rect_filled(
                                        ui.available_rect_before_wrap(),
                                        0.0,
                                        background,
                                    );
                                }
                            };

                            if expandable.is_some() {
                                row.col(|ui| {
                                    paint_row(ui);
                                    let icon = if expanded { "⏷" } else { "⏵" };
                                    if ui.add(Button::new(icon).frame(false)).clicked() {
                                        msgs.push(GridMessage::ToggleRowExpanded(key.clone()));
                                    }
                                });
                            }
                            if selection_enabled {
                                row.col(|ui| {
                                    paint_row(ui);
                                    if page_row.selectable {
                                        let mut checked = selected;
                                        if ui.checkbox(&mut checked, "").changed() {
                                            msgs.push(GridMessage::ToggleRowSelected(key.clone()));
                                        }
                                    }
                                });
                            }

                            for &column_index in &frame.visible {
                                let column = &self.columns()[column_index];
                                let cell_highlight = if self.row_col_highlight {
                                    self.interaction.cell_highlight(index, &column.key)
                                } else {
                                    CellHighlight::None
                                };
                                let (_, response) = row.col(|ui| {
                                    let class_style =
                                        self.settings.style.resolve(&column.cell_class(data));
                                    let background = match cell_highlight {
                                        CellHighlight::Cell => Some(highlight.cell_background),
                                        CellHighlight::Line => Some(highlight.row_col),
                                        CellHighlight::None => {
                                            class_style.background.or(row_background)
                                        }
                                    };
                                    if let Some(background) = background {
                                        ui.painter().rect_filled(
                                            ui.available_rect_before_wrap(),
                                            0.0,
                                            background,
                                        );
                                    }
                                    let foreground = match cell_highlight {
                                        CellHighlight::Cell => Some(highlight.cell_foreground),
                                        _ => class_style.foreground.or(row_style.foreground),
                                    };
                                    ui.add_space(metrics.padding_x);
                                    ui.add(
                                        Label::new(styled(
                                            column.cell(data),
                                            foreground,
                                            metrics.font_size,
                                        ))
                                        .selectable(false)
                                        .truncate(),
                                    );
                                });
                                if self.row_col_highlight && response.hovered() {
                                    hovered = Some(HoverCell {
                                        row: index,
                                        column: column.key.clone(),
                                    });
                                }
                            }

                            if row.response().clicked() {
                                msgs.push(GridMessage::RowClicked {
                                    key: key.clone(),
                                    data_index: page_row.data_index,
                                    at: Instant::now(),
                                });
                            }
                        }
                        BodyLine::Detail(index) => {
                            let (Some(page_row), Some(expandable)) =
                                (frame.page.get(index), expandable)
                            else {
                                return;
                            };
                            let Some(data) = self.rows().get(page_row.data_index) else {
                                return;
                            };
                            row.col(|ui| {
                                let span = Rect::from_min_size(
                                    ui.max_rect().min,
                                    vec2(table_width, detail_height),
                                );
                                ui.painter()
                                    .rect_filled(span, 0.0, ui.visuals().faint_bg_color);
                                ui.scope_builder(UiBuilder::new().max_rect(span.shrink(4.0)), |ui| {
                                    (expandable.render)(ui, data);
                                });
                            });
                            for _ in 1..(control_columns + frame.visible.len()) {
                                row.col(|_| {});
                            }
                        }
                    }
                });
            });

        if self.row_col_highlight {
            match hovered {
                Some(cell) if self.interaction.hover() != Some(&cell) => {
                    msgs.push(GridMessage::HoverCell {
                        row: cell.row,
                        column: cell.column,
                    });
                }
                None if self.interaction.hover().is_some() => msgs.push(GridMessage::ClearHover),
                _ => {}
            }
        }

        if frame.page.is_empty() {
            ui.label(RichText::new("No data available").italics());
        }
    }

    fn draw_header_label(
        &self,
        ui: &mut egui::Ui,
        msgs: &mut Vec<GridMessage>,
        column: &ColumnDef<T>,
        metrics: SizeMetrics,
    ) {
        let text = match sort_indicator(&self.sort, &column.key) {
            Some(indicator) => format!("{} {indicator}", column.header),
            None => column.header.clone(),
        };
        let label = Label::new(RichText::new(text).strong().size(metrics.font_size))
            .selectable(false)
            .truncate();
        if column.sortable {
            if ui
                .add(label.sense(Sense::click()))
                .on_hover_text("Click to sort")
                .clicked()
            {
                msgs.push(GridMessage::ToggleSort(column.key.clone()));
            }
        } else {
            ui.add(label);
        }
    }

    fn draw_filter(
        &self,
        ui: &mut egui::Ui,
        msgs: &mut Vec<GridMessage>,
        column: &ColumnDef<T>,
        frame: &FrameData,
    ) {
        let key = &column.key;
        let width = ui.available_width() - RESIZE_HANDLE_WIDTH;
        let current = self.filter.column(key);
        let no_options = Arc::default();
        let options = frame.options.get(key).unwrap_or(&no_options);

        match column.filter {
            Some(FilterKind::Input | FilterKind::Date) => {
                let mut text = match current {
                    Some(FilterValue::Text(text)) => text.clone(),
                    _ => String::new(),
                };
                let hint = if column.filter == Some(FilterKind::Date) {
                    "YYYY-MM-DD"
                } else {
                    "Filter..."
                };
                let response =
                    ui.add(TextEdit::singleline(&mut text).hint_text(hint).desired_width(width));
                if response.changed() {
                    msgs.push(GridMessage::SetColumnFilter {
                        column: key.clone(),
                        value: FilterValue::Text(text),
                    });
                }
            }
            Some(FilterKind::SingleSelect) => {
                let selected = match current {
                    Some(FilterValue::Text(value)) => Some(value.as_str()),
                    _ => None,
                };
                let selected_text = selected.map_or_else(
                    || "All".to_string(),
                    |value| column.filter_params.label_for(value),
                );
                ComboBox::from_id_salt(self.id.with(("single", key)))
                    .selected_text(selected_text)
                    .width(width)
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(selected.is_none(), "All").clicked() {
                            msgs.push(GridMessage::ClearColumnFilter(key.clone()));
                        }
                        for option in options.iter() {
                            let label = column.filter_params.label_for(option);
                            if ui
                                .selectable_label(selected == Some(option.as_str()), label)
                                .clicked()
                            {
                                msgs.push(GridMessage::SetColumnFilter {
                                    column: key.clone(),
                                    value: FilterValue::Text(option.clone()),
                                });
                            }
                        }
                    });
            }
            Some(FilterKind::MultiSelect) => {
                let chosen: BTreeSet<String> = match current {
                    Some(FilterValue::Many(chosen)) => chosen.clone(),
                    _ => BTreeSet::new(),
                };
                let title = if chosen.is_empty() {
                    "Any".to_string()
                } else {
                    format!("{} selected", chosen.len())
                };
                ui.menu_button(title, |ui| {
                    let search_id = self.id.with(("multi_search", key, self.columns_generation));
                    let mut query = ui
                        .data_mut(|data| data.get_temp::<String>(search_id))
                        .unwrap_or_default();
                    if ui
                        .add(TextEdit::singleline(&mut query).hint_text("Search options..."))
                        .changed()
                    {
                        ui.data_mut(|data| data.insert_temp(search_id, query.clone()));
                    }
                    egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                        for option in search_options(options, &query) {
                            let mut checked = chosen.contains(option);
                            let label = column.filter_params.label_for(option);
                            if ui.checkbox(&mut checked, label).changed() {
                                let mut next = chosen.clone();
                                if checked {
                                    next.insert(option.clone());
                                } else {
                                    next.remove(option);
                                }
                                msgs.push(GridMessage::SetColumnFilter {
                                    column: key.clone(),
                                    value: FilterValue::Many(next),
                                });
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Clear").clicked() {
                        msgs.push(GridMessage::ClearColumnFilter(key.clone()));
                        ui.close_menu();
                    }
                });
            }
            Some(FilterKind::DateRange) => {
                let draft_id = self.id.with(("date_range", key, self.columns_generation));
                let mut draft = ui
                    .data_mut(|data| data.get_temp::<[String; 2]>(draft_id))
                    .unwrap_or_else(|| match current {
                        Some(FilterValue::Range { from, to }) => [
                            from.map(|d| d.to_string()).unwrap_or_default(),
                            to.map(|d| d.to_string()).unwrap_or_default(),
                        ],
                        _ => Default::default(),
                    });
                let mut changed = false;
                ui.horizontal(|ui| {
                    let half = (width - ui.spacing().item_spacing.x) / 2.0;
                    for (text, hint) in draft.iter_mut().zip(["From", "To"]) {
                        changed |= ui
                            .add(TextEdit::singleline(text).hint_text(hint).desired_width(half))
                            .changed();
                    }
                });
                if changed {
                    ui.data_mut(|data| data.insert_temp(draft_id, draft.clone()));
                    // Partially typed dates keep the previous filter.
                    if let (Ok(from), Ok(to)) =
                        (parse_date_input(&draft[0]), parse_date_input(&draft[1]))
                    {
                        msgs.push(GridMessage::SetColumnFilter {
                            column: key.clone(),
                            value: FilterValue::Range { from, to },
                        });
                    }
                }
            }
            None => {}
        }
    }

    fn draw_resize_handle(
        &self,
        ui: &mut egui::Ui,
        msgs: &mut Vec<GridMessage>,
        column: &ColumnDef<T>,
        frame: &FrameData,
        font: &FontId,
    ) {
        let cell = ui.max_rect();
        let rect = Rect::from_min_max(
            pos2(cell.right() - RESIZE_HANDLE_WIDTH / 2.0, cell.top()),
            pos2(cell.right() + RESIZE_HANDLE_WIDTH / 2.0, cell.bottom()),
        );
        let response = ui
            .interact(rect, self.id.with(("resize", &column.key)), Sense::click_and_drag())
            .on_hover_cursor(CursorIcon::ResizeColumn);

        if response.hovered() || response.dragged() {
            ui.painter().vline(
                cell.right(),
                cell.y_range(),
                ui.visuals().widgets.active.bg_stroke,
            );
        }

        if response.double_clicked() {
            let measure = EguiTextMeasure {
                ui,
                font: font.clone(),
            };
            let rows = frame
                .page
                .iter()
                .filter_map(|row| self.rows().get(row.data_index));
            msgs.push(GridMessage::AutoSizeColumn {
                column: column.key.clone(),
                measured: measure_column(column, rows, &measure),
            });
        } else if response.dragged() {
            let delta = response.drag_delta().x;
            if delta != 0.0 {
                msgs.push(GridMessage::ResizeColumn {
                    column: column.key.clone(),
                    delta,
                });
            }
        }
    }

    fn draw_footer(&self, ui: &mut egui::Ui, msgs: &mut Vec<GridMessage>, frame: &FrameData) {
        let info = frame.info;
        ui.horizontal(|ui| {
            if self.pagination.enabled {
                ui.label("Rows per page");
                let page_size = self.pagination.page_size();
                ComboBox::from_id_salt(self.id.with("page_size"))
                    .selected_text(page_size.to_string())
                    .width(60.0)
                    .show_ui(ui, |ui| {
                        for size in self.settings.page_size_choices(page_size) {
                            if ui
                                .selectable_label(size == page_size, size.to_string())
                                .clicked()
                            {
                                msgs.push(GridMessage::SetPageSize(size));
                            }
                        }
                    });

                if ui.add_enabled(info.has_prev(), Button::new("Prev")).clicked() {
                    msgs.push(GridMessage::PrevPage);
                }
                for button in page_buttons(info.current_page, info.display_pages(), PAGE_BUTTON_RADIUS)
                {
                    match button {
                        PageButton::Page(page) => {
                            if ui
                                .selectable_label(page == info.current_page, page.to_string())
                                .clicked()
                            {
                                msgs.push(GridMessage::SetPage(page));
                            }
                        }
                        PageButton::Gap => {
                            ui.label("...");
                        }
                    }
                }
                if ui.add_enabled(info.has_next(), Button::new("Next")).clicked() {
                    msgs.push(GridMessage::NextPage);
                }

                ui.separator();
                ui.label(format!(
                    "Showing {} to {} of {} entries",
                    info.start_entry, info.end_entry, info.total
                ));
            } else {
                ui.label(format!("Total entries: {}", info.total));
            }

            if self.options.selection_enabled() {
                ui.separator();
                ui.label(format!("Selected: {}", self.selection.len()));
            }
        });
    }
}
