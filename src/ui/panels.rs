use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::CellValue;
use crate::report::columns::SemanticKey;
use crate::report::format::{category_bars, pie_slices};
use crate::report::metrics::Metric;
use crate::state::{AppState, HEAD_ROWS, PREVIEW_ROWS};
use crate::ui::{plot, table};

const NOT_CHOSEN: &str = "— не выбрано —";

// ---------------------------------------------------------------------------
// Left side panel – header row, columns, comparison
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Настройки");
    ui.separator();

    let Some(sheet_len) = state.sheet.as_ref().map(|s| s.len()) else {
        ui.label("Файл не загружен.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Header row ----
            ui.strong("Строка заголовков (0 = первая строка)");
            let mut row = state.header_row;
            let max_row = sheet_len.saturating_sub(1);
            if ui
                .add(egui::DragValue::new(&mut row).range(0..=max_row).speed(0.1))
                .changed()
            {
                state.set_header_row(row);
            }
            ui.separator();

            column_pickers(ui, state);
            ui.separator();

            comparison_controls(ui, state);
        });
}

/// One picker per undetected key; detected keys are shown read-only.
fn column_pickers(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Колонки");
    let Some(columns) = state.dataset.as_ref().map(|d| d.column_names.clone()) else {
        return;
    };

    for key in SemanticKey::DETECTABLE {
        if let Some(column) = state.detected.get(key) {
            ui.label(format!("{}: {column}", key.label()));
            continue;
        }

        let current = state.user_choices.get(&key).cloned();
        let selected_text = current.as_deref().unwrap_or(NOT_CHOSEN).to_string();
        let mut picked: Option<Option<String>> = None;

        ui.label(
            RichText::new(format!("Выберите колонку для '{}'", key.label()))
                .color(Color32::from_rgb(200, 140, 0)),
        );
        egui::ComboBox::from_id_salt(("column", key))
            .selected_text(selected_text)
            .show_ui(ui, |ui: &mut Ui| {
                if ui.selectable_label(current.is_none(), NOT_CHOSEN).clicked() {
                    picked = Some(None);
                }
                for col in &columns {
                    if ui
                        .selectable_label(current.as_deref() == Some(col.as_str()), col)
                        .clicked()
                    {
                        picked = Some(Some(col.clone()));
                    }
                }
            });

        match picked {
            Some(Some(col)) => state.choose_column(key, col),
            Some(None) => state.clear_choice(key),
            None => {}
        }
    }
}

fn comparison_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Сравнение ИП");
    let sellers: Vec<CellValue> = match &state.report {
        Some(Ok(report)) => report.metrics.sellers().cloned().collect(),
        _ => return,
    };

    egui::ComboBox::from_id_salt("comparison_metric")
        .selected_text(state.comparison.metric.label())
        .show_ui(ui, |ui: &mut Ui| {
            for metric in Metric::ALL {
                ui.selectable_value(&mut state.comparison.metric, metric, metric.label());
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Все").clicked() {
            for seller in &sellers {
                state.comparison.set_selected(seller, true);
            }
        }
        if ui.small_button("Никого").clicked() {
            for seller in &sellers {
                state.comparison.set_selected(seller, false);
            }
        }
    });

    for seller in &sellers {
        let mut checked = state.comparison.is_selected(seller);
        let text = RichText::new(seller.to_string()).color(state.color_map.color_for(seller));
        if ui.checkbox(&mut checked, text).changed() {
            state.comparison.set_selected(seller, checked);
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – preview and report
// ---------------------------------------------------------------------------

/// Render the preview, per-seller metrics and the comparison.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(sheet) = &state.sheet else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("📂 Загрузите Excel файл  (Файл → Открыть…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Превью данных");
            table::preview_table(ui, sheet, PREVIEW_ROWS, state.header_row);
            ui.separator();

            if let Some(dataset) = &state.dataset {
                ui.label(
                    RichText::new("Файл успешно загружен!").color(Color32::from_rgb(40, 160, 60)),
                );
                table::dataset_preview(ui, dataset, HEAD_ROWS);
                ui.label(format!("Колонки в файле: {}", dataset.column_names.join(", ")));
                ui.separator();
            }

            let report = match &state.report {
                Some(Ok(report)) => report,
                Some(Err(msg)) => {
                    ui.label(RichText::new(msg).color(Color32::RED));
                    return;
                }
                None => return,
            };

            ui.strong("Автоматически определенные колонки:");
            ui.code(state.detected.to_pretty_json());
            if report.mapping != state.detected {
                ui.strong("Колонки для расчёта:");
                ui.code(report.mapping.to_pretty_json());
            }
            for warning in &report.metrics.warnings {
                plot::unavailable(ui, warning);
            }
            ui.separator();

            ui.heading("Метрики по ИП");
            for (seller, metrics) in &report.metrics.by_seller {
                egui::CollapsingHeader::new(format!("Метрики для ИП: {seller}"))
                    .id_salt(("seller", seller.to_string()))
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.code(metrics.to_pretty_json());
                        match report.categories.get(seller) {
                            Some(Ok(sums)) => {
                                ui.strong(format!("Продажи по категориям для {seller}"));
                                plot::category_chart(
                                    ui,
                                    &format!("categories_{seller}"),
                                    &category_bars(sums),
                                );
                            }
                            Some(Err(reason)) => plot::unavailable(ui, reason),
                            None => {}
                        }
                    });
            }
            ui.separator();

            ui.heading("Сравнение ИП");
            if state.comparison.selected().is_empty() {
                ui.label("Выберите ИП для сравнения.");
                return;
            }
            match state.comparison.compare(&report.metrics.by_seller) {
                Ok(cmp) => {
                    ui.strong(format!("Сравнение ИП по: {}", cmp.metric.label()));
                    match pie_slices(&cmp) {
                        Ok(slices) => plot::pie_chart(ui, &slices, &state.color_map),
                        Err(reason) => plot::unavailable(ui, reason),
                    }
                }
                Err(reason) => plot::unavailable(ui, reason),
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Файл", |ui: &mut Ui| {
            if ui.button("Открыть…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let sellers = match &state.report {
                Some(Ok(report)) => report.metrics.by_seller.len(),
                _ => 0,
            };
            ui.label(format!("{} строк, {} ИП", ds.len(), sellers));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Открыть отчёт о продажах")
        .add_filter("Таблицы", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
