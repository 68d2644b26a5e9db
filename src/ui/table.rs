use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{RawSheet, SalesDataset};

/// Raw rows before header selection, with the chosen header row highlighted.
pub fn preview_table(ui: &mut Ui, sheet: &RawSheet, rows: usize, header_row: usize) {
    let preview = sheet.preview(rows);
    let width = sheet.width();

    ui.push_id("raw_preview", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto().at_least(28.0))
            .columns(Column::auto().at_least(60.0).clip(true), width)
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for idx in 0..width {
                    header.col(|ui: &mut Ui| {
                        ui.strong(idx.to_string());
                    });
                }
            })
            .body(|mut body| {
                for (row_idx, row) in preview.iter().enumerate() {
                    body.row(18.0, |mut table_row| {
                        table_row.set_selected(row_idx == header_row);
                        table_row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(row_idx.to_string()).weak());
                        });
                        for idx in 0..width {
                            table_row.col(|ui: &mut Ui| {
                                let text = row.get(idx).map(|v| v.to_string()).unwrap_or_default();
                                ui.label(text);
                            });
                        }
                    });
                }
            });
    });
}

/// First `rows` records parsed under the chosen header. The `#` column is the
/// record's row in the raw sheet.
pub fn dataset_preview(ui: &mut Ui, dataset: &SalesDataset, rows: usize) {
    let columns = &dataset.column_names;

    ui.push_id("dataset_preview", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .column(Column::auto().at_least(28.0))
            .columns(Column::auto().at_least(60.0).clip(true), columns.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
                for name in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|mut body| {
                for record in dataset.head(rows) {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(record.source_row.to_string()).weak());
                        });
                        for name in columns {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(record.get(name).to_string());
                            });
                        }
                    });
                }
            });
    });
}
