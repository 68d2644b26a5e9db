use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct SalesPandaApp {
    pub state: AppState,
}

impl eframe::App for SalesPandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: header row, columns, comparison ----
        egui::SidePanel::left("settings_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: preview and report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.state);
        });
    }
}
