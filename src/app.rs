use eframe::egui;

use crate::data::query::{coverage_query, series_query, totals_query};
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CarbonScopeApp {
    pub state: AppState,
}

impl CarbonScopeApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CarbonScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection controls ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Re-run the queries with the controls as they stand this frame.
        // The table never changes underneath them, so this is pure
        // recomputation over a few hundred rows at most.
        let selection = self.state.selection();
        let series = series_query(&self.state.table, &selection);
        let totals = totals_query(&self.state.table, &selection);
        let coverage = coverage_query(&self.state.table, &selection);

        // ---- Bottom strip: totals table ----
        egui::TopBottomPanel::bottom("totals_strip")
            .default_height(150.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::totals_strip(ui, &totals, &coverage, &self.state);
            });

        // ---- Central panel: the two charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let chart_height = ((ui.available_height() - 64.0) / 2.0).max(120.0);

            ui.heading("Greenhouse Gas Emissions");
            plot::series_plot(
                ui,
                &series,
                self.state.table.years(),
                &self.state.color_map,
                chart_height,
            );
            ui.separator();
            ui.heading("Total Emissions by Country/Region");
            plot::totals_plot(ui, &totals, &self.state.color_map, chart_height);
        });
    }
}
