use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::query::TotalPoint;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection controls
// ---------------------------------------------------------------------------

/// Render the year-range inputs and the country checkbox list.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Selection");
    ui.separator();

    let (min_year, max_year) = state.table.year_range();

    // ---- Year range ----
    ui.strong("Year range");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        ui.add(
            egui::DragValue::new(&mut state.start_year)
                .range(min_year..=max_year)
                .speed(0.2),
        );
        ui.label("to");
        ui.add(
            egui::DragValue::new(&mut state.end_year)
                .range(min_year..=max_year)
                .speed(0.2),
        );
    });
    if state.start_year > state.end_year {
        ui.colored_label(Color32::RED, "Start year is after end year");
    }
    ui.separator();

    // Clone what we need so we can mutate state inside the loop. Duplicate
    // rows collapse to one checkbox; first occurrence wins the position.
    let mut countries: Vec<String> = Vec::new();
    for country in state.table.countries() {
        if !countries.iter().any(|seen| seen == country) {
            countries.push(country.to_owned());
        }
    }

    // ---- Country list ----
    ui.strong(format!(
        "Countries ({}/{})",
        state.selected.len(),
        countries.len()
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
        ui.add(
            egui::TextEdit::singleline(&mut state.country_search)
                .hint_text("Filter countries")
                .desired_width(ui.available_width()),
        );
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let needle = state.country_search.to_lowercase();
            for country in &countries {
                if !needle.is_empty() && !country.to_lowercase().contains(&needle) {
                    continue;
                }

                let text =
                    RichText::new(country).color(state.color_map.color_for(country));
                let mut checked = state.selected.contains(country);
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_country(country);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let (first, last) = state.table.year_range();
        ui.label(format!(
            "{} countries, years {first}–{last}, {} selected",
            state.table.len(),
            state.selected.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

/// Let the user switch to another dataset. The current table stays in place
/// when the chosen file fails to load.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                let (first, last) = table.year_range();
                log::info!(
                    "Loaded {} countries spanning {first}–{last} from {}",
                    table.len(),
                    path.display()
                );
                state.replace_table(table);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Totals strip – the numbers behind the bar chart
// ---------------------------------------------------------------------------

/// Table of the current selection: total, mean over the covered years, and
/// how many in-range years actually carried a value. `coverage` comes from
/// [`coverage_query`][crate::data::query::coverage_query] and lines up with
/// `totals` row for row, so duplicate-named rows keep their own counts.
pub fn totals_strip(
    ui: &mut Ui,
    totals: &[TotalPoint<'_>],
    coverage: &[usize],
    state: &AppState,
) {
    ui.strong("Totals for the selected range");

    if totals.is_empty() {
        ui.label("Nothing selected.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::remainder())
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(60.0))
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Total");
            });
            header.col(|ui| {
                ui.strong("Mean/yr");
            });
            header.col(|ui| {
                ui.strong("Years");
            });
        })
        .body(|mut body| {
            for (point, &years) in totals.iter().zip(coverage) {
                body.row(16.0, |mut row| {
                    row.col(|ui| {
                        ui.label(
                            RichText::new(point.country)
                                .color(state.color_map.color_for(point.country)),
                        );
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}", point.total));
                    });
                    row.col(|ui| {
                        let mean = if years > 0 {
                            point.total / years as f64
                        } else {
                            0.0
                        };
                        ui.label(format!("{mean:.1}"));
                    });
                    row.col(|ui| {
                        ui.label(years.to_string());
                    });
                });
            }
        });
}
