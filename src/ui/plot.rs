use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::ColorMap;
use crate::data::query::{SeriesPoint, TotalPoint};

// ---------------------------------------------------------------------------
// Emissions time-series chart (upper half of the central panel)
// ---------------------------------------------------------------------------

/// Render the per-country emissions lines over the selected year range.
///
/// `points` arrive in row-major order; [`line_runs`] cuts them into runs at
/// country changes and skipped year columns, so a missing value shows as a
/// gap in the line. `years` is the table's full year-column list.
pub fn series_plot(
    ui: &mut Ui,
    points: &[SeriesPoint<'_>],
    years: &[i32],
    colors: &ColorMap,
    height: f32,
) {
    Plot::new("emissions_series")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Emissions (Mt CO\u{2082}e)")
        .x_axis_formatter(|mark, _range| format_year(mark.value))
        .label_formatter(|name, point| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n{}: {:.1}", point.x.round() as i64, point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for run in line_runs(points, years) {
                let country = run[0].country;

                let line: PlotPoints = run
                    .iter()
                    .map(|p| [f64::from(p.year), p.emissions])
                    .collect();

                // Runs of one country share name and colour, so the legend
                // shows a single entry and toggles all of them together.
                plot_ui.line(
                    Line::new(line)
                        .name(country)
                        .color(colors.color_for(country))
                        .width(2.0),
                );
            }
        });
}

/// Split the melted points into per-line runs: one country, stepping only
/// to the directly following year column. A skipped column means a missing
/// value, and the run ends so the chart draws a gap instead of bridging it.
fn line_runs<'p, 'a>(
    points: &'p [SeriesPoint<'a>],
    years: &'p [i32],
) -> impl Iterator<Item = &'p [SeriesPoint<'a>]> {
    points.chunk_by(move |a, b| a.country == b.country && next_year(years, a.year) == Some(b.year))
}

/// The year column directly after `year`, if any.
fn next_year(years: &[i32], year: i32) -> Option<i32> {
    let idx = years.partition_point(|&y| y <= year);
    years.get(idx).copied()
}

/// Years are integers; blank out the fractional grid marks that appear
/// once the plot is zoomed in far enough.
fn format_year(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        String::new()
    }
}

// ---------------------------------------------------------------------------
// Per-country totals chart (lower half of the central panel)
// ---------------------------------------------------------------------------

/// Render one bar per retained row, in table order, at integer x positions.
///
/// Every bar gets its own named chart so the legend lists countries and
/// clicking a legend entry toggles all bars carrying that name.
pub fn totals_plot(ui: &mut Ui, totals: &[TotalPoint<'_>], colors: &ColorMap, height: f32) {
    let names: Vec<String> = totals.iter().map(|t| t.country.to_owned()).collect();

    Plot::new("emissions_totals")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Country/Region")
        .y_axis_label("Total emissions (Mt CO\u{2082}e)")
        .x_axis_formatter(move |mark, _range| bar_label(&names, mark.value))
        .label_formatter(|name, point| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}: {:.1}", point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (index, point) in totals.iter().enumerate() {
                let bar = Bar::new(index as f64, point.total)
                    .name(point.country)
                    .fill(colors.color_for(point.country))
                    .width(0.6);

                plot_ui.bar_chart(BarChart::new(vec![bar]).name(point.country));
            }
        });
}

/// Label whole-number positions with their country, everything else blank.
fn bar_label(names: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    names.get(index as usize).cloned().unwrap_or_default()
}
