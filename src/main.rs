mod app;
mod color;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use app::CarbonScopeApp;
use state::AppState;

/// Interactive greenhouse-gas emissions dashboard.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Emissions table to load at startup (.csv, .json or .parquet)
    #[arg(value_name = "DATA_FILE", default_value = "data/emissions.csv")]
    data: PathBuf,
}

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    // No table, no dashboard: a failed startup load is fatal.
    let table = match data::loader::load_file(&args.data) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Cannot load {}: {e:#}", args.data.display());
            std::process::exit(1);
        }
    };
    let (first, last) = table.year_range();
    log::info!(
        "Loaded {} countries spanning {first}–{last} from {}",
        table.len(),
        args.data.display()
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CarbonScope – Emissions Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(CarbonScopeApp::new(AppState::new(table))))),
    )
}
