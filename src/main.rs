mod app;
mod color;
mod state;
mod ui;

use anyhow::Result;
use app::KfantrixApp;
use eframe::egui;
use kfantrix::config::DashboardConfig;

fn main() -> Result<()> {
    let config = DashboardConfig::resolve()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging_level.as_str()),
    )
    .init();
    log::info!("Reading data from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "KFANTRIX – K-pop Channel Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(KfantrixApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the dashboard: {e}"))
}
