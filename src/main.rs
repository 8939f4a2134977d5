use anyhow::{Context, Result, anyhow};
use eframe::egui;

use rais_dashboard::app::RaisDashboardApp;
use rais_dashboard::config::AppConfig;

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env_and_args().context("reading configuration")?;
    log::info!("Reading datasets from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Microeletrônica no Brasil – RAIS 2006–2019",
        options,
        Box::new(|_cc| Ok(Box::new(RaisDashboardApp::new(config)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
