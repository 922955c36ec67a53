// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

use eframe::egui;
use etest_wafer_viewer::config::AppConfig;
use etest_wafer_viewer::gui;
use etest_wafer_viewer::session::api::HttpBackend;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!(
        "Backend {}, wafer diameter {}px",
        config.api_base,
        config.wafer_diameter_px
    );
    let backend = match HttpBackend::new(&config.api_base, config.request_timeout) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            log::error!("Failed to create HTTP client: {e}");
            return Err(e.to_string().into());
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1600.0, 1000.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Etest Program Generator",
        options,
        Box::new(move |cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(gui::WaferViewerApp::new(&config, backend)))
        }),
    )?;
    Ok(())
}
