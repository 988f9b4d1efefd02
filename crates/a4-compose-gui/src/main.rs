#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use a4_compose::ComposerOptions;
use anyhow::Context;
use eframe::egui;
use std::path::Path;

mod app;
mod capture;
mod handlers;
mod logger;
mod measure;
mod views;
mod worker;

const CONFIG_FILE: &str = "a4-composer.json";

async fn load_options() -> ComposerOptions {
    let path = Path::new(CONFIG_FILE);
    if !path.exists() {
        return ComposerOptions::default();
    }
    match ComposerOptions::load(path).await {
        Ok(options) => {
            log::info!("Loaded options from {}", path.display());
            options
        }
        Err(e) => {
            log::warn!("Ignoring {}: {}", path.display(), e);
            ComposerOptions::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let status_log = logger::StatusLog::new(200, log::LevelFilter::Info);
    status_log
        .clone()
        .init()
        .context("Failed to install logger")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let options = runtime.block_on(load_options());
    let handle = runtime.handle().clone();
    // UI callbacks may spawn tasks
    let _runtime_guard = runtime.enter();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_title("A4 Composer"),
        ..Default::default()
    };

    eframe::run_native(
        "A4 Composer",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(app::ComposerApp::new(
                cc, handle, options, status_log,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
