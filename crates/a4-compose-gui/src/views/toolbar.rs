use a4_compose::{Composer, ExportMode};
use a4_compose_runtime::ComposeCommand;
use eframe::egui;
use tokio::sync::mpsc;

use crate::measure::EguiMeasurer;

pub fn show(
    ui: &mut egui::Ui,
    composer: &mut Composer,
    measurer: &EguiMeasurer,
    command_tx: &mpsc::UnboundedSender<ComposeCommand>,
    status: &mut String,
    busy: bool,
) {
    ui.horizontal_wrapped(|ui| {
        ui.add_enabled_ui(!busy, |ui| {
            if ui.button("📂 Open Document").clicked() {
                open_document(command_tx, status);
            }

            ui.separator();

            let (min_font, max_font) = composer.options().font_size_range;
            let mut font_size = composer.font_size();
            let slider = ui.add(
                egui::Slider::new(&mut font_size, min_font..=max_font)
                    .step_by(1.0)
                    .text("Font size"),
            );
            if slider.changed() {
                composer.set_font_size(font_size, measurer);
            }

            ui.separator();

            if ui.button("↺ Reset").clicked() {
                composer.reset();
                *status = "Reset to defaults".to_string();
            }

            ui.separator();

            if ui.button("💾 Save Configuration").clicked() {
                save_configuration(composer);
            }
            if ui.button("📂 Load Configuration").clicked() {
                load_configuration(command_tx);
            }
        });

        ui.separator();

        let can_export = !busy && !composer.pages().is_empty();
        ui.add_enabled_ui(can_export, |ui| {
            if ui.button("👁 Preview").clicked() {
                start_export(composer, ExportMode::Preview, command_tx, status);
            }
            if ui.button("💾 Download PDF").clicked() {
                if let Some(mode) = pick_download(composer) {
                    start_export(composer, mode, command_tx, status);
                }
            }
        });
    });

    if composer.pagination().degraded {
        ui.colored_label(
            egui::Color32::from_rgb(0xb4, 0x53, 0x09),
            "Layout could not be measured; the whole document is shown on one page.",
        );
    }
}

fn open_document(command_tx: &mpsc::UnboundedSender<ComposeCommand>, status: &mut String) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter("Word document", &["docx"])
        .add_filter("HTML", &["html", "htm"])
        .pick_file()
    {
        *status = format!("Loading {}...", path.display());
        let _ = command_tx.send(ComposeCommand::LoadDocument { path });
    }
}

fn save_configuration(composer: &Composer) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter("JSON", &["json"])
        .set_file_name("a4-composer.json")
        .save_file()
    {
        let mut options = composer.options().clone();
        options.font_size = composer.font_size();
        tokio::spawn(async move {
            if let Err(e) = options.save(&path).await {
                log::error!("Failed to save configuration: {}", e);
            } else {
                log::info!("Configuration saved to {}", path.display());
            }
        });
    }
}

fn load_configuration(command_tx: &mpsc::UnboundedSender<ComposeCommand>) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter("JSON", &["json"])
        .pick_file()
    {
        let _ = command_tx.send(ComposeCommand::LoadConfig { path });
    }
}

fn pick_download(composer: &Composer) -> Option<ExportMode> {
    rfd::FileDialog::new()
        .add_filter("PDF", &["pdf"])
        .set_file_name(&composer.options().export.default_filename)
        .save_file()
        .map(|path| ExportMode::Download { path })
}

fn start_export(
    composer: &Composer,
    mode: ExportMode,
    command_tx: &mpsc::UnboundedSender<ComposeCommand>,
    status: &mut String,
) {
    *status = format!("Exporting {} pages...", composer.pages().len());
    let _ = command_tx.send(ComposeCommand::Export {
        pages: composer.pages().to_vec(),
        mode,
        settings: composer.options().export.clone(),
    });
}
