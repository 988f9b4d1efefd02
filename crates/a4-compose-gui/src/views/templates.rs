use a4_compose::{Composer, Template};
use a4_compose_runtime::ComposeCommand;
use eframe::egui;
use tokio::sync::mpsc;

/// Background gallery; picking an entry loads its image in the worker
pub fn show(
    ui: &mut egui::Ui,
    composer: &Composer,
    command_tx: &mpsc::UnboundedSender<ComposeCommand>,
    busy: bool,
) {
    ui.heading("Templates");
    ui.separator();

    let selected = composer.template();
    ui.add_enabled_ui(!busy, |ui| {
        for template in &composer.options().templates {
            let is_selected = selected == Some(template);
            if ui
                .selectable_label(is_selected, &template.name)
                .on_hover_text(&template.url)
                .clicked()
                && !is_selected
            {
                request(template, command_tx);
            }
        }
    });

    if composer.options().templates.is_empty() {
        ui.label("No templates configured");
    }
}

fn request(template: &Template, command_tx: &mpsc::UnboundedSender<ComposeCommand>) {
    let _ = command_tx.send(ComposeCommand::LoadTemplate {
        template: template.clone(),
    });
}
