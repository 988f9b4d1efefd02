use a4_compose::Template;
use a4_compose_runtime::ComposeUpdate;

use crate::worker::UpdateSender;

pub async fn handle_load(template: Template, updates: &UpdateSender) {
    let path = template.url.clone();
    let decoded = tokio::task::spawn_blocking(move || image::open(&path).map(|img| img.to_rgba8())).await;

    match decoded {
        Ok(Ok(rgba)) => {
            let (width, height) = rgba.dimensions();
            log::info!("Loaded template {} ({}x{})", template.name, width, height);
            updates.send(ComposeUpdate::TemplateLoaded {
                template,
                width: width as usize,
                height: height as usize,
                rgba_data: rgba.into_raw(),
            });
        }
        Ok(Err(e)) => updates.error(format!("Failed to load template {}: {}", template.url, e)),
        Err(e) => updates.error(format!("Template loading task failed: {}", e)),
    }
}
