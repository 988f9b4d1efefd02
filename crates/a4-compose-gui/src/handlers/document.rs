use a4_compose::{ComposerOptions, DocumentLoader, DocxLoader, MarkupLoader, load_document};
use a4_compose_runtime::ComposeUpdate;
use std::path::PathBuf;

use crate::worker::UpdateSender;

pub async fn handle_load(path: PathBuf, updates: &UpdateSender) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let result = if MarkupLoader.accepts(&name) {
        load_document(&path, &MarkupLoader).await
    } else {
        load_document(&path, &DocxLoader).await
    };

    match result {
        Ok(document) => {
            if document.is_empty() {
                log::warn!("{} has no content", name);
            }
            updates.send(ComposeUpdate::DocumentLoaded { document });
        }
        Err(e) => updates.error(format!("Failed to load {}: {}", name, e)),
    }
}

pub async fn handle_load_config(path: PathBuf, updates: &UpdateSender) {
    match ComposerOptions::load(&path).await {
        Ok(options) => {
            log::info!("Configuration loaded from {}", path.display());
            updates.send(ComposeUpdate::ConfigLoaded { options });
        }
        Err(e) => updates.error(format!("Failed to load configuration: {}", e)),
    }
}
