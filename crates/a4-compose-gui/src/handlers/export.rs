use a4_compose::{
    Artifact, ComposeError, ExportMode, ExportModeSwitch, ExportPipeline, ExportSettings, Page,
    PageRasterizer, PdfAssembler,
};
use a4_compose_runtime::{ComposeUpdate, RgbaImage};
use std::time::Duration;
use tokio::sync::oneshot;

use crate::worker::UpdateSender;

/// Upper bound on how long the UI may take to answer a capture request
const CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Asks the UI to render and screenshot pages
struct ChannelRasterizer<'a> {
    updates: &'a UpdateSender,
    total: usize,
}

impl PageRasterizer for ChannelRasterizer<'_> {
    async fn capture(
        &mut self,
        page_index: usize,
        _page: &Page,
        scale: f32,
    ) -> a4_compose::Result<RgbaImage> {
        self.updates.send(ComposeUpdate::Progress {
            operation: "Capturing pages".to_string(),
            current: page_index,
            total: self.total,
        });

        let (reply, response) = oneshot::channel();
        if !self.updates.send(ComposeUpdate::CaptureRequest {
            page_index,
            scale,
            reply,
        }) {
            return Err(ComposeError::NotReady("page renderer is gone"));
        }

        match tokio::time::timeout(CAPTURE_TIMEOUT, response).await {
            Ok(Ok(Ok(image))) => Ok(image),
            Ok(Ok(Err(reason))) => Err(ComposeError::Capture {
                page: page_index,
                reason,
            }),
            Ok(Err(_)) => Err(ComposeError::NotReady("page renderer dropped the request")),
            Err(_) => Err(ComposeError::Capture {
                page: page_index,
                reason: format!("no response within {}s", CAPTURE_TIMEOUT.as_secs()),
            }),
        }
    }
}

/// Mirrors export mode into the UI
struct ChannelModeSwitch<'a> {
    updates: &'a UpdateSender,
}

impl ExportModeSwitch for ChannelModeSwitch<'_> {
    fn set_export_mode(&mut self, active: bool) {
        self.updates.send(ComposeUpdate::ExportMode { active });
    }
}

pub async fn handle_export(
    pages: Vec<Page>,
    mode: ExportMode,
    settings: ExportSettings,
    updates: &UpdateSender,
) {
    let title = match &mode {
        ExportMode::Preview => "Preview".to_string(),
        ExportMode::Download { path } => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string()),
    };
    let assembler = PdfAssembler::new(title, settings.page_size_mm);
    let mut rasterizer = ChannelRasterizer {
        updates,
        total: pages.len(),
    };
    let mut switch = ChannelModeSwitch { updates };

    let result = ExportPipeline::new(settings)
        .export(&pages, &mode, &mut rasterizer, assembler, &mut switch)
        .await;

    match result {
        Ok(Artifact::Preview(handle)) => {
            updates.send(ComposeUpdate::PreviewReady { handle });
        }
        Ok(Artifact::Saved(path)) => {
            updates.send(ComposeUpdate::Saved { path });
        }
        Err(e) => updates.error(format!("Export failed: {}", e)),
    }
}
