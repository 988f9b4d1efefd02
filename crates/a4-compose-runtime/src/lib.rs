use std::path::PathBuf;
use tokio::sync::oneshot;

// Re-export types from the library crate
pub use a4_compose::{
    ComposerOptions, Document, ExportMode, ExportSettings, Page, PreviewHandle, Template,
};
pub use image::RgbaImage;

/// Reply channel for a page capture
pub type CaptureReply = oneshot::Sender<Result<RgbaImage, String>>;

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum ComposeCommand {
    LoadDocument {
        path: PathBuf,
    },
    LoadTemplate {
        template: Template,
    },
    LoadConfig {
        path: PathBuf,
    },
    Export {
        pages: Vec<Page>,
        mode: ExportMode,
        settings: ExportSettings,
    },
}

/// Updates sent from worker to UI
#[derive(Debug)]
pub enum ComposeUpdate {
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    DocumentLoaded {
        document: Document,
    },
    TemplateLoaded {
        template: Template,
        width: usize,
        height: usize,
        rgba_data: Vec<u8>,
    },
    ConfigLoaded {
        options: ComposerOptions,
    },
    /// Enter or leave clean rendering for capture
    ExportMode {
        active: bool,
    },
    /// Render `page_index` alone and answer with its raster
    CaptureRequest {
        page_index: usize,
        scale: f32,
        reply: CaptureReply,
    },
    PreviewReady {
        handle: PreviewHandle,
    },
    Saved {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}

impl ComposeUpdate {
    /// Whether this update ends a running operation
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ComposeUpdate::DocumentLoaded { .. }
                | ComposeUpdate::TemplateLoaded { .. }
                | ComposeUpdate::ConfigLoaded { .. }
                | ComposeUpdate::PreviewReady { .. }
                | ComposeUpdate::Saved { .. }
                | ComposeUpdate::Error { .. }
        )
    }
}
