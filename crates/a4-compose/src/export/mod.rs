//! Export of composed pages into a single artifact
//!
//! The export runs strictly in page order:
//! 1. Switch the renderer into export mode (no border, no resize handle)
//! 2. Wait for the settle interval so the decorations are gone
//! 3. Capture each page and append it to the artifact
//! 4. Leave export mode, whatever the outcome
//! 5. Deliver the artifact as a preview or a download

mod artifact;
mod capability;
mod pdf;

pub use artifact::{Artifact, ExportMode, PreviewHandle};
pub use capability::*;
pub use pdf::PdfAssembler;

use crate::options::ExportSettings;
use crate::types::*;

/// Holds export mode for as long as it lives
struct ExportModeGuard<'a, S: ExportModeSwitch + ?Sized> {
    switch: &'a mut S,
}

impl<'a, S: ExportModeSwitch + ?Sized> ExportModeGuard<'a, S> {
    fn enter(switch: &'a mut S) -> Self {
        switch.set_export_mode(true);
        Self { switch }
    }
}

impl<S: ExportModeSwitch + ?Sized> Drop for ExportModeGuard<'_, S> {
    fn drop(&mut self) {
        self.switch.set_export_mode(false);
    }
}

fn capture_error(page: usize, err: ComposeError) -> ComposeError {
    match err {
        ComposeError::Capture { .. } => err,
        other => ComposeError::Capture {
            page,
            reason: other.to_string(),
        },
    }
}

fn assembly_error(err: ComposeError) -> ComposeError {
    match err {
        ComposeError::Assembly(_) => err,
        other => ComposeError::Assembly(other.to_string()),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportPipeline {
    settings: ExportSettings,
}

impl ExportPipeline {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Capture `pages` in order and deliver them as one artifact.
    ///
    /// A failure on any page stops the export; nothing is delivered and
    /// export mode is left before the error is returned.
    pub async fn export<R, A, S>(
        &self,
        pages: &[Page],
        mode: &ExportMode,
        rasterizer: &mut R,
        mut assembler: A,
        switch: &mut S,
    ) -> Result<Artifact>
    where
        R: PageRasterizer,
        A: ArtifactAssembler,
        S: ExportModeSwitch + ?Sized,
    {
        if pages.is_empty() {
            return Err(ComposeError::NoPages);
        }

        let scale = self.settings.capture_scale;
        let area = PlacementMm::full_page(self.settings.page_size_mm);

        {
            let _export_mode = ExportModeGuard::enter(switch);
            tokio::time::sleep(self.settings.settle_interval()).await;

            for (index, page) in pages.iter().enumerate() {
                log::debug!("Capturing page {} of {}", index + 1, pages.len());
                let image = rasterizer
                    .capture(index, page, scale)
                    .await
                    .map_err(|e| capture_error(index, e))?;

                if index > 0 {
                    assembler.add_page().await.map_err(assembly_error)?;
                }
                assembler
                    .place_image(image, area)
                    .await
                    .map_err(assembly_error)?;
            }
        }

        let bytes = assembler.finish().await.map_err(assembly_error)?;
        let artifact = artifact::deliver(bytes, mode).await?;
        log::info!(
            "Exported {} pages to {}",
            pages.len(),
            artifact.path().display()
        );
        Ok(artifact)
    }
}
