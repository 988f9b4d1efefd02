//! Capabilities the export pipeline is driven through

use crate::geometry::{GeometryModel, PointerCapture};
use crate::types::{Page, Result};
use image::RgbaImage;
use std::future::Future;

/// Toggles the clean rendering used while pages are captured
pub trait ExportModeSwitch {
    fn set_export_mode(&mut self, active: bool);
}

impl<C: PointerCapture> ExportModeSwitch for GeometryModel<C> {
    fn set_export_mode(&mut self, active: bool) {
        GeometryModel::set_export_mode(self, active);
    }
}

/// Produces a raster snapshot of a rendered page
pub trait PageRasterizer {
    /// Capture page `page_index` at `scale` times its canvas size
    fn capture(
        &mut self,
        page_index: usize,
        page: &Page,
        scale: f32,
    ) -> impl Future<Output = Result<RgbaImage>> + Send;
}

/// Area on an output page, in millimeters from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementMm {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlacementMm {
    /// The whole page
    pub fn full_page(page_size_mm: (f32, f32)) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: page_size_mm.0,
            height: page_size_mm.1,
        }
    }
}

/// Builds the output artifact one page at a time.
///
/// An assembler starts with one empty page; `add_page` appends another and
/// makes it current.
pub trait ArtifactAssembler {
    fn add_page(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Draw `image` on the current page
    fn place_image(
        &mut self,
        image: RgbaImage,
        area: PlacementMm,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Serialize the artifact
    fn finish(self) -> impl Future<Output = Result<Vec<u8>>> + Send
    where
        Self: Sized;
}
