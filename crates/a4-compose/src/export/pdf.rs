//! PDF assembly of captured pages

use crate::types::{ComposeError, Result};
use image::RgbaImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, RawImage, RawImageData, RawImageFormat,
    XObjectTransform,
};

use super::{ArtifactAssembler, PlacementMm};

/// An image waiting to be written to a page
struct PlacedImage {
    raw: RawImage,
    area: PlacementMm,
}

/// Collects captured pages and writes them as an image-only PDF.
///
/// The document itself is built in `finish`, on a blocking thread.
pub struct PdfAssembler {
    title: String,
    pages: Vec<Vec<PlacedImage>>,
    page_size_mm: (f32, f32),
}

impl PdfAssembler {
    pub fn new(title: impl Into<String>, page_size_mm: (f32, f32)) -> Self {
        Self {
            title: title.into(),
            pages: vec![Vec::new()],
            page_size_mm,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Composite over white and drop the alpha channel
fn flatten_rgb(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u32;
        for channel in [r, g, b] {
            let blended = (channel as u32 * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}

fn page_ops(doc: &mut PdfDocument, images: Vec<PlacedImage>, page_height_mm: f32) -> Vec<Op> {
    let mut ops = Vec::new();
    for PlacedImage { raw, area } in images {
        let (width_px, height_px) = (raw.width as f32, raw.height as f32);
        let image_id = doc.add_image(&raw);

        let width_pt = Mm(area.width).into_pt().0;
        let height_pt = Mm(area.height).into_pt().0;

        // PDF space has its origin at the bottom-left corner
        ops.push(Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                translate_x: Some(Mm(area.x).into_pt()),
                translate_y: Some(Mm(page_height_mm - area.y - area.height).into_pt()),
                rotate: None,
                // At 72 dpi one pixel is one point
                scale_x: Some(width_pt / width_px),
                scale_y: Some(height_pt / height_px),
                dpi: Some(72.0),
            },
        });
    }
    ops
}

impl ArtifactAssembler for PdfAssembler {
    async fn add_page(&mut self) -> Result<()> {
        self.pages.push(Vec::new());
        Ok(())
    }

    async fn place_image(&mut self, image: RgbaImage, area: PlacementMm) -> Result<()> {
        let (width_px, height_px) = image.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(ComposeError::Assembly("Captured image is empty".to_string()));
        }

        let raw = RawImage {
            pixels: RawImageData::U8(flatten_rgb(&image)),
            width: width_px as usize,
            height: height_px as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        self.pages
            .last_mut()
            .ok_or_else(|| ComposeError::Assembly("No current page".to_string()))?
            .push(PlacedImage { raw, area });
        Ok(())
    }

    async fn finish(self) -> Result<Vec<u8>> {
        let PdfAssembler {
            title,
            pages,
            page_size_mm,
        } = self;

        tokio::task::spawn_blocking(move || {
            let (width_mm, height_mm) = page_size_mm;
            let mut doc = PdfDocument::new(&title);

            let mut pdf_pages = Vec::with_capacity(pages.len());
            for images in pages {
                let ops = page_ops(&mut doc, images, height_mm);
                pdf_pages.push(PdfPage::new(Mm(width_mm), Mm(height_mm), ops));
            }
            doc.pages = pdf_pages;

            let mut warnings = Vec::new();
            let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
            if !warnings.is_empty() {
                log::debug!("PDF assembled with {} warnings", warnings.len());
            }
            if bytes.is_empty() {
                return Err(ComposeError::Assembly(
                    "PDF serialization produced no data".to_string(),
                ));
            }
            Ok(bytes)
        })
        .await?
    }
}
