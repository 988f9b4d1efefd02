//! Block text layout shared by page rendering and pagination

use a4_compose::constants::LINE_HEIGHT_FACTOR;
use a4_compose::{Block, BlockKind, BlockMeasurer, ComposeError};
use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use std::sync::Arc;

/// Space below every block, as a multiple of the font size
const BLOCK_SPACING: f32 = 0.5;

fn font_scale(kind: BlockKind) -> f32 {
    match kind {
        BlockKind::Heading(1) => 2.0,
        BlockKind::Heading(2) => 1.5,
        BlockKind::Heading(3) => 1.17,
        BlockKind::Heading(5) => 0.83,
        BlockKind::Heading(6) => 0.67,
        _ => 1.0,
    }
}

/// Text layout of `block` wrapped at `width`
pub fn block_job(block: &Block, width: f32, font_size: f32, color: egui::Color32) -> LayoutJob {
    let size = font_size * font_scale(block.kind());
    let format = TextFormat {
        font_id: egui::FontId::proportional(size),
        line_height: Some(size * LINE_HEIGHT_FACTOR),
        color,
        ..Default::default()
    };

    let mut job = LayoutJob::single_section(block.text(), format);
    job.wrap.max_width = width.max(1.0);
    job
}

/// Vertical advance after a block whose text is `galley`
pub fn block_advance(galley: &egui::Galley, font_size: f32) -> f32 {
    galley.size().y + font_size * BLOCK_SPACING
}

/// Lays out one block for painting and returns it with its advance
pub fn layout_block(
    painter: &egui::Painter,
    block: &Block,
    width: f32,
    font_size: f32,
    color: egui::Color32,
) -> (Arc<egui::Galley>, f32) {
    let galley = painter.layout_job(block_job(block, width, font_size, color));
    let advance = block_advance(&galley, font_size);
    (galley, advance)
}

/// Measures blocks with the same text layout the page view paints with
pub struct EguiMeasurer {
    painter: egui::Painter,
}

impl EguiMeasurer {
    pub fn new(ctx: &egui::Context) -> Self {
        Self {
            painter: egui::Painter::new(
                ctx.clone(),
                egui::LayerId::background(),
                egui::Rect::EVERYTHING,
            ),
        }
    }
}

impl BlockMeasurer for EguiMeasurer {
    fn block_height(&self, block: &Block, width: f32, font_size: f32) -> a4_compose::Result<f32> {
        if !(width > 0.0 && font_size > 0.0) {
            return Err(ComposeError::Measure(format!(
                "cannot lay out at width {} and font size {}",
                width, font_size
            )));
        }
        let (_, advance) = layout_block(
            &self.painter,
            block,
            width,
            font_size,
            egui::Color32::BLACK,
        );
        Ok(advance)
    }
}
