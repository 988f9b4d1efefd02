use a4_compose::{Affordances, Composer, GeometryBox, Page, Point};
use eframe::egui;

use crate::measure::{EguiMeasurer, layout_block};

const PAGE_GAP: f32 = 24.0;
const HANDLE_RADIUS: f32 = 7.0;
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x3b, 0x82, 0xf6);

/// Everything needed to paint one page
pub struct PageSurface<'a> {
    pub page: Option<&'a Page>,
    pub bounds: GeometryBox,
    pub font_size: f32,
    pub affordances: Affordances,
    pub template: Option<&'a egui::TextureHandle>,
}

impl<'a> PageSurface<'a> {
    pub fn of(composer: &'a Composer, page_index: usize, template: Option<&'a egui::TextureHandle>) -> Self {
        Self {
            page: composer.pages().get(page_index),
            bounds: composer.bounds(),
            font_size: composer.font_size(),
            affordances: composer.affordances(page_index),
            template,
        }
    }
}

/// UV rectangle that makes an image of `image_size` cover `target` without
/// distortion, cropping the overflow evenly on both sides
pub fn cover_uv(image_size: egui::Vec2, target: egui::Vec2) -> egui::Rect {
    if image_size.x <= 0.0 || image_size.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(1.0, 1.0));
    }
    let image_aspect = image_size.x / image_size.y;
    let target_aspect = target.x / target.y;

    if image_aspect > target_aspect {
        let width = target_aspect / image_aspect;
        let left = (1.0 - width) / 2.0;
        egui::Rect::from_min_max(egui::pos2(left, 0.0), egui::pos2(left + width, 1.0))
    } else {
        let height = image_aspect / target_aspect;
        let top = (1.0 - height) / 2.0;
        egui::Rect::from_min_max(egui::pos2(0.0, top), egui::pos2(1.0, top + height))
    }
}

/// Content region of a page drawn at `canvas`
pub fn region_rect(canvas: egui::Rect, bounds: GeometryBox) -> egui::Rect {
    egui::Rect::from_min_size(
        canvas.min + egui::vec2(bounds.x, bounds.y),
        egui::vec2(bounds.width, bounds.height),
    )
}

fn paint_border(painter: &egui::Painter, region: egui::Rect) {
    let corners = [
        region.left_top(),
        region.right_top(),
        region.right_bottom(),
        region.left_bottom(),
        region.left_top(),
    ];
    painter.extend(egui::Shape::dashed_line(
        &corners,
        egui::Stroke::new(1.5, ACCENT),
        6.0,
        4.0,
    ));
}

/// Paint a page: white sheet, template background, content and, when the
/// affordances allow it, the region's border and resize handle.
pub fn paint_page(painter: &egui::Painter, canvas: egui::Rect, surface: &PageSurface<'_>) {
    painter.rect_filled(canvas, 0.0, egui::Color32::WHITE);

    if let Some(texture) = surface.template {
        let uv = cover_uv(texture.size_vec2(), canvas.size());
        painter.image(texture.id(), canvas, uv, egui::Color32::WHITE);
    }

    let region = region_rect(canvas, surface.bounds);
    if let Some(page) = surface.page {
        let content = painter.with_clip_rect(region.intersect(canvas));
        let mut top = region.top();
        for block in &page.blocks {
            let (galley, advance) = layout_block(
                &content,
                block,
                surface.bounds.width,
                surface.font_size,
                egui::Color32::BLACK,
            );
            content.galley(egui::pos2(region.left(), top), galley, egui::Color32::BLACK);
            top += advance;
        }
    }

    if surface.affordances.border {
        paint_border(painter, region);
    }
    if surface.affordances.resize_handle {
        painter.circle_filled(region.right_bottom(), HANDLE_RADIUS, ACCENT);
        painter.circle_stroke(
            region.right_bottom(),
            HANDLE_RADIUS,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
        );
    }
}

fn point(pos: egui::Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

/// Pointer handling for the editable region of the first page
fn interact_region(ui: &mut egui::Ui, composer: &mut Composer, region: egui::Rect) {
    let body = ui
        .interact(region, ui.id().with("content_region"), egui::Sense::drag())
        .on_hover_cursor(egui::CursorIcon::Grab);
    if body.drag_started() {
        if let Some(pos) = body.interact_pointer_pos() {
            composer.begin_drag(point(pos));
        }
    }

    // Registered last so it wins over the body
    let handle_rect =
        egui::Rect::from_center_size(region.right_bottom(), egui::Vec2::splat(HANDLE_RADIUS * 3.0));
    let handle = ui
        .interact(handle_rect, ui.id().with("resize_handle"), egui::Sense::drag())
        .on_hover_cursor(egui::CursorIcon::ResizeNwSe);
    if handle.drag_started() {
        if let Some(pos) = handle.interact_pointer_pos() {
            composer.begin_resize(point(pos));
        }
    }
}

/// Feed global pointer state into the active gesture
pub fn track_gesture(ctx: &egui::Context, composer: &mut Composer, measurer: &EguiMeasurer) {
    if composer.geometry().is_idle() {
        return;
    }
    let (latest, released) = ctx.input(|i| {
        (
            i.pointer.latest_pos(),
            i.pointer.any_released() || !i.pointer.primary_down(),
        )
    });
    if let Some(pos) = latest {
        composer.pointer_moved(point(pos), measurer);
    }
    if released {
        composer.end_gesture();
    }
}

pub fn show(ui: &mut egui::Ui, composer: &mut Composer, template: Option<&egui::TextureHandle>) {
    let (width, height) = composer.options().canvas_size;
    let page_count = composer.pages().len().max(1);

    egui::ScrollArea::both().show(ui, |ui| {
        for page_index in 0..page_count {
            let (canvas, _) =
                ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());
            let surface = PageSurface::of(composer, page_index, template);
            let interactive = surface.affordances.interactive;
            let region = region_rect(canvas, surface.bounds);

            paint_page(ui.painter(), canvas, &surface);
            ui.painter().rect_stroke(
                canvas,
                0.0,
                egui::Stroke::new(1.0, egui::Color32::from_gray(200)),
                egui::StrokeKind::Outside,
            );

            if interactive {
                interact_region(ui, composer, region);
            }
            ui.add_space(PAGE_GAP);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_uv_crops_wide_image() {
        let uv = cover_uv(egui::vec2(2000.0, 1000.0), egui::vec2(100.0, 100.0));
        assert!((uv.min.x - 0.25).abs() < 1e-6);
        assert!((uv.max.x - 0.75).abs() < 1e-6);
        assert_eq!(uv.min.y, 0.0);
        assert_eq!(uv.max.y, 1.0);
    }

    #[test]
    fn test_cover_uv_crops_tall_image() {
        let uv = cover_uv(egui::vec2(100.0, 400.0), egui::vec2(100.0, 200.0));
        assert!((uv.min.y - 0.25).abs() < 1e-6);
        assert!((uv.max.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_region_offsets_from_canvas() {
        let canvas = egui::Rect::from_min_size(egui::pos2(10.0, 20.0), egui::vec2(794.0, 1123.0));
        let region = region_rect(canvas, GeometryBox::default());
        assert_eq!(region.min, egui::pos2(90.0, 140.0));
        assert_eq!(region.size(), egui::vec2(630.0, 850.0));
    }
}
