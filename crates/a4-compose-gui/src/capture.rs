//! Page capture from viewport screenshots
//!
//! While a capture is pending the UI zoom is raised so that one canvas pixel
//! covers `scale` physical pixels, and text is rasterized at that density.
//! The requested page is drawn alone in a foreground layer. When it does not
//! fit the window it is shown one tile at a time, and the screenshot of each
//! tile is pasted into the page raster.

use a4_compose_runtime::{CaptureReply, RgbaImage};
use eframe::egui;
use egui::emath::TSTransform;
use std::sync::Arc;

pub const CAPTURE_LAYER: &str = "capture_page";

/// Frames to wait for the raised zoom before capturing anyway
const ZOOM_SETTLE_FRAMES: u32 = 10;

/// Marks our own screenshot requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CaptureTag {
    page: usize,
    tile: usize,
}

/// A part of the page raster, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tile {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// How one page is split over screenshots
#[derive(Debug, Clone)]
struct TilePlan {
    /// Screen points per canvas pixel
    zoom: f32,
    pixels_per_point: f32,
    /// Top-left of the drawable area, in screen points
    origin: egui::Pos2,
    /// Raster size of the whole page
    size: (u32, u32),
    tiles: Vec<Tile>,
}

impl TilePlan {
    fn new(canvas: egui::Vec2, scale: f32, viewport: egui::Rect, pixels_per_point: f32) -> Self {
        let size = (
            (canvas.x * scale).round().max(1.0) as u32,
            (canvas.y * scale).round().max(1.0) as u32,
        );
        let step = (
            ((viewport.width() * pixels_per_point).floor() as u32).max(1),
            ((viewport.height() * pixels_per_point).floor() as u32).max(1),
        );

        let mut tiles = Vec::new();
        for y in (0..size.1).step_by(step.1 as usize) {
            for x in (0..size.0).step_by(step.0 as usize) {
                tiles.push(Tile {
                    x,
                    y,
                    width: step.0.min(size.0 - x),
                    height: step.1.min(size.1 - y),
                });
            }
        }

        Self {
            zoom: scale / pixels_per_point,
            pixels_per_point,
            origin: viewport.min,
            size,
            tiles,
        }
    }

    /// Places `tile` at the top-left of the drawable area
    fn transform(&self, tile: usize) -> TSTransform {
        let tile = self.tiles[tile];
        let offset = egui::vec2(tile.x as f32, tile.y as f32) / self.pixels_per_point;
        TSTransform::new(self.origin.to_vec2() - offset, self.zoom)
    }

    /// Where `tile` shows up on screen
    fn screen_rect(&self, tile: usize) -> egui::Rect {
        let tile = self.tiles[tile];
        egui::Rect::from_min_size(
            self.origin,
            egui::vec2(tile.width as f32, tile.height as f32) / self.pixels_per_point,
        )
    }
}

/// Zoom raised for the duration of a capture
struct ZoomOverride {
    ctx: egui::Context,
    previous: f32,
}

impl Drop for ZoomOverride {
    fn drop(&mut self) {
        self.ctx.set_zoom_factor(self.previous);
    }
}

pub struct PendingCapture {
    pub page_index: usize,
    pub scale: f32,
    reply: Option<CaptureReply>,
    zoom: Option<ZoomOverride>,
    waited_frames: u32,
    plan: Option<TilePlan>,
    tile: usize,
    requested: bool,
    raster: Option<RgbaImage>,
}

impl PendingCapture {
    pub fn new(page_index: usize, scale: f32, reply: CaptureReply) -> Self {
        Self {
            page_index,
            scale,
            reply: Some(reply),
            zoom: None,
            waited_frames: 0,
            plan: None,
            tile: 0,
            requested: false,
            raster: None,
        }
    }

    pub fn layer_id() -> egui::LayerId {
        egui::LayerId::new(egui::Order::Foreground, egui::Id::new(CAPTURE_LAYER))
    }

    /// Transform for drawing the page this frame, or `None` while the
    /// raised zoom has not taken effect yet
    pub fn prepare(&mut self, ctx: &egui::Context, canvas_size: (f32, f32)) -> Option<TSTransform> {
        if self.plan.is_none() {
            if self.zoom.is_none() {
                let previous = ctx.zoom_factor();
                if let Some(native) = ctx.native_pixels_per_point() {
                    ctx.set_zoom_factor(self.scale / native);
                }
                self.zoom = Some(ZoomOverride {
                    ctx: ctx.clone(),
                    previous,
                });
            }

            let settled = (ctx.pixels_per_point() - self.scale).abs() < 0.01;
            if !settled && self.waited_frames < ZOOM_SETTLE_FRAMES {
                self.waited_frames += 1;
                ctx.request_repaint();
                return None;
            }

            let plan = TilePlan::new(
                egui::vec2(canvas_size.0, canvas_size.1),
                self.scale,
                ctx.content_rect(),
                ctx.pixels_per_point(),
            );
            log::debug!(
                "Capturing page {} at {}x{} in {} tiles",
                self.page_index,
                plan.size.0,
                plan.size.1,
                plan.tiles.len()
            );
            self.raster = Some(RgbaImage::from_pixel(
                plan.size.0,
                plan.size.1,
                image::Rgba([255, 255, 255, 255]),
            ));
            self.plan = Some(plan);
        }

        self.plan.as_ref().map(|plan| plan.transform(self.tile))
    }

    /// Ask for a screenshot of the tile drawn this frame, once
    pub fn page_drawn(&mut self, ctx: &egui::Context) {
        if self.plan.is_some() && !self.requested {
            self.requested = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::new(
                self.tag(),
            )));
        }
    }

    fn tag(&self) -> CaptureTag {
        CaptureTag {
            page: self.page_index,
            tile: self.tile,
        }
    }

    /// Look for our screenshot among this frame's events. Returns true once
    /// the request has been answered.
    pub fn poll(&mut self, ctx: &egui::Context) -> bool {
        let expected = self.tag();
        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Screenshot {
                    user_data, image, ..
                } if user_data
                    .data
                    .as_ref()
                    .and_then(|data| data.downcast_ref::<CaptureTag>())
                    == Some(&expected) =>
                {
                    Some(Arc::clone(image))
                }
                _ => None,
            })
        });

        let Some(screenshot) = screenshot else {
            return false;
        };
        let (Some(plan), Some(raster)) = (&self.plan, &mut self.raster) else {
            self.respond(Err("page was not drawn before the screenshot".to_string()));
            return true;
        };

        if let Err(message) = paste_tile(raster, &screenshot, plan, self.tile) {
            self.respond(Err(message));
            return true;
        }

        self.tile += 1;
        self.requested = false;
        if self.tile < plan.tiles.len() {
            return false;
        }

        match self.raster.take() {
            Some(raster) => self.respond(Ok(raster)),
            None => self.respond(Err("page raster missing".to_string())),
        }
        true
    }

    pub fn respond(&mut self, result: Result<RgbaImage, String>) {
        if let Some(reply) = self.reply.take() {
            if reply.send(result).is_err() {
                log::debug!("Capture of page {} no longer awaited", self.page_index);
            }
        }
    }
}

impl Drop for PendingCapture {
    fn drop(&mut self) {
        self.respond(Err("capture abandoned".to_string()));
    }
}

pub fn color_image_to_rgba(image: &egui::ColorImage) -> Result<RgbaImage, String> {
    let [width, height] = image.size;
    let data = image
        .pixels
        .iter()
        .flat_map(|pixel| pixel.to_srgba_unmultiplied())
        .collect();
    RgbaImage::from_raw(width as u32, height as u32, data)
        .ok_or_else(|| format!("screenshot buffer does not match {}x{}", width, height))
}

/// Copy one tile out of a screenshot into the page raster
fn paste_tile(
    raster: &mut RgbaImage,
    screenshot: &egui::ColorImage,
    plan: &TilePlan,
    tile: usize,
) -> Result<(), String> {
    let cropped = screenshot.region(&plan.screen_rect(tile), Some(plan.pixels_per_point));
    if cropped.width() == 0 || cropped.height() == 0 {
        return Err("page is outside the window".to_string());
    }
    let rgba = color_image_to_rgba(&cropped)?;
    let Tile { x, y, .. } = plan.tiles[tile];
    image::imageops::replace(raster, &rgba, x as i64, y as i64);
    Ok(())
}
