use a4_compose::{Composer, ComposerOptions, PreviewHandle};
use a4_compose_runtime::{ComposeCommand, ComposeUpdate};
use eframe::egui;
use tokio::sync::mpsc;

use crate::capture::PendingCapture;
use crate::logger::StatusLog;
use crate::measure::EguiMeasurer;
use crate::views::{self, PageSurface};
use crate::worker::{UpdateSender, worker_task};

#[derive(Clone)]
struct ProgressState {
    operation: String,
    current: usize,
    total: usize,
}

pub struct ComposerApp {
    composer: Composer,
    template_texture: Option<egui::TextureHandle>,
    status: String,
    busy: bool,

    // Async infrastructure
    command_tx: mpsc::UnboundedSender<ComposeCommand>,
    update_rx: mpsc::UnboundedReceiver<ComposeUpdate>,

    progress: Option<ProgressState>,
    capture: Option<PendingCapture>,
    /// Keeps the latest preview file alive until the next one
    preview: Option<PreviewHandle>,
    status_log: StatusLog,

    _tokio_handle: tokio::runtime::Handle,
}

impl ComposerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        tokio_handle: tokio::runtime::Handle,
        options: ComposerOptions,
        status_log: StatusLog,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        tokio_handle.spawn(worker_task(
            command_rx,
            UpdateSender::new(update_tx, cc.egui_ctx.clone()),
        ));

        Self {
            composer: Composer::new(options),
            template_texture: None,
            status: String::new(),
            busy: false,
            command_tx,
            update_rx,
            progress: None,
            capture: None,
            preview: None,
            status_log,
            _tokio_handle: tokio_handle,
        }
    }

    fn handle_update(&mut self, ctx: &egui::Context, update: ComposeUpdate) {
        if update.is_terminal() {
            self.busy = false;
            self.progress = None;
        }

        match update {
            ComposeUpdate::Progress {
                operation,
                current,
                total,
            } => {
                self.busy = true;
                self.progress = Some(ProgressState {
                    operation,
                    current,
                    total,
                });
            }
            ComposeUpdate::DocumentLoaded { document } => {
                self.status = format!(
                    "Loaded {} ({} blocks)",
                    document.name,
                    document.blocks.len()
                );
                self.composer
                    .load_document(document, &EguiMeasurer::new(ctx));
            }
            ComposeUpdate::TemplateLoaded {
                template,
                width,
                height,
                rgba_data,
            } => {
                let image = egui::ColorImage::from_rgba_unmultiplied([width, height], &rgba_data);
                self.template_texture =
                    Some(ctx.load_texture("template", image, egui::TextureOptions::LINEAR));
                self.status = format!("Template: {}", template.name);
                self.composer.select_template(template);
            }
            ComposeUpdate::ConfigLoaded { options } => {
                self.composer = Composer::new(options);
                self.template_texture = None;
                self.status = "Configuration loaded".to_string();
            }
            ComposeUpdate::ExportMode { active } => {
                self.busy = active || self.busy;
                self.composer.set_export_mode(active);
                if !active {
                    // A capture still waiting is answered with an error on drop
                    self.capture = None;
                }
            }
            ComposeUpdate::CaptureRequest {
                page_index,
                scale,
                reply,
            } => {
                let mut pending = PendingCapture::new(page_index, scale, reply);
                if page_index >= self.composer.pages().len() {
                    pending.respond(Err(format!("page {} does not exist", page_index)));
                } else {
                    self.capture = Some(pending);
                }
            }
            ComposeUpdate::PreviewReady { handle } => {
                ctx.open_url(egui::OpenUrl::new_tab(handle.url()));
                self.status = format!("Preview opened: {}", handle.path().display());
                self.preview = Some(handle);
            }
            ComposeUpdate::Saved { path } => {
                self.status = format!("Saved {}", path.display());
            }
            ComposeUpdate::Error { message } => {
                self.status = format!("Error: {message}");
            }
        }
    }

    /// Draw the page being captured on its own layer, over everything else
    fn draw_capture(&mut self, ctx: &egui::Context) {
        let Some(capture) = &mut self.capture else {
            return;
        };
        let canvas_size = self.composer.options().canvas_size;
        let Some(transform) = capture.prepare(ctx, canvas_size) else {
            return;
        };

        let canvas = egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(canvas_size.0, canvas_size.1),
        );
        let layer = PendingCapture::layer_id();
        let painter = egui::Painter::new(ctx.clone(), layer, canvas);
        let surface = PageSurface::of(
            &self.composer,
            capture.page_index,
            self.template_texture.as_ref(),
        );
        views::paint_page(&painter, canvas, &surface);

        ctx.set_transform_layer(layer, transform);
        capture.page_drawn(ctx);
        ctx.request_repaint();
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        if let Some(progress) = &self.progress {
            ui.label(&progress.operation);
            ui.add(
                egui::ProgressBar::new(progress.current as f32 / progress.total.max(1) as f32)
                    .show_percentage(),
            );
        }
        if !self.status.is_empty() {
            ui.label(&self.status);
        }
        egui::CollapsingHeader::new("Log").show(ui, |ui| {
            if ui.small_button("Clear").clicked() {
                self.status_log.clear();
            }
            for entry in self.status_log.recent(8) {
                ui.monospace(entry.line());
            }
        });
    }
}

impl eframe::App for ComposerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Ok(update) = self.update_rx.try_recv() {
            self.handle_update(ctx, update);
        }

        if let Some(capture) = &mut self.capture {
            if capture.poll(ctx) {
                self.capture = None;
            }
        }

        let measurer = EguiMeasurer::new(ctx);
        views::track_gesture(ctx, &mut self.composer, &measurer);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            views::toolbar::show(
                ui,
                &mut self.composer,
                &measurer,
                &self.command_tx,
                &mut self.status,
                self.busy,
            );
        });

        // Reset clears the template selection
        if self.composer.template().is_none() {
            self.template_texture = None;
        }

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.show_status(ui);
        });

        egui::SidePanel::left("templates")
            .default_width(180.0)
            .show(ctx, |ui| {
                views::templates::show(ui, &self.composer, &self.command_tx, self.busy);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            views::pages::show(ui, &mut self.composer, self.template_texture.as_ref());
        });

        self.draw_capture(ctx);

        if self.busy {
            ctx.request_repaint();
        }
    }
}
