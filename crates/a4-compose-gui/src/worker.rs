use a4_compose_runtime::{ComposeCommand, ComposeUpdate};
use eframe::egui;
use tokio::sync::mpsc;

use crate::handlers;

/// Sends updates to the UI and wakes it up so they are seen promptly
#[derive(Clone)]
pub struct UpdateSender {
    tx: mpsc::UnboundedSender<ComposeUpdate>,
    ctx: egui::Context,
}

impl UpdateSender {
    pub fn new(tx: mpsc::UnboundedSender<ComposeUpdate>, ctx: egui::Context) -> Self {
        Self { tx, ctx }
    }

    /// Returns false once the UI has gone away
    pub fn send(&self, update: ComposeUpdate) -> bool {
        let delivered = self.tx.send(update).is_ok();
        self.ctx.request_repaint();
        delivered
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.send(ComposeUpdate::Error { message });
    }
}

/// Async worker task that processes commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<ComposeCommand>,
    updates: UpdateSender,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut command_rx, &updates).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: ComposeCommand,
    command_rx: &mut mpsc::UnboundedReceiver<ComposeCommand>,
    updates: &UpdateSender,
) {
    match cmd {
        ComposeCommand::LoadDocument { path } => {
            handlers::document::handle_load(path, updates).await;
        }
        ComposeCommand::LoadTemplate { mut template } => {
            // Only the most recently picked template matters
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let ComposeCommand::LoadTemplate {
                    template: newer_template,
                } = next_cmd
                {
                    log::debug!("Discarding queued template load, using newer request");
                    template = newer_template;
                } else {
                    Box::pin(process_command(next_cmd, command_rx, updates)).await;
                }
            }
            handlers::template::handle_load(template, updates).await;
        }
        ComposeCommand::LoadConfig { path } => {
            handlers::document::handle_load_config(path, updates).await;
        }
        ComposeCommand::Export {
            pages,
            mode,
            settings,
        } => {
            handlers::export::handle_export(pages, mode, settings, updates).await;
        }
    }
}
