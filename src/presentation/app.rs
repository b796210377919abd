use crate::domain::models::{DisplayUpdate, TrackerCommand};
use crate::presentation::components::Components;
use crate::presentation::display::DisplaySurface;
use crate::presentation::theme;
use eframe::egui;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

pub struct BeaconFinderApp {
    pub(crate) tracker_tx: mpsc::UnboundedSender<TrackerCommand>,
    pub(crate) display_rx: mpsc::UnboundedReceiver<DisplayUpdate>,
    pub(crate) surface: DisplaySurface,
}

impl BeaconFinderApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        tracker_tx: mpsc::UnboundedSender<TrackerCommand>,
        display_rx: mpsc::UnboundedReceiver<DisplayUpdate>,
    ) -> Self {
        theme::configure_style(&cc.egui_ctx);

        Self {
            tracker_tx,
            display_rx,
            surface: DisplaySurface::default(),
        }
    }

    fn send(&self, command: TrackerCommand) {
        if self.tracker_tx.send(command).is_err() {
            warn!("Tracker worker is gone, dropping {:?}", command);
        }
    }
}

impl eframe::App for BeaconFinderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.surface.drain(&mut self.display_rx);

        let frame = egui::Frame::none()
            .fill(theme::background_fill(self.surface.background))
            .inner_margin(egui::Margin::same(24.0));

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Where Are You");
                ui.add_space(30.0);

                Components::proximity_icon(ui, self.surface.icon, 160.0);
                ui.add_space(20.0);

                Components::status_line(ui, &self.surface.status);
                ui.add_space(20.0);

                let button = egui::Button::new(self.surface.toggle_label());
                if ui.add_enabled(self.surface.toggle_enabled, button).clicked() {
                    self.send(TrackerCommand::Toggle);
                }

                if let Some(fault) = &self.surface.fault {
                    ui.add_space(10.0);
                    Components::fault_line(ui, fault);
                }
            });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
