use crate::domain::models::Icon;
use crate::presentation::theme;
use eframe::egui;

pub struct Components;

impl Components {
    /// Progress icon: concentric rings while searching, a filled target when close
    pub fn proximity_icon(ui: &mut egui::Ui, icon: Icon, size: f32) {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size / 2.0 - 4.0;
        let stroke = egui::Stroke::new(3.0, theme::FOREGROUND);

        match icon {
            Icon::Searching => {
                for step in 1..=3 {
                    painter.circle_stroke(center, radius * step as f32 / 3.0, stroke);
                }
            }
            Icon::TargetClose => {
                painter.circle_stroke(center, radius, stroke);
                painter.circle_filled(center, radius * 0.6, theme::FOREGROUND);
            }
        }
    }

    pub fn status_line(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).size(22.0).strong());
    }

    pub fn fault_line(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).color(theme::FAULT));
    }
}
