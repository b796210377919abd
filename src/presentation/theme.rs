use crate::domain::models::Color;
use eframe::egui;

pub fn background_fill(color: Color) -> egui::Color32 {
    match color {
        Color::Green => egui::Color32::from_rgb(0, 200, 0),
        Color::Blue => egui::Color32::from_rgb(30, 60, 230),
        Color::Red => egui::Color32::from_rgb(220, 30, 30),
        Color::Black => egui::Color32::BLACK,
    }
}

/// Text stays white on every proximity background
pub const FOREGROUND: egui::Color32 = egui::Color32::WHITE;
pub const FAULT: egui::Color32 = egui::Color32::from_rgb(255, 200, 0);

pub fn configure_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style
        .text_styles
        .iter_mut()
        .for_each(|(text_style, font_id)| {
            font_id.size = match text_style {
                egui::TextStyle::Heading => 28.0,
                egui::TextStyle::Body => 18.0,
                egui::TextStyle::Button => 18.0,
                _ => font_id.size,
            };
        });

    style.spacing.item_spacing = egui::vec2(12.0, 12.0);
    style.spacing.button_padding = egui::vec2(24.0, 12.0);

    style.visuals = egui::Visuals::dark();
    style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(2.0, FOREGROUND);
    style.visuals.widgets.inactive.rounding = egui::Rounding::ZERO;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(2.5, FOREGROUND);
    style.visuals.widgets.hovered.rounding = egui::Rounding::ZERO;
    style.visuals.widgets.active.rounding = egui::Rounding::ZERO;
    style.visuals.override_text_color = Some(FOREGROUND);

    ctx.set_style(style);
}
