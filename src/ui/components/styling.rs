//! # Styling
//!
//! Small egui style adjustments applied once per frame.

use eframe::egui;

/// Roomier spacing so entry rows read as separate journal sections.
pub fn apply_diary_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(10.0, 10.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    ctx.set_style(style);
}
