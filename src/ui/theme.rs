use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

use crate::api::AppointmentStatus;

// Palette. Surfaces climb from a warm near-black in small steps; the rose
// accent carries selection, links, and the booking ghost.
pub const BG: Color32 = Color32::from_rgb(14, 13, 12);
pub const SURFACE: Color32 = Color32::from_rgb(27, 25, 23);
pub const SURFACE_EDGE: Color32 = Color32::from_rgb(43, 40, 37);
pub const ACCENT: Color32 = Color32::from_rgb(222, 106, 136);
pub const TEXT: Color32 = Color32::from_rgb(232, 228, 222);
pub const TEXT_DIM: Color32 = Color32::from_rgb(178, 172, 164);
pub const TEXT_FAINT: Color32 = Color32::from_rgb(118, 113, 106);
pub const DANGER: Color32 = Color32::from_rgb(229, 112, 108);
pub const SUCCESS: Color32 = Color32::from_rgb(146, 192, 118);

// Grid furniture
pub const GRID_LINE: Color32 = Color32::from_rgb(52, 49, 45);
pub const HOUR_LINE: Color32 = Color32::from_rgb(70, 66, 61);
pub const QUARTER_LINE: Color32 = Color32::from_rgb(32, 30, 28);
pub const TODAY_WASH: Color32 = Color32::from_rgb(21, 19, 18);

/// Font family for filled Phosphor icons
pub fn phosphor_fill_family() -> FontFamily {
    FontFamily::Name("phosphor-fill".into())
}

pub fn setup_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    // Phosphor Regular icons as fallback in the Proportional family
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    // Phosphor Fill as a separate family for filled icons
    fonts.font_data.insert(
        "phosphor-fill".into(),
        egui_phosphor::Variant::Fill.font_data(),
    );
    fonts.families.insert(
        FontFamily::Name("phosphor-fill".into()),
        vec!["phosphor-fill".into()],
    );

    ctx.set_fonts(fonts);
}

pub fn setup_theme(ctx: &egui::Context) {
    let mut style = Style::default();
    let mut visuals = Visuals::dark();

    visuals.panel_fill = BG;
    visuals.window_fill = BG;
    visuals.faint_bg_color = SURFACE;
    visuals.extreme_bg_color = BG;

    visuals.widgets.noninteractive.bg_fill = SURFACE_EDGE;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, TEXT_DIM);

    visuals.widgets.inactive.bg_fill = Color32::from_rgb(58, 54, 50);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Color32::from_rgb(204, 198, 190));

    visuals.widgets.hovered.bg_fill = Color32::from_rgb(84, 78, 72);
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.widgets.active.bg_fill = ACCENT;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

    visuals.selection.bg_fill = ACCENT;
    visuals.selection.stroke = Stroke::new(1.0, Color32::WHITE);
    visuals.hyperlink_color = ACCENT;

    for widget in [
        &mut visuals.widgets.noninteractive,
        &mut visuals.widgets.inactive,
        &mut visuals.widgets.hovered,
        &mut visuals.widgets.active,
    ] {
        widget.rounding = Rounding::same(5.0);
    }
    visuals.window_rounding = Rounding::same(10.0);

    style.visuals = visuals;

    // One text size everywhere; hierarchy comes from color, not scale
    style.text_styles = [
        (TextStyle::Small, FontId::proportional(14.0)),
        (TextStyle::Body, FontId::proportional(14.0)),
        (TextStyle::Button, FontId::proportional(14.0)),
        (TextStyle::Heading, FontId::proportional(14.0)),
        (TextStyle::Monospace, FontId::monospace(14.0)),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(10.0, 8.0);
    style.spacing.button_padding = egui::vec2(16.0, 9.0);
    style.spacing.window_margin = egui::Margin::same(22.0);

    ctx.set_style(style);
}

/// Accent color per booking status, used for card stripes and chips
pub fn status_color(status: AppointmentStatus) -> Color32 {
    match status {
        AppointmentStatus::Pending => Color32::from_rgb(0xd9, 0xa5, 0x14),
        AppointmentStatus::Confirmed => Color32::from_rgb(0x46, 0x99, 0xe0),
        AppointmentStatus::InProgress => Color32::from_rgb(0xe0, 0x76, 0x2a),
        AppointmentStatus::Completed => Color32::from_rgb(0x6c, 0xb6, 0x4c),
        AppointmentStatus::Cancelled => Color32::from_rgb(0x6f, 0x6a, 0x64),
    }
}

/// Shared frame for the app's modal dialogs
pub fn dialog_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(BG)
        .stroke(Stroke::new(2.0, SURFACE_EDGE))
        .rounding(Rounding::same(10.0))
        .inner_margin(egui::Margin::same(20.0))
}

/// (bg, hover bg, text) for the custom-painted flat buttons
pub fn flat_button() -> (Color32, Color32, Color32) {
    (SURFACE, Color32::from_rgb(78, 72, 66), TEXT_DIM)
}
