use chrono::NaiveDate;
use egui::{Color32, RichText, Ui};

use super::theme::{self, phosphor_fill_family, status_color};
use crate::api::{format_price, Appointment, AppointmentStatus, Staff};
use crate::schedule::{
    block_for, format_time, is_today, parse_time, slot_at, week_dates, HOURS_SHOWN, OPEN_HOUR,
};

/// Legibility floor for rendered cards; the position math itself is never
/// clamped.
const MIN_CARD_HEIGHT: f32 = 30.0;

/// Proposed booking slot from clicking empty grid space
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub date: NaiveDate,
    pub staff_name: Option<String>,
    pub time: String,
}

/// Result from grid interactions
#[derive(Default)]
pub struct GridResult {
    pub edit: Option<Appointment>,
    pub add_at: Option<NewSlot>,
}

/// Result from list interactions
#[derive(Default)]
pub struct ListResult {
    pub edit: Option<Appointment>,
    pub complete: Option<Appointment>,
    pub cancel: Option<Appointment>,
    pub add_clicked: bool,
}

/// The fetched appointments for one visible week
#[derive(Debug, Clone)]
pub struct WeekData {
    pub week_start: NaiveDate,
    pub appointments: Vec<Appointment>,
}

impl WeekData {
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            appointments: Vec::new(),
        }
    }

    pub fn appointments_for_day(&self, date: NaiveDate) -> Vec<&Appointment> {
        self.appointments.iter().filter(|a| a.on_date(date)).collect()
    }

    /// Booking count and revenue for one day, cancelled bookings excluded
    pub fn day_summary(&self, date: NaiveDate) -> (usize, f64) {
        let mut count = 0;
        let mut revenue = 0.0;
        for appt in self.appointments.iter().filter(|a| a.on_date(date)) {
            if appt.status != AppointmentStatus::Cancelled {
                count += 1;
                revenue += appt.price;
            }
        }
        (count, revenue)
    }

    pub fn week_summary(&self) -> (usize, f64) {
        let mut count = 0;
        let mut revenue = 0.0;
        for appt in &self.appointments {
            if appt.status != AppointmentStatus::Cancelled {
                count += 1;
                revenue += appt.price;
            }
        }
        (count, revenue)
    }

    /// Day dates (Mon-Sun)
    pub fn all_days(&self) -> [NaiveDate; 7] {
        week_dates(self.week_start)
    }
}

struct GridColumn<'a> {
    heading: String,
    summary: String,
    is_today: bool,
    date: NaiveDate,
    staff_name: Option<&'a str>,
    bookings: Vec<&'a Appointment>,
}

/// One column per weekday; bookings are assigned by exact calendar-date match
pub fn render_week_grid(ui: &mut Ui, week: &WeekData, currency: &str) -> GridResult {
    let columns: Vec<GridColumn> = week
        .all_days()
        .into_iter()
        .map(|day| {
            let heading = if is_today(day) {
                "Today".to_string()
            } else {
                day.format("%a %-d").to_string()
            };
            let (count, revenue) = week.day_summary(day);
            let summary = if count > 0 {
                format!("{} · {}", count, format_price(revenue, currency))
            } else {
                String::new()
            };
            GridColumn {
                heading,
                summary,
                is_today: is_today(day),
                date: day,
                staff_name: None,
                bookings: week.appointments_for_day(day),
            }
        })
        .collect();

    render_columns(ui, &columns)
}

/// One column per staff member for a single day; bookings are assigned by
/// exact staff-name match (the stored booking carries only the name).
pub fn render_day_grid(
    ui: &mut Ui,
    date: NaiveDate,
    staff: &[Staff],
    week: &WeekData,
    currency: &str,
) -> GridResult {
    if staff.is_empty() {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("No staff on the roster yet")
                    .size(16.0)
                    .color(theme::TEXT_FAINT),
            );
        });
        return GridResult::default();
    }

    let day_bookings = week.appointments_for_day(date);

    let columns: Vec<GridColumn> = staff
        .iter()
        .map(|member| {
            let bookings: Vec<&Appointment> = day_bookings
                .iter()
                .copied()
                .filter(|a| a.staff_name == member.name)
                .collect();
            let (count, revenue) = bookings
                .iter()
                .filter(|a| a.status != AppointmentStatus::Cancelled)
                .fold((0usize, 0f64), |(c, r), a| (c + 1, r + a.price));
            let summary = if count > 0 {
                format!("{} · {}", count, format_price(revenue, currency))
            } else {
                String::new()
            };
            GridColumn {
                heading: member.name.clone(),
                summary,
                is_today: false,
                date,
                staff_name: Some(member.name.as_str()),
                bookings,
            }
        })
        .collect();

    render_columns(ui, &columns)
}

/// Shared column renderer for both grid modes. Cards are painted once,
/// absolutely positioned over the full column height; hour rows are only
/// furniture, so a card may span as many of them as its duration needs.
fn render_columns(ui: &mut Ui, columns: &[GridColumn]) -> GridResult {
    let mut result = GridResult::default();

    // Layout constants
    let hour_label_width = 64.0;
    let header_height = 32.0;

    // Pixels per hour follow the viewport so the whole window fits when there
    // is room; recomputed every frame, resize needs no extra handling.
    let cell_height = ((ui.available_height() - header_height - 8.0) / HOURS_SHOWN as f32)
        .floor()
        .max(48.0);
    let total_grid_height = HOURS_SHOWN as f32 * cell_height;

    let available_width = ui.available_width();
    let num_cols = columns.len();
    let col_width = (available_width - hour_label_width) / num_cols as f32;

    // Fixed column headers (outside the ScrollArea)
    let (header_rect, _) = ui.allocate_exact_size(
        egui::vec2(available_width, header_height),
        egui::Sense::hover(),
    );

    let painter = ui.painter();

    for (i, column) in columns.iter().enumerate() {
        let x = header_rect.min.x + hour_label_width + i as f32 * col_width;
        let col_header_rect = egui::Rect::from_min_size(
            egui::pos2(x, header_rect.min.y),
            egui::vec2(col_width, header_height),
        );

        let heading_color = if column.is_today {
            Color32::WHITE
        } else {
            theme::TEXT_DIM
        };

        let text_left = col_header_rect.min.x + 8.0;
        let text_y = col_header_rect.center().y;

        let heading_galley = painter.layout_no_wrap(
            column.heading.clone(),
            egui::FontId::proportional(14.0),
            heading_color,
        );
        let heading_width = heading_galley.rect.width();
        painter.galley(
            egui::pos2(text_left, text_y - heading_galley.rect.height() / 2.0),
            heading_galley,
            Color32::WHITE,
        );

        // Day totals after the heading
        painter.text(
            egui::pos2(text_left + heading_width + 8.0, text_y),
            egui::Align2::LEFT_CENTER,
            &column.summary,
            egui::FontId::proportional(13.0),
            Color32::WHITE,
        );

        // Separator between column headings
        if i > 0 {
            painter.line_segment(
                [
                    egui::pos2(x, col_header_rect.min.y + 4.0),
                    egui::pos2(x, col_header_rect.max.y - 4.0),
                ],
                egui::Stroke::new(1.0, theme::GRID_LINE),
            );
        }
    }

    // Scrollable grid area
    egui::ScrollArea::vertical().show(ui, |ui| {
        let (grid_rect, _) = ui.allocate_exact_size(
            egui::vec2(available_width, total_grid_height),
            egui::Sense::hover(),
        );

        let painter = ui.painter();

        // Dim background for the current day's column
        for (i, column) in columns.iter().enumerate() {
            if column.is_today {
                let col_x = grid_rect.min.x + hour_label_width + i as f32 * col_width;
                let col_rect = egui::Rect::from_min_size(
                    egui::pos2(col_x, grid_rect.min.y),
                    egui::vec2(col_width, total_grid_height),
                );
                painter.rect_filled(col_rect, 0.0, theme::TODAY_WASH);
                break;
            }
        }

        // Vertical grid lines for columns
        for i in 0..num_cols {
            let x = grid_rect.min.x + hour_label_width + i as f32 * col_width;
            painter.line_segment(
                [
                    egui::pos2(x, grid_rect.min.y),
                    egui::pos2(x, grid_rect.max.y),
                ],
                egui::Stroke::new(1.0, theme::GRID_LINE),
            );
        }

        // Right edge line
        painter.line_segment(
            [
                egui::pos2(grid_rect.max.x, grid_rect.min.y),
                egui::pos2(grid_rect.max.x, grid_rect.max.y),
            ],
            egui::Stroke::new(1.0, theme::GRID_LINE),
        );

        // One labelled row line per hour of the calendar window
        for hour_idx in 0..=HOURS_SHOWN {
            let y = grid_rect.min.y + hour_idx as f32 * cell_height;

            if hour_idx < HOURS_SHOWN {
                let hour_text = format_time(OPEN_HOUR + hour_idx, 0);
                painter.text(
                    egui::pos2(grid_rect.min.x + hour_label_width - 8.0, y),
                    egui::Align2::RIGHT_TOP,
                    &hour_text,
                    egui::FontId::proportional(11.0),
                    theme::TEXT_FAINT,
                );
            }

            painter.line_segment(
                [
                    egui::pos2(grid_rect.min.x + hour_label_width, y),
                    egui::pos2(grid_rect.max.x, y),
                ],
                egui::Stroke::new(
                    1.0,
                    if hour_idx == 0 {
                        theme::HOUR_LINE
                    } else {
                        theme::GRID_LINE
                    },
                ),
            );

            // Quarter-hour subdivision lines - the four click slots per cell
            if hour_idx < HOURS_SHOWN {
                let quarter_height = cell_height / 4.0;

                for quarter in 1..4 {
                    let quarter_y = y + quarter as f32 * quarter_height;
                    painter.line_segment(
                        [
                            egui::pos2(grid_rect.min.x + hour_label_width, quarter_y),
                            egui::pos2(grid_rect.max.x, quarter_y),
                        ],
                        egui::Stroke::new(1.0, theme::QUARTER_LINE),
                    );
                }
            }
        }

        // Column hit areas come first so the cards registered after them sit
        // on top and win clicks
        let col_responses: Vec<egui::Response> = (0..num_cols)
            .map(|col_idx| {
                let col_x = grid_rect.min.x + hour_label_width + col_idx as f32 * col_width;
                let col_rect = egui::Rect::from_min_size(
                    egui::pos2(col_x, grid_rect.min.y),
                    egui::vec2(col_width, total_grid_height),
                );
                ui.interact(
                    col_rect,
                    ui.id().with(("grid_col", col_idx)),
                    egui::Sense::click(),
                )
            })
            .collect();

        // Booking cards, painted once per column over the full column height
        let mut all_card_rects: Vec<egui::Rect> = Vec::new();

        for (col_idx, column) in columns.iter().enumerate() {
            let col_x = grid_rect.min.x + hour_label_width + col_idx as f32 * col_width;

            for &booking in &column.bookings {
                let Ok(start) = parse_time(&booking.time) else {
                    // Times come from our own formatter; a bad one is data
                    // corruption and the card is simply not drawn
                    continue;
                };

                let block = block_for(start, booking.duration_minutes, cell_height);
                let height = block.height.max(MIN_CARD_HEIGHT);

                let block_margin = 2.0;
                let card_rect = egui::Rect::from_min_size(
                    egui::pos2(col_x + block_margin, grid_rect.min.y + block.top),
                    egui::vec2(col_width - block_margin * 2.0, height - 2.0),
                );

                all_card_rects.push(card_rect);
                paint_booking_card(ui, card_rect, booking);

                let response = ui.interact(
                    card_rect,
                    ui.id().with(("booking_card", booking.local_id)),
                    egui::Sense::click(),
                );
                if response.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if response.clicked() {
                    result.edit = Some((*booking).clone());
                }
            }
        }

        // Empty-slot interactions: hover ghost + click-to-book per column
        let pointer_pos = ui.ctx().pointer_hover_pos();
        let over_card = pointer_pos
            .map(|pos| all_card_rects.iter().any(|r| r.contains(pos)))
            .unwrap_or(false);

        for (col_idx, column) in columns.iter().enumerate() {
            let col_x = grid_rect.min.x + hour_label_width + col_idx as f32 * col_width;
            let col_response = &col_responses[col_idx];

            if col_response.hovered() && !over_card {
                if let Some(pos) = pointer_pos {
                    if pos.y >= grid_rect.min.y && pos.y <= grid_rect.max.y {
                        let slot = slot_at(pos.y - grid_rect.min.y, cell_height);
                        let slot_time = format_time(slot.hour, slot.minutes);

                        // One-hour ghost preview at the snapped quarter slot
                        let ghost_block = block_for(slot, 60, cell_height);
                        let ghost_rect = egui::Rect::from_min_size(
                            egui::pos2(col_x + 2.0, grid_rect.min.y + ghost_block.top),
                            egui::vec2(col_width - 4.0, ghost_block.height),
                        );

                        ui.painter().rect(
                            ghost_rect,
                            4.0,
                            theme::ACCENT.gamma_multiply(0.22),
                            egui::Stroke::new(1.0, theme::ACCENT.gamma_multiply(0.5)),
                        );
                        ui.painter().text(
                            ghost_rect.center(),
                            egui::Align2::CENTER_CENTER,
                            format!("{} · 1h", slot_time),
                            egui::FontId::proportional(13.0),
                            Color32::from_rgba_unmultiplied(255, 255, 255, 150),
                        );

                        if col_response.clicked() {
                            result.add_at = Some(NewSlot {
                                date: column.date,
                                staff_name: column.staff_name.map(str::to_string),
                                time: slot_time,
                            });
                        }
                    }
                }
            }
        }
    });

    result
}

/// Paint one booking card. The card's top/height may land outside the grid
/// rect for out-of-window times; the painter's clip rect handles it.
fn paint_booking_card(ui: &Ui, rect: egui::Rect, booking: &Appointment) {
    let painter = ui.painter();
    let accent = status_color(booking.status);
    let corner_radius = 4.0;

    painter.rect(rect, corner_radius, theme::SURFACE, egui::Stroke::new(1.0, accent));

    // Left accent stripe
    let accent_width = 3.0;
    let accent_rect = egui::Rect::from_min_size(rect.min, egui::vec2(accent_width, rect.height()));
    painter.rect(
        accent_rect,
        egui::Rounding {
            nw: corner_radius,
            sw: corner_radius,
            ne: 0.0,
            se: 0.0,
        },
        accent,
        egui::Stroke::NONE,
    );

    let text_left = rect.min.x + accent_width + 5.0;
    let font_size = 13.0;

    // First line: start time + client name
    if rect.height() > 20.0 {
        let line_y = rect.min.y + 12.0;
        let mut x = text_left;

        let time_galley = painter.layout_no_wrap(
            booking.time.clone(),
            egui::FontId::proportional(font_size),
            Color32::WHITE,
        );
        painter.galley(
            egui::pos2(x, line_y - time_galley.size().y / 2.0),
            time_galley.clone(),
            Color32::WHITE,
        );
        x += time_galley.size().x + 6.0;

        let name_galley = painter.layout_no_wrap(
            booking.client_name.clone(),
            egui::FontId::proportional(font_size),
            theme::TEXT,
        );
        if x + name_galley.size().x < rect.max.x - 4.0 {
            painter.galley(
                egui::pos2(x, line_y - name_galley.size().y / 2.0),
                name_galley,
                Color32::WHITE,
            );
        }
    }

    // Second line: service label, when the card is tall enough
    if rect.height() > 44.0 && !booking.service.is_empty() {
        painter.text(
            egui::pos2(text_left, rect.min.y + 28.0),
            egui::Align2::LEFT_CENTER,
            &booking.service,
            egui::FontId::proportional(12.0),
            theme::TEXT_DIM,
        );
    }
}

/// Flat list of bookings with per-row actions. Returns the clicked actions;
/// filtering and sorting are the caller's concern.
pub fn render_appointment_list(
    ui: &mut Ui,
    entries: &[Appointment],
    currency: &str,
) -> ListResult {
    let mut result = ListResult::default();

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 0.0;

        for entry in entries {
            match render_list_row(ui, entry, currency) {
                RowAction::None => {}
                RowAction::Edit => result.edit = Some(entry.clone()),
                RowAction::Complete => result.complete = Some(entry.clone()),
                RowAction::Cancel => result.cancel = Some(entry.clone()),
            }
        }

        if render_add_button(ui, entries.is_empty()) {
            result.add_clicked = true;
        }
    });

    result
}

enum RowAction {
    None,
    Edit,
    Complete,
    Cancel,
}

fn render_list_row(ui: &mut Ui, entry: &Appointment, currency: &str) -> RowAction {
    let mut action = RowAction::None;
    let text_color = theme::TEXT;
    let secondary_color = theme::TEXT_DIM;
    let accent_color = status_color(entry.status);

    // Card styling
    let card_bg = theme::SURFACE;
    let card_border = theme::SURFACE_EDGE;
    let accent_width = 4.0;
    let corner_radius = 6.0;
    let card_padding = 10.0;
    let card_gap = 6.0;

    let line_height = 24.0;
    let total_height = line_height + card_padding * 2.0;

    let menu_id = ui.make_persistent_id(format!("booking_menu_{}", entry.local_id));

    let available_width = ui.available_width();
    let (full_rect, response) = ui.allocate_exact_size(
        egui::vec2(available_width, total_height + card_gap),
        egui::Sense::click(),
    );

    if response.secondary_clicked() {
        ui.memory_mut(|mem| mem.toggle_popup(menu_id));
    }
    if response.double_clicked() {
        action = RowAction::Edit;
    }

    let card_rect = egui::Rect::from_min_size(
        full_rect.min,
        egui::vec2(available_width, total_height),
    );

    let is_hovered = response.hovered();
    let painter = ui.painter();

    painter.rect(
        card_rect,
        corner_radius,
        card_bg,
        egui::Stroke::new(1.0, card_border),
    );

    // Left accent stripe (rounded on the left side only)
    let accent_rect = egui::Rect::from_min_size(
        card_rect.min,
        egui::vec2(accent_width + corner_radius, card_rect.height()),
    );
    painter.rect(
        accent_rect,
        egui::Rounding {
            nw: corner_radius,
            sw: corner_radius,
            ne: 0.0,
            se: 0.0,
        },
        accent_color,
        egui::Stroke::NONE,
    );
    let cover_rect = egui::Rect::from_min_size(
        egui::pos2(card_rect.min.x + accent_width, card_rect.min.y),
        egui::vec2(corner_radius, card_rect.height()),
    );
    painter.rect_filled(cover_rect, 0.0, card_bg);

    let content_left = card_rect.min.x + accent_width + card_padding;
    let content_rect = egui::Rect::from_min_max(
        egui::pos2(content_left, card_rect.min.y + card_padding),
        egui::pos2(card_rect.max.x - card_padding, card_rect.max.y - card_padding),
    );
    let mut child_ui = ui.new_child(egui::UiBuilder::new().max_rect(content_rect));

    child_ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;
        ui.set_height(line_height);

        // Date and start time - white so the schedule column stands out
        ui.add(egui::Label::new(
            RichText::new(format!("{} {}", entry.date.format("%b %-d"), entry.time))
                .size(14.0)
                .color(Color32::WHITE),
        ));

        // Client
        ui.add(egui::Label::new(
            RichText::new(&entry.client_name).size(14.0).color(text_color),
        ));

        // Status dot + label, in the accent color
        ui.add(egui::Label::new(
            RichText::new(egui_phosphor::fill::CIRCLE)
                .size(9.0)
                .family(phosphor_fill_family())
                .color(accent_color),
        ));
        ui.add(egui::Label::new(
            RichText::new(entry.status.label()).size(13.0).color(accent_color),
        ));

        // Staff + service detail
        let detail = if entry.service.is_empty() {
            entry.staff_name.clone()
        } else {
            format!("{} · {}", entry.staff_name, entry.service)
        };
        ui.add(
            egui::Label::new(RichText::new(detail).size(14.0).color(secondary_color)).truncate(),
        );

        // Price + actions menu (right-aligned)
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let menu_response = ui.add(
                egui::Label::new(
                    RichText::new(egui_phosphor::regular::DOTS_THREE_VERTICAL)
                        .size(14.0)
                        .color(if is_hovered { text_color } else { secondary_color }),
                )
                .sense(egui::Sense::click()),
            );

            if menu_response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if menu_response.clicked() {
                ui.memory_mut(|mem| mem.toggle_popup(menu_id));
            }

            egui::popup::popup_below_widget(
                ui,
                menu_id,
                &menu_response,
                egui::PopupCloseBehavior::CloseOnClick,
                |ui| {
                    ui.set_min_width(160.0);
                    ui.style_mut().spacing.button_padding = egui::vec2(12.0, 8.0);

                    if ui
                        .add(
                            egui::Button::new(
                                RichText::new(format!(
                                    "{}  Edit booking",
                                    egui_phosphor::regular::PENCIL_SIMPLE
                                ))
                                .size(14.0),
                            )
                            .frame(false),
                        )
                        .clicked()
                    {
                        action = RowAction::Edit;
                    }

                    if entry.status != AppointmentStatus::Completed
                        && ui
                            .add(
                                egui::Button::new(
                                    RichText::new(format!(
                                        "{}  Mark completed",
                                        egui_phosphor::regular::CHECK_FAT
                                    ))
                                    .size(14.0),
                                )
                                .frame(false),
                            )
                            .clicked()
                    {
                        action = RowAction::Complete;
                    }

                    if entry.status != AppointmentStatus::Cancelled
                        && ui
                            .add(
                                egui::Button::new(
                                    RichText::new(format!(
                                        "{}  Cancel booking",
                                        egui_phosphor::regular::TRASH
                                    ))
                                    .size(14.0),
                                )
                                .frame(false),
                            )
                            .clicked()
                    {
                        action = RowAction::Cancel;
                    }
                },
            );

            ui.add(egui::Label::new(
                RichText::new(format_price(entry.price, currency))
                    .size(14.0)
                    .color(Color32::WHITE),
            ));
        });
    });

    action
}

/// Dashed-feel add target at the tail of the list; larger when the book is
/// empty
fn render_add_button(ui: &mut Ui, is_empty: bool) -> bool {
    let card_gap = 8.0;
    let button_height = if is_empty { 80.0 } else { 50.0 };
    let available_width = ui.available_width();

    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(available_width, button_height + card_gap),
        egui::Sense::click(),
    );

    let button_rect =
        egui::Rect::from_min_size(rect.min, egui::vec2(available_width, button_height));

    let painter = ui.painter();
    let is_hovered = response.hovered();

    // Accent border, brighter on hover
    let border_color = if is_hovered {
        theme::ACCENT
    } else {
        theme::ACCENT.gamma_multiply(0.55)
    };

    painter.rect_stroke(button_rect, 8.0, egui::Stroke::new(2.0, border_color));

    let icon_color = if is_hovered {
        Color32::WHITE
    } else {
        theme::ACCENT
    };
    let icon_size = if is_empty { 32.0 } else { 24.0 };

    painter.text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        egui_phosphor::regular::PLUS,
        egui::FontId::proportional(icon_size),
        icon_color,
    );

    if is_hovered {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    response.clicked()
}
