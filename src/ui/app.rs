use chrono::{Local, NaiveDate};
use eframe::egui;
use egui::{Color32, RichText};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::Instant;

use super::theme;
use super::views::{self, NewSlot, WeekData};
use crate::api::{
    format_price, Appointment, AppointmentStatus, Customer, SalonClient, SaveAppointmentRequest,
    Service, Staff,
};
use crate::config::Config;
use crate::schedule::{
    aggregate, build_timestamp, format_date, format_time, parse_date, parse_time,
    selection_from_label, CalendarNav, CalendarView, GridView,
};

pub struct SalonApp {
    config: Config,
    state: AppState,

    // Current view; owns the anchor week/day and the grid/list flip
    nav: CalendarNav,

    // Data for the visible week (grid modes) and the full book (list mode)
    week: WeekData,
    all_appointments: Vec<Appointment>,

    // Roster and catalog, loaded once per session
    staff: Vec<Staff>,
    services: Vec<Service>,
    customers: Vec<Customer>,
    roster_requested: bool,

    // Every appointment load is tagged; responses for a superseded tag are
    // dropped so racing navigation can't show another view's data
    fetch_seq: u64,

    // List-view filters; only the explicit clear control resets them
    filter_status: Option<AppointmentStatus>,
    filter_from: String,
    filter_to: String,
    sort_newest_first: bool,

    // Booking dialog
    show_dialog: bool,
    dialog_mode: DialogMode,
    dialog_backend_id: Option<String>,
    dialog_customer_id: Option<String>,
    dialog_staff_id: Option<String>,
    dialog_date: String,
    dialog_time: String,
    dialog_service_ids: Vec<String>, // selection order drives the aggregate
    dialog_status: AppointmentStatus,
    dialog_price: String,
    dialog_notes: String,

    // Form validation errors (true = has error)
    error_customer: bool,
    error_staff: bool,
    error_date: bool,
    error_time: bool,
    error_price: bool,

    // Cancel confirmation
    pending_cancel: Option<Appointment>,
    show_cancel_confirm: bool,

    // Settings dialog
    show_settings: bool,
    settings_server: String,
    settings_email: String,
    settings_key: String,
    settings_font_scale: f32,
    settings_currency: String,

    // Status
    status_message: Option<(String, bool)>, // (message, is_error)
    loading: bool,
    is_offline: bool,

    // Progress bar state
    progress: f32,
    progress_start: Instant,
    progress_phase: ProgressPhase,

    // Async communication
    runtime: tokio::runtime::Runtime,
    result_rx: Receiver<AsyncResult>,
    result_tx: Sender<AsyncResult>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppState {
    Setup,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DialogMode {
    Add,
    Edit,
}

enum AsyncResult {
    WeekLoaded(u64, Vec<Appointment>),
    ListLoaded(u64, Vec<Appointment>),
    RosterLoaded(Vec<Staff>, Vec<Service>, Vec<Customer>),
    RosterFailed,
    BookingSaved(String),
    Error(String),
    Offline,
}

/// How long the finished load bar lingers before it is gone
const FADE_SECS: f32 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProgressPhase {
    Idle,
    FastStart,  // jump to 20% so the bar reads as alive
    SlowCrawl,  // creep toward 55% while the request runs
    Completing, // snap to full
    FadingOut,  // fade after completion
    Shrinking,  // collapse on error
}

impl SalonApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load().unwrap_or_default();
        super::setup_fonts(&cc.egui_ctx);
        super::setup_theme(&cc.egui_ctx);
        let state = if config.is_configured() {
            AppState::Main
        } else {
            AppState::Setup
        };

        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        let (result_tx, result_rx) = channel();

        let today = Local::now().date_naive();
        let nav = CalendarNav::new(today, config.day_grid);
        let week_anchor = nav.fetch_range().map(|(from, _)| from).unwrap_or(today);

        let mut app = Self {
            show_settings: false,
            settings_server: config.server_url.clone(),
            settings_email: config.email.clone(),
            settings_key: String::new(),
            settings_font_scale: config.font_scale,
            settings_currency: config.currency.clone(),
            config,
            state,
            nav,
            week: WeekData::new(week_anchor),
            all_appointments: Vec::new(),
            staff: Vec::new(),
            services: Vec::new(),
            customers: Vec::new(),
            roster_requested: false,
            fetch_seq: 0,
            filter_status: None,
            filter_from: String::new(),
            filter_to: String::new(),
            sort_newest_first: true,
            show_dialog: false,
            dialog_mode: DialogMode::Add,
            dialog_backend_id: None,
            dialog_customer_id: None,
            dialog_staff_id: None,
            dialog_date: String::new(),
            dialog_time: String::new(),
            dialog_service_ids: Vec::new(),
            dialog_status: AppointmentStatus::Pending,
            dialog_price: String::new(),
            dialog_notes: String::new(),
            error_customer: false,
            error_staff: false,
            error_date: false,
            error_time: false,
            error_price: false,
            pending_cancel: None,
            show_cancel_confirm: false,
            status_message: None,
            loading: false,
            is_offline: false,
            progress: 0.0,
            progress_start: Instant::now(),
            progress_phase: ProgressPhase::Idle,
            runtime,
            result_rx,
            result_tx,
        };

        if state == AppState::Main {
            app.refresh_data();
        }

        app
    }

    fn check_async_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                AsyncResult::WeekLoaded(seq, appointments) => {
                    if seq != self.fetch_seq {
                        // A newer load superseded this one while it was in
                        // flight
                        continue;
                    }
                    self.week.appointments = appointments;
                    self.loading = false;
                    self.is_offline = false;
                    self.status_message = None;
                    self.progress_phase = ProgressPhase::Completing;
                    self.progress_start = Instant::now();
                }
                AsyncResult::ListLoaded(seq, appointments) => {
                    if seq != self.fetch_seq {
                        continue;
                    }
                    self.all_appointments = appointments;
                    self.loading = false;
                    self.is_offline = false;
                    self.status_message = None;
                    self.progress_phase = ProgressPhase::Completing;
                    self.progress_start = Instant::now();
                }
                AsyncResult::RosterLoaded(staff, services, customers) => {
                    self.staff = staff;
                    self.services = services;
                    self.customers = customers;
                }
                AsyncResult::RosterFailed => {
                    // Retried on the next refresh
                    self.roster_requested = false;
                }
                AsyncResult::BookingSaved(msg) => {
                    self.loading = false;
                    self.show_dialog = false;
                    self.status_message = Some((msg, false));
                    self.progress_phase = ProgressPhase::Completing;
                    self.progress_start = Instant::now();
                    // The saved draft is superseded, never merged: re-fetch
                    // the authoritative list
                    self.refresh_data();
                }
                AsyncResult::Error(msg) => {
                    self.loading = false;
                    self.is_offline = false;
                    self.status_message = Some((msg, true));
                    self.progress_phase = ProgressPhase::Shrinking;
                    self.progress_start = Instant::now();
                }
                AsyncResult::Offline => {
                    self.loading = false;
                    self.is_offline = true;
                    self.status_message = None;
                    self.progress_phase = ProgressPhase::Shrinking;
                    self.progress_start = Instant::now();
                }
            }
        }
    }

    fn refresh_data(&mut self) {
        if !self.config.is_configured() {
            return;
        }
        self.ensure_roster();
        match self.nav.view() {
            CalendarView::Grid(_) => self.load_week(),
            CalendarView::List => self.load_list(),
        }
    }

    fn start_progress(&mut self) {
        self.loading = true;
        self.progress = 0.0;
        self.progress_phase = ProgressPhase::FastStart;
        self.progress_start = Instant::now();
    }

    fn load_week(&mut self) {
        let Some((from, to)) = self.nav.fetch_range() else {
            return;
        };

        self.fetch_seq += 1;
        let seq = self.fetch_seq;

        // Drop the old week right away; the grid shows empty over stale
        self.week = WeekData::new(from);
        self.start_progress();

        let config = self.config.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = SalonClient::new(&config)?;
                let records = client.get_appointments(from, to).await?;
                let mut appointments = records
                    .into_iter()
                    .enumerate()
                    .map(|(i, record)| record.into_appointment(i as u64 + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                appointments.sort_by_key(booking_sort_key);
                Ok::<_, anyhow::Error>(appointments)
            }
            .await;

            match result {
                Ok(appointments) => {
                    let _ = tx.send(AsyncResult::WeekLoaded(seq, appointments));
                }
                Err(e) => {
                    let _ = tx.send(classify_error(e));
                }
            }
        });
    }

    fn load_list(&mut self) {
        self.fetch_seq += 1;
        let seq = self.fetch_seq;
        self.start_progress();

        let config = self.config.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = SalonClient::new(&config)?;
                let records = client.get_all_appointments().await?;
                let mut appointments = records
                    .into_iter()
                    .enumerate()
                    .map(|(i, record)| record.into_appointment(i as u64 + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                appointments.sort_by_key(booking_sort_key);
                Ok::<_, anyhow::Error>(appointments)
            }
            .await;

            match result {
                Ok(appointments) => {
                    let _ = tx.send(AsyncResult::ListLoaded(seq, appointments));
                }
                Err(e) => {
                    let _ = tx.send(classify_error(e));
                }
            }
        });
    }

    fn ensure_roster(&mut self) {
        if self.roster_requested {
            return;
        }
        self.roster_requested = true;

        let config = self.config.clone();
        let tx = self.result_tx.clone();

        self.runtime.spawn(async move {
            let result = async {
                let client = SalonClient::new(&config)?;
                let staff = client.get_staff().await?;
                let services = client.get_services().await?;
                let customers = client.get_customers().await?;
                Ok::<_, anyhow::Error>((staff, services, customers))
            }
            .await;

            match result {
                Ok((staff, services, customers)) => {
                    let _ = tx.send(AsyncResult::RosterLoaded(staff, services, customers));
                }
                Err(e) => {
                    // Not fatal on its own; the booking dialog needs it though
                    eprintln!("Roster load failed: {}", e);
                    let _ = tx.send(AsyncResult::RosterFailed);
                }
            }
        });
    }

    fn save_settings(&mut self) {
        let credentials_changed = self.config.server_url != self.settings_server.trim()
            || self.config.email != self.settings_email
            || !self.settings_key.is_empty();

        self.config.server_url = self.settings_server.trim().to_string();
        self.config.email = self.settings_email.clone();
        self.config.font_scale = self.settings_font_scale;
        let currency = self.settings_currency.trim();
        self.config.currency = if currency.is_empty() {
            "$".to_string()
        } else {
            currency.to_string()
        };

        if !self.settings_key.is_empty() {
            self.config.api_key = Some(self.settings_key.clone());
        }

        match self.config.save() {
            Ok(_) => {
                self.show_settings = false;
                if self.config.is_configured() && self.state == AppState::Setup {
                    self.state = AppState::Main;
                }
                if credentials_changed {
                    self.roster_requested = false;
                    self.refresh_data();
                }
            }
            Err(e) => {
                self.status_message = Some((format!("Failed to save: {}", e), true));
            }
        }
    }

    fn open_add_dialog(&mut self, slot: Option<NewSlot>) {
        self.dialog_mode = DialogMode::Add;
        self.dialog_backend_id = None;
        self.dialog_customer_id = None;
        self.dialog_staff_id = None;
        self.dialog_date = format_date(
            slot.as_ref()
                .map(|s| s.date)
                .unwrap_or_else(|| Local::now().date_naive()),
        );
        self.dialog_time = slot
            .as_ref()
            .map(|s| s.time.clone())
            .unwrap_or_else(|| format_time(10, 0));
        if let Some(staff_name) = slot.and_then(|s| s.staff_name) {
            self.dialog_staff_id = self
                .staff
                .iter()
                .find(|m| m.name == staff_name)
                .map(|m| m.id.clone());
        }
        self.dialog_service_ids.clear();
        self.dialog_status = AppointmentStatus::Pending;
        self.dialog_price = String::new();
        self.dialog_notes = String::new();
        self.clear_dialog_errors();
        self.show_dialog = true;
    }

    fn open_edit_dialog(&mut self, appt: &Appointment) {
        self.dialog_mode = DialogMode::Edit;
        self.dialog_backend_id = appt.backend_id.clone();

        // Name-keyed reverse lookups; a rename on the backend since the
        // booking was stored leaves the field unselected for re-picking
        self.dialog_customer_id = self
            .customers
            .iter()
            .find(|c| c.name == appt.client_name)
            .map(|c| c.id.clone());
        self.dialog_staff_id = self
            .staff
            .iter()
            .find(|m| m.name == appt.staff_name)
            .map(|m| m.id.clone());

        self.dialog_date = format_date(appt.date);
        self.dialog_time = appt.time.clone();
        // Service names with no catalog match drop out of the selection here
        self.dialog_service_ids = selection_from_label(&appt.service, &self.services);
        self.dialog_status = appt.status;
        self.dialog_price = price_field_value(appt.price);
        self.dialog_notes = appt.notes.clone();
        self.clear_dialog_errors();
        self.show_dialog = true;
    }

    fn clear_dialog_errors(&mut self) {
        self.error_customer = false;
        self.error_staff = false;
        self.error_date = false;
        self.error_time = false;
        self.error_price = false;
    }

    /// Re-derive the price field from the service selection. An empty
    /// selection leaves the price unset rather than zero.
    fn recompute_price(&mut self) {
        let agg = aggregate(&self.dialog_service_ids, &self.services);
        self.dialog_price = match agg.total_price {
            Some(price) => price_field_value(price),
            None => String::new(),
        };
    }

    fn save_dialog(&mut self) {
        self.clear_dialog_errors();

        if self.dialog_customer_id.is_none() {
            self.error_customer = true;
        }
        if self.dialog_staff_id.is_none() {
            self.error_staff = true;
        }

        let date = match parse_date(&self.dialog_date) {
            Ok(d) => Some(d),
            Err(_) => {
                self.error_date = true;
                None
            }
        };
        if parse_time(&self.dialog_time).is_err() {
            self.error_time = true;
        }

        let price = match self.dialog_price.trim().parse::<f64>() {
            Ok(p) if p >= 0.0 => Some(p),
            _ => {
                self.error_price = true;
                None
            }
        };

        if self.error_customer
            || self.error_staff
            || self.error_date
            || self.error_time
            || self.error_price
        {
            return;
        }

        let (Some(date), Some(price)) = (date, price) else {
            return;
        };
        let Ok(stamp) = build_timestamp(date, &self.dialog_time) else {
            self.error_time = true;
            return;
        };

        let customer_id = self.dialog_customer_id.clone().unwrap_or_default();
        let staff_id = self.dialog_staff_id.clone().unwrap_or_default();
        let client_name = self
            .customers
            .iter()
            .find(|c| c.id == customer_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "client".to_string());

        let request = SaveAppointmentRequest {
            customer_id,
            staff_id,
            service_ids: self.dialog_service_ids.clone(),
            appointment_date: stamp,
            status: self.dialog_status.to_wire().to_string(),
            notes: if self.dialog_notes.trim().is_empty() {
                None
            } else {
                Some(self.dialog_notes.trim().to_string())
            },
            price,
        };

        self.start_progress();

        let config = self.config.clone();
        let tx = self.result_tx.clone();
        let backend_id = self.dialog_backend_id.clone();
        let is_edit = self.dialog_mode == DialogMode::Edit;
        let date_label = self.dialog_date.clone();

        self.runtime.spawn(async move {
            let result: Result<String, anyhow::Error> = async {
                let client = SalonClient::new(&config)?;
                match (&backend_id, is_edit) {
                    (Some(id), true) => {
                        client.update_appointment(id, &request).await?;
                        Ok(format!("Updated booking for {}", client_name))
                    }
                    _ => {
                        client.create_appointment(&request).await?;
                        Ok(format!("Booked {} for {}", client_name, date_label))
                    }
                }
            }
            .await;

            match result {
                Ok(msg) => {
                    let _ = tx.send(AsyncResult::BookingSaved(msg));
                }
                Err(e) => {
                    let _ = tx.send(classify_error(e));
                }
            }
        });
    }

    /// Rebuild a write request from a stored booking so a status flip
    /// (completed/cancelled) round-trips without opening the dialog.
    fn request_from_existing(
        &self,
        appt: &Appointment,
        status: AppointmentStatus,
    ) -> Option<SaveAppointmentRequest> {
        let customer = self.customers.iter().find(|c| c.name == appt.client_name)?;
        let staff = self.staff.iter().find(|m| m.name == appt.staff_name)?;
        let stamp = build_timestamp(appt.date, &appt.time).ok()?;

        Some(SaveAppointmentRequest {
            customer_id: customer.id.clone(),
            staff_id: staff.id.clone(),
            service_ids: selection_from_label(&appt.service, &self.services),
            appointment_date: stamp,
            status: status.to_wire().to_string(),
            notes: if appt.notes.is_empty() {
                None
            } else {
                Some(appt.notes.clone())
            },
            price: appt.price,
        })
    }

    fn save_status_change(&mut self, appt: &Appointment, status: AppointmentStatus) {
        let Some(backend_id) = appt.backend_id.clone() else {
            self.status_message =
                Some(("Booking has not reached the server yet".to_string(), true));
            return;
        };
        let Some(request) = self.request_from_existing(appt, status) else {
            self.status_message = Some((
                "Could not match the booking to the roster; edit it instead".to_string(),
                true,
            ));
            return;
        };

        self.start_progress();

        let config = self.config.clone();
        let tx = self.result_tx.clone();
        let msg = format!("Marked {} {}", appt.client_name, status.label());

        self.runtime.spawn(async move {
            let result: Result<String, anyhow::Error> = async {
                let client = SalonClient::new(&config)?;
                client.update_appointment(&backend_id, &request).await?;
                Ok(msg)
            }
            .await;

            match result {
                Ok(msg) => {
                    let _ = tx.send(AsyncResult::BookingSaved(msg));
                }
                Err(e) => {
                    let _ = tx.send(classify_error(e));
                }
            }
        });
    }

    fn admin_url(&self) -> String {
        self.config.base_url().replace("/api/v1", "/admin")
    }

    fn render_setup(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Salondesk setup");
            ui.add_space(20.0);

            ui.label("Enter your salon server details to get started.");
            ui.add_space(8.0);

            let link = egui::Label::new(
                RichText::new("API keys are issued from the server's admin console")
                    .color(theme::ACCENT),
            )
            .sense(egui::Sense::click());
            let response = ui.add(link);
            if response.hovered() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
            if response.clicked() {
                let _ = open::that(self.admin_url());
            }

            ui.add_space(20.0);
        });

        egui::Grid::new("setup_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Server:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_server)
                        .hint_text("books.yoursalon.com")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("Email:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_email)
                        .hint_text("you@yoursalon.com")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("API key:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_key)
                        .password(true)
                        .hint_text("Paste your API key here")
                        .desired_width(350.0),
                );
                ui.end_row();
            });

        ui.add_space(20.0);

        if ui.button("Save and connect").clicked() {
            self.save_settings();
        }
    }

    fn render_main(&mut self, ui: &mut egui::Ui) {
        // Header with navigation
        let mut step: i64 = 0;
        let mut view_pick: Option<ViewPick> = None;
        let mut reload = false;
        let mut open_settings = false;

        ui.horizontal(|ui| {
            let button_bg = theme::SURFACE_EDGE;
            let button_text = theme::TEXT_DIM;

            match self.nav.view() {
                CalendarView::Grid(_) => {
                    let grid = self.nav.grid();
                    // Pill-shaped week/day navigator
                    egui::Frame::none()
                        .fill(button_bg)
                        .rounding(egui::Rounding::same(12.0))
                        .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                let left_arrow = ui.add(
                                    egui::Label::new(
                                        RichText::new(egui_phosphor::regular::CARET_LEFT)
                                            .size(14.0)
                                            .color(button_text),
                                    )
                                    .sense(egui::Sense::click()),
                                );
                                if left_arrow.hovered() {
                                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                                }
                                if left_arrow.clicked() {
                                    step = -1;
                                }

                                ui.add_space(4.0);

                                let title = match grid {
                                    GridView::Week(ws) => {
                                        let end = ws + chrono::Duration::days(6);
                                        format!(
                                            "{} - {}",
                                            ws.format("%b %-d"),
                                            end.format("%b %-d, %Y")
                                        )
                                    }
                                    GridView::Day(d) => d.format("%a, %b %-d, %Y").to_string(),
                                };
                                // Min width to keep the pill from resizing
                                ui.allocate_ui_with_layout(
                                    egui::vec2(150.0, 14.0),
                                    egui::Layout::centered_and_justified(
                                        egui::Direction::LeftToRight,
                                    ),
                                    |ui| {
                                        ui.label(
                                            RichText::new(&title).size(14.0).color(button_text),
                                        );
                                    },
                                );

                                ui.add_space(4.0);

                                let right_arrow = ui.add(
                                    egui::Label::new(
                                        RichText::new(egui_phosphor::regular::CARET_RIGHT)
                                            .size(14.0)
                                            .color(button_text),
                                    )
                                    .sense(egui::Sense::click()),
                                );
                                if right_arrow.hovered() {
                                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                                }
                                if right_arrow.clicked() {
                                    step = 1;
                                }
                            });
                        });

                    // Week totals (only show when there are bookings)
                    ui.add_space(16.0);
                    let (count, revenue) = self.week.week_summary();
                    if count > 0 {
                        ui.label(
                            RichText::new(format!(
                                "{} bookings · {}",
                                count,
                                format_price(revenue, &self.config.currency)
                            ))
                            .size(14.0)
                            .color(Color32::WHITE),
                        );
                    }
                }
                CalendarView::List => {
                    ui.label(
                        RichText::new("All appointments")
                            .size(14.0)
                            .color(Color32::WHITE),
                    );
                }
            }

            // View switcher: current-mode icon plus a chevron opening a popup
            ui.add_space(16.0);
            let view_menu_id = ui.make_persistent_id("view_mode_menu");
            let current_icon = match self.nav.view() {
                CalendarView::Grid(GridView::Week(_)) => egui_phosphor::regular::CALENDAR_BLANK,
                CalendarView::Grid(GridView::Day(_)) => egui_phosphor::regular::USERS,
                CalendarView::List => egui_phosphor::regular::LIST,
            };

            let icon_color = theme::TEXT_DIM;
            let hover_color = Color32::WHITE;
            let btn_text = format!("{} {}", current_icon, egui_phosphor::regular::CARET_DOWN);
            let font_id = egui::FontId::proportional(14.0);
            let text_size = ui.fonts(|f| {
                f.layout_no_wrap(btn_text.clone(), font_id.clone(), icon_color)
                    .size()
            });
            let (btn_rect, btn_response) =
                ui.allocate_exact_size(text_size + egui::vec2(6.0, 4.0), egui::Sense::click());
            let btn_col = if btn_response.hovered() {
                hover_color
            } else {
                icon_color
            };
            ui.painter().text(
                btn_rect.center(),
                egui::Align2::CENTER_CENTER,
                &btn_text,
                font_id,
                btn_col,
            );

            if btn_response.clicked() {
                ui.memory_mut(|mem| mem.toggle_popup(view_menu_id));
            }

            egui::popup::popup_below_widget(
                ui,
                view_menu_id,
                &btn_response,
                egui::PopupCloseBehavior::CloseOnClick,
                |ui| {
                    ui.set_min_width(170.0);
                    ui.style_mut().spacing.button_padding = egui::vec2(12.0, 8.0);

                    let options = [
                        (
                            ViewPick::WeekGrid,
                            egui_phosphor::regular::CALENDAR_BLANK,
                            "Week grid",
                        ),
                        (ViewPick::DayGrid, egui_phosphor::regular::USERS, "Staff day"),
                        (
                            ViewPick::List,
                            egui_phosphor::regular::LIST,
                            "All appointments",
                        ),
                    ];
                    let current = match self.nav.view() {
                        CalendarView::Grid(GridView::Week(_)) => ViewPick::WeekGrid,
                        CalendarView::Grid(GridView::Day(_)) => ViewPick::DayGrid,
                        CalendarView::List => ViewPick::List,
                    };

                    for (pick, icon, label) in options {
                        if pick == current {
                            continue;
                        }
                        if ui
                            .add(
                                egui::Button::new(
                                    RichText::new(format!("{} {}", icon, label)).size(14.0),
                                )
                                .frame(false),
                            )
                            .clicked()
                        {
                            view_pick = Some(pick);
                        }
                    }
                },
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                // Settings and sync sit right-aligned as bare icons
                let text_color = theme::TEXT_FAINT;
                let hover_color = Color32::WHITE;
                let font_id = egui::FontId::proportional(18.0);

                // Settings button
                let settings_icon = egui_phosphor::regular::FADERS_HORIZONTAL;
                let icon_size = ui.fonts(|f| {
                    f.layout_no_wrap(settings_icon.to_string(), font_id.clone(), Color32::WHITE)
                        .size()
                });
                let (settings_rect, settings_response) =
                    ui.allocate_exact_size(icon_size + egui::vec2(8.0, 4.0), egui::Sense::click());
                let settings_col = if settings_response.hovered() {
                    hover_color
                } else {
                    text_color
                };
                ui.painter().text(
                    settings_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    settings_icon,
                    font_id.clone(),
                    settings_col,
                );
                if settings_response.on_hover_text("Settings").clicked() {
                    open_settings = true;
                }

                ui.add_space(12.0);

                // Reload button
                let reload_icon = egui_phosphor::regular::CLOUD_ARROW_DOWN;
                let icon_size = ui.fonts(|f| {
                    f.layout_no_wrap(reload_icon.to_string(), font_id.clone(), Color32::WHITE)
                        .size()
                });
                let (reload_rect, reload_response) =
                    ui.allocate_exact_size(icon_size + egui::vec2(8.0, 4.0), egui::Sense::click());
                let reload_col = if reload_response.hovered() {
                    hover_color
                } else {
                    text_color
                };
                ui.painter().text(
                    reload_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    reload_icon,
                    font_id,
                    reload_col,
                );
                if reload_response.on_hover_text("Sync with server").clicked() {
                    reload = true;
                }
            });
        });

        // Apply header actions
        if step < 0 {
            self.nav.previous();
            self.refresh_data();
        } else if step > 0 {
            self.nav.next();
            self.refresh_data();
        }
        if let Some(pick) = view_pick {
            match pick {
                ViewPick::WeekGrid => {
                    self.nav.set_day_grid(false);
                    self.config.day_grid = false;
                }
                ViewPick::DayGrid => {
                    self.nav.set_day_grid(true);
                    self.config.day_grid = true;
                }
                ViewPick::List => {
                    if self.nav.view() != CalendarView::List {
                        self.nav.toggle_list();
                    }
                }
            }
            let _ = self.config.save();
            self.refresh_data();
        }
        if reload {
            self.refresh_data();
        }
        if open_settings {
            self.settings_server = self.config.server_url.clone();
            self.settings_email = self.config.email.clone();
            self.settings_key = String::new();
            self.settings_font_scale = self.config.font_scale;
            self.settings_currency = self.config.currency.clone();
            self.show_settings = true;
        }

        ui.add_space(8.0);

        // Offline takes over the whole content area until a retry succeeds
        if self.is_offline {
            ui.add_space(40.0);
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(egui_phosphor::regular::WIFI_SLASH.to_string())
                        .size(34.0)
                        .color(theme::DANGER),
                );
                ui.add_space(16.0);
                ui.label(
                    RichText::new("Can't reach the server")
                        .size(20.0)
                        .color(theme::TEXT_DIM),
                );
                ui.add_space(8.0);
                ui.label(
                    RichText::new("Check the connection and retry")
                        .size(14.0)
                        .color(theme::TEXT_FAINT),
                );
                ui.add_space(24.0);
                if ui
                    .add(
                        egui::Button::new(
                            RichText::new(format!(
                                "{} Retry",
                                egui_phosphor::regular::ARROWS_CLOCKWISE
                            ))
                            .size(17.0)
                            .color(Color32::WHITE),
                        )
                        .fill(theme::ACCENT)
                        .rounding(6.0),
                    )
                    .clicked()
                {
                    self.is_offline = false;
                    self.refresh_data();
                }
            });
            return;
        }

        // Render the active view
        match self.nav.view() {
            CalendarView::Grid(GridView::Week(_)) => {
                let result = views::render_week_grid(ui, &self.week, &self.config.currency);
                if let Some(appt) = result.edit {
                    self.open_edit_dialog(&appt);
                }
                if let Some(slot) = result.add_at {
                    self.open_add_dialog(Some(slot));
                }
            }
            CalendarView::Grid(GridView::Day(date)) => {
                let result = views::render_day_grid(
                    ui,
                    date,
                    &self.staff,
                    &self.week,
                    &self.config.currency,
                );
                if let Some(appt) = result.edit {
                    self.open_edit_dialog(&appt);
                }
                if let Some(slot) = result.add_at {
                    self.open_add_dialog(Some(slot));
                }
            }
            CalendarView::List => {
                self.render_list(ui);
            }
        }
    }

    fn render_list(&mut self, ui: &mut egui::Ui) {
        // Filter bar; these survive view toggles and reset only via Clear
        let mut picked_filter: Option<Option<AppointmentStatus>> = None;
        let mut toggle_sort = false;
        let mut clear_filters = false;

        ui.horizontal(|ui| {
            let filter_label = match self.filter_status {
                Some(status) => status.label().to_string(),
                None => "all statuses".to_string(),
            };
            egui::ComboBox::from_id_salt("status_filter")
                .selected_text(filter_label)
                .width(140.0)
                .show_ui(ui, |ui| {
                    if ui
                        .selectable_label(self.filter_status.is_none(), "all statuses")
                        .clicked()
                    {
                        picked_filter = Some(None);
                    }
                    for status in AppointmentStatus::ALL {
                        if ui
                            .selectable_label(self.filter_status == Some(status), status.label())
                            .clicked()
                        {
                            picked_filter = Some(Some(status));
                        }
                    }
                });

            ui.label(RichText::new("from").size(13.0));
            ui.add(
                egui::TextEdit::singleline(&mut self.filter_from)
                    .desired_width(100.0)
                    .hint_text("2026-08-01"),
            );
            ui.label(RichText::new("to").size(13.0));
            ui.add(
                egui::TextEdit::singleline(&mut self.filter_to)
                    .desired_width(100.0)
                    .hint_text("2026-08-31"),
            );

            let sort_label = if self.sort_newest_first {
                format!("{} Newest first", egui_phosphor::regular::SORT_DESCENDING)
            } else {
                format!("{} Oldest first", egui_phosphor::regular::SORT_ASCENDING)
            };
            if ui
                .add(egui::Button::new(RichText::new(sort_label).size(14.0)))
                .clicked()
            {
                toggle_sort = true;
            }

            if ui
                .add(egui::Button::new(RichText::new("Clear").size(14.0)))
                .on_hover_text("Reset filters")
                .clicked()
            {
                clear_filters = true;
            }
        });

        if let Some(filter) = picked_filter {
            self.filter_status = filter;
        }
        if toggle_sort {
            self.sort_newest_first = !self.sort_newest_first;
        }
        if clear_filters {
            self.filter_status = None;
            self.filter_from.clear();
            self.filter_to.clear();
            self.sort_newest_first = true;
        }

        ui.add_space(8.0);

        // Unparseable range bounds filter nothing rather than everything
        let from = parse_date(&self.filter_from).ok();
        let to = parse_date(&self.filter_to).ok();

        let mut entries: Vec<Appointment> = self
            .all_appointments
            .iter()
            .filter(|a| self.filter_status.map_or(true, |s| a.status == s))
            .filter(|a| from.map_or(true, |d| a.date >= d))
            .filter(|a| to.map_or(true, |d| a.date <= d))
            .cloned()
            .collect();
        entries.sort_by_key(booking_sort_key);
        if self.sort_newest_first {
            entries.reverse();
        }

        let result = views::render_appointment_list(ui, &entries, &self.config.currency);
        if let Some(appt) = result.edit {
            self.open_edit_dialog(&appt);
        }
        if let Some(appt) = result.complete {
            self.save_status_change(&appt, AppointmentStatus::Completed);
        }
        if let Some(appt) = result.cancel {
            self.pending_cancel = Some(appt);
            self.show_cancel_confirm = true;
        }
        if result.add_clicked {
            self.open_add_dialog(None);
        }
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        let section_color = theme::TEXT_FAINT;

        // === Server connection ===
        ui.label(RichText::new("Server").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("server_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Server");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_server)
                        .hint_text("books.yoursalon.com")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("Email");
                ui.add(egui::TextEdit::singleline(&mut self.settings_email).desired_width(350.0));
                ui.end_row();

                ui.label("API key");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_key)
                        .password(true)
                        .hint_text("Leave blank to keep existing")
                        .desired_width(350.0),
                );
                ui.end_row();

                ui.label("");
                let link = ui.add(
                    egui::Label::new(
                        RichText::new("Open the admin console")
                            .size(14.0)
                            .color(theme::ACCENT),
                    )
                    .sense(egui::Sense::click()),
                );
                if link.hovered() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                }
                if link.clicked() {
                    let _ = open::that(self.admin_url());
                }
                ui.end_row();
            });

        ui.add_space(20.0);

        // === Display ===
        ui.label(RichText::new("Display").color(section_color).strong());
        ui.add_space(8.0);

        egui::Grid::new("display_grid")
            .num_columns(2)
            .spacing([20.0, 10.0])
            .show(ui, |ui| {
                ui.label("Font scale");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::Slider::new(&mut self.settings_font_scale, 0.75..=2.0)
                            .show_value(false),
                    );
                    ui.label(format!("{:.0}%", self.settings_font_scale * 100.0));
                });
                ui.end_row();

                ui.label("Currency symbol");
                ui.add(
                    egui::TextEdit::singleline(&mut self.settings_currency).desired_width(60.0),
                );
                ui.end_row();
            });

        ui.add_space(24.0);

        let mut save_clicked = false;
        let mut cancel_clicked = false;
        ui.horizontal(|ui| {
            let (btn_bg, btn_hover, text_color) = theme::flat_button();
            let font_id = egui::FontId::proportional(17.0);
            let padding = egui::vec2(18.0, 10.0);
            let rounding = egui::Rounding::same(6.0);

            for (label, clicked) in [
                ("Save", &mut save_clicked),
                ("Cancel", &mut cancel_clicked),
            ] {
                let size = ui.fonts(|f| {
                    f.layout_no_wrap(label.to_string(), font_id.clone(), text_color)
                        .size()
                });
                let (rect, response) =
                    ui.allocate_exact_size(size + padding * 2.0, egui::Sense::click());
                let bg = if response.hovered() { btn_hover } else { btn_bg };
                ui.painter().rect_filled(rect, rounding, bg);
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    label,
                    font_id.clone(),
                    text_color,
                );
                if response.clicked() {
                    *clicked = true;
                }
            }
        });

        if save_clicked {
            self.save_settings();
        }
        if cancel_clicked {
            self.show_settings = false;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ViewPick {
    WeekGrid,
    DayGrid,
    List,
}

impl eframe::App for SalonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Ctrl+scroll / trackpad pinch adjusts the persisted font scale
        let zoom_delta = ctx.input(|i| i.zoom_delta());
        if zoom_delta != 1.0 {
            self.config.font_scale = (self.config.font_scale * zoom_delta).clamp(0.75, 2.5);
            if (zoom_delta - 1.0).abs() > 0.01 {
                let _ = self.config.save();
            }
        }

        ctx.set_pixels_per_point(self.config.font_scale);

        self.check_async_results();

        // Advance the load-bar animation
        let elapsed = self.progress_start.elapsed().as_secs_f32();
        match self.progress_phase {
            ProgressPhase::Idle => {}
            ProgressPhase::FastStart => {
                // 0 to 20% in 0.3s
                self.progress = (elapsed / 0.3 * 0.2).min(0.2);
                if elapsed >= 0.3 {
                    self.progress_phase = ProgressPhase::SlowCrawl;
                    self.progress_start = Instant::now();
                }
                ctx.request_repaint();
            }
            ProgressPhase::SlowCrawl => {
                // 20% to 55% over ~8s; stalls there until the response lands
                self.progress = 0.2 + (elapsed / 8.0 * 0.35).min(0.35);
                ctx.request_repaint();
            }
            ProgressPhase::Completing => {
                // Snap the remainder in 0.12s
                let t = (elapsed / 0.12).min(1.0);
                self.progress = self.progress + (1.0 - self.progress) * t;
                if elapsed >= 0.12 {
                    self.progress = 1.0;
                    self.progress_phase = ProgressPhase::FadingOut;
                    self.progress_start = Instant::now();
                }
                ctx.request_repaint();
            }
            ProgressPhase::FadingOut => {
                if elapsed >= FADE_SECS {
                    self.progress_phase = ProgressPhase::Idle;
                    self.progress = 0.0;
                }
                ctx.request_repaint();
            }
            ProgressPhase::Shrinking => {
                // Collapse in 0.18s on error
                let t = (elapsed / 0.18).min(1.0);
                self.progress = self.progress * (1.0 - t);
                if elapsed >= 0.18 {
                    self.progress_phase = ProgressPhase::Idle;
                    self.progress = 0.0;
                }
                ctx.request_repaint();
            }
        }

        // Render the booking dialog if open
        if self.show_dialog {
            self.render_booking_dialog(ctx);
        }

        // Render settings dialog if open
        if self.show_settings {
            egui::Window::new("Settings")
                .collapsible(false)
                .resizable(false)
                .default_width(650.0)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .frame(theme::dialog_frame())
                .show(ctx, |ui| {
                    self.render_settings(ui);
                });
        }

        // Render cancel confirmation dialog
        if self.show_cancel_confirm {
            self.render_cancel_confirm(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().inner_margin(egui::Margin::symmetric(12.0, 0.0)))
            .show(ctx, |ui| {
                // Load bar pinned at the top; its height is reserved even
                // when idle so nothing below shifts
                let bar_height = 4.0;
                let (rect, _) = ui.allocate_exact_size(
                    egui::vec2(ui.available_width(), bar_height),
                    egui::Sense::hover(),
                );

                if self.progress_phase != ProgressPhase::Idle
                    && ui.is_rect_visible(rect)
                    && self.progress > 0.0
                {
                    let painter = ui.painter();
                    let fill_width = rect.width() * self.progress;
                    let bar_rect =
                        egui::Rect::from_min_size(rect.min, egui::vec2(fill_width, bar_height));
                    let alpha = if self.progress_phase == ProgressPhase::FadingOut {
                        let t = self.progress_start.elapsed().as_secs_f32() / FADE_SECS;
                        ((1.0 - t) * 255.0) as u8
                    } else {
                        255
                    };
                    painter.rect_filled(
                        bar_rect,
                        0.0,
                        Color32::from_rgba_unmultiplied(255, 255, 255, alpha),
                    );
                }

                // Status line with copy and dismiss controls
                let mut dismiss_message = false;
                let mut copy_message: Option<String> = None;
                if !self.loading {
                    if let Some((msg, is_error)) = &self.status_message {
                        let color = if *is_error {
                            theme::DANGER
                        } else {
                            theme::SUCCESS
                        };
                        let dim_color = theme::TEXT_FAINT;
                        ui.horizontal(|ui| {
                            ui.add(egui::Label::new(RichText::new(msg).color(color)));

                            ui.add_space(8.0);

                            let copy_btn = ui.add(
                                egui::Label::new(
                                    RichText::new(egui_phosphor::regular::COPY)
                                        .size(14.0)
                                        .color(dim_color),
                                )
                                .sense(egui::Sense::click()),
                            );
                            if copy_btn.hovered() {
                                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            }
                            if copy_btn.clicked() {
                                copy_message = Some(msg.clone());
                            }

                            let close_btn = ui.add(
                                egui::Label::new(
                                    RichText::new(egui_phosphor::regular::X)
                                        .size(14.0)
                                        .color(dim_color),
                                )
                                .sense(egui::Sense::click()),
                            );
                            if close_btn.hovered() {
                                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            }
                            if close_btn.clicked() {
                                dismiss_message = true;
                            }
                        });
                        ui.add_space(8.0);
                    }
                }
                if let Some(text) = copy_message {
                    ui.ctx().copy_text(text);
                }
                if dismiss_message {
                    self.status_message = None;
                }

                match self.state {
                    AppState::Setup => self.render_setup(ui),
                    AppState::Main => self.render_main(ui),
                }
            });
    }
}

impl SalonApp {
    fn render_booking_dialog(&mut self, ctx: &egui::Context) {
        let title = match self.dialog_mode {
            DialogMode::Add => "New booking",
            DialogMode::Edit => "Edit booking",
        };

        let mut picked_customer: Option<String> = None;
        let mut picked_staff: Option<String> = None;
        let mut toggled_service: Option<String> = None;
        let mut picked_status: Option<AppointmentStatus> = None;
        let mut save_requested = false;
        let mut close_requested = false;

        let error_frame = |flagged: bool| {
            if flagged {
                egui::Frame::none()
                    .stroke(egui::Stroke::new(2.0, theme::DANGER))
                    .rounding(4.0)
                    .inner_margin(2.0)
            } else {
                egui::Frame::none()
            }
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(true)
            .default_width(620.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .title_bar(true)
            .frame(theme::dialog_frame())
            .show(ctx, |ui| {
                ui.set_min_width(560.0);

                egui::Grid::new("booking_grid")
                    .num_columns(2)
                    .spacing([12.0, 10.0])
                    .show(ui, |ui| {
                        // Client
                        ui.label("Client");
                        let customer_label = self
                            .dialog_customer_id
                            .as_ref()
                            .and_then(|id| self.customers.iter().find(|c| &c.id == id))
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| "Select client".to_string());
                        error_frame(self.error_customer).show(ui, |ui| {
                            egui::ComboBox::from_id_salt("dialog_customer")
                                .selected_text(customer_label)
                                .width(320.0)
                                .show_ui(ui, |ui| {
                                    for customer in &self.customers {
                                        let selected = self.dialog_customer_id.as_deref()
                                            == Some(customer.id.as_str());
                                        let text = if customer.phone.is_empty() {
                                            customer.name.clone()
                                        } else {
                                            format!("{} · {}", customer.name, customer.phone)
                                        };
                                        if ui.selectable_label(selected, text).clicked() {
                                            picked_customer = Some(customer.id.clone());
                                        }
                                    }
                                });
                        });
                        ui.end_row();

                        // Staff
                        ui.label("Staff");
                        let staff_label = self
                            .dialog_staff_id
                            .as_ref()
                            .and_then(|id| self.staff.iter().find(|m| &m.id == id))
                            .map(|m| m.name.clone())
                            .unwrap_or_else(|| "Select staff".to_string());
                        error_frame(self.error_staff).show(ui, |ui| {
                            egui::ComboBox::from_id_salt("dialog_staff")
                                .selected_text(staff_label)
                                .width(320.0)
                                .show_ui(ui, |ui| {
                                    for member in &self.staff {
                                        let selected = self.dialog_staff_id.as_deref()
                                            == Some(member.id.as_str());
                                        if ui.selectable_label(selected, &member.name).clicked() {
                                            picked_staff = Some(member.id.clone());
                                        }
                                    }
                                });
                        });
                        ui.end_row();

                        // Date
                        ui.label("Date");
                        error_frame(self.error_date).show(ui, |ui| {
                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.dialog_date)
                                    .desired_width(150.0)
                                    .hint_text("2026-08-04"),
                            );
                            if response.changed() {
                                self.error_date = false;
                            }
                        });
                        ui.end_row();

                        // Start time
                        ui.label("Start");
                        error_frame(self.error_time).show(ui, |ui| {
                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.dialog_time)
                                    .desired_width(150.0)
                                    .hint_text("9:00 AM"),
                            );
                            if response.changed() {
                                self.error_time = false;
                            }
                        });
                        ui.end_row();

                        // Status
                        ui.label("Status");
                        egui::ComboBox::from_id_salt("dialog_status")
                            .selected_text(self.dialog_status.label())
                            .width(150.0)
                            .show_ui(ui, |ui| {
                                for status in AppointmentStatus::ALL {
                                    if ui
                                        .selectable_label(
                                            self.dialog_status == status,
                                            status.label(),
                                        )
                                        .clicked()
                                    {
                                        picked_status = Some(status);
                                    }
                                }
                            });
                        ui.end_row();
                    });

                ui.add_space(12.0);
                ui.label("Services");

                // Service chips - dark by default, bright blue when selected.
                // Toggling recomputes duration and price from the selection.
                if self.services.is_empty() {
                    ui.label(
                        RichText::new("Catalog loading...")
                            .size(14.0)
                            .color(theme::TEXT_FAINT),
                    );
                } else {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;
                        for service in &self.services {
                            let selected = self.dialog_service_ids.contains(&service.id);
                            let chip_text =
                                format!("{} · {}m", service.name, service.duration);
                            let font_id = egui::FontId::proportional(15.0);
                            let text_size = ui.fonts(|f| {
                                f.layout_no_wrap(chip_text.clone(), font_id.clone(), Color32::WHITE)
                                    .size()
                            });
                            let padding = egui::vec2(8.0, 4.0);
                            let button_size = text_size + padding * 2.0;

                            let (rect, response) =
                                ui.allocate_exact_size(button_size, egui::Sense::click());

                            let (text_color, bg_color) = if selected {
                                (Color32::WHITE, theme::ACCENT)
                            } else {
                                (theme::TEXT_FAINT, Color32::TRANSPARENT)
                            };

                            if selected {
                                ui.painter().rect_filled(
                                    rect,
                                    egui::Rounding::same(3.0),
                                    bg_color,
                                );
                            }
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                &chip_text,
                                font_id,
                                text_color,
                            );

                            if response.hovered() {
                                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            }
                            if response.clicked() {
                                toggled_service = Some(service.id.clone());
                            }
                        }
                    });
                }

                // Derived totals from the current selection
                let agg = aggregate(&self.dialog_service_ids, &self.services);
                ui.add_space(8.0);
                egui::Grid::new("booking_totals_grid")
                    .num_columns(2)
                    .spacing([12.0, 10.0])
                    .show(ui, |ui| {
                        if !agg.service_names.is_empty() {
                            ui.label("Selected");
                            ui.add(
                                egui::Label::new(
                                    RichText::new(&agg.service_names)
                                        .size(14.0)
                                        .color(theme::TEXT_DIM),
                                )
                                .truncate(),
                            );
                            ui.end_row();
                        }

                        ui.label("Duration");
                        ui.label(
                            RichText::new(format_minutes(agg.total_duration))
                                .size(14.0)
                                .color(theme::TEXT_DIM),
                        );
                        ui.end_row();

                        ui.label("Price");
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(&self.config.currency)
                                    .size(14.0)
                                    .color(theme::TEXT_DIM),
                            );
                            error_frame(self.error_price).show(ui, |ui| {
                                let response = ui.add(
                                    egui::TextEdit::singleline(&mut self.dialog_price)
                                        .desired_width(120.0)
                                        .hint_text("0"),
                                );
                                if response.changed() {
                                    self.error_price = false;
                                }
                            });
                        });
                        ui.end_row();
                    });

                // Notes outside the grid for more room
                ui.add_space(12.0);
                ui.label("Notes");
                let max_notes_height = (ctx.screen_rect().height() - 480.0).max(80.0).min(220.0);
                egui::ScrollArea::vertical()
                    .max_height(max_notes_height)
                    .show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut self.dialog_notes)
                                .desired_width(ui.available_width())
                                .desired_rows(3)
                                .hint_text("Anything the stylist should know?"),
                        );
                    });

                ui.add_space(14.0);

                // Progress bar for saving
                if self.progress_phase != ProgressPhase::Idle {
                    let bar_height = 4.0;
                    let (rect, _) = ui.allocate_exact_size(
                        egui::vec2(ui.available_width(), bar_height),
                        egui::Sense::hover(),
                    );
                    if ui.is_rect_visible(rect) && self.progress > 0.0 {
                        let painter = ui.painter();
                        let fill_width = rect.width() * self.progress;
                        let bar_rect =
                            egui::Rect::from_min_size(rect.min, egui::vec2(fill_width, bar_height));
                        let alpha = if self.progress_phase == ProgressPhase::FadingOut {
                            let t = self.progress_start.elapsed().as_secs_f32() / FADE_SECS;
                            ((1.0 - t) * 255.0) as u8
                        } else {
                            255
                        };
                        painter.rect_filled(
                            bar_rect,
                            0.0,
                            Color32::from_rgba_unmultiplied(255, 255, 255, alpha),
                        );
                    }
                    ui.add_space(10.0);
                }

                ui.add_enabled_ui(!self.loading, |ui| {
                    ui.horizontal(|ui| {
                        let (btn_bg, btn_hover, text_color) = theme::flat_button();
                        let font_id = egui::FontId::proportional(17.0);
                        let padding = egui::vec2(18.0, 10.0);
                        let rounding = egui::Rounding::same(6.0);

                        for (label, flag) in [
                            ("Save", &mut save_requested),
                            ("Cancel", &mut close_requested),
                        ] {
                            let size = ui.fonts(|f| {
                                f.layout_no_wrap(label.to_string(), font_id.clone(), text_color)
                                    .size()
                            });
                            let (rect, response) =
                                ui.allocate_exact_size(size + padding * 2.0, egui::Sense::click());
                            let bg = if response.hovered() { btn_hover } else { btn_bg };
                            ui.painter().rect_filled(rect, rounding, bg);
                            ui.painter().text(
                                rect.center(),
                                egui::Align2::CENTER_CENTER,
                                label,
                                font_id.clone(),
                                text_color,
                            );
                            if response.clicked() {
                                *flag = true;
                            }
                        }
                    });
                });
            });

        // Apply dialog interactions (after window closure for borrow checker)
        if let Some(id) = picked_customer {
            self.dialog_customer_id = Some(id);
            self.error_customer = false;
        }
        if let Some(id) = picked_staff {
            self.dialog_staff_id = Some(id);
            self.error_staff = false;
        }
        if let Some(id) = toggled_service {
            if let Some(pos) = self.dialog_service_ids.iter().position(|s| s == &id) {
                self.dialog_service_ids.remove(pos);
            } else {
                self.dialog_service_ids.push(id);
            }
            self.recompute_price();
        }
        if let Some(status) = picked_status {
            self.dialog_status = status;
        }
        if save_requested {
            self.save_dialog();
        }
        if close_requested {
            self.show_dialog = false;
        }
    }

    fn render_cancel_confirm(&mut self, ctx: &egui::Context) {
        let mut do_cancel = false;
        let mut keep = false;

        egui::Window::new("Cancel booking")
            .collapsible(false)
            .resizable(false)
            .default_width(400.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(theme::dialog_frame())
            .show(ctx, |ui| {
                ui.add_space(10.0);

                if let Some(appt) = &self.pending_cancel {
                    ui.label(RichText::new("Cancel this booking?").size(14.0));
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&appt.client_name).strong());
                        if !appt.client_phone.is_empty() {
                            ui.label(&appt.client_phone);
                        }
                        ui.label("-");
                        ui.add(
                            egui::Label::new(format!(
                                "{} {}",
                                appt.date.format("%b %-d"),
                                appt.time
                            ))
                            .truncate(),
                        );
                    });
                    if !appt.service.is_empty() {
                        ui.label(&appt.service);
                    }
                }

                ui.add_space(20.0);

                ui.horizontal(|ui| {
                    let (btn_bg, btn_hover, text_color) = theme::flat_button();
                    let cancel_color = theme::DANGER;
                    let font_id = egui::FontId::proportional(17.0);
                    let padding = egui::vec2(18.0, 10.0);
                    let rounding = egui::Rounding::same(6.0);

                    // Cancel-booking button - red text for emphasis
                    let confirm_text = "Cancel booking";
                    let confirm_size = ui.fonts(|f| {
                        f.layout_no_wrap(confirm_text.to_string(), font_id.clone(), cancel_color)
                            .size()
                    });
                    let (confirm_rect, confirm_response) =
                        ui.allocate_exact_size(confirm_size + padding * 2.0, egui::Sense::click());
                    let confirm_bg = if confirm_response.hovered() {
                        btn_hover
                    } else {
                        btn_bg
                    };
                    ui.painter().rect_filled(confirm_rect, rounding, confirm_bg);
                    ui.painter().text(
                        confirm_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        confirm_text,
                        font_id.clone(),
                        cancel_color,
                    );
                    if confirm_response.clicked() {
                        do_cancel = true;
                    }

                    // Keep button
                    let keep_text = "Keep";
                    let keep_size = ui.fonts(|f| {
                        f.layout_no_wrap(keep_text.to_string(), font_id.clone(), text_color)
                            .size()
                    });
                    let (keep_rect, keep_response) =
                        ui.allocate_exact_size(keep_size + padding * 2.0, egui::Sense::click());
                    let keep_bg = if keep_response.hovered() {
                        btn_hover
                    } else {
                        btn_bg
                    };
                    ui.painter().rect_filled(keep_rect, rounding, keep_bg);
                    ui.painter().text(
                        keep_rect.center(),
                        egui::Align2::CENTER_CENTER,
                        keep_text,
                        font_id,
                        text_color,
                    );
                    if keep_response.clicked() {
                        keep = true;
                    }
                });
            });

        if do_cancel {
            if let Some(appt) = self.pending_cancel.take() {
                self.save_status_change(&appt, AppointmentStatus::Cancelled);
            }
            self.show_cancel_confirm = false;
        }
        if keep {
            self.pending_cancel = None;
            self.show_cancel_confirm = false;
        }
    }
}

/// Sort key for the booking lists: calendar day, then start time
fn booking_sort_key(appt: &Appointment) -> (NaiveDate, u32) {
    let minutes = parse_time(&appt.time)
        .map(|t| t.minutes_from_midnight())
        .unwrap_or(0);
    (appt.date, minutes)
}

fn price_field_value(price: f64) -> String {
    if (price - price.round()).abs() < 0.005 {
        format!("{}", price.round() as i64)
    } else {
        format!("{:.2}", price)
    }
}

fn format_minutes(minutes: i64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 && mins > 0 {
        format!("{}h {}m", hours, mins)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", mins)
    }
}

/// Sort network failures from API errors so the UI can show the offline
/// screen instead of an error banner
fn classify_error(e: anyhow::Error) -> AsyncResult {
    let err_str = e.to_string().to_lowercase();
    if err_str.contains("connection")
        || err_str.contains("network")
        || err_str.contains("dns")
        || err_str.contains("resolve")
        || err_str.contains("timeout")
        || err_str.contains("unreachable")
        || err_str.contains("error sending request")
        || err_str.contains("no route")
        || err_str.contains("failed to lookup")
    {
        AsyncResult::Offline
    } else {
        AsyncResult::Error(format!("Error: {}", e))
    }
}
