use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::{split_timestamp, TimeParseError, DEFAULT_SLOT_MINUTES};

/// Booking lifecycle. Lowercase in memory and in the UI, uppercase on the
/// wire; `from_wire`/`to_wire` are the only place the convention crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    /// Unrecognized wire strings land on `pending` rather than failing the
    /// whole fetch.
    pub fn from_wire(s: &str) -> Self {
        match s {
            "PENDING" => AppointmentStatus::Pending,
            "CONFIRMED" => AppointmentStatus::Confirmed,
            "IN_PROGRESS" => AppointmentStatus::InProgress,
            "COMPLETED" => AppointmentStatus::Completed,
            "CANCELLED" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Pending,
        }
    }

    pub fn to_wire(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in_progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRef {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffRef {
    pub name: String,
}

/// One service line on a stored appointment
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub duration: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiAppointment {
    pub id: String,
    pub customer: CustomerRef,
    pub staff: StaffRef,
    #[serde(default)]
    pub services: Vec<ServiceLine>,
    #[serde(rename = "appointmentDate")]
    pub appointment_date: String,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Staff {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Catalog entry: a bookable offering with its own duration and price
#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub duration: i64,
    pub price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<ApiAppointment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffResponse {
    pub staff: Vec<Staff>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesResponse {
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomersResponse {
    pub customers: Vec<Customer>,
}

/// Write-path payload for create and update. References are by id; the
/// read-path name joins never travel back to the server.
#[derive(Debug, Clone, Serialize)]
pub struct SaveAppointmentRequest {
    #[serde(rename = "customerId")]
    pub customer_id: String,
    #[serde(rename = "staffId")]
    pub staff_id: String,
    #[serde(rename = "serviceIds")]
    pub service_ids: Vec<String>,
    #[serde(rename = "appointmentDate")]
    pub appointment_date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub price: f64,
}

// Booking display model for the UI
#[derive(Debug, Clone)]
pub struct Appointment {
    pub local_id: u64,
    pub backend_id: Option<String>,
    pub client_name: String,
    pub client_phone: String,
    pub staff_name: String,
    pub service: String,
    pub date: NaiveDate,
    pub time: String, // "H:MM AM" form
    pub duration_minutes: i64,
    pub price: f64,
    pub status: AppointmentStatus,
    pub notes: String,
}

impl Appointment {
    /// Calendar-day comparison; neither side's time of day matters
    pub fn on_date(&self, date: NaiveDate) -> bool {
        self.date == date
    }
}

impl ApiAppointment {
    /// Lower the wire record into the display model. The first service line
    /// stands in for the whole booking on the read path; multi-service
    /// aggregation happens only when writing.
    pub fn into_appointment(self, local_id: u64) -> Result<Appointment, TimeParseError> {
        let (date, time) = split_timestamp(&self.appointment_date)?;

        let (service, duration_minutes, price) = match self.services.into_iter().next() {
            Some(line) => (line.name, line.duration, line.price),
            None => (String::new(), DEFAULT_SLOT_MINUTES, 0.0),
        };

        Ok(Appointment {
            local_id,
            backend_id: Some(self.id),
            client_name: self.customer.name,
            client_phone: self.customer.phone,
            staff_name: self.staff.name,
            service,
            date,
            time,
            duration_minutes,
            price,
            status: AppointmentStatus::from_wire(&self.status),
            notes: self.notes.unwrap_or_default(),
        })
    }
}

/// Format a price with the configured currency symbol, dropping the cents on
/// whole amounts
pub fn format_price(amount: f64, currency: &str) -> String {
    if (amount - amount.round()).abs() < 0.005 {
        format!("{}{}", currency, amount.round() as i64)
    } else {
        format!("{}{:.2}", currency, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_case_convention_round_trips() {
        for status in AppointmentStatus::ALL {
            assert_eq!(AppointmentStatus::from_wire(status.to_wire()), status);
            assert_eq!(status.label(), status.to_wire().to_lowercase());
        }
    }

    #[test]
    fn unknown_wire_status_defaults_to_pending() {
        assert_eq!(AppointmentStatus::from_wire("NO_SHOW"), AppointmentStatus::Pending);
        // Lowercase is not a wire spelling
        assert_eq!(AppointmentStatus::from_wire("confirmed"), AppointmentStatus::Pending);
    }

    #[test]
    fn wire_record_lowers_into_the_display_model() {
        let json = r#"{
            "id": "apt-9",
            "customer": { "name": "Asha Verma", "phone": "98-7654-3210" },
            "staff": { "name": "Rohan" },
            "services": [
                { "name": "Haircut", "duration": 60, "price": 3000 },
                { "name": "Beard Trim", "duration": 30, "price": 1500 }
            ],
            "appointmentDate": "2026-03-02T09:30:00",
            "status": "CONFIRMED",
            "notes": "walk-in"
        }"#;
        let api: ApiAppointment = serde_json::from_str(json).unwrap();
        let appt = api.into_appointment(1).unwrap();

        assert_eq!(appt.backend_id.as_deref(), Some("apt-9"));
        assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        assert_eq!(appt.time, "9:30 AM");
        // Read path shows the first service line only
        assert_eq!(appt.service, "Haircut");
        assert_eq!(appt.duration_minutes, 60);
        assert_eq!(appt.price, 3000.0);
        assert_eq!(appt.status, AppointmentStatus::Confirmed);
        assert_eq!(appt.notes, "walk-in");
    }

    #[test]
    fn serviceless_record_falls_back_to_the_default_slot() {
        let json = r#"{
            "id": "apt-10",
            "customer": { "name": "Dee" },
            "staff": { "name": "Mina" },
            "services": [],
            "appointmentDate": "2026-03-02T14:00:00",
            "status": "HELD",
            "notes": null
        }"#;
        let api: ApiAppointment = serde_json::from_str(json).unwrap();
        let appt = api.into_appointment(2).unwrap();

        assert_eq!(appt.duration_minutes, 60);
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert!(appt.notes.is_empty());
    }

    #[test]
    fn malformed_timestamp_fails_the_adapter() {
        let json = r#"{
            "id": "apt-11",
            "customer": { "name": "Dee" },
            "staff": { "name": "Mina" },
            "services": [],
            "appointmentDate": "soon",
            "status": "PENDING",
            "notes": null
        }"#;
        let api: ApiAppointment = serde_json::from_str(json).unwrap();
        assert!(api.into_appointment(3).is_err());
    }

    #[test]
    fn day_comparison_ignores_time_of_day() {
        let api: ApiAppointment = serde_json::from_str(
            r#"{
                "id": "apt-12",
                "customer": { "name": "Dee" },
                "staff": { "name": "Mina" },
                "services": [],
                "appointmentDate": "2026-03-02T23:45:00",
                "status": "PENDING",
                "notes": null
            }"#,
        )
        .unwrap();
        let appt = api.into_appointment(4).unwrap();
        assert!(appt.on_date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()));
        assert!(!appt.on_date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()));
    }

    #[test]
    fn prices_format_with_the_currency_symbol() {
        assert_eq!(format_price(1500.0, "$"), "$1500");
        assert_eq!(format_price(249.5, "$"), "$249.50");
    }
}
