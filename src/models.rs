use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BarberRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ServiceRow {
    pub id: String,
    pub name: String,
    pub price: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub barber: String,
    pub booking_code: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

/// An appointment with its recorded service names attached. The `barber`
/// field is the display name captured at booking time, and the service names
/// are the ones the customer picked then, whatever the catalog says today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub barber: String,
    pub services: Vec<String>,
    pub booking_code: String,
}

impl Appointment {
    pub fn from_row(row: AppointmentRow, services: Vec<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            last_name: row.last_name,
            phone: row.phone,
            date: row.date,
            time: row.time,
            barber: row.barber,
            services,
            booking_code: row.booking_code,
        }
    }
}

/// A recorded service name resolved against the current catalog. `price` is
/// absent when the service has since been renamed or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ServicePrice {
    pub name: String,
    pub price: Option<i64>,
}

/// What a code lookup returns: the appointment itself plus the price
/// breakdown of its services and the total of the resolvable prices.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetails {
    pub appointment: Appointment,
    pub services: Vec<ServicePrice>,
    pub total_price: i64,
}
