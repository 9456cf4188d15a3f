//! The draft-to-confirmed booking pipeline: validate the customer's draft,
//! hand back a pending payload for review, then persist it with a fresh
//! booking code on confirmation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    auth::new_id,
    db,
    error::AppError,
    models::{Appointment, BookingDetails},
};

/// How many random 4-digit codes to probe before giving up. With a code
/// space of 10,000 this only trips when the book is nearly full.
const CODE_ATTEMPTS: u32 = 32;

/// What the customer submits from the booking form. Nothing is persisted at
/// this stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub barber: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// A validated draft, trimmed and ready for the customer's final review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingBooking {
    pub name: String,
    pub last_name: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub barber: String,
    pub services: Vec<String>,
}

/// Checks that every required field is present and at least one service is
/// selected. Reports all missing fields at once and touches nothing.
pub fn prepare(draft: &BookingDraft) -> Result<PendingBooking, AppError> {
    let mut missing = Vec::new();

    if draft.name.trim().is_empty() {
        missing.push("name".to_string());
    }
    if draft.last_name.trim().is_empty() {
        missing.push("last_name".to_string());
    }
    if draft.phone.trim().is_empty() {
        missing.push("phone".to_string());
    }
    if draft.barber.trim().is_empty() {
        missing.push("barber".to_string());
    }
    if draft.date.trim().is_empty() {
        missing.push("date".to_string());
    }
    if draft.time.trim().is_empty() {
        missing.push("time".to_string());
    }

    let services: Vec<String> = draft
        .services
        .iter()
        .map(|service| service.trim().to_string())
        .filter(|service| !service.is_empty())
        .collect();
    if services.is_empty() {
        missing.push("services".to_string());
    }

    if !missing.is_empty() {
        return Err(AppError::Validation(missing));
    }

    Ok(PendingBooking {
        name: draft.name.trim().to_string(),
        last_name: draft.last_name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        date: draft.date.trim().to_string(),
        time: draft.time.trim().to_string(),
        barber: draft.barber.trim().to_string(),
        services,
    })
}

/// Persists a reviewed booking: allocates a code, then writes the
/// appointment and its service rows in one transaction. If the slot was
/// taken in the meantime the unique index turns the race into a Conflict
/// and nothing is written, so the caller can offer a retry.
pub async fn confirm(pool: &SqlitePool, draft: &BookingDraft) -> Result<Appointment, AppError> {
    let pending = prepare(draft)?;
    let booking_code = allocate_booking_code(pool).await?;

    let appointment = Appointment {
        id: new_id(),
        name: pending.name,
        last_name: pending.last_name,
        phone: pending.phone,
        date: pending.date,
        time: pending.time,
        barber: pending.barber,
        services: pending.services,
        booking_code,
    };

    db::insert_appointment(pool, &appointment).await?;

    log::info!(
        "Confirmed booking {} for {} {} with {}",
        appointment.booking_code,
        appointment.name,
        appointment.last_name,
        appointment.barber
    );

    Ok(appointment)
}

/// Probes random 4-digit codes against the store until a free one turns up,
/// giving up after a fixed number of attempts rather than looping forever.
async fn allocate_booking_code(pool: &SqlitePool) -> Result<String, AppError> {
    for _ in 0..CODE_ATTEMPTS {
        let candidate = format!("{:04}", rand::thread_rng().gen_range(0..10_000));
        if !db::booking_code_taken(pool, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(AppError::Conflict(
        "could not allocate a booking code".to_string(),
    ))
}

/// Looks up a live appointment by its booking code and resolves the price of
/// each recorded service against the current catalog. Services renamed or
/// removed since booking show up without a price and don't count toward the
/// total.
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<BookingDetails, AppError> {
    let appointment = db::fetch_appointment_by_code(pool, code)
        .await?
        .ok_or(AppError::NotFound("booking"))?;

    let services = db::resolve_service_prices(pool, &appointment.services).await?;
    let total_price = services.iter().filter_map(|service| service.price).sum();

    Ok(BookingDetails {
        appointment,
        services,
        total_price,
    })
}

/// Admin-side cancellation by appointment id.
pub async fn cancel(pool: &SqlitePool, appointment_id: &str) -> Result<(), AppError> {
    db::delete_appointment(pool, appointment_id).await
}

/// Customer-side cancellation: the booking code is the only credential.
pub async fn cancel_by_code(pool: &SqlitePool, code: &str) -> Result<(), AppError> {
    let appointment = db::fetch_appointment_by_code(pool, code)
        .await?
        .ok_or(AppError::NotFound("booking"))?;
    db::delete_appointment(pool, &appointment.id).await
}
