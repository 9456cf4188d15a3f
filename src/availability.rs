//! Per-barber, per-day slot bookkeeping. The admin offers a set of times for
//! each (barber, date); what customers can still book is that set minus the
//! times already taken by live appointments.

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::{db, error::AppError};

/// Bookable times for a barber on a date, ascending "HH:MM" order.
///
/// Offered slots live in their own table keyed by barber id; appointments
/// record the barber by name. Both are read here so a taken time drops out
/// of the result without the offered set being rewritten.
pub async fn open_slots(
    pool: &SqlitePool,
    barber_id: &str,
    date: &str,
) -> Result<Vec<String>, AppError> {
    let barber = db::fetch_barber(pool, barber_id)
        .await?
        .ok_or(AppError::NotFound("barber"))?;

    let offered = db::offered_times(pool, barber_id, date).await?;
    let booked: HashSet<String> = db::booked_times(pool, &barber.name, date)
        .await?
        .into_iter()
        .collect();

    Ok(offered
        .into_iter()
        .filter(|time| !booked.contains(time))
        .collect())
}

/// Replaces the whole offered set for (barber, date) in one transaction.
///
/// Existing appointments at removed times stay booked; the offered set only
/// controls what new customers see.
pub async fn replace_offered(
    pool: &SqlitePool,
    barber_id: &str,
    date: &str,
    times: &[String],
) -> Result<(), AppError> {
    if db::fetch_barber(pool, barber_id).await?.is_none() {
        return Err(AppError::NotFound("barber"));
    }
    db::replace_offered_slots(pool, barber_id, date, times).await
}

/// Housekeeping: drops offered slots dated strictly before `today`.
/// Appointments are never purged.
pub async fn purge_past(pool: &SqlitePool, today: &str) -> Result<u64, AppError> {
    let purged = db::purge_past_slots(pool, today).await?;
    if purged > 0 {
        log::info!("Purged {purged} past availability slots");
    }
    Ok(purged)
}

/// Dates that still have at least one offered slot, for the booking calendar.
pub async fn offered_dates(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    db::offered_dates(pool).await
}
