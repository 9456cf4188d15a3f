use std::collections::HashMap;
use std::{env, fs, path::Path};

use chrono::Utc;
use sqlx::error::ErrorKind;
use sqlx::SqlitePool;

use crate::{
    auth::{hash_password, new_id},
    error::AppError,
    models::{AdminUserRow, Appointment, AppointmentRow, BarberRow, ServicePrice, ServiceRow},
};

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = if let Some(path) = db_url.strip_prefix("sqlite://") {
        Some(path)
    } else if let Some(path) = db_url.strip_prefix("sqlite:") {
        Some(path)
    } else {
        None
    };

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    let db_path = Path::new(path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates the default admin account on first start. Credentials come from
/// `ADMIN_USER` / `ADMIN_PASSWORD`, falling back to admin/admin.
pub async fn seed_admin(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let existing = sqlx::query_as::<_, (String,)>("SELECT id FROM admin_users LIMIT 1")
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Ok(());
    }

    let username = env::var("ADMIN_USER").unwrap_or_else(|_| "admin".to_string());
    let password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    if password == "admin" {
        log::warn!("ADMIN_PASSWORD not set. Using default password 'admin'. Set ADMIN_PASSWORD in production.");
    }

    let password_hash = hash_password(&password)
        .map_err(|_| sqlx::Error::Protocol("password hash failed".into()))?;

    sqlx::query(
        r#"INSERT INTO admin_users (id, username, password_hash, created_at)
           VALUES (?, ?, ?, ?)"#,
    )
    .bind(new_id())
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_admin_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<AdminUserRow>, AppError> {
    sqlx::query_as::<_, AdminUserRow>(
        r#"SELECT id, username, password_hash, created_at
           FROM admin_users
           WHERE username = ?
           LIMIT 1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|err| AppError::storage("fetch_admin_by_username", err))
}

fn constraint_kind(err: &sqlx::Error) -> Option<ErrorKind> {
    match err {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

fn constraint_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db) => db.message().to_string(),
        _ => String::new(),
    }
}

// --- appointments -------------------------------------------------------

/// Inserts the appointment and its service link rows in one transaction.
/// Either everything lands or nothing does.
pub async fn insert_appointment(
    pool: &SqlitePool,
    appointment: &Appointment,
) -> Result<(), AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| AppError::storage("insert_appointment", err))?;

    sqlx::query(
        r#"INSERT INTO appointments (id, name, last_name, phone, date, time, barber, booking_code)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&appointment.id)
    .bind(&appointment.name)
    .bind(&appointment.last_name)
    .bind(&appointment.phone)
    .bind(&appointment.date)
    .bind(&appointment.time)
    .bind(&appointment.barber)
    .bind(&appointment.booking_code)
    .execute(&mut *tx)
    .await
    .map_err(|err| match constraint_kind(&err) {
        Some(ErrorKind::UniqueViolation) => {
            if constraint_message(&err).contains("booking_code") {
                AppError::Conflict("booking code already in use".to_string())
            } else {
                AppError::Conflict("time slot already booked".to_string())
            }
        }
        _ => AppError::storage("insert_appointment", err),
    })?;

    for service_name in &appointment.services {
        sqlx::query(
            "INSERT INTO appointment_services (id, appointment_id, service_name) VALUES (?, ?, ?)",
        )
        .bind(new_id())
        .bind(&appointment.id)
        .bind(service_name)
        .execute(&mut *tx)
        .await
        .map_err(|err| AppError::storage("insert_appointment", err))?;
    }

    tx.commit()
        .await
        .map_err(|err| AppError::storage("insert_appointment", err))
}

pub async fn fetch_appointment_by_code(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<Appointment>, AppError> {
    let row = sqlx::query_as::<_, AppointmentRow>(
        r#"SELECT id, name, last_name, phone, date, time, barber, booking_code
           FROM appointments
           WHERE booking_code = ?
           LIMIT 1"#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
    .map_err(|err| AppError::storage("fetch_appointment_by_code", err))?;

    let Some(row) = row else {
        return Ok(None);
    };

    let services = sqlx::query_scalar::<_, String>(
        "SELECT service_name FROM appointment_services WHERE appointment_id = ?",
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("fetch_appointment_by_code", err))?;

    Ok(Some(Appointment::from_row(row, services)))
}

pub async fn fetch_all_appointments(pool: &SqlitePool) -> Result<Vec<Appointment>, AppError> {
    let rows = sqlx::query_as::<_, AppointmentRow>(
        r#"SELECT id, name, last_name, phone, date, time, barber, booking_code
           FROM appointments
           ORDER BY date, time"#,
    )
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("fetch_all_appointments", err))?;

    let links = sqlx::query_as::<_, (String, String)>(
        "SELECT appointment_id, service_name FROM appointment_services",
    )
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("fetch_all_appointments", err))?;

    let mut services_by_appointment: HashMap<String, Vec<String>> = HashMap::new();
    for (appointment_id, service_name) in links {
        services_by_appointment
            .entry(appointment_id)
            .or_default()
            .push(service_name);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let services = services_by_appointment.remove(&row.id).unwrap_or_default();
            Appointment::from_row(row, services)
        })
        .collect())
}

/// Service rows cascade via the foreign key.
pub async fn delete_appointment(pool: &SqlitePool, appointment_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(appointment_id)
        .execute(pool)
        .await
        .map_err(|err| AppError::storage("delete_appointment", err))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("appointment"));
    }
    Ok(())
}

pub async fn booking_code_taken(pool: &SqlitePool, code: &str) -> Result<bool, AppError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM appointments WHERE booking_code = ?",
    )
    .bind(code)
    .fetch_one(pool)
    .await
    .map_err(|err| AppError::storage("booking_code_taken", err))?;

    Ok(count > 0)
}

/// Times already consumed by live appointments for a barber (by recorded
/// name) on a date.
pub async fn booked_times(
    pool: &SqlitePool,
    barber_name: &str,
    date: &str,
) -> Result<Vec<String>, AppError> {
    sqlx::query_scalar::<_, String>(
        "SELECT time FROM appointments WHERE barber = ? AND date = ?",
    )
    .bind(barber_name)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("booked_times", err))
}

// --- barbers ------------------------------------------------------------

pub async fn fetch_barbers(pool: &SqlitePool) -> Result<Vec<BarberRow>, AppError> {
    sqlx::query_as::<_, BarberRow>("SELECT id, name FROM barbers ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|err| AppError::storage("fetch_barbers", err))
}

pub async fn fetch_barber(pool: &SqlitePool, barber_id: &str) -> Result<Option<BarberRow>, AppError> {
    sqlx::query_as::<_, BarberRow>("SELECT id, name FROM barbers WHERE id = ? LIMIT 1")
        .bind(barber_id)
        .fetch_optional(pool)
        .await
        .map_err(|err| AppError::storage("fetch_barber", err))
}

pub async fn insert_barber(pool: &SqlitePool, name: &str) -> Result<BarberRow, AppError> {
    let barber = BarberRow {
        id: new_id(),
        name: name.to_string(),
    };

    sqlx::query("INSERT INTO barbers (id, name) VALUES (?, ?)")
        .bind(&barber.id)
        .bind(&barber.name)
        .execute(pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict("a barber with that name already exists".to_string())
            }
            _ => AppError::storage("insert_barber", err),
        })?;

    Ok(barber)
}

/// Historical appointments keep the old name; only the roster row changes.
pub async fn rename_barber(pool: &SqlitePool, barber_id: &str, name: &str) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE barbers SET name = ? WHERE id = ?")
        .bind(name)
        .bind(barber_id)
        .execute(pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict("a barber with that name already exists".to_string())
            }
            _ => AppError::storage("rename_barber", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("barber"));
    }
    Ok(())
}

/// Offered slots cascade away with the barber; appointments stay.
pub async fn delete_barber(pool: &SqlitePool, barber_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM barbers WHERE id = ?")
        .bind(barber_id)
        .execute(pool)
        .await
        .map_err(|err| AppError::storage("delete_barber", err))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("barber"));
    }
    Ok(())
}

// --- services -----------------------------------------------------------

pub async fn fetch_services(pool: &SqlitePool) -> Result<Vec<ServiceRow>, AppError> {
    sqlx::query_as::<_, ServiceRow>("SELECT id, name, price FROM services ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|err| AppError::storage("fetch_services", err))
}

pub async fn insert_service(
    pool: &SqlitePool,
    name: &str,
    price: i64,
) -> Result<ServiceRow, AppError> {
    let service = ServiceRow {
        id: new_id(),
        name: name.to_string(),
        price,
    };

    sqlx::query("INSERT INTO services (id, name, price) VALUES (?, ?, ?)")
        .bind(&service.id)
        .bind(&service.name)
        .bind(service.price)
        .execute(pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict("a service with that name already exists".to_string())
            }
            _ => AppError::storage("insert_service", err),
        })?;

    Ok(service)
}

pub async fn update_service(
    pool: &SqlitePool,
    service_id: &str,
    name: &str,
    price: i64,
) -> Result<(), AppError> {
    let result = sqlx::query("UPDATE services SET name = ?, price = ? WHERE id = ?")
        .bind(name)
        .bind(price)
        .bind(service_id)
        .execute(pool)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict("a service with that name already exists".to_string())
            }
            _ => AppError::storage("update_service", err),
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("service"));
    }
    Ok(())
}

pub async fn delete_service(pool: &SqlitePool, service_id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM services WHERE id = ?")
        .bind(service_id)
        .execute(pool)
        .await
        .map_err(|err| AppError::storage("delete_service", err))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("service"));
    }
    Ok(())
}

/// Resolves recorded service names against the current catalog, in the order
/// they were recorded. Names with no catalog row resolve to no price.
pub async fn resolve_service_prices(
    pool: &SqlitePool,
    names: &[String],
) -> Result<Vec<ServicePrice>, AppError> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let price = sqlx::query_scalar::<_, i64>("SELECT price FROM services WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await
            .map_err(|err| AppError::storage("resolve_service_prices", err))?;
        resolved.push(ServicePrice {
            name: name.clone(),
            price,
        });
    }
    Ok(resolved)
}

// --- availability -------------------------------------------------------

pub async fn offered_times(
    pool: &SqlitePool,
    barber_id: &str,
    date: &str,
) -> Result<Vec<String>, AppError> {
    sqlx::query_scalar::<_, String>(
        "SELECT time FROM barber_availability WHERE barber_id = ? AND date = ? ORDER BY time",
    )
    .bind(barber_id)
    .bind(date)
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("offered_times", err))
}

/// Replaces the whole offered set for a barber's day. The delete and the
/// inserts share one transaction, so a bad entry leaves the old set intact.
pub async fn replace_offered_slots(
    pool: &SqlitePool,
    barber_id: &str,
    date: &str,
    times: &[String],
) -> Result<(), AppError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|err| AppError::storage("replace_offered_slots", err))?;

    sqlx::query("DELETE FROM barber_availability WHERE barber_id = ? AND date = ?")
        .bind(barber_id)
        .bind(date)
        .execute(&mut *tx)
        .await
        .map_err(|err| AppError::storage("replace_offered_slots", err))?;

    for time in times {
        sqlx::query(
            "INSERT INTO barber_availability (id, barber_id, date, time) VALUES (?, ?, ?, ?)",
        )
        .bind(new_id())
        .bind(barber_id)
        .bind(date)
        .bind(time)
        .execute(&mut *tx)
        .await
        .map_err(|err| match constraint_kind(&err) {
            Some(ErrorKind::UniqueViolation) => {
                AppError::Conflict(format!("duplicate time {time} in offered set"))
            }
            Some(ErrorKind::ForeignKeyViolation) => AppError::NotFound("barber"),
            _ => AppError::storage("replace_offered_slots", err),
        })?;
    }

    tx.commit()
        .await
        .map_err(|err| AppError::storage("replace_offered_slots", err))
}

/// Deletes offered slots dated strictly before `today`. Returns how many
/// rows went away. Appointments are never touched here.
pub async fn purge_past_slots(pool: &SqlitePool, today: &str) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM barber_availability WHERE date < ?")
        .bind(today)
        .execute(pool)
        .await
        .map_err(|err| AppError::storage("purge_past_slots", err))?;

    Ok(result.rows_affected())
}

pub async fn offered_dates(pool: &SqlitePool) -> Result<Vec<String>, AppError> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT date FROM barber_availability ORDER BY date",
    )
    .fetch_all(pool)
    .await
    .map_err(|err| AppError::storage("offered_dates", err))
}
