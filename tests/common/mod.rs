#![allow(dead_code)]

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use barberbook::auth::{hash_password, new_id};
use barberbook::booking::BookingDraft;
use barberbook::db;
use barberbook::models::{BarberRow, ServiceRow};

/// Fresh in-memory database with the full schema applied. A single pooled
/// connection that never expires, so the database survives for the whole
/// test.
pub async fn setup_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    db::run_migrations(&pool).await.unwrap();
    pool
}

pub async fn seed_barber(pool: &SqlitePool, name: &str) -> BarberRow {
    db::insert_barber(pool, name).await.unwrap()
}

pub async fn seed_service(pool: &SqlitePool, name: &str, price: i64) -> ServiceRow {
    db::insert_service(pool, name, price).await.unwrap()
}

pub async fn seed_admin_user(pool: &SqlitePool, username: &str, password: &str) {
    sqlx::query(
        "INSERT INTO admin_users (id, username, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(new_id())
    .bind(username)
    .bind(hash_password(password).unwrap())
    .bind("2025-06-14T12:00:00Z")
    .execute(pool)
    .await
    .unwrap();
}

pub fn draft(barber: &str, date: &str, time: &str, services: &[&str]) -> BookingDraft {
    BookingDraft {
        name: "Juan".to_string(),
        last_name: "Pérez".to_string(),
        phone: "55 1234 5678".to_string(),
        date: date.to_string(),
        time: time.to_string(),
        barber: barber.to_string(),
        services: services.iter().map(|s| s.to_string()).collect(),
    }
}
