//! Barbershop appointment booking service.
//!
//! Customers pick a barber, date, time, and services, and get a 4-digit
//! booking code to look up or cancel their appointment later. An admin
//! manages the barber roster, the service catalog, and day-by-day
//! availability over a basic-auth JSON API.

pub mod auth;
pub mod availability;
pub mod booking;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use state::AppState;
