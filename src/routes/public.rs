use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{
    availability,
    booking::{self, BookingDraft},
    db,
    error::AppError,
    state::AppState,
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/api/barbers").route(web::get().to(list_barbers)))
        .service(web::resource("/api/services").route(web::get().to(list_services)))
        .service(web::resource("/api/availability/dates").route(web::get().to(available_dates)))
        .service(
            web::resource("/api/availability/{barber_id}/{date}")
                .route(web::get().to(open_slots)),
        )
        .service(web::resource("/api/bookings/prepare").route(web::post().to(prepare_booking)))
        .service(web::resource("/api/bookings").route(web::post().to(confirm_booking)))
        .service(
            web::resource("/api/bookings/{code}")
                .route(web::get().to(lookup_booking))
                .route(web::delete().to(cancel_booking)),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

async fn list_barbers(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let barbers = db::fetch_barbers(&state.db).await?;
    Ok(HttpResponse::Ok().json(barbers))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let services = db::fetch_services(&state.db).await?;
    Ok(HttpResponse::Ok().json(services))
}

async fn available_dates(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let dates = availability::offered_dates(&state.db).await?;
    Ok(HttpResponse::Ok().json(dates))
}

async fn open_slots(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (barber_id, date) = path.into_inner();
    let slots = availability::open_slots(&state.db, &barber_id, &date).await?;
    Ok(HttpResponse::Ok().json(slots))
}

/// Validation-only step: the customer gets their cleaned-up draft back for
/// review, or the list of missing fields. Nothing is written.
async fn prepare_booking(draft: web::Json<BookingDraft>) -> Result<HttpResponse, AppError> {
    let pending = booking::prepare(&draft)?;
    Ok(HttpResponse::Ok().json(pending))
}

async fn confirm_booking(
    state: web::Data<AppState>,
    draft: web::Json<BookingDraft>,
) -> Result<HttpResponse, AppError> {
    let appointment = booking::confirm(&state.db, &draft).await?;
    Ok(HttpResponse::Created().json(appointment))
}

async fn lookup_booking(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    let details = booking::find_by_code(&state.db, &code).await?;
    Ok(HttpResponse::Ok().json(details))
}

async fn cancel_booking(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let code = path.into_inner();
    booking::cancel_by_code(&state.db, &code).await?;
    Ok(HttpResponse::Ok().json(json!({ "cancelled": true })))
}
