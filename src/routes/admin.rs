use actix_web::{web, HttpResponse};
use actix_web_httpauth::middleware::HttpAuthentication;
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::admin_validator,
    availability, booking, db,
    error::AppError,
    state::AppState,
};

#[derive(Deserialize)]
struct BarberForm {
    name: String,
}

#[derive(Deserialize)]
struct ServiceForm {
    name: String,
    price: i64,
}

#[derive(Deserialize)]
struct AvailabilityForm {
    times: Vec<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/api")
            .wrap(HttpAuthentication::basic(admin_validator))
            .service(
                web::resource("/barbers")
                    .route(web::get().to(list_barbers))
                    .route(web::post().to(create_barber)),
            )
            .service(
                web::resource("/barbers/{id}")
                    .route(web::put().to(rename_barber))
                    .route(web::delete().to(delete_barber)),
            )
            .service(
                web::resource("/services")
                    .route(web::get().to(list_services))
                    .route(web::post().to(create_service)),
            )
            .service(
                web::resource("/services/{id}")
                    .route(web::put().to(update_service))
                    .route(web::delete().to(delete_service)),
            )
            .service(web::resource("/appointments").route(web::get().to(list_appointments)))
            .service(
                web::resource("/appointments/{id}").route(web::delete().to(cancel_appointment)),
            )
            .service(web::resource("/availability/purge").route(web::post().to(purge_past)))
            .service(
                web::resource("/availability/{barber_id}/{date}")
                    .route(web::put().to(replace_availability)),
            ),
    );
}

async fn list_barbers(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let barbers = db::fetch_barbers(&state.db).await?;
    Ok(HttpResponse::Ok().json(barbers))
}

async fn create_barber(
    state: web::Data<AppState>,
    form: web::Json<BarberForm>,
) -> Result<HttpResponse, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec!["name".to_string()]));
    }

    let barber = db::insert_barber(&state.db, name).await?;
    log::info!("Created barber {}", barber.name);
    Ok(HttpResponse::Created().json(barber))
}

async fn rename_barber(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Json<BarberForm>,
) -> Result<HttpResponse, AppError> {
    let barber_id = path.into_inner();
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec!["name".to_string()]));
    }

    db::rename_barber(&state.db, &barber_id, name).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": true })))
}

async fn delete_barber(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let barber_id = path.into_inner();
    db::delete_barber(&state.db, &barber_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
}

async fn list_services(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let services = db::fetch_services(&state.db).await?;
    Ok(HttpResponse::Ok().json(services))
}

async fn create_service(
    state: web::Data<AppState>,
    form: web::Json<ServiceForm>,
) -> Result<HttpResponse, AppError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec!["name".to_string()]));
    }

    let service = db::insert_service(&state.db, name, form.price).await?;
    log::info!("Created service {} at {}", service.name, service.price);
    Ok(HttpResponse::Created().json(service))
}

async fn update_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
    form: web::Json<ServiceForm>,
) -> Result<HttpResponse, AppError> {
    let service_id = path.into_inner();
    let name = form.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(vec!["name".to_string()]));
    }

    db::update_service(&state.db, &service_id, name, form.price).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": true })))
}

async fn delete_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service_id = path.into_inner();
    db::delete_service(&state.db, &service_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "deleted": true })))
}

async fn list_appointments(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let appointments = db::fetch_all_appointments(&state.db).await?;
    Ok(HttpResponse::Ok().json(appointments))
}

async fn cancel_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let appointment_id = path.into_inner();
    booking::cancel(&state.db, &appointment_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "cancelled": true })))
}

async fn replace_availability(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    form: web::Json<AvailabilityForm>,
) -> Result<HttpResponse, AppError> {
    let (barber_id, date) = path.into_inner();
    availability::replace_offered(&state.db, &barber_id, &date, &form.times).await?;
    Ok(HttpResponse::Ok().json(json!({ "offered": form.times.len() })))
}

async fn purge_past(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    let purged = availability::purge_past(&state.db, &today).await?;
    Ok(HttpResponse::Ok().json(json!({ "purged": purged })))
}
