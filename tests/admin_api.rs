mod common;

use actix_web::{http::StatusCode, test, web, App};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use barberbook::{routes, AppState};

use common::{seed_admin_user, setup_pool};

macro_rules! spawn_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { db: $pool.clone() }))
                .configure(routes::public::configure)
                .configure(routes::admin::configure),
        )
        .await
    };
}

fn basic_auth(username: &str, password: &str) -> (&'static str, String) {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    ("Authorization", format!("Basic {encoded}"))
}

#[actix_web::test]
async fn admin_endpoints_require_credentials() {
    let pool = setup_pool().await;
    seed_admin_user(&pool, "admin", "secret").await;
    let app = spawn_app!(pool);

    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .insert_header(basic_auth("admin", "wrong-password"))
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn barber_crud_roundtrip() {
    let pool = setup_pool().await;
    seed_admin_user(&pool, "admin", "secret").await;
    let app = spawn_app!(pool);
    let auth = basic_auth("admin", "secret");

    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let barber: Value = test::read_body_json(res).await;
    let barber_id = barber["id"].as_str().unwrap().to_string();

    // Names are unique.
    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::put()
        .uri(&format!("/admin/api/barbers/{barber_id}"))
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Ramón" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    // The roster is public.
    let req = test::TestRequest::get().uri("/api/barbers").to_request();
    let barbers: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(barbers[0]["name"], "Ramón");

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/api/barbers/{barber_id}"))
        .insert_header(auth.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("/admin/api/barbers/{barber_id}"))
        .insert_header(auth)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn booking_flow_over_http() {
    let pool = setup_pool().await;
    seed_admin_user(&pool, "admin", "secret").await;
    let app = spawn_app!(pool);
    let auth = basic_auth("admin", "secret");

    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let barber: Value = test::call_and_read_body_json(&app, req).await;
    let barber_id = barber["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/admin/api/services")
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Corte", "price": 200 }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let req = test::TestRequest::put()
        .uri(&format!("/admin/api/availability/{barber_id}/2025-07-01"))
        .insert_header(auth.clone())
        .set_json(json!({ "times": ["09:00", "10:00"] }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{barber_id}/2025-07-01"))
        .to_request();
    let slots: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slots, json!(["09:00", "10:00"]));

    // Incomplete draft: the missing fields come back by name.
    let req = test::TestRequest::post()
        .uri("/api/bookings/prepare")
        .set_json(json!({
            "name": "Juan",
            "last_name": "",
            "phone": "55 1234 5678",
            "date": "2025-07-01",
            "time": "10:00",
            "barber": "Chente",
            "services": []
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["missing"], json!(["last_name", "services"]));

    let complete = json!({
        "name": "Juan",
        "last_name": "Pérez",
        "phone": "55 1234 5678",
        "date": "2025-07-01",
        "time": "10:00",
        "barber": "Chente",
        "services": ["Corte"]
    });

    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(complete.clone())
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let confirmed: Value = test::read_body_json(res).await;
    let code = confirmed["booking_code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 4);

    // The booked time is gone from the open set.
    let req = test::TestRequest::get()
        .uri(&format!("/api/availability/{barber_id}/2025-07-01"))
        .to_request();
    let slots: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(slots, json!(["09:00"]));

    // A second customer racing for the same slot loses cleanly.
    let req = test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(complete)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/api/bookings/{code}"))
        .to_request();
    let details: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(details["total_price"], 200);
    assert_eq!(details["appointment"]["barber"], "Chente");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/bookings/{code}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/bookings/{code}"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn purge_reports_how_many_slots_went_away() {
    let pool = setup_pool().await;
    seed_admin_user(&pool, "admin", "secret").await;
    let app = spawn_app!(pool);
    let auth = basic_auth("admin", "secret");

    let req = test::TestRequest::post()
        .uri("/admin/api/barbers")
        .insert_header(auth.clone())
        .set_json(json!({ "name": "Chente" }))
        .to_request();
    let barber: Value = test::call_and_read_body_json(&app, req).await;
    let barber_id = barber["id"].as_str().unwrap().to_string();

    // Long past, so it is gone whatever today is.
    let req = test::TestRequest::put()
        .uri(&format!("/admin/api/availability/{barber_id}/2000-01-01"))
        .insert_header(auth.clone())
        .set_json(json!({ "times": ["09:00"] }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/admin/api/availability/purge")
        .insert_header(auth)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["purged"], 1);
}
