use actix_web::{dev::ServiceRequest, error::ErrorUnauthorized, web, Error, HttpMessage};
use actix_web_httpauth::extractors::basic::BasicAuth;
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use uuid::Uuid;

use crate::{db, state::AppState};

#[derive(Clone, Debug)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(hash) => Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok(),
        Err(_) => false,
    }
}

pub async fn authenticate_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> Option<AdminUser> {
    let user = db::fetch_admin_by_username(&state.db, username)
        .await
        .ok()??;

    if !verify_password(password, &user.password_hash) {
        return None;
    }

    Some(AdminUser {
        id: user.id,
        username: user.username,
    })
}

pub async fn admin_validator(
    req: ServiceRequest,
    credentials: BasicAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
        return Err((ErrorUnauthorized("Unauthorized"), req));
    };

    let username = credentials.user_id().to_string();
    let password = credentials.password().unwrap_or_default().to_string();

    match authenticate_credentials(state, &username, &password).await {
        Some(user) => {
            req.extensions_mut().insert(user);
            Ok(req)
        }
        None => Err((ErrorUnauthorized("Unauthorized"), req)),
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
