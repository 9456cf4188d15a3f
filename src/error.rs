use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy shared by the store, the availability ledger, and the
/// booking workflow. Handlers bubble these up with `?` and the
/// [`ResponseError`] impl turns them into JSON responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure in {op}")]
    Storage {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl AppError {
    pub fn storage(op: &'static str, source: sqlx::Error) -> Self {
        AppError::Storage { op, source }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(fields) => json!({
                "error": "validation",
                "missing": fields,
            }),
            AppError::NotFound(entity) => json!({
                "error": "not_found",
                "entity": entity,
            }),
            AppError::Conflict(message) => json!({
                "error": "conflict",
                "message": message,
            }),
            AppError::Storage { op, source } => {
                // Driver details stay in the log, not in the response.
                log::error!("Storage failure in {op}: {source}");
                json!({
                    "error": "storage",
                    "message": "could not complete the operation, try again",
                })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_missing_fields() {
        let err = AppError::Validation(vec!["name".to_string(), "phone".to_string()]);
        assert_eq!(err.to_string(), "missing required fields: name, phone");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            AppError::NotFound("booking").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("taken".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::storage("insert_barber", sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
