use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerConfig, ServerState, router, run, run_with_listener, spawn_with_listener};
pub use validate::FieldError;

mod auth;
mod fails;
mod server;
pub mod session;
mod users;
mod validate;

/// Failures a handler can produce; the single place they become HTTP.
pub enum ServerError {
    Engine(EngineError),
    /// Field-presence / well-formedness failures, reported per field.
    Validation(Vec<FieldError>),
    /// Login with an email no user has.
    InvalidCredentials,
    /// Unexpected server-side failure; details are logged, never returned.
    Internal(String),
}

#[derive(Serialize)]
pub(crate) struct Error {
    pub(crate) error: String,
}

#[derive(Serialize)]
struct ValidationBody {
    message: String,
    errors: Vec<FieldError>,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidReference(_) | EngineError::EmptyUpdate(_) => StatusCode::BAD_REQUEST,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ServerError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let error = message_for_engine_error(err);
                (status, Json(Error { error })).into_response()
            }
            ServerError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationBody {
                    message: "Validation failed. Check the input fields.".to_string(),
                    errors,
                }),
            )
                .into_response(),
            ServerError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(Error {
                    error: "Invalid credentials".to_string(),
                }),
            )
                .into_response(),
            ServerError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(Error {
                        error: "internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_invalid_reference_maps_to_400() {
        let res =
            ServerError::from(EngineError::InvalidReference("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_empty_update_maps_to_400() {
        let res = ServerError::from(EngineError::EmptyUpdate("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_database_maps_to_500() {
        let res = ServerError::from(EngineError::Database(sea_orm_db_err())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn sea_orm_db_err() -> sea_orm::DbErr {
        sea_orm::DbErr::Custom("boom".to_string())
    }

    #[test]
    fn validation_maps_to_400() {
        let res = ServerError::Validation(vec![FieldError::new("name", "Name is required")])
            .into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_credentials_maps_to_401() {
        let res = ServerError::InvalidCredentials.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_maps_to_500() {
        let res = ServerError::Internal("boom".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
