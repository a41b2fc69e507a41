//! User API endpoints

use api_types::user::{UserNew, UserView};
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::ServerState,
    validate::{self, FieldError},
};

fn to_view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

/// Handle requests for listing users
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(to_view).collect()))
}

/// Handle sign-up requests
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let mut errors = Vec::new();
    if validate::is_blank(&payload.name) {
        errors.push(FieldError::new("name", "Name is required"));
    }
    match payload.email.as_deref() {
        Some(email) if validate::is_valid_email(email) => {}
        _ => errors.push(FieldError::new("email", "Valid email is required")),
    }
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let user = state
        .engine
        .new_user(
            payload.name.as_deref().unwrap_or_default(),
            payload.email.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_view(user))))
}
