//! Session endpoints.
//!
//! Login looks the user up by email alone: a password may be present in the
//! request body but no code path reads it. The credential check is
//! deliberately incomplete, not forgotten.

use api_types::{
    auth::{LoginRequest, LoginResponse, MessageResponse, StatusResponse},
    user::UserView,
};
use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{
    ServerError,
    server::ServerState,
    session,
    validate::{self, FieldError},
};

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ServerError> {
    let email = match payload.email.as_deref() {
        Some(email) if validate::is_valid_email(email) => email,
        _ => {
            return Err(ServerError::Validation(vec![FieldError::new(
                "email",
                "Valid email is required",
            )]));
        }
    };

    let user = state
        .engine
        .user_by_email(email)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    let token = session::mint(&state.config.token_secret, user.id, &user.name, Utc::now())
        .map_err(|err| ServerError::Internal(format!("failed to sign session token: {err}")))?;

    let jar = jar.add(session::session_cookie(token, state.config.secure_cookies));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserView {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        }),
    ))
}

/// Clears the session cookie unconditionally; safe to call while logged out.
pub async fn logout(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(session::clear_session_cookie(state.config.secure_cookies));
    (
        jar,
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

pub async fn status(
    State(state): State<ServerState>,
    jar: CookieJar,
) -> (CookieJar, Json<StatusResponse>) {
    let token = match jar.get(session::SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return (
                jar,
                Json(StatusResponse {
                    logged_in: false,
                    user: None,
                }),
            );
        }
    };

    match session::verify(&state.config.token_secret, &token) {
        Some(user) => (
            jar,
            Json(StatusResponse {
                logged_in: true,
                user: Some(user),
            }),
        ),
        None => {
            // Stale or forged token: clear it so the client stops sending it.
            let jar = jar.add(session::clear_session_cookie(state.config.secure_cookies));
            (
                jar,
                Json(StatusResponse {
                    logged_in: false,
                    user: None,
                }),
            )
        }
    }
}
