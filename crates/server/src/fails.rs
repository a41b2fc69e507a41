//! Coding-fail API endpoints

use api_types::{
    auth::MessageResponse,
    fail::{FailNew, FailUpdate, FailView},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Fail, FailChanges, FailDraft};

use crate::{
    ServerError,
    server::ServerState,
    validate::{self, FieldError},
};

fn to_view(fail: Fail) -> FailView {
    FailView {
        id: fail.id,
        name: fail.name,
        description: fail.description,
        author: fail.author,
        created_by: fail.created_by,
        created_by_name: fail.created_by_name,
    }
}

/// Handle requests for listing every post
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<FailView>>, ServerError> {
    let fails = state.engine.list_fails(None).await?;
    Ok(Json(fails.into_iter().map(to_view).collect()))
}

/// Handle requests for listing one user's posts
pub async fn list_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<FailView>>, ServerError> {
    let fails = state.engine.list_fails(Some(user_id)).await?;
    Ok(Json(fails.into_iter().map(to_view).collect()))
}

/// Handle requests for a single post
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<FailView>, ServerError> {
    let fail = state.engine.fail(id).await?;
    Ok(Json(to_view(fail)))
}

/// Handle requests for creating a new post
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<FailNew>,
) -> Result<(StatusCode, Json<FailView>), ServerError> {
    let mut errors = Vec::new();
    if validate::is_blank(&payload.name) {
        errors.push(FieldError::new("name", "Name is required"));
    }
    if validate::is_blank(&payload.description) {
        errors.push(FieldError::new("description", "Description is required"));
    }
    if payload.created_by.is_none() {
        errors.push(FieldError::new("created_by", "Created_by is required"));
    }
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let draft = FailDraft {
        name: payload.name.unwrap_or_default(),
        description: payload.description.unwrap_or_default(),
        author: payload.author,
        created_by: payload.created_by.unwrap_or_default(),
    };

    let fail = state.engine.new_fail(draft).await?;
    Ok((StatusCode::CREATED, Json(to_view(fail))))
}

/// Handle requests for updating a post; `created_by` never changes.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<FailUpdate>,
) -> Result<Json<FailView>, ServerError> {
    let changes = FailChanges {
        name: payload.name,
        description: payload.description,
        author: payload.author,
    };

    let fail = state.engine.update_fail(id, changes).await?;
    Ok(Json(to_view(fail)))
}

/// Handle requests for deleting a post
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete_fail(id).await?;
    Ok(Json(MessageResponse {
        message: "Entity deleted successfully".to_string(),
    }))
}
