use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserAccount;
use crate::state::AppState;

/// GET /api/v1/users
pub async fn handle_list_users(State(state): State<AppState>) -> Json<Vec<UserAccount>> {
    Json(state.repo.users())
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub name: String,
}

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<(StatusCode, Json<UserAccount>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("User name must not be empty".into()));
    }

    let user = UserAccount {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
    };
    state.repo.upsert_user(user.clone()).map_err(AppError::Storage)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<UserRequest>,
) -> Result<Json<UserAccount>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("User name must not be empty".into()));
    }
    if !state.repo.users().iter().any(|u| u.id == user_id) {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }

    let user = UserAccount {
        id: user_id,
        name: req.name.trim().to_string(),
    };
    state.repo.upsert_user(user.clone()).map_err(AppError::Storage)?;

    Ok(Json(user))
}

/// DELETE /api/v1/users/:id
///
/// Removes only the account. Clients keep their `user_id`; they drop out
/// of that user's filtered view but stay reachable in the full list.
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut users = state.repo.users();
    let before = users.len();
    users.retain(|u| u.id != user_id);
    if users.len() == before {
        return Err(AppError::NotFound(format!("User {user_id} not found")));
    }
    state.repo.set_users(&users).map_err(AppError::Storage)?;

    info!("Deleted user {user_id}");
    Ok(StatusCode::NO_CONTENT)
}
