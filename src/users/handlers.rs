use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::dto::MessageResponse,
    auth::extractors::CurrentUser,
    error::ApiError,
    state::AppState,
    users::dto::{UpdateUserRequest, UserResponse, UsersListResponse},
    users::services,
    validation::parse_user_id,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(fetch_all_users)).route(
        "/users/:id",
        get(get_user_by_id).put(update_user).delete(delete_user),
    )
}

/// Ordered mutation decision table: no identity is a 401; a non-admin may
/// only touch their own record; a role change additionally requires admin.
fn authorize_mutation(
    identity: Option<&CurrentUser>,
    target_id: i32,
    wants_role_change: bool,
    ownership_message: &'static str,
) -> Result<(), ApiError> {
    let Some(actor) = identity else {
        return Err(ApiError::Unauthorized);
    };
    if !actor.is_admin() && actor.id != target_id {
        return Err(ApiError::Forbidden(ownership_message));
    }
    if wants_role_change && !actor.is_admin() {
        return Err(ApiError::Forbidden("Only admins can change user roles"));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn fetch_all_users(
    State(state): State<AppState>,
) -> Result<Json<UsersListResponse>, ApiError> {
    info!("getting users");
    let users = services::get_all_users(&state.db).await?;
    let count = users.len();
    Ok(Json(UsersListResponse {
        message: "Successfully retrieved users",
        users,
        count,
    }))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&raw_id).map_err(|e| ApiError::Validation(vec![e]))?;
    info!(user_id = %id, "getting user by id");

    let user = services::get_user_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(UserResponse {
        message: "Successfully retrieved user",
        user,
    }))
}

#[instrument(skip(state, identity, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    identity: Option<CurrentUser>,
    Path(raw_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_user_id(&raw_id).map_err(|e| ApiError::Validation(vec![e]))?;
    if payload.is_empty() {
        return Err(ApiError::EmptyBody);
    }
    let updates = payload.validate().map_err(ApiError::Validation)?;

    authorize_mutation(
        identity.as_ref(),
        id,
        updates.role.is_some(),
        "You can only update your own information",
    )?;

    info!(user_id = %id, "updating user");
    let user = services::update_user(&state.db, id, updates).await?;
    Ok(Json(UserResponse {
        message: "User updated successfully",
        user,
    }))
}

#[instrument(skip(state, identity))]
pub async fn delete_user(
    State(state): State<AppState>,
    identity: Option<CurrentUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_user_id(&raw_id).map_err(|e| ApiError::Validation(vec![e]))?;

    authorize_mutation(
        identity.as_ref(),
        id,
        false,
        "You can only delete your own account",
    )?;

    info!(user_id = %id, "deleting user");
    services::delete_user(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
