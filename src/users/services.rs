use sqlx::PgPool;
use tracing::info;

use crate::{
    auth::password::hash_password,
    auth::services::is_unique_violation,
    error::ApiError,
    users::dto::UserUpdates,
    users::repo::{PublicUser, UserChanges},
};

pub async fn get_all_users(db: &PgPool) -> Result<Vec<PublicUser>, ApiError> {
    Ok(PublicUser::all(db).await?)
}

pub async fn get_user_by_id(db: &PgPool, id: i32) -> Result<Option<PublicUser>, ApiError> {
    Ok(PublicUser::find(db, id).await?)
}

pub async fn update_user(
    db: &PgPool,
    id: i32,
    updates: UserUpdates,
) -> Result<PublicUser, ApiError> {
    let password_hash = match updates.password.as_deref() {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let changes = UserChanges {
        name: updates.name,
        email: updates.email,
        password_hash,
        role: updates.role,
    };

    match PublicUser::update(db, id, &changes).await {
        Ok(Some(user)) => {
            info!(user_id = %id, "user updated");
            Ok(user)
        }
        Ok(None) => Err(ApiError::NotFound),
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

pub async fn delete_user(db: &PgPool, id: i32) -> Result<(), ApiError> {
    if PublicUser::delete(db, id).await? {
        info!(user_id = %id, "user deleted");
        Ok(())
    } else {
        Err(ApiError::NotFound)
    }
}
