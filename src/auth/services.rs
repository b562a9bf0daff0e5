use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    auth::dto::{Credentials, NewUser},
    auth::password::{hash_password, verify_password},
    error::ApiError,
    users::repo::{PublicUser, UserRecord},
};

pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn create_user(db: &PgPool, new_user: NewUser) -> Result<PublicUser, ApiError> {
    if UserRecord::find_by_email(db, &new_user.email)
        .await?
        .is_some()
    {
        warn!(email = %new_user.email, "signup with an already registered email");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&new_user.password)?;

    match PublicUser::insert(db, &new_user.name, &new_user.email, &hash, new_user.role).await {
        Ok(user) => {
            info!(user_id = %user.id, email = %user.email, "user created");
            Ok(user)
        }
        // Lost the race against a concurrent signup with the same email;
        // the unique index is the authority.
        Err(e) if is_unique_violation(&e) => Err(ApiError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

/// Unknown email and wrong password collapse into the same error so the
/// endpoint cannot be used to enumerate accounts.
pub async fn authenticate_user(
    db: &PgPool,
    credentials: &Credentials,
) -> Result<PublicUser, ApiError> {
    let Some(record) = UserRecord::find_by_email(db, &credentials.email).await? else {
        warn!(email = %credentials.email, "signin with unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(&credentials.password, &record.password)? {
        warn!(user_id = %record.id, "signin with a wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %record.id, email = %record.email, "user authenticated");
    Ok(record.into_public())
}
