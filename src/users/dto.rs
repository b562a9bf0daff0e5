use serde::{Deserialize, Serialize};

use crate::{
    error::FieldError,
    users::repo::{PublicUser, Role},
    validation::{check_email, check_name, check_password},
};

/// Raw partial-update body; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated partial update. `password` is still plaintext; the service
/// hashes it before it reaches the repository.
#[derive(Debug, Default)]
pub struct UserUpdates {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
    }

    pub fn validate(self) -> Result<UserUpdates, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut updates = UserUpdates::default();

        if let Some(name) = self.name {
            match check_name(&name) {
                Some(e) => errors.push(e),
                None => updates.name = Some(name.trim().to_owned()),
            }
        }

        if let Some(email) = self.email {
            let email = email.trim().to_lowercase();
            match check_email(&email) {
                Some(e) => errors.push(e),
                None => updates.email = Some(email),
            }
        }

        if let Some(password) = self.password {
            match check_password(&password) {
                Some(e) => errors.push(e),
                None => updates.password = Some(password),
            }
        }

        if let Some(raw) = self.role.as_deref() {
            match raw.parse::<Role>() {
                Ok(role) => updates.role = Some(role),
                Err(()) => errors.push(FieldError::new("role", "Role must be either user or admin")),
            }
        }

        if errors.is_empty() {
            Ok(updates)
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub message: &'static str,
    pub users: Vec<PublicUser>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: PublicUser,
}
