use serde::{Deserialize, Serialize};

use crate::{
    error::FieldError,
    users::repo::{PublicUser, Role},
    validation::{check_email, check_name, check_password},
};

/// Raw signup body. Fields are optional so presence is checked by the
/// validation layer and reported per field instead of failing
/// deserialization.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated signup data; `password` is still plaintext here and is hashed
/// by the auth service before it goes anywhere near the database.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl SignupRequest {
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match self.name {
            Some(name) => {
                if let Some(e) = check_name(&name) {
                    errors.push(e);
                }
                Some(name.trim().to_owned())
            }
            None => {
                errors.push(FieldError::new("name", "Name is required"));
                None
            }
        };

        let email = match self.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if let Some(e) = check_email(&email) {
                    errors.push(e);
                }
                Some(email)
            }
            None => {
                errors.push(FieldError::new("email", "Email is required"));
                None
            }
        };

        let password = match self.password {
            Some(password) => {
                if let Some(e) = check_password(&password) {
                    errors.push(e);
                }
                Some(password)
            }
            None => {
                errors.push(FieldError::new("password", "Password is required"));
                None
            }
        };

        let role = match self.role.as_deref() {
            None => Role::User,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push(FieldError::new("role", "Role must be either user or admin"));
                Role::User
            }),
        };

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) if errors.is_empty() => Ok(NewUser {
                name,
                email,
                password,
                role,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(self) -> Result<Credentials, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = match self.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if let Some(e) = check_email(&email) {
                    errors.push(e);
                }
                Some(email)
            }
            None => {
                errors.push(FieldError::new("email", "Email is required"));
                None
            }
        };

        let password = match self.password {
            Some(password) if !password.is_empty() => Some(password),
            _ => {
                errors.push(FieldError::new("password", "Password is required"));
                None
            }
        };

        match (email, password) {
            (Some(email), Some(password)) if errors.is_empty() => {
                Ok(Credentials { email, password })
            }
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
