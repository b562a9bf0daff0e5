use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::Duration;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, MessageResponse, SigninRequest, SignupRequest},
        jwt::JwtKeys,
        services, session,
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let new_user = payload.validate().map_err(ApiError::Validation)?;
    let user = services::create_user(&state.db, new_user).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    let max_age = Duration::seconds(keys.ttl.as_secs() as i64);
    let jar = jar.add(session::session_cookie(
        token,
        max_age,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User registered",
            user,
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SigninRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let credentials = payload.validate().map_err(ApiError::Validation)?;
    let user = services::authenticate_user(&state.db, &credentials).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;
    let max_age = Duration::seconds(keys.ttl.as_secs() as i64);
    let jar = jar.add(session::session_cookie(
        token,
        max_age,
        state.config.cookie_secure,
    ));

    info!(user_id = %user.id, email = %user.email, "user signed in");
    Ok((
        jar,
        Json(AuthResponse {
            message: "User signed in",
            user,
        }),
    ))
}

/// Always clears the cookie; the existing token is decoded only for the
/// audit log and its validity does not change the outcome.
#[instrument(skip(state, jar))]
pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    match jar.get(session::SESSION_COOKIE) {
        Some(cookie) => match JwtKeys::from_ref(&state).verify(cookie.value()) {
            Ok(claims) => info!(email = %claims.email, "user signed out"),
            Err(_) => info!("user signed out (invalid token)"),
        },
        None => info!("user signed out (no token)"),
    }

    let jar = jar.add(session::removal_cookie());
    (
        jar,
        Json(MessageResponse {
            message: "User signed out successfully",
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request as HttpRequest},
    };
    use tower::ServiceExt;

    use crate::users::repo::Role;

    fn signout_app(state: AppState) -> Router {
        Router::new()
            .route("/auth/signout", post(signout))
            .with_state(state)
    }

    #[tokio::test]
    async fn signout_clears_the_cookie_even_without_a_session() {
        let state = AppState::fake();
        let response = signout_app(state)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/auth/signout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie");
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn signout_accepts_a_valid_session_cookie() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign(3, "a@x.com", Role::User)
            .expect("sign");
        let response = signout_app(state)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/auth/signout")
                    .header(header::COOKIE, format!("token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "User signed out successfully");
    }
}
