//! Authentication handlers.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{hash_password, issue_token, verify_password};
use crate::model::NewUser;
use crate::web::dto::{
    AuthResponse, LoginRequest, MeResponse, MessageResponse, RegisterRequest, UserInfo,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, TOKEN_COOKIE};

use super::SharedState;

fn token_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// POST /api/auth/register - Create a user and log them in.
pub async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    if req.username.is_empty() || req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request(
            "Username, email and password are required",
        ));
    }

    if state
        .stores
        .users
        .find_by_username(&req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already taken"));
    }
    if state
        .stores
        .users
        .find_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(ApiError::bad_request("Email already registered"));
    }

    let password = hash_password(&req.password, &state.auth)?;
    let user = state
        .stores
        .users
        .create(&NewUser {
            username: req.username,
            email: req.email,
            password,
        })
        .await?;

    let token = issue_token(&user.id, &user.username, &state.auth)?;
    let jar = jar.add(token_cookie(&token));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            user: UserInfo::from(user),
            token,
        }),
    ))
}

/// POST /api/auth/login - Authenticate and set the session cookie.
pub async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    // Uniform failure message; never reveal which part was wrong.
    let user = state
        .stores
        .users
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?
    {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&user.id, &user.username, &state.auth)?;
    let jar = jar.add(token_cookie(&token));

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: UserInfo::from(user),
            token,
        }),
    ))
}

/// POST /api/auth/logout - Clear the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/").build());
    (
        jar,
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    )
}

/// GET /api/auth/me - The authenticated user's profile.
pub async fn me(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = state
        .stores
        .users
        .find_by_id(&current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(MeResponse {
        user: UserInfo::from(user),
    }))
}
