use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidInput)?;

    let username = payload
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::InvalidInput)?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::InvalidInput)?;

    let hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e)
    })?;

    let user = User::create(&state.db, username, &hash).await.map_err(|e| {
        warn!(error = %e, username, "create user failed");
        ApiError::Store(e)
    })?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully!",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::InvalidInput)?;

    let username = payload
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(ApiError::InvalidInput)?;
    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::InvalidInput)?;

    // Unknown username and wrong password are indistinguishable to the caller
    let user = User::find_by_username(&state.db, username).await?;
    let user = match user {
        Some(u) if verify_password(password, &u.password_hash) => u,
        _ => {
            warn!(username, "login with invalid credentials");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e)
    })?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
    }))
}
