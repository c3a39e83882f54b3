use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_PASSWORD_REQUIRED, ERR_USERNAME_REQUIRED};
use crate::db::{generate_id, tables};
use crate::error::{AppError, Result};
use crate::models::User;
use crate::routes::extract::AppJson;
use crate::routes::owned::blocking;
use crate::security::{authenticate_user, create_access_token, hash_password};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Body returned by both login and register
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_id: String,
    pub display_name: String,
}

impl LoginResponse {
    fn bearer(access_token: String, user: User) -> Self {
        Self {
            access_token,
            token_type: "bearer",
            user_id: user.id,
            display_name: user.display_name,
        }
    }
}

/// Exchange username and password for an access token
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let row = blocking(&state.store, move |store| {
        Ok(authenticate_user(store, &payload.username, &payload.password)?)
    })
    .await?;

    let Some(row) = row else {
        tracing::warn!("Failed login attempt");
        return Err(AppError::InvalidCredentials);
    };

    let user = User::from_row(&row);
    let token = create_access_token(
        &user.id,
        &state.config.secret_key,
        state.config.access_token_expire_minutes,
    )?;

    tracing::info!("User {} logged in", user.id);
    Ok(Json(LoginResponse::bearer(token, user)))
}

/// Create an account and log it in
///
/// Returns 400 if the username is blank or already taken. The duplicate check
/// and the insert happen under one table lock.
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<Json<LoginResponse>> {
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::InvalidInput(ERR_USERNAME_REQUIRED.to_string()));
    }
    if payload.password.is_empty() {
        return Err(AppError::InvalidInput(ERR_PASSWORD_REQUIRED.to_string()));
    }

    let display_name = User::resolve_display_name(payload.display_name.as_deref(), &username);
    let cost = state.config.bcrypt_cost;
    let password = payload.password;

    let user = blocking(&state.store, move |store| {
        let password_hash = hash_password(&password, cost)?;
        let row = User::new_row(&generate_id(), &username, &password_hash, &display_name);

        let inserted = store.modify_table(tables::USERS, |rows| {
            if rows.iter().any(|r| r.value("username") == username) {
                return None;
            }
            rows.push(row.clone());
            Some(row)
        })?;

        inserted
            .map(|row| User::from_row(&row))
            .ok_or(AppError::UsernameTaken)
    })
    .await?;

    let token = create_access_token(
        &user.id,
        &state.config.secret_key,
        state.config.access_token_expire_minutes,
    )?;

    tracing::info!("New user registered: {}", user.id);
    Ok(Json(LoginResponse::bearer(token, user)))
}
