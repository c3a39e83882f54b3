use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::constants::{ERR_INVALID_TOKEN, ERR_NOT_AUTHENTICATED};
use crate::db::{tables, Row, Store, StoreResult};
use crate::error::AppError;
use crate::AppState;

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a password with bcrypt at the given cost
///
/// CPU-bound; call from a blocking task inside handlers.
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Check a password against a stored bcrypt hash
///
/// An empty or malformed hash never verifies.
pub fn verify_password(plain: &str, hashed: &str) -> bool {
    if hashed.is_empty() {
        return false;
    }
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

/// Return the user row if `username` exists and `password` matches its hash
///
/// Only the first row with the username is considered.
pub fn authenticate_user(store: &Store, username: &str, password: &str) -> StoreResult<Option<Row>> {
    let users = store.read_table(tables::USERS)?;
    let Some(user) = users.into_iter().find(|u| u.value("username") == username) else {
        return Ok(None);
    };

    if verify_password(password, user.value("password_hash")) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

// =============================================================================
// Access Tokens
// =============================================================================

/// JWT claims: the subject is the user id
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issue an HS256 access token for `user_id`
pub fn create_access_token(
    user_id: &str,
    secret: &str,
    expire_minutes: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::minutes(expire_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode a token and return its subject, or None if it is invalid or expired
pub fn decode_token(token: &str, secret: &str) -> Option<String> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()?;

    Some(data.claims.sub).filter(|sub| !sub.is_empty())
}

/// Token part of an `Authorization: Bearer <token>` header value
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

// =============================================================================
// Request Authentication
// =============================================================================

/// Id of the authenticated caller, resolved from the bearer token
///
/// Rejects with 401 "Not authenticated" when no bearer credentials are sent
/// and 401 "Invalid or expired token" when they do not verify.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized(ERR_NOT_AUTHENTICATED))?;

        match decode_token(token, &state.config.secret_key) {
            Some(user_id) => Ok(CurrentUser(user_id)),
            None => {
                tracing::warn!("Rejected invalid or expired access token");
                Err(AppError::Unauthorized(ERR_INVALID_TOKEN))
            }
        }
    }
}
