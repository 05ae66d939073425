//! Password hashing, access tokens and the authenticated-user extractor.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::AppState;
use crate::config::AuthConfig;
use crate::database::db::queries;
use crate::database::models::User;
use crate::error::{Error, Result};

/// Token payload. `sub` carries the user id as a string.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `false` for a wrong password; an error only if the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub fn issue_token(user_id: i64, config: &AuthConfig) -> Result<String> {
    issue_token_at(user_id, config, Utc::now().timestamp())
}

/// Issue a token as if the current time were `issued_at` (unix seconds).
pub fn issue_token_at(user_id: i64, config: &AuthConfig, issued_at: i64) -> Result<String> {
    let ttl = i64::try_from(config.token_ttl_seconds).unwrap_or(i64::MAX);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued_at,
        exp: issued_at.saturating_add(ttl),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

/// The user id inside a valid, unexpired token.
pub fn verify_token(token: &str, config: &AuthConfig) -> Option<i64> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    );
    match data {
        Ok(data) => match data.claims.sub.parse::<i64>() {
            Ok(user_id) => Some(user_id),
            Err(_) => {
                debug!(sub = %data.claims.sub, "token subject is not a user id");
                None
            }
        },
        Err(e) => {
            debug!(error = %e, "rejected access token");
            None
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The user behind the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts).ok_or_else(|| Error::unauthorized("Token is missing!"))?;
        let user_id = verify_token(token, &state.config.auth)
            .ok_or_else(|| Error::unauthorized("Token is invalid or expired!"))?;
        let user = queries::get_user_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("User not found!"))?;
        Ok(AuthUser(user))
    }
}
