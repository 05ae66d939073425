use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{required_text, unwrap_body};
use crate::backend::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::backend::AppState;
use crate::database::db::queries;
use crate::database::models::User;
use crate::error::{Error, Result, ValidationErrors};

const MIN_PASSWORD_LEN: usize = 6;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern"))
}

fn is_valid_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_new_password: Option<String>,
}

fn check_password(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> String {
    match value {
        None => {
            errors.add(field, "Missing data for required field.");
            String::new()
        }
        Some(p) if p.chars().count() < MIN_PASSWORD_LEN => {
            errors.add(field, format!("Length must be at least {MIN_PASSWORD_LEN}."));
            p.to_string()
        }
        Some(p) => p.to_string(),
    }
}

struct Registration {
    username: String,
    email: String,
    password: String,
}

impl RegisterRequest {
    fn validate(self) -> Result<Registration> {
        let mut errors = ValidationErrors::new();
        let username = required_text(&mut errors, "username", self.username.as_deref(), 80);
        if !username.is_empty() && username.chars().count() < 3 {
            errors.add("username", "Length must be between 3 and 80.");
        }
        let email = required_text(&mut errors, "email", self.email.as_deref(), 120);
        if !email.is_empty() && !is_valid_email(&email) {
            errors.add("email", "Not a valid email address.");
        }
        let password = check_password(&mut errors, "password", self.password.as_deref());
        errors.into_result()?;
        Ok(Registration {
            username,
            email,
            password,
        })
    }
}

pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let registration = unwrap_body(body)?.validate()?;

    if queries::user_exists(&state.db, &registration.username, &registration.email).await? {
        return Err(Error::conflict("Username or email already exists"));
    }

    let password_hash = hash_password(&registration.password)?;
    let user = match queries::create_user(
        &state.db,
        &registration.username,
        &registration.email,
        &password_hash,
    )
    .await
    {
        Ok(user) => user,
        // Lost a race with a concurrent registration.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(Error::conflict("Username or email already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, username = %user.username, "registered user");
    let access_token = issue_token(user.id, &state.config.auth)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "access_token": access_token,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = unwrap_body(body)?;
    let mut errors = ValidationErrors::new();
    let login = required_text(&mut errors, "login", request.login.as_deref(), 120);
    if request.password.is_none() {
        errors.add("password", "Missing data for required field.");
    }
    errors.into_result()?;
    let password = request.password.unwrap_or_default();

    let user = queries::find_user_by_login(&state.db, &login).await?;
    let user = match user {
        Some(user) if verify_password(&password, &user.password_hash)? => user,
        _ => {
            warn!(login = %login, "failed login attempt");
            return Err(Error::unauthorized("Invalid credentials"));
        }
    };

    info!(user_id = user.id, "user logged in");
    let access_token = issue_token(user.id, &state.config.auth)?;
    Ok(Json(json!({ "access_token": access_token, "user": user })))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: std::result::Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let request = unwrap_body(body)?;
    let mut errors = ValidationErrors::new();
    if request.current_password.is_none() {
        errors.add("current_password", "Missing data for required field.");
    }
    let new_password = check_password(&mut errors, "new_password", request.new_password.as_deref());
    match request.confirm_new_password.as_deref() {
        None => errors.add("confirm_new_password", "Missing data for required field."),
        Some(confirm) if confirm != new_password => {
            errors.add("confirm_new_password", "New passwords do not match.");
        }
        Some(_) => {}
    }
    errors.into_result()?;

    let current = request.current_password.unwrap_or_default();
    if !verify_password(&current, &user.password_hash)? {
        warn!(user_id = user.id, "password change with wrong current password");
        return Err(Error::unauthorized("Current password is incorrect"));
    }

    let hash = hash_password(&new_password)?;
    if !queries::update_password_hash(&state.db, user.id, &hash).await? {
        return Err(Error::unauthorized("User not found!"));
    }

    info!(user_id = user.id, "password changed");
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
